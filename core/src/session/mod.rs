//! Logged-in principal and the complex it administers.
//!
//! The context is handed explicitly to every data-access and mutation call. It is set up
//! once per session (restored from disk or created by a login) and torn down on logout.

mod store;

use std::{path::Path, sync::Arc};

use cg_store_api::{auth::AuthToken, Record};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
	models::{Complex, ComplexId, FromRecord, Principal},
	store::RecordStore,
	Error,
};

pub use store::{token_expiry, PersistedSession, SessionStore};

pub const USERS_COLLECTION: &str = "users";
pub const COMPLEXES_COLLECTION: &str = "res_complexes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
	pub principal: Principal,
	pub complex: Option<Complex>,
}

impl SessionContext {
	pub fn complex_id(&self) -> Option<&ComplexId> {
		self.complex.as_ref().map(|complex| &complex.id)
	}

	pub fn require_complex(&self) -> Result<&ComplexId, Error> {
		self.complex_id().ok_or(Error::NoComplex)
	}
}

pub struct Sessions {
	store: Arc<dyn RecordStore>,
	persisted: SessionStore,
	current: watch::Sender<Option<SessionContext>>,
}

impl Sessions {
	pub fn new(store: Arc<dyn RecordStore>, data_dir: &Path) -> Self {
		Self {
			store,
			persisted: SessionStore::new(data_dir),
			current: watch::Sender::new(None),
		}
	}

	pub fn current(&self) -> Option<SessionContext> {
		self.current.borrow().clone()
	}

	pub fn require(&self) -> Result<SessionContext, Error> {
		self.current().ok_or(Error::NotAuthenticated)
	}

	/// Receiver notified every time the context is set up or torn down.
	pub fn watch(&self) -> watch::Receiver<Option<SessionContext>> {
		self.current.subscribe()
	}

	/// Picks up a session persisted by an earlier run.
	///
	/// A persisted session that cannot be used is discarded. Transport failures are
	/// returned and leave the persisted session in place for the next try.
	pub async fn restore(&self) -> Result<Option<SessionContext>, Error> {
		let persisted = match self.persisted.load().await {
			Ok(Some(persisted)) => persisted,
			Ok(None) => return Ok(None),
			Err(e) => {
				warn!(%e, "persisted session unreadable, discarding it");
				self.logout().await?;
				return Ok(None);
			}
		};

		if !persisted.is_valid() {
			warn!("persisted session expired, discarding it");
			self.logout().await?;
			return Ok(None);
		}

		match self.establish(persisted.token, persisted.record).await {
			Ok(context) => {
				info!(principal = %context.principal.id, "session restored");
				Ok(Some(context))
			}
			Err(Error::Store(e)) if !e.is_unauthorized() && !e.is_not_found() => {
				self.store.set_auth_token(None).await;
				Err(e.into())
			}
			Err(e) => {
				warn!(%e, "persisted session rejected, discarding it");
				self.logout().await?;
				Ok(None)
			}
		}
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, Error> {
		let auth = self
			.store
			.authenticate(USERS_COLLECTION, email, password)
			.await?;

		let session = PersistedSession {
			token: auth.token,
			record: auth.record,
		};

		let context = match self
			.establish(session.token.clone(), session.record.clone())
			.await
		{
			Ok(context) => context,
			Err(e) => {
				self.store.set_auth_token(None).await;
				self.current.send_replace(None);
				return Err(e);
			}
		};

		self.persisted.save(&session).await?;
		info!(principal = %context.principal.id, "logged in");

		Ok(context)
	}

	pub async fn logout(&self) -> Result<(), Error> {
		self.store.set_auth_token(None).await;
		self.current.send_replace(None);
		self.persisted.clear().await?;
		info!("logged out");
		Ok(())
	}

	async fn establish(&self, token: AuthToken, record: Record) -> Result<SessionContext, Error> {
		let principal = Principal::from_record(record)?;
		self.store.set_auth_token(Some(token)).await;

		let complex = match &principal.complex_id {
			Some(complex_id) => Some(Complex::from_record(
				self.store
					.get_one(COMPLEXES_COLLECTION, complex_id.as_str())
					.await?,
			)?),
			None => {
				warn!(principal = %principal.id, "account has no complex assigned");
				None
			}
		};

		let context = SessionContext { principal, complex };
		self.current.send_replace(Some(context.clone()));

		Ok(context)
	}
}
