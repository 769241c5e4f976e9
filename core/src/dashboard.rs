use std::{path::Path, sync::Arc};

use tracing::{info, warn};

use crate::{
	access::{
		Accessor, DataAccess, QueryHandle, APARTMENTS, APARTMENTS_WITH_RESIDENTS, GATES,
		GATE_PERMISSIONS,
	},
	config::AppConfig,
	models::{FromRecord, Gate, GateId, Resident, UserId},
	permissions::{EmptyPermissionPolicy, GrantOutcome, Permissions, RevokeOutcome},
	session::{SessionContext, Sessions},
	store::{HttpRecordStore, RecordStore},
	views::{self, ComplexStats},
	Error,
};

/// Everything the admin screens need, wired to one record store.
///
/// Reads and mutations take the current [`SessionContext`]; any call the store rejects
/// as unauthorized ends the session.
pub struct Dashboard {
	sessions: Sessions,
	access: Arc<DataAccess>,
	permissions: Permissions,
}

impl Dashboard {
	pub fn new(config: &AppConfig) -> Result<Self, Error> {
		let store = HttpRecordStore::new(config.api_url.as_str())?;

		Ok(Self::with_store(
			Arc::new(store),
			&config.data_dir,
			config.empty_permission_policy,
		))
	}

	pub fn with_store(
		store: Arc<dyn RecordStore>,
		data_dir: &Path,
		policy: EmptyPermissionPolicy,
	) -> Self {
		let access = DataAccess::new(Arc::clone(&store));

		Self {
			sessions: Sessions::new(Arc::clone(&store), data_dir),
			permissions: Permissions::new(store, Arc::clone(&access), policy),
			access,
		}
	}

	pub async fn restore_session(&self) -> Result<Option<SessionContext>, Error> {
		self.sessions.restore().await
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, Error> {
		self.access.clear().await;
		self.sessions.login(email, password).await
	}

	pub async fn logout(&self) -> Result<(), Error> {
		self.access.clear().await;
		self.sessions.logout().await
	}

	pub fn context(&self) -> Option<SessionContext> {
		self.sessions.current()
	}

	/// Rows of `accessor` for the administered complex.
	pub async fn fetch<T>(&self, accessor: Accessor<T>) -> Result<Arc<Vec<T>>, Error>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		let ctx = self.sessions.require()?;
		let result = self.access.fetch(accessor, ctx.complex_id()).await;
		self.check(result).await
	}

	/// Same rows, kept current across logins and mutations.
	pub fn follow<T>(&self, accessor: Accessor<T>) -> QueryHandle<T>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		self.access.follow(accessor, self.sessions.watch())
	}

	pub async fn residents(&self) -> Result<Vec<Resident>, Error> {
		let rows = self.fetch(APARTMENTS_WITH_RESIDENTS).await?;
		Ok(views::residents(rows.iter()))
	}

	pub async fn stats(&self) -> Result<ComplexStats, Error> {
		let (apartments, gates, permissions) = futures::try_join!(
			self.fetch(APARTMENTS),
			self.fetch(GATES),
			self.fetch(GATE_PERMISSIONS),
		)?;

		Ok(ComplexStats::collect(&apartments, &gates, &permissions))
	}

	pub async fn grant_access(&self, user_id: &UserId, gate_id: &GateId) -> Result<GrantOutcome, Error> {
		let ctx = self.sessions.require()?;
		let (resident, gate) = self.lookup(&ctx, user_id, gate_id).await?;

		let result = self.permissions.grant_access(&ctx, &resident, &gate).await;
		self.check(result).await
	}

	pub async fn revoke_access(&self, user_id: &UserId, gate_id: &GateId) -> Result<RevokeOutcome, Error> {
		let ctx = self.sessions.require()?;
		let (resident, gate) = self.lookup(&ctx, user_id, gate_id).await?;

		let result = self.permissions.revoke_access(&ctx, &resident, &gate).await;
		self.check(result).await
	}

	async fn lookup(
		&self,
		ctx: &SessionContext,
		user_id: &UserId,
		gate_id: &GateId,
	) -> Result<(Resident, Gate), Error> {
		ctx.require_complex()?;

		let resident = self
			.residents()
			.await?
			.into_iter()
			.find(|resident| resident.user_id == *user_id)
			.ok_or_else(|| Error::UnknownResident(user_id.clone()))?;

		let gate = self
			.fetch(GATES)
			.await?
			.iter()
			.find(|gate| gate.id == *gate_id)
			.cloned()
			.ok_or_else(|| Error::UnknownGate(gate_id.clone()))?;

		Ok((resident, gate))
	}

	async fn check<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
		if let Err(e) = &result {
			if e.is_unauthorized() {
				info!(%e, "store rejected the session, logging out");
				if let Err(e) = self.logout().await {
					warn!(%e, "failed to clear session");
				}
			}
		}
		result
	}
}
