//! Data access: one accessor per entity family, scoped to the administered complex.

mod cache;
mod query;

use std::{marker::PhantomData, sync::Arc};

use cg_store_api::{Filter, ListParams, Sort};
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
	models::{ApartmentRow, ComplexId, FromRecord, Gate, GatePermission},
	session::SessionContext,
	store::RecordStore,
	Error,
};

pub use cache::{Generation, QueryCache, QueryKey};
pub use query::{QueryHandle, QueryState};

/// Describes one read: cache key, source collection and server-side order.
pub struct Accessor<T> {
	pub key: &'static str,
	pub collection: &'static str,
	pub sort: Option<&'static str>,
	_row: PhantomData<fn() -> T>,
}

impl<T> Clone for Accessor<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Accessor<T> {}

impl<T> Accessor<T> {
	pub const fn new(key: &'static str, collection: &'static str, sort: Option<&'static str>) -> Self {
		Self {
			key,
			collection,
			sort,
			_row: PhantomData,
		}
	}

	pub fn query_key(&self, complex_id: &ComplexId) -> QueryKey {
		QueryKey {
			entity: self.key,
			complex_id: complex_id.clone(),
		}
	}

	pub fn params(&self, complex_id: &ComplexId) -> ListParams {
		ListParams::filtered(Filter::eq("complex_id", complex_id.as_str()))
			.sorted(self.sort.map(Sort::asc))
	}
}

/// Apartments of the complex ordered by number.
pub const APARTMENTS: Accessor<ApartmentRow> =
	Accessor::new("apartments", "apartment_list", Some("apartment_number"));

/// Same view, unordered, as the source of the resident list.
pub const APARTMENTS_WITH_RESIDENTS: Accessor<ApartmentRow> =
	Accessor::new("apartments_list", "apartment_list", None);

pub const GATES: Accessor<Gate> = Accessor::new("gates", "gates", Some("name"));

pub const GATE_PERMISSIONS: Accessor<GatePermission> = Accessor::new(
	"gate_permissions",
	"gates_user_permissions_view",
	Some("user_id"),
);

pub struct DataAccess {
	store: Arc<dyn RecordStore>,
	cache: QueryCache,
}

impl DataAccess {
	pub fn new(store: Arc<dyn RecordStore>) -> Arc<Self> {
		Arc::new(Self {
			store,
			cache: QueryCache::default(),
		})
	}

	/// Rows of `accessor` for the complex. Without a complex this is empty and no
	/// request is made.
	pub async fn fetch<T>(
		&self,
		accessor: Accessor<T>,
		complex_id: Option<&ComplexId>,
	) -> Result<Arc<Vec<T>>, Error>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		let Some(complex_id) = complex_id else {
			return Ok(Arc::new(Vec::new()));
		};

		let key = accessor.query_key(complex_id);
		if let Some(rows) = self.cache.get::<T>(&key).await {
			trace!(entity = accessor.key, %complex_id, "cache hit");
			return Ok(rows);
		}

		let generation = self.cache.generation(&key).await;
		let records = self
			.store
			.list(accessor.collection, &accessor.params(complex_id))
			.await?;

		let rows = Arc::new(
			records
				.into_iter()
				.map(T::from_record)
				.collect::<Result<Vec<_>, _>>()?,
		);

		debug!(entity = accessor.key, %complex_id, rows = rows.len(), "fetched");
		self.cache.insert(key, generation, Arc::clone(&rows)).await;

		Ok(rows)
	}

	/// Drops the memoized rows and fetches again.
	pub async fn refetch<T>(
		&self,
		accessor: Accessor<T>,
		complex_id: Option<&ComplexId>,
	) -> Result<Arc<Vec<T>>, Error>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		if let Some(complex_id) = complex_id {
			self.invalidate(accessor, complex_id).await;
		}
		self.fetch(accessor, complex_id).await
	}

	pub async fn invalidate<T>(&self, accessor: Accessor<T>, complex_id: &ComplexId) {
		self.cache.invalidate(accessor.query_key(complex_id)).await;
	}

	pub async fn clear(&self) {
		self.cache.clear().await;
	}

	/// One-shot read whose result is published on the returned handle.
	pub fn subscribe<T>(
		self: &Arc<Self>,
		accessor: Accessor<T>,
		complex_id: Option<ComplexId>,
	) -> QueryHandle<T>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		let cancel = CancellationToken::new();
		let (tx, rx) = watch::channel(QueryState::Loading);

		let this = Arc::clone(self);
		let token = cancel.clone();
		tokio::spawn(async move {
			tokio::select! {
				_ = token.cancelled() => {
					debug!(entity = accessor.key, "query dropped before completion");
				}
				result = this.fetch(accessor, complex_id.as_ref()) => {
					if !token.is_cancelled() {
						tx.send_replace(result.into());
					}
				}
			}
		});

		QueryHandle::new(rx, cancel.drop_guard())
	}

	/// Read that follows the session: it runs again whenever the complex in the context
	/// changes and whenever its rows are invalidated.
	pub fn follow<T>(
		self: &Arc<Self>,
		accessor: Accessor<T>,
		mut context: watch::Receiver<Option<SessionContext>>,
	) -> QueryHandle<T>
	where
		T: FromRecord + Send + Sync + 'static,
	{
		let cancel = CancellationToken::new();
		let (tx, rx) = watch::channel(QueryState::Loading);

		let this = Arc::clone(self);
		let token = cancel.clone();
		tokio::spawn(async move {
			let mut invalidations = this.cache.subscribe();
			// complex the current state was fetched for
			let mut published: Option<Option<ComplexId>> = None;

			loop {
				let complex_id = context
					.borrow_and_update()
					.as_ref()
					.and_then(|ctx| ctx.complex_id().cloned());

				if published.as_ref() != Some(&complex_id) {
					tx.send_replace(QueryState::Loading);

					tokio::select! {
						_ = token.cancelled() => return,
						changed = context.changed() => {
							if changed.is_err() {
								return;
							}
							continue;
						}
						result = this.fetch(accessor, complex_id.as_ref()) => {
							tx.send_replace(result.into());
							published = Some(complex_id);
						}
					}
				}

				tokio::select! {
					_ = token.cancelled() => return,
					changed = context.changed() => {
						if changed.is_err() {
							return;
						}
					}
					invalidated = invalidations.recv() => match invalidated {
						Ok(key) => {
							let ours = published
								.as_ref()
								.and_then(Option::as_ref)
								.is_some_and(|complex_id| key == accessor.query_key(complex_id));
							if ours {
								published = None;
							}
						}
						Err(RecvError::Lagged(_)) => published = None,
						Err(RecvError::Closed) => return,
					},
				}
			}
		});

		QueryHandle::new(rx, cancel.drop_guard())
	}
}
