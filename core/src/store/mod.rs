//! Seam between the dashboard logic and the hosted record store.

mod http;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use cg_store_api::{
	auth::{AuthResponse, AuthToken},
	Error, Filter, ListParams, Record,
};

pub use http::HttpRecordStore;

/// Collection-style query/command interface of the record store.
///
/// Implementations return the store's own error taxonomy untouched, so callers can
/// tell "no such record" apart from every other failure.
#[async_trait]
pub trait RecordStore: Send + Sync {
	/// Every row of `collection` matching `params`.
	async fn list(&self, collection: &str, params: &ListParams) -> Result<Vec<Record>, Error>;

	async fn get_one(&self, collection: &str, id: &str) -> Result<Record, Error>;

	/// First row matching `filter`, [`Error::NotFound`] when there is none.
	async fn get_first(&self, collection: &str, filter: &Filter) -> Result<Record, Error>;

	async fn create(&self, collection: &str, fields: Record) -> Result<Record, Error>;

	async fn update(&self, collection: &str, id: &str, fields: Record) -> Result<Record, Error>;

	async fn delete(&self, collection: &str, id: &str) -> Result<(), Error>;

	async fn authenticate(
		&self,
		collection: &str,
		identity: &str,
		password: &str,
	) -> Result<AuthResponse, Error>;

	/// Token attached to every following request.
	async fn set_auth_token(&self, token: Option<AuthToken>);
}
