use async_trait::async_trait;
use cg_store_api::{
	auth::{self, AuthResponse, AuthToken},
	records, Error, Filter, ListParams, Record, RequestConfig, RequestConfigProvider,
};
use tokio::sync::RwLock;
use tracing::debug;

use super::RecordStore;

/// [`RecordStore`] over the store's HTTP API.
pub struct HttpRecordStore {
	client: reqwest::Client,
	api_url: String,
	auth_token: RwLock<Option<AuthToken>>,
}

impl HttpRecordStore {
	pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
		let client = reqwest::Client::builder()
			.user_agent(concat!("concierge/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::Transport(e.to_string()))?;

		Ok(Self {
			client,
			api_url: api_url.into(),
			auth_token: RwLock::new(None),
		})
	}
}

impl RequestConfigProvider for HttpRecordStore {
	async fn get_request_config(&self) -> RequestConfig {
		RequestConfig {
			client: self.client.clone(),
			api_url: self.api_url.clone(),
			auth_token: self.auth_token.read().await.clone(),
		}
	}
}

#[async_trait]
impl RecordStore for HttpRecordStore {
	async fn list(&self, collection: &str, params: &ListParams) -> Result<Vec<Record>, Error> {
		records::list(self.get_request_config().await, collection, params).await
	}

	async fn get_one(&self, collection: &str, id: &str) -> Result<Record, Error> {
		records::get_one(self.get_request_config().await, collection, id).await
	}

	async fn get_first(&self, collection: &str, filter: &Filter) -> Result<Record, Error> {
		records::get_first(self.get_request_config().await, collection, filter).await
	}

	async fn create(&self, collection: &str, fields: Record) -> Result<Record, Error> {
		records::create(self.get_request_config().await, collection, &fields).await
	}

	async fn update(&self, collection: &str, id: &str, fields: Record) -> Result<Record, Error> {
		records::update(self.get_request_config().await, collection, id, &fields).await
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
		records::delete(self.get_request_config().await, collection, id).await
	}

	async fn authenticate(
		&self,
		collection: &str,
		identity: &str,
		password: &str,
	) -> Result<AuthResponse, Error> {
		debug!(collection, identity, "authenticating with password");
		auth::with_password(self.get_request_config().await, collection, identity, password).await
	}

	async fn set_auth_token(&self, token: Option<AuthToken>) {
		*self.auth_token.write().await = token;
	}
}
