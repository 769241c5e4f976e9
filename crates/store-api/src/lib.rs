pub mod auth;
pub mod filter;

use std::future::Future;

use auth::AuthToken;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

pub use filter::{Filter, Sort};

/// Untyped row as returned by the record store.
pub type Record = serde_json::Map<String, Value>;

#[derive(Clone)]
pub struct RequestConfig {
	pub client: reqwest::Client,
	pub api_url: String,
	pub auth_token: Option<AuthToken>,
}

impl RequestConfig {
	fn collection_url(&self, collection: &str) -> String {
		format!(
			"{}/api/collections/{}",
			self.api_url.trim_end_matches('/'),
			collection
		)
	}
}

pub trait RequestConfigProvider {
	fn get_request_config(&self) -> impl Future<Output = RequestConfig> + Send;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("no matching record in '{collection}'")]
	NotFound { collection: String },
	#[error("request rejected ({status}): {message}")]
	Unauthorized { status: u16, message: String },
	#[error("record store returned {status}: {message}")]
	Status { status: u16, message: String },
	#[error("transport error: {0}")]
	Transport(String),
	#[error("unexpected response: {0}")]
	Decode(String),
}

impl Error {
	/// The store answered "no such record". Every other variant is a failure of the call.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	message: String,
}

trait WithAuth {
	fn with_auth(self, token: Option<AuthToken>) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
	fn with_auth(self, token: Option<AuthToken>) -> Self {
		match token {
			Some(token) => self.header("authorization", token.0),
			None => self,
		}
	}
}

async fn send<T: DeserializeOwned>(
	collection: &str,
	req: reqwest::RequestBuilder,
) -> Result<T, Error> {
	let res = checked(collection, req).await?;

	res.json().await.map_err(|e| Error::Decode(e.to_string()))
}

async fn checked(
	collection: &str,
	req: reqwest::RequestBuilder,
) -> Result<reqwest::Response, Error> {
	let res = req
		.send()
		.await
		.map_err(|e| Error::Transport(e.to_string()))?;

	let status = res.status();
	if status.is_success() {
		return Ok(res);
	}

	let message = res
		.json::<ErrorBody>()
		.await
		.ok()
		.map(|body| body.message)
		.filter(|message| !message.is_empty())
		.unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

	debug!(collection, status = status.as_u16(), %message, "record store request failed");

	Err(match status.as_u16() {
		404 => Error::NotFound {
			collection: collection.to_string(),
		},
		status @ (401 | 403) => Error::Unauthorized { status, message },
		status => Error::Status { status, message },
	})
}

/// Query options of a collection read.
#[derive(Debug, Default, Clone)]
pub struct ListParams {
	pub filter: Option<Filter>,
	pub sort: Option<Sort>,
}

impl ListParams {
	pub fn filtered(filter: Filter) -> Self {
		Self {
			filter: Some(filter),
			..Default::default()
		}
	}

	pub fn sorted(mut self, sort: Option<Sort>) -> Self {
		self.sort = sort;
		self
	}

	fn query(&self) -> Vec<(&'static str, String)> {
		let mut query = Vec::with_capacity(2);
		if let Some(filter) = &self.filter {
			query.push(("filter", filter.to_string()));
		}
		if let Some(sort) = &self.sort {
			query.push(("sort", sort.to_string()));
		}
		query
	}
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
	#[serde(default)]
	pub page: i64,
	#[serde(default)]
	pub per_page: i64,
	pub items: Vec<T>,
}

pub mod records {
	use super::*;

	/// Number of rows requested per page when reading a full collection.
	pub const PAGE_SIZE: usize = 500;

	async fn page<T: DeserializeOwned>(
		config: &RequestConfig,
		collection: &str,
		params: &ListParams,
		page: usize,
		per_page: usize,
	) -> Result<ListResult<T>, Error> {
		let mut query = params.query();
		query.push(("page", page.to_string()));
		query.push(("perPage", per_page.to_string()));
		query.push(("skipTotal", "1".to_string()));

		trace!(collection, page, "fetching page");

		send(
			collection,
			config
				.client
				.get(format!("{}/records", config.collection_url(collection)))
				.query(&query)
				.with_auth(config.auth_token.clone()),
		)
		.await
	}

	pub use list::exec as list;
	pub mod list {
		use super::*;

		/// Reads every row matching `params`, following pages until a short page.
		pub async fn exec<T: DeserializeOwned>(
			config: RequestConfig,
			collection: &str,
			params: &ListParams,
		) -> Result<Vec<T>, Error> {
			let mut items = Vec::new();
			let mut current = 1;

			loop {
				let result = page::<T>(&config, collection, params, current, PAGE_SIZE).await?;
				let received = result.items.len();
				items.extend(result.items);

				if received < PAGE_SIZE {
					break;
				}
				current += 1;
			}

			debug!(collection, rows = items.len(), "listed records");

			Ok(items)
		}
	}

	pub use get_one::exec as get_one;
	pub mod get_one {
		use super::*;

		pub async fn exec<T: DeserializeOwned>(
			config: RequestConfig,
			collection: &str,
			id: &str,
		) -> Result<T, Error> {
			send(
				collection,
				config
					.client
					.get(format!("{}/records/{id}", config.collection_url(collection)))
					.with_auth(config.auth_token),
			)
			.await
		}
	}

	pub use get_first::exec as get_first;
	pub mod get_first {
		use super::*;

		/// First row matching `filter`, or [`Error::NotFound`] when nothing matches.
		pub async fn exec<T: DeserializeOwned>(
			config: RequestConfig,
			collection: &str,
			filter: &Filter,
		) -> Result<T, Error> {
			let params = ListParams::filtered(filter.clone());

			page::<T>(&config, collection, &params, 1, 1)
				.await?
				.items
				.into_iter()
				.next()
				.ok_or_else(|| Error::NotFound {
					collection: collection.to_string(),
				})
		}
	}

	pub use create::exec as create;
	pub mod create {
		use super::*;

		pub async fn exec<T: DeserializeOwned>(
			config: RequestConfig,
			collection: &str,
			fields: &Record,
		) -> Result<T, Error> {
			send(
				collection,
				config
					.client
					.post(format!("{}/records", config.collection_url(collection)))
					.json(fields)
					.with_auth(config.auth_token),
			)
			.await
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		/// Partial update: only the given fields are replaced.
		pub async fn exec<T: DeserializeOwned>(
			config: RequestConfig,
			collection: &str,
			id: &str,
			fields: &Record,
		) -> Result<T, Error> {
			send(
				collection,
				config
					.client
					.patch(format!("{}/records/{id}", config.collection_url(collection)))
					.json(fields)
					.with_auth(config.auth_token),
			)
			.await
		}
	}

	pub use delete::exec as delete;
	pub mod delete {
		use super::*;

		pub async fn exec(config: RequestConfig, collection: &str, id: &str) -> Result<(), Error> {
			checked(
				collection,
				config
					.client
					.delete(format!("{}/records/{id}", config.collection_url(collection)))
					.with_auth(config.auth_token),
			)
			.await
			.map(|_| ())
		}
	}
}
