//! In-process [`RecordStore`] that records every call, for tests.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	},
	time::Duration,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cg_store_api::{
	auth::{AuthResponse, AuthToken},
	Error, Filter, ListParams, Record,
};
use serde_json::{json, Value};

use super::RecordStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	List {
		collection: String,
		filter: Option<String>,
		sort: Option<String>,
	},
	GetOne {
		collection: String,
		id: String,
	},
	GetFirst {
		collection: String,
		filter: String,
	},
	Create {
		collection: String,
		fields: Record,
	},
	Update {
		collection: String,
		id: String,
		fields: Record,
	},
	Delete {
		collection: String,
		id: String,
	},
	Authenticate {
		identity: String,
	},
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
	Unauthorized,
	Transport,
}

impl Failure {
	fn error(self) -> Error {
		match self {
			Self::Unauthorized => Error::Unauthorized {
				status: 403,
				message: "Only admins can perform this action.".to_string(),
			},
			Self::Transport => Error::Transport("connection refused".to_string()),
		}
	}
}

/// Signed-looking token whose payload carries `exp`.
pub fn token(exp: i64) -> AuthToken {
	let payload = URL_SAFE_NO_PAD.encode(json!({ "id": "admin1", "exp": exp }).to_string());
	AuthToken(format!("eyJhbGciOiJIUzI1NiJ9.{payload}.signature"))
}

pub fn record(value: Value) -> Record {
	crate::models::record(value)
}

#[derive(Default)]
pub struct MemoryStore {
	collections: Mutex<HashMap<String, Vec<Record>>>,
	calls: Mutex<Vec<Call>>,
	failures: Mutex<HashMap<String, Failure>>,
	users: Mutex<HashMap<String, (String, Record)>>,
	token: Mutex<Option<AuthToken>>,
	latency: Mutex<Option<Duration>>,
	next_id: AtomicUsize,
}

impl MemoryStore {
	pub fn insert(&self, collection: &str, row: Value) {
		self.collections
			.lock()
			.unwrap()
			.entry(collection.to_string())
			.or_default()
			.push(record(row));
	}

	pub fn rows(&self, collection: &str) -> Vec<Record> {
		self.collections
			.lock()
			.unwrap()
			.get(collection)
			.cloned()
			.unwrap_or_default()
	}

	pub fn add_user(&self, identity: &str, password: &str, user: Value) {
		self.users
			.lock()
			.unwrap()
			.insert(identity.to_string(), (password.to_string(), record(user)));
	}

	pub fn fail(&self, collection: &str, failure: Failure) {
		self.failures
			.lock()
			.unwrap()
			.insert(collection.to_string(), failure);
	}

	pub fn recover(&self, collection: &str) {
		self.failures.lock().unwrap().remove(collection);
	}

	pub fn set_latency(&self, latency: Duration) {
		*self.latency.lock().unwrap() = Some(latency);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	pub fn current_token(&self) -> Option<AuthToken> {
		self.token.lock().unwrap().clone()
	}

	async fn enter(&self, collection: &str, call: Call) -> Result<(), Error> {
		self.calls.lock().unwrap().push(call);

		let latency = *self.latency.lock().unwrap();
		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}

		let failure = self.failures.lock().unwrap().get(collection).copied();
		match failure {
			Some(failure) => Err(failure.error()),
			None => Ok(()),
		}
	}

	fn not_found(collection: &str) -> Error {
		Error::NotFound {
			collection: collection.to_string(),
		}
	}
}

#[async_trait]
impl RecordStore for MemoryStore {
	async fn list(&self, collection: &str, params: &ListParams) -> Result<Vec<Record>, Error> {
		self.enter(
			collection,
			Call::List {
				collection: collection.to_string(),
				filter: params.filter.as_ref().map(ToString::to_string),
				sort: params.sort.as_ref().map(ToString::to_string),
			},
		)
		.await?;

		let mut rows = self
			.rows(collection)
			.into_iter()
			.filter(|row| params.filter.as_ref().map_or(true, |f| f.matches(row)))
			.collect::<Vec<_>>();

		if let Some(sort) = &params.sort {
			let key = |row: &Record| row.get(&sort.field).map(ToString::to_string);
			rows.sort_by(|a, b| key(a).cmp(&key(b)));
			if sort.descending {
				rows.reverse();
			}
		}

		Ok(rows)
	}

	async fn get_one(&self, collection: &str, id: &str) -> Result<Record, Error> {
		self.enter(
			collection,
			Call::GetOne {
				collection: collection.to_string(),
				id: id.to_string(),
			},
		)
		.await?;

		self.rows(collection)
			.into_iter()
			.find(|row| row.get("id").and_then(Value::as_str) == Some(id))
			.ok_or_else(|| Self::not_found(collection))
	}

	async fn get_first(&self, collection: &str, filter: &Filter) -> Result<Record, Error> {
		self.enter(
			collection,
			Call::GetFirst {
				collection: collection.to_string(),
				filter: filter.to_string(),
			},
		)
		.await?;

		self.rows(collection)
			.into_iter()
			.find(|row| filter.matches(row))
			.ok_or_else(|| Self::not_found(collection))
	}

	async fn create(&self, collection: &str, fields: Record) -> Result<Record, Error> {
		self.enter(
			collection,
			Call::Create {
				collection: collection.to_string(),
				fields: fields.clone(),
			},
		)
		.await?;

		let mut row = fields;
		let id = format!("rec{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
		row.insert("id".to_string(), Value::String(id));
		self.collections
			.lock()
			.unwrap()
			.entry(collection.to_string())
			.or_default()
			.push(row.clone());

		Ok(row)
	}

	async fn update(&self, collection: &str, id: &str, fields: Record) -> Result<Record, Error> {
		self.enter(
			collection,
			Call::Update {
				collection: collection.to_string(),
				id: id.to_string(),
				fields: fields.clone(),
			},
		)
		.await?;

		let mut collections = self.collections.lock().unwrap();
		let row = collections
			.get_mut(collection)
			.and_then(|rows| {
				rows.iter_mut()
					.find(|row| row.get("id").and_then(Value::as_str) == Some(id))
			})
			.ok_or_else(|| Self::not_found(collection))?;

		row.extend(fields);

		Ok(row.clone())
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
		self.enter(
			collection,
			Call::Delete {
				collection: collection.to_string(),
				id: id.to_string(),
			},
		)
		.await?;

		let mut collections = self.collections.lock().unwrap();
		let rows = collections
			.get_mut(collection)
			.ok_or_else(|| Self::not_found(collection))?;
		let before = rows.len();
		rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id));

		if rows.len() == before {
			return Err(Self::not_found(collection));
		}
		Ok(())
	}

	async fn authenticate(
		&self,
		collection: &str,
		identity: &str,
		password: &str,
	) -> Result<AuthResponse, Error> {
		self.enter(
			collection,
			Call::Authenticate {
				identity: identity.to_string(),
			},
		)
		.await?;

		let users = self.users.lock().unwrap();
		match users.get(identity) {
			Some((expected, user)) if expected == password => Ok(AuthResponse {
				token: token(chrono::Utc::now().timestamp() + 3600),
				record: user.clone(),
			}),
			_ => Err(Error::Unauthorized {
				status: 400,
				message: "Failed to authenticate.".to_string(),
			}),
		}
	}

	async fn set_auth_token(&self, token: Option<AuthToken>) {
		*self.token.lock().unwrap() = token;
	}
}
