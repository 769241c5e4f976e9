use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{send, Error, Record, RequestConfig};

/// Session token issued by the record store. Sent verbatim in the `authorization` header.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

impl std::fmt::Debug for AuthToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("AuthToken(..)")
	}
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
	pub token: AuthToken,
	pub record: Record,
}

pub use with_password::exec as with_password;
pub mod with_password {
	use super::*;

	pub async fn exec(
		config: RequestConfig,
		collection: &str,
		identity: &str,
		password: &str,
	) -> Result<AuthResponse, Error> {
		send(
			collection,
			config
				.client
				.post(format!(
					"{}/auth-with-password",
					config.collection_url(collection)
				))
				.json(&json!({
					"identity": identity,
					"password": password,
				})),
		)
		.await
		.map_err(|e| match e {
			// a failed login is reported as 400 by the store
			Error::Status { status: 400, message } => Error::Unauthorized {
				status: 400,
				message,
			},
			e => e,
		})
	}
}
