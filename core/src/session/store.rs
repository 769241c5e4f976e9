use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cg_store_api::{auth::AuthToken, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::Error;

/// Session as the record store issued it: the token and the raw principal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
	pub token: AuthToken,
	pub record: Record,
}

impl PersistedSession {
	/// A session is valid while its token has not expired. The signature is not checked
	/// here, the store does that on every request.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(Utc::now())
	}

	pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
		token_expiry(&self.token).is_some_and(|exp| exp > now)
	}
}

/// `exp` claim of a JWT-shaped token.
pub fn token_expiry(token: &AuthToken) -> Option<DateTime<Utc>> {
	let payload = token.0.split('.').nth(1)?;
	let bytes = URL_SAFE_NO_PAD
		.decode(payload.trim_end_matches('='))
		.ok()?;
	let claims: Value = serde_json::from_slice(&bytes).ok()?;

	DateTime::from_timestamp(claims.get("exp")?.as_i64()?, 0)
}

/// File-backed store of the current session, kept in the data directory.
pub struct SessionStore {
	path: PathBuf,
}

impl SessionStore {
	pub const FILE_NAME: &'static str = "session.json";

	pub fn new(data_dir: &Path) -> Self {
		Self {
			path: data_dir.join(Self::FILE_NAME),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub async fn load(&self) -> Result<Option<PersistedSession>, Error> {
		match fs::read(&self.path).await {
			Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	pub async fn save(&self, session: &PersistedSession) -> Result<(), Error> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}
		fs::write(&self.path, serde_json::to_vec_pretty(session)?).await?;

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
		}

		debug!(path = %self.path.display(), "session saved");
		Ok(())
	}

	pub async fn clear(&self) -> Result<(), Error> {
		match fs::remove_file(&self.path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}
