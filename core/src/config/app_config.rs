//! Application configuration

use super::{default_data_dir, Migrate};
use crate::permissions::EmptyPermissionPolicy;
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "concierge.json";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8090";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	#[serde(skip)]
	pub data_dir: PathBuf,

	/// Base URL of the record store
	pub api_url: String,

	/// Logging level, used when `RUST_LOG` is not set
	pub log_level: String,

	/// What revoking a resident's last gate does to their permission record
	#[serde(default)]
	pub empty_permission_policy: EmptyPermissionPolicy,
}

impl AppConfig {
	/// Load configuration from a specific data directory, creating it on first use
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let mut config: AppConfig = serde_json::from_str(&json)?;
			config.data_dir = data_dir.to_path_buf();

			if config.current_version() < Self::target_version() {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::target_version()
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			api_url: DEFAULT_API_URL.to_string(),
			log_level: "info".to_string(),
			empty_permission_policy: EmptyPermissionPolicy::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.config_path();
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	pub fn config_path(&self) -> PathBuf {
		self.data_dir.join(CONFIG_FILE_NAME)
	}

	/// Keys accepted by [`AppConfig::get`] and [`AppConfig::set`]
	pub const KEYS: &'static [&'static str] = &["api_url", "log_level", "empty_permission_policy"];

	pub fn get(&self, key: &str) -> Result<String> {
		Ok(match key {
			"api_url" => self.api_url.clone(),
			"log_level" => self.log_level.clone(),
			"empty_permission_policy" => match self.empty_permission_policy {
				EmptyPermissionPolicy::Keep => "keep".to_string(),
				EmptyPermissionPolicy::Delete => "delete".to_string(),
			},
			_ => bail!("Unknown config key: {key}"),
		})
	}

	/// Update one key after validating the value. Does not save.
	pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"api_url" => {
				if !(value.starts_with("http://") || value.starts_with("https://")) {
					bail!("api_url must be an http(s) URL, got '{value}'");
				}
				self.api_url = value.trim_end_matches('/').to_string();
			}
			"log_level" => {
				const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
				let level = value.to_ascii_lowercase();
				if !LEVELS.contains(&level.as_str()) {
					bail!("log_level must be one of {}, got '{value}'", LEVELS.join(", "));
				}
				self.log_level = level;
			}
			"empty_permission_policy" => {
				self.empty_permission_policy = match value.to_ascii_lowercase().as_str() {
					"keep" => EmptyPermissionPolicy::Keep,
					"delete" => EmptyPermissionPolicy::Delete,
					_ => bail!("empty_permission_policy must be 'keep' or 'delete', got '{value}'"),
				};
			}
			_ => bail!("Cannot set key: {key}"),
		}
		Ok(())
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		2
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				self.version = 1;
				self.migrate()
			}
			1 => {
				// v2 adds the revoke policy
				self.empty_permission_policy = EmptyPermissionPolicy::default();
				self.version = 2;
				Ok(())
			}
			2 => Ok(()),
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}
