use anyhow::{Context as _, Result};
use cg_core::{config::AppConfig, session::SessionContext, Dashboard};
use std::path::PathBuf;

use crate::config::CliConfig;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

pub struct Context {
	pub dashboard: Dashboard,
	pub format: OutputFormat,
	pub data_dir: PathBuf,
	pub config: AppConfig,
}

impl Context {
	pub fn new(config: AppConfig, format: OutputFormat) -> Result<Self> {
		let dashboard = Dashboard::new(&config)
			.with_context(|| format!("Failed to set up a client for {}", config.api_url))?;

		Ok(Self {
			dashboard,
			format,
			data_dir: config.data_dir.clone(),
			config,
		})
	}

	/// Session of an earlier `login`, or an error telling the user to log in.
	pub async fn require_session(&self) -> Result<SessionContext> {
		match self
			.dashboard
			.restore_session()
			.await
			.context("Failed to restore the saved session")?
		{
			Some(session) => Ok(session),
			None => anyhow::bail!("Not logged in. Run 'concierge login' first."),
		}
	}

	pub fn cli_config(&self) -> Result<CliConfig> {
		CliConfig::load(&self.data_dir)
	}

	pub fn save_cli_config(&self, config: &CliConfig) -> Result<()> {
		config.save(&self.data_dir)
	}
}
