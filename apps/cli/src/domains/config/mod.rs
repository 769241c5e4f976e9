use anyhow::Result;
use cg_core::config::AppConfig;
use clap::Subcommand;
use std::path::Path;

use crate::{config::CliConfig, util::prelude::*};

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
	/// Show all configuration
	Show,
	/// Get a configuration value
	Get {
		/// Configuration key (e.g., "api_url", "empty_permission_policy")
		key: String,
	},
	/// Set a configuration value
	Set {
		/// Configuration key
		key: String,
		/// Configuration value
		value: String,
	},
}

pub async fn run(data_dir: &Path, cmd: ConfigCmd) -> Result<()> {
	let mut config = AppConfig::load_from(data_dir)?;

	match cmd {
		ConfigCmd::Show => {
			let mut table = table(["Key", "Value"]);
			for key in AppConfig::KEYS {
				table.add_row(vec![key.to_string(), config.get(key)?]);
			}

			println!("{}", table);
			println!();
			println!("Config file: {}", config.config_path().display());
			println!("View state: {}", CliConfig::config_path(data_dir).display());
		}
		ConfigCmd::Get { key } => {
			println!("{}", config.get(&key)?);
		}
		ConfigCmd::Set { key, value } => {
			config.set(&key, &value)?;
			config.save()?;
			println!("Set {} = {}", key, config.get(&key)?);
		}
	}

	Ok(())
}
