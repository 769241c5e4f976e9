//! CLI-specific configuration management

use anyhow::Result;
use cg_core::views::{
	ApartmentField, Direction, GateField, PermissionField, ResidentField, SortSpec,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration stored in the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
	/// Last ordering used by each list command
	#[serde(default)]
	pub sorts: ViewSorts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSorts {
	pub apartments: Option<SortSpec<ApartmentField>>,
	pub residents: Option<SortSpec<ResidentField>>,
	pub gates: Option<SortSpec<GateField>>,
	pub permissions: Option<SortSpec<PermissionField>>,
}

impl CliConfig {
	/// Get the CLI config file path
	pub fn config_path(data_dir: &Path) -> PathBuf {
		data_dir.join("cli.json")
	}

	/// Load CLI config from the data directory
	pub fn load(data_dir: &Path) -> Result<Self> {
		let config_path = Self::config_path(data_dir);

		if config_path.exists() {
			let json = std::fs::read_to_string(&config_path)?;
			let config: CliConfig = serde_json::from_str(&json)?;
			Ok(config)
		} else {
			let config = Self::default();
			config.save(data_dir)?;
			Ok(config)
		}
	}

	/// Save CLI config to the data directory
	pub fn save(&self, data_dir: &Path) -> Result<()> {
		std::fs::create_dir_all(data_dir)?;

		let config_path = Self::config_path(data_dir);
		let json = serde_json::to_string_pretty(self)?;
		std::fs::write(&config_path, json)?;
		Ok(())
	}
}

/// Ordering for a list command, the way clicking a column header would change it.
///
/// Naming the field the list is already sorted by flips the direction, naming another
/// field sorts by it ascending. An explicit direction always wins.
pub fn next_sort<F: Copy + PartialEq>(
	saved: Option<SortSpec<F>>,
	default: SortSpec<F>,
	field: Option<F>,
	direction: Option<Direction>,
) -> SortSpec<F> {
	let mut spec = match (saved, field) {
		(Some(saved), Some(field)) => saved.toggle(field),
		(None, Some(field)) => SortSpec::asc(field),
		(Some(saved), None) => saved,
		(None, None) => default,
	};

	if let Some(direction) = direction {
		spec.direction = direction;
	}

	spec
}
