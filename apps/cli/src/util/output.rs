use anyhow::Result;
use cg_core::views::{Direction, SortSpec};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use serde::Serialize;
use std::fmt::Display;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

pub fn table<const N: usize>(header: [&str; N]) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_BORDERS_ONLY);
	table.set_header(header.to_vec());
	table
}

/// Value shown for an empty cell.
pub fn or_dash(value: &str) -> &str {
	if value.is_empty() {
		"-"
	} else {
		value
	}
}

pub fn sort_label<F: Display>(spec: SortSpec<F>) -> String {
	let direction = match spec.direction {
		Direction::Asc => "ascending",
		Direction::Desc => "descending",
	};
	format!("sorted by {} {direction}", spec.field)
}
