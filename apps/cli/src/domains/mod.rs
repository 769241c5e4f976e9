pub mod access;
pub mod apartments;
pub mod auth;
pub mod config;
pub mod gates;
pub mod permissions;
pub mod residents;
pub mod stats;

use cg_core::views::Direction;
use clap::Args;

/// Direction flags shared by the list commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DirectionArgs {
	/// Force ascending order
	#[arg(long, conflicts_with = "desc")]
	pub asc: bool,
	/// Force descending order
	#[arg(long)]
	pub desc: bool,
}

impl DirectionArgs {
	pub fn direction(self) -> Option<Direction> {
		match (self.asc, self.desc) {
			(true, _) => Some(Direction::Asc),
			(_, true) => Some(Direction::Desc),
			_ => None,
		}
	}
}
