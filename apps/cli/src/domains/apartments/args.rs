use cg_core::views::ApartmentField;
use clap::Args;

use crate::domains::DirectionArgs;

#[derive(Args, Debug)]
pub struct ApartmentsArgs {
	/// Only rows whose number, resident or access code contains this text
	#[arg(long, short)]
	pub search: Option<String>,

	/// Column to sort by (number, code, name, email); repeating the current column flips the order
	#[arg(long)]
	pub sort: Option<ApartmentField>,

	#[command(flatten)]
	pub direction: DirectionArgs,

	/// Only occupied apartments
	#[arg(long, conflicts_with = "vacant")]
	pub occupied: bool,

	/// Only vacant apartments
	#[arg(long)]
	pub vacant: bool,
}
