use anyhow::Result;
use cg_core::{
	access::{GATES, GATE_PERMISSIONS},
	models::Gate,
	views::{self, GateField, SortSpec},
};
use clap::Args;
use serde::Serialize;

use comfy_table::Table;

use crate::{config::next_sort, context::Context, domains::DirectionArgs, util::prelude::*};

#[derive(Args, Debug)]
pub struct GatesArgs {
	/// Only gates whose name contains this text
	#[arg(long, short)]
	pub search: Option<String>,

	/// Column to sort by (name, kind); repeating the current column flips the order
	#[arg(long)]
	pub sort: Option<GateField>,

	#[command(flatten)]
	pub direction: DirectionArgs,
}

#[derive(Serialize)]
struct GateAccess<'a> {
	#[serde(flatten)]
	gate: &'a Gate,
	users: Vec<UserRef<'a>>,
}

#[derive(Serialize)]
struct UserRef<'a> {
	user_id: &'a str,
	name: &'a str,
}

/// One row per gate. The id column is what `access grant` and `access revoke` take.
fn gate_table(list: &[GateAccess]) -> Table {
	let mut table = table(["Name", "Type", "Gate ID", "Users", "Residents with access"]);
	for entry in list {
		let names = entry.users.iter().map(|u| u.name).collect::<Vec<_>>().join(", ");
		table.add_row(vec![
			entry.gate.name.clone(),
			entry.gate.kind.label().to_string(),
			entry.gate.id.to_string(),
			entry.users.len().to_string(),
			names,
		]);
	}
	table
}

pub async fn run(ctx: &Context, args: GatesArgs) -> Result<()> {
	ctx.require_session().await?;
	let (gates, permissions) = tokio::try_join!(
		ctx.dashboard.fetch(GATES),
		ctx.dashboard.fetch(GATE_PERMISSIONS),
	)?;

	let mut cli_config = ctx.cli_config()?;
	let spec = next_sort(
		cli_config.sorts.gates,
		SortSpec::asc(GateField::Name),
		args.sort,
		args.direction.direction(),
	);
	cli_config.sorts.gates = Some(spec);
	ctx.save_cli_config(&cli_config)?;

	let found = views::sort(
		views::filter(gates.as_slice(), args.search.as_deref().unwrap_or_default()),
		spec,
	);

	let list = found
		.into_iter()
		.map(|gate| GateAccess {
			gate,
			users: views::users_with_access(&gate.id, permissions.as_slice())
				.into_iter()
				.map(|permission| UserRef {
					user_id: permission.user_id.as_str(),
					name: permission.display_name(),
				})
				.collect(),
		})
		.collect::<Vec<_>>();

	print_output!(ctx, &list, |list: &Vec<GateAccess>| {
		if list.is_empty() {
			println!("No gates found");
			return;
		}

		println!("{}", gate_table(list));
		println!("{} gates, {}", list.len(), sort_label(spec));
	});

	Ok(())
}
