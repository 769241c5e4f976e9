use std::collections::HashMap;

use anyhow::Result;
use cg_core::{
	access::{GATES, GATE_PERMISSIONS},
	models::{GateId, GatePermission},
	views::{self, PermissionField, SortSpec},
};
use clap::Args;

use crate::{config::next_sort, context::Context, domains::DirectionArgs, util::prelude::*};

#[derive(Args, Debug)]
pub struct PermissionsArgs {
	/// Only residents whose name or email contains this text
	#[arg(long, short)]
	pub search: Option<String>,

	/// Column to sort by (name, email, gates); repeating the current column flips the order
	#[arg(long)]
	pub sort: Option<PermissionField>,

	#[command(flatten)]
	pub direction: DirectionArgs,
}

pub async fn run(ctx: &Context, args: PermissionsArgs) -> Result<()> {
	ctx.require_session().await?;
	let (permissions, gates) = tokio::try_join!(
		ctx.dashboard.fetch(GATE_PERMISSIONS),
		ctx.dashboard.fetch(GATES),
	)?;

	let mut cli_config = ctx.cli_config()?;
	let spec = next_sort(
		cli_config.sorts.permissions,
		SortSpec::asc(PermissionField::Name),
		args.sort,
		args.direction.direction(),
	);
	cli_config.sorts.permissions = Some(spec);
	ctx.save_cli_config(&cli_config)?;

	let found = views::sort(
		views::filter(permissions.as_slice(), args.search.as_deref().unwrap_or_default()),
		spec,
	);
	let gate_names = gates
		.iter()
		.map(|gate| (&gate.id, gate.name.as_str()))
		.collect::<HashMap<&GateId, &str>>();

	print_output!(ctx, &found, |found: &Vec<&GatePermission>| {
		if found.is_empty() {
			println!("No permissions found");
			return;
		}

		let mut table = table(["Resident", "Email", "Gates"]);
		for permission in found {
			let names = permission
				.gate_ids
				.iter()
				// ids of deleted gates are shown as-is
				.map(|id| gate_names.get(id).copied().unwrap_or(id.as_str()))
				.collect::<Vec<_>>()
				.join(", ");
			table.add_row(vec![
				permission.display_name().to_string(),
				or_dash(&permission.user_email).to_string(),
				if names.is_empty() { "(none)".to_string() } else { names },
			]);
		}
		println!("{table}");
		println!("{} residents, {}", found.len(), sort_label(spec));
	});

	Ok(())
}
