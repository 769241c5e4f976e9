use anyhow::Result;
use cg_core::{
	models::Resident,
	views::{self, ResidentField, SortSpec},
};
use clap::Args;

use crate::{config::next_sort, context::Context, domains::DirectionArgs, util::prelude::*};

#[derive(Args, Debug)]
pub struct ResidentsArgs {
	/// Only residents whose name or email contains this text
	#[arg(long, short)]
	pub search: Option<String>,

	/// Column to sort by (name, email); repeating the current column flips the order
	#[arg(long)]
	pub sort: Option<ResidentField>,

	#[command(flatten)]
	pub direction: DirectionArgs,
}

pub async fn run(ctx: &Context, args: ResidentsArgs) -> Result<()> {
	ctx.require_session().await?;
	let residents = ctx.dashboard.residents().await?;

	let mut cli_config = ctx.cli_config()?;
	let spec = next_sort(
		cli_config.sorts.residents,
		SortSpec::asc(ResidentField::Name),
		args.sort,
		args.direction.direction(),
	);
	cli_config.sorts.residents = Some(spec);
	ctx.save_cli_config(&cli_config)?;

	let found = views::sort(
		views::filter(residents.as_slice(), args.search.as_deref().unwrap_or_default()),
		spec,
	);

	print_output!(ctx, &found, |found: &Vec<&Resident>| {
		if found.is_empty() {
			println!("No residents found");
			return;
		}

		let mut table = table(["Name", "Email", "User ID"]);
		for resident in found {
			table.add_row(vec![
				resident.display_name(),
				or_dash(&resident.user_email),
				resident.user_id.as_str(),
			]);
		}
		println!("{table}");
		println!("{} residents, {}", found.len(), sort_label(spec));
	});

	Ok(())
}
