mod args;

use anyhow::Result;
use cg_core::{
	access::APARTMENTS,
	models::ApartmentRow,
	views::{self, ApartmentField, Occupancy, SortSpec},
};
use serde::Serialize;

use crate::{config::next_sort, context::Context, util::prelude::*};

pub use self::args::ApartmentsArgs;

#[derive(Serialize)]
struct ApartmentList<'a> {
	occupancy: Occupancy,
	apartments: Vec<&'a ApartmentRow>,
}

pub async fn run(ctx: &Context, args: ApartmentsArgs) -> Result<()> {
	ctx.require_session().await?;
	let rows = ctx.dashboard.fetch(APARTMENTS).await?;

	let mut cli_config = ctx.cli_config()?;
	let spec = next_sort(
		cli_config.sorts.apartments,
		SortSpec::asc(ApartmentField::Number),
		args.sort,
		args.direction.direction(),
	);
	cli_config.sorts.apartments = Some(spec);
	ctx.save_cli_config(&cli_config)?;

	let found = views::filter(rows.as_slice(), args.search.as_deref().unwrap_or_default())
		.into_iter()
		.filter(|row| !args.occupied || row.is_occupied())
		.filter(|row| !args.vacant || !row.is_occupied())
		.collect::<Vec<_>>();

	let list = ApartmentList {
		occupancy: Occupancy::of(rows.iter()),
		apartments: views::sort(found, spec),
	};

	print_output!(ctx, &list, |list: &ApartmentList| {
		if list.apartments.is_empty() {
			println!("No apartments found");
			return;
		}

		let mut table = table(["Number", "Code", "Resident", "Email"]);
		for row in &list.apartments {
			let resident = if row.is_occupied() {
				row.resident().map(|r| r.display_name().to_string()).unwrap_or_default()
			} else {
				"(vacant)".to_string()
			};
			table.add_row(vec![
				or_dash(&row.apartment_number),
				or_dash(&row.apartment_code),
				resident.as_str(),
				or_dash(&row.user_email),
			]);
		}
		println!("{table}");
		println!(
			"{} apartments, {} occupied, {} vacant, {}",
			list.occupancy.total,
			list.occupancy.occupied,
			list.occupancy.vacant,
			sort_label(spec)
		);
	});

	Ok(())
}
