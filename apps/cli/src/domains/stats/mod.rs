use anyhow::Result;
use cg_core::views::ComplexStats;

use crate::{context::Context, util::prelude::*};

pub async fn run(ctx: &Context) -> Result<()> {
	let session = ctx.require_session().await?;
	let stats = ctx.dashboard.stats().await?;

	print_output!(ctx, &stats, |s: &ComplexStats| {
		let mut table = table(["Metric", "Value"]);
		table.add_row(vec!["Apartments".to_string(), s.apartments.total.to_string()]);
		table.add_row(vec![
			"Occupied".to_string(),
			format!("{} ({}%)", s.apartments.occupied, s.occupancy_rate),
		]);
		table.add_row(vec!["Vacant".to_string(), s.apartments.vacant.to_string()]);
		table.add_row(vec!["Residents".to_string(), s.residents.to_string()]);
		table.add_row(vec!["Gates".to_string(), s.gates.to_string()]);
		table.add_row(vec!["Barriers".to_string(), s.barriers.to_string()]);
		table.add_row(vec![
			"Residents with access".to_string(),
			s.residents_with_access.to_string(),
		]);
		table.add_row(vec!["Granted gates".to_string(), s.grants.to_string()]);

		if let Some(complex) = &session.complex {
			println!("{}", complex.name);
		}
		println!("{table}");
	});

	Ok(())
}
