use itertools::Itertools;
use serde::Serialize;

use crate::models::{ApartmentRow, Gate, GateId, GateKind, GatePermission, Resident, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
	pub total: usize,
	pub occupied: usize,
	pub vacant: usize,
}

impl Occupancy {
	pub fn of<'a>(rows: impl IntoIterator<Item = &'a ApartmentRow>) -> Self {
		rows.into_iter().fold(Self::default(), |mut acc, row| {
			acc.total += 1;
			if row.is_occupied() {
				acc.occupied += 1;
			} else {
				acc.vacant += 1;
			}
			acc
		})
	}

	/// Occupied share in whole percent, 0 for an empty complex.
	pub fn rate(&self) -> u8 {
		if self.total == 0 {
			return 0;
		}
		// occupied <= total, so this is at most 100
		((self.occupied * 100 + self.total / 2) / self.total) as u8
	}
}

/// Residents of the occupied rows, one per user, in order of first appearance.
pub fn residents<'a>(rows: impl IntoIterator<Item = &'a ApartmentRow>) -> Vec<Resident> {
	rows.into_iter()
		.filter_map(ApartmentRow::resident)
		.unique_by(|resident| resident.user_id.clone())
		.collect()
}

/// Permission records that open `gate`.
pub fn users_with_access<'a>(gate: &GateId, permissions: &'a [GatePermission]) -> Vec<&'a GatePermission> {
	permissions
		.iter()
		.filter(|permission| permission.allows(gate))
		.collect()
}

pub fn has_access(user: &UserId, gate: &GateId, permissions: &[GatePermission]) -> bool {
	permissions
		.iter()
		.any(|permission| permission.user_id == *user && permission.allows(gate))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AccessPartition<'a> {
	pub with_access: Vec<&'a Resident>,
	pub without_access: Vec<&'a Resident>,
}

/// Splits residents by whether they can open `gate`, keeping their order on both sides.
pub fn partition_by_access<'a>(
	residents: &'a [Resident],
	gate: &GateId,
	permissions: &[GatePermission],
) -> AccessPartition<'a> {
	let (with_access, without_access) = residents
		.iter()
		.partition(|resident| has_access(&resident.user_id, gate, permissions));

	AccessPartition {
		with_access,
		without_access,
	}
}

/// Headline numbers for a complex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplexStats {
	pub apartments: Occupancy,
	pub occupancy_rate: u8,
	pub residents: usize,
	pub gates: usize,
	pub barriers: usize,
	/// Residents holding at least one gate.
	pub residents_with_access: usize,
	/// Sum of granted gates over all residents.
	pub grants: usize,
}

impl ComplexStats {
	pub fn collect(
		apartments: &[ApartmentRow],
		gates: &[Gate],
		permissions: &[GatePermission],
	) -> Self {
		let occupancy = Occupancy::of(apartments);
		let (gates, barriers) = gates.iter().fold((0, 0), |(g, b), gate| match gate.kind {
			GateKind::Gate => (g + 1, b),
			GateKind::Barrier => (g, b + 1),
		});
		let active = permissions
			.iter()
			.filter(|permission| !permission.gate_ids.is_empty())
			.collect_vec();

		Self {
			apartments: occupancy,
			occupancy_rate: occupancy.rate(),
			residents: residents(apartments).len(),
			gates,
			barriers,
			residents_with_access: active.iter().map(|p| &p.user_id).unique().count(),
			grants: active.iter().map(|p| p.gate_ids.len()).sum(),
		}
	}
}
