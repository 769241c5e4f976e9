use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::{ApartmentRow, Gate, GatePermission, Resident};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	#[default]
	Asc,
	Desc,
}

impl Direction {
	pub fn flip(self) -> Self {
		match self {
			Self::Asc => Self::Desc,
			Self::Desc => Self::Asc,
		}
	}
}

/// Column a list is ordered by, and which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec<F> {
	pub field: F,
	pub direction: Direction,
}

impl<F: Copy + PartialEq> SortSpec<F> {
	pub fn asc(field: F) -> Self {
		Self {
			field,
			direction: Direction::Asc,
		}
	}

	pub fn desc(field: F) -> Self {
		Self {
			field,
			direction: Direction::Desc,
		}
	}

	/// Clicking the same column again flips the direction, another column starts ascending.
	pub fn toggle(self, field: F) -> Self {
		if self.field == field {
			Self {
				field,
				direction: self.direction.flip(),
			}
		} else {
			Self::asc(field)
		}
	}
}

/// Comparable projection of a row.
///
/// Numbers order before text. Text compares case-folded first, then exactly, so the
/// order is total and does not depend on the input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
	Number(i64),
	Text { folded: String, raw: String },
}

impl SortKey {
	pub fn text(value: &str) -> Self {
		Self::Text {
			folded: value.to_lowercase(),
			raw: value.to_string(),
		}
	}

	/// Leading integer of `value` ("12B" is 12), or text when it has no leading digits.
	pub fn number_prefix(value: &str) -> Self {
		let trimmed = value.trim_start();
		let digits = trimmed
			.bytes()
			.take_while(u8::is_ascii_digit)
			.collect::<Vec<_>>();

		if digits.is_empty() {
			return Self::text(value);
		}

		Self::Number(digits.into_iter().fold(0_i64, |n, d| {
			n.saturating_mul(10).saturating_add(i64::from(d - b'0'))
		}))
	}
}

pub trait Sortable {
	type Field: Copy;

	fn sort_key(&self, field: Self::Field) -> SortKey;
}

impl<T: Sortable> Sortable for &T {
	type Field = T::Field;

	fn sort_key(&self, field: Self::Field) -> SortKey {
		(**self).sort_key(field)
	}
}

/// Stable sort by `spec`: rows with equal keys keep their relative order in either direction.
pub fn sort<T: Sortable>(mut rows: Vec<T>, spec: SortSpec<T::Field>) -> Vec<T> {
	match spec.direction {
		Direction::Asc => rows.sort_by_cached_key(|row| row.sort_key(spec.field)),
		Direction::Desc => rows.sort_by_cached_key(|row| Reverse(row.sort_key(spec.field))),
	}
	rows
}

macro_rules! sort_fields {
	($($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? })+) => {$(
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(rename_all = "lowercase")]
		pub enum $name {
			$($variant),+
		}

		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = String;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::ALL
					.iter()
					.copied()
					.find(|field| field.as_str().eq_ignore_ascii_case(s))
					.ok_or_else(|| format!(
						"unknown field '{s}', expected one of: {}",
						Self::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
					))
			}
		}
	)+};
}

sort_fields! {
	ApartmentField {
		Number => "number",
		Code => "code",
		Name => "name",
		Email => "email",
	}
	ResidentField {
		Name => "name",
		Email => "email",
	}
	GateField {
		Name => "name",
		Kind => "kind",
	}
	PermissionField {
		Name => "name",
		Email => "email",
		Gates => "gates",
	}
}

impl Sortable for ApartmentRow {
	type Field = ApartmentField;

	fn sort_key(&self, field: ApartmentField) -> SortKey {
		match field {
			ApartmentField::Number => SortKey::number_prefix(&self.apartment_number),
			ApartmentField::Code => SortKey::text(&self.apartment_code),
			ApartmentField::Name => SortKey::text(&self.user_name),
			ApartmentField::Email => SortKey::text(&self.user_email),
		}
	}
}

impl Sortable for Resident {
	type Field = ResidentField;

	fn sort_key(&self, field: ResidentField) -> SortKey {
		match field {
			ResidentField::Name => SortKey::text(self.display_name()),
			ResidentField::Email => SortKey::text(&self.user_email),
		}
	}
}

impl Sortable for Gate {
	type Field = GateField;

	fn sort_key(&self, field: GateField) -> SortKey {
		match field {
			GateField::Name => SortKey::text(&self.name),
			GateField::Kind => SortKey::text(self.kind.label()),
		}
	}
}

impl Sortable for GatePermission {
	type Field = PermissionField;

	fn sort_key(&self, field: PermissionField) -> SortKey {
		match field {
			PermissionField::Name => SortKey::text(self.display_name()),
			PermissionField::Email => SortKey::text(&self.user_email),
			PermissionField::Gates => {
				SortKey::Number(i64::try_from(self.gate_ids.len()).unwrap_or(i64::MAX))
			}
		}
	}
}
