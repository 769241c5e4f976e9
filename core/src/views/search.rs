use crate::models::{ApartmentRow, Gate, GatePermission, Resident};

/// Rows that can be matched by a free-text query.
pub trait Searchable {
	/// Fields the query is matched against.
	fn search_fields(&self) -> Vec<&str>;
}

impl<T: Searchable + ?Sized> Searchable for &T {
	fn search_fields(&self) -> Vec<&str> {
		(**self).search_fields()
	}
}

impl Searchable for ApartmentRow {
	fn search_fields(&self) -> Vec<&str> {
		vec![
			self.apartment_number.as_str(),
			self.user_name.as_str(),
			self.user_email.as_str(),
			self.apartment_code.as_str(),
		]
	}
}

impl Searchable for Resident {
	fn search_fields(&self) -> Vec<&str> {
		vec![self.user_name.as_str(), self.user_email.as_str()]
	}
}

impl Searchable for Gate {
	fn search_fields(&self) -> Vec<&str> {
		vec![self.name.as_str()]
	}
}

impl Searchable for GatePermission {
	fn search_fields(&self) -> Vec<&str> {
		vec![self.user_name.as_str(), self.user_email.as_str()]
	}
}

/// Rows with at least one searchable field containing `query`, ignoring case.
///
/// Keeps the input order. An empty query keeps everything. Whitespace in the query is
/// part of the match.
pub fn filter<'a, T: Searchable>(rows: &'a [T], query: &str) -> Vec<&'a T> {
	let query = query.to_lowercase();
	if query.is_empty() {
		return rows.iter().collect();
	}

	rows.iter()
		.filter(|row| {
			row.search_fields()
				.into_iter()
				.any(|field| field.to_lowercase().contains(&query))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{ApartmentId, ComplexId, GateId, GateKind, UserId};

	fn apartment(number: &str, name: &str, email: &str, code: &str) -> ApartmentRow {
		ApartmentRow {
			id: ApartmentId::new(format!("a{number}")),
			apartment_number: number.into(),
			apartment_code: code.into(),
			complex_id: ComplexId::new("c1"),
			user_id: (!name.is_empty()).then(|| UserId::new(format!("u-{name}"))),
			user_name: name.into(),
			user_email: email.into(),
		}
	}

	fn rows() -> Vec<ApartmentRow> {
		vec![
			apartment("101", "Ana Petrovic", "ana@example.com", "4411"),
			apartment("102", "", "", "9001"),
			apartment("12", "Marko", "marko@mail.rs", "1234"),
			apartment("7B", "Zoran", "z@example.com", "0000"),
		]
	}

	#[test]
	fn matches_any_field_case_insensitively() {
		let rows = rows();

		let numbers = |query| {
			filter(&rows, query)
				.into_iter()
				.map(|row| row.apartment_number.as_str())
				.collect::<Vec<_>>()
		};

		assert_eq!(numbers("ANA"), ["101"]);
		assert_eq!(numbers("example.COM"), ["101", "7B"]);
		assert_eq!(numbers("12"), ["12"]);
		assert_eq!(numbers("900"), ["102"]);
		assert_eq!(numbers("7b"), ["7B"]);
		assert!(numbers("nobody").is_empty());
	}

	#[test]
	fn empty_query_keeps_everything_in_order() {
		let rows = rows();
		let found = filter(&rows, "");

		assert_eq!(found.len(), rows.len());
		assert!(found.iter().zip(&rows).all(|(hit, row)| std::ptr::eq(*hit, row)));
	}

	#[test]
	fn surrounding_whitespace_is_matched_literally() {
		let rows = rows();

		assert!(filter(&rows, "marko ").is_empty());
		assert!(filter(&rows, "   ").is_empty());
		assert_eq!(filter(&rows, "ana ")[0].apartment_number, "101");
		assert_eq!(filter(&rows, " petrovic").len(), 1);
	}

	#[test]
	fn result_is_an_order_preserving_subsequence() {
		let rows = rows();
		for query in ["1", "a", "example", "0", "zz", "Marko", "marko ", " "] {
			let found = filter(&rows, query);

			let mut cursor = rows.iter();
			for hit in &found {
				assert!(cursor.any(|row| std::ptr::eq(row, *hit)));
			}

			let needle = query.to_lowercase();
			for row in &rows {
				let matches = row
					.search_fields()
					.iter()
					.any(|field| field.to_lowercase().contains(&needle));
				assert_eq!(matches, found.iter().any(|hit| std::ptr::eq(*hit, row)));
			}
		}
	}

	#[test]
	fn gates_and_permissions_use_their_own_fields() {
		let gates = vec![
			Gate {
				id: GateId::new("g1"),
				name: "North entrance".into(),
				kind: GateKind::Gate,
				complex_id: ComplexId::new("c1"),
			},
			Gate {
				id: GateId::new("g2"),
				name: "Garage".into(),
				kind: GateKind::Barrier,
				complex_id: ComplexId::new("c1"),
			},
		];
		assert_eq!(filter(&gates, "north")[0].id.as_str(), "g1");
		// the kind is not searchable
		assert!(filter(&gates, "barrier").is_empty());

		let permissions = vec![GatePermission {
			id: "p1".into(),
			gate_ids: Default::default(),
			user_id: UserId::new("u1"),
			user_name: "Ana".into(),
			user_email: "ana@example.com".into(),
			complex_id: ComplexId::new("c1"),
		}];
		assert_eq!(filter(&permissions, "EXAMPLE").len(), 1);
		assert!(filter(&permissions, "u1").is_empty());
	}
}
