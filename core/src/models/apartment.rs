use cg_store_api::Record;
use serde::{Deserialize, Serialize};

use super::{decode, optional_id, text, ApartmentId, ComplexId, FromRecord, InvalidRecord, UserId};

/// Label shown for a resident with neither a name nor an email.
pub const UNKNOWN_USER: &str = "Unknown user";

/// Row of the denormalized apartment view: the apartment plus the resident living in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApartmentRow {
	pub id: ApartmentId,
	pub apartment_number: String,
	pub apartment_code: String,
	pub complex_id: ComplexId,
	/// `None` for a vacant apartment.
	pub user_id: Option<UserId>,
	pub user_name: String,
	pub user_email: String,
}

#[derive(Deserialize)]
struct RawApartmentRow {
	id: ApartmentId,
	#[serde(default, deserialize_with = "text")]
	apartment_number: String,
	#[serde(default, deserialize_with = "text")]
	apartment_code: String,
	complex_id: ComplexId,
	#[serde(default, deserialize_with = "optional_id")]
	user_id: Option<UserId>,
	// relation column of the plain apartments collection
	#[serde(default, deserialize_with = "optional_id")]
	user: Option<UserId>,
	#[serde(default, deserialize_with = "text")]
	user_name: String,
	#[serde(default, deserialize_with = "text")]
	user_email: String,
}

impl ApartmentRow {
	pub fn is_occupied(&self) -> bool {
		self.user_id.is_some()
	}

	pub fn resident(&self) -> Option<Resident> {
		self.user_id.as_ref().map(|user_id| Resident {
			user_id: user_id.clone(),
			user_name: self.user_name.clone(),
			user_email: self.user_email.clone(),
		})
	}
}

impl FromRecord for ApartmentRow {
	const KIND: &'static str = "apartment";

	fn from_record(record: Record) -> Result<Self, InvalidRecord> {
		let raw = decode(Self::KIND, record, |row: &RawApartmentRow| {
			if row.id.is_empty() {
				return Err("empty id");
			}
			if row.complex_id.is_empty() {
				return Err("empty complex_id");
			}
			Ok(())
		})?;

		Ok(Self {
			id: raw.id,
			apartment_number: raw.apartment_number,
			apartment_code: raw.apartment_code,
			complex_id: raw.complex_id,
			user_id: raw.user_id.or(raw.user),
			user_name: raw.user_name,
			user_email: raw.user_email,
		})
	}
}

/// Resident identity, as denormalized into apartment and permission rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
	pub user_id: UserId,
	pub user_name: String,
	pub user_email: String,
}

impl Resident {
	pub fn display_name(&self) -> &str {
		display_name(&self.user_name, &self.user_email)
	}
}

pub(crate) fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
	if !name.is_empty() {
		name
	} else if !email.is_empty() {
		email
	} else {
		UNKNOWN_USER
	}
}
