use cg_store_api::Record;
use serde::{Deserialize, Serialize};

use super::{decode, optional_id, text, ComplexId, FromRecord, InvalidRecord, UserId};

/// The logged-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: UserId,
	#[serde(default, deserialize_with = "text")]
	pub email: String,
	#[serde(default, deserialize_with = "text")]
	pub name: String,
	/// Complex this account administers.
	#[serde(default, deserialize_with = "optional_id")]
	pub complex_id: Option<ComplexId>,
}

impl FromRecord for Principal {
	const KIND: &'static str = "user";

	fn from_record(record: Record) -> Result<Self, InvalidRecord> {
		decode(Self::KIND, record, |principal: &Self| {
			if principal.id.is_empty() {
				return Err("empty id");
			}
			Ok(())
		})
	}
}
