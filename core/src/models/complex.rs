use cg_store_api::Record;
use serde::{Deserialize, Serialize};

use super::{decode, text, ComplexId, FromRecord, InvalidRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complex {
	pub id: ComplexId,
	#[serde(default, deserialize_with = "text")]
	pub name: String,
}

impl FromRecord for Complex {
	const KIND: &'static str = "complex";

	fn from_record(record: Record) -> Result<Self, InvalidRecord> {
		decode(Self::KIND, record, |complex: &Self| {
			if complex.id.is_empty() {
				return Err("empty id");
			}
			Ok(())
		})
	}
}
