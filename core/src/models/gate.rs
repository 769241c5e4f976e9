use std::{fmt, str::FromStr};

use cg_store_api::Record;
use serde::{Deserialize, Deserializer, Serialize};

use super::{decode, text, ComplexId, FromRecord, GateId, InvalidRecord};

/// Physical access point with binary pass / no-pass control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
	pub id: GateId,
	#[serde(default, deserialize_with = "text")]
	pub name: String,
	#[serde(rename = "type")]
	pub kind: GateKind,
	pub complex_id: ComplexId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
	/// Pedestrian gate.
	Gate,
	/// Vehicle barrier.
	Barrier,
}

impl GateKind {
	pub fn label(self) -> &'static str {
		match self {
			Self::Gate => "gate",
			Self::Barrier => "barrier",
		}
	}
}

impl fmt::Display for GateKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for GateKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("gate") {
			Ok(Self::Gate)
		} else if s.eq_ignore_ascii_case("barrier") {
			Ok(Self::Barrier)
		} else {
			Err(format!("unknown gate type '{s}'"))
		}
	}
}

impl<'de> Deserialize<'de> for GateKind {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer)?
			.parse()
			.map_err(serde::de::Error::custom)
	}
}

impl FromRecord for Gate {
	const KIND: &'static str = "gate";

	fn from_record(record: Record) -> Result<Self, InvalidRecord> {
		decode(Self::KIND, record, |gate: &Self| {
			if gate.id.is_empty() {
				return Err("empty id");
			}
			Ok(())
		})
	}
}
