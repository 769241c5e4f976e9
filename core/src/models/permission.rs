use std::collections::BTreeSet;

use cg_store_api::Record;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{
	apartment::display_name, decode, text, ComplexId, FromRecord, GateId, InvalidRecord,
	PermissionId, Resident, UserId,
};

/// Per-resident access list covering every gate of the complex.
///
/// At most one of these exists per `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePermission {
	pub id: PermissionId,
	#[serde(default, deserialize_with = "gate_id_set")]
	pub gate_ids: BTreeSet<GateId>,
	pub user_id: UserId,
	#[serde(default, deserialize_with = "text")]
	pub user_name: String,
	#[serde(default, deserialize_with = "text")]
	pub user_email: String,
	#[serde(default)]
	pub complex_id: ComplexId,
}

impl GatePermission {
	pub fn allows(&self, gate: &GateId) -> bool {
		self.gate_ids.contains(gate)
	}

	pub fn display_name(&self) -> &str {
		display_name(&self.user_name, &self.user_email)
	}
}

impl FromRecord for GatePermission {
	const KIND: &'static str = "gate permission";

	fn from_record(record: Record) -> Result<Self, InvalidRecord> {
		decode(Self::KIND, record, |permission: &Self| {
			if permission.id.is_empty() {
				return Err("empty id");
			}
			if permission.user_id.is_empty() {
				return Err("empty user_id");
			}
			Ok(())
		})
	}
}

/// Fields of a permission record created for a resident without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGatePermission {
	pub gate_ids: BTreeSet<GateId>,
	pub user_id: UserId,
	pub user_name: String,
	pub user_email: String,
	pub complex_id: ComplexId,
}

impl NewGatePermission {
	pub fn new(resident: &Resident, gate: GateId, complex_id: ComplexId) -> Self {
		Self {
			gate_ids: BTreeSet::from([gate]),
			user_id: resident.user_id.clone(),
			user_name: resident.user_name.clone(),
			user_email: resident.user_email.clone(),
			complex_id,
		}
	}
}

/// The id list is a JSON column. Depending on the collection it comes back as an array,
/// `null`, or the array encoded as a string.
fn gate_id_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<GateId>, D::Error> {
	fn collect<E: serde::de::Error>(items: Vec<Value>) -> Result<BTreeSet<GateId>, E> {
		items
			.into_iter()
			.filter_map(|item| match item {
				Value::String(id) if id.is_empty() => None,
				Value::String(id) => Some(Ok(GateId::from(id))),
				other => Some(Err(E::custom(format!("expected gate id, got {other}")))),
			})
			.collect()
	}

	match Value::deserialize(deserializer)? {
		Value::Null => Ok(BTreeSet::new()),
		Value::Array(items) => collect(items),
		Value::String(s) if s.trim().is_empty() => Ok(BTreeSet::new()),
		Value::String(s) if s.trim_start().starts_with('[') => {
			let items = serde_json::from_str::<Vec<Value>>(&s).map_err(serde::de::Error::custom)?;
			collect(items)
		}
		Value::String(id) => Ok(BTreeSet::from([GateId::from(id)])),
		other => Err(serde::de::Error::custom(format!(
			"expected gate id list, got {other}"
		))),
	}
}
