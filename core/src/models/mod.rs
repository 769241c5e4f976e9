//! Typed records.
//!
//! Rows arrive from the record store as untyped JSON objects. Everything in this module
//! decodes them through [`FromRecord`], coercing the loose parts (numbers where text is
//! expected, `null` where a field is optional) and rejecting rows that break an invariant.

mod apartment;
mod complex;
mod gate;
mod permission;
mod principal;

use std::fmt;

use cg_store_api::Record;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use apartment::{ApartmentRow, Resident};
pub use complex::Complex;
pub use gate::{Gate, GateKind};
pub use permission::{GatePermission, NewGatePermission};
pub use principal::Principal;

macro_rules! record_id {
	($($(#[$meta:meta])* $name:ident),+ $(,)?) => {$(
		$(#[$meta])*
		#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
	)+};
}

record_id!(
	/// Residential complex managed by one administrator account.
	ComplexId,
	ApartmentId,
	/// Resident / user account.
	UserId,
	GateId,
	PermissionId,
);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} record{}: {reason}", .id.as_deref().map(|id| format!(" <id={id}>")).unwrap_or_default())]
pub struct InvalidRecord {
	pub kind: &'static str,
	pub id: Option<String>,
	pub reason: String,
}

impl InvalidRecord {
	pub(crate) fn new(kind: &'static str, record: &Record, reason: impl Into<String>) -> Self {
		Self {
			kind,
			id: record.get("id").and_then(Value::as_str).map(str::to_string),
			reason: reason.into(),
		}
	}
}

/// Schema boundary between untyped store rows and the typed model.
pub trait FromRecord: Sized {
	const KIND: &'static str;

	fn from_record(record: Record) -> Result<Self, InvalidRecord>;
}

/// Serde-decodes a record, then runs `validate` over the typed value.
pub(crate) fn decode<T: DeserializeOwned>(
	kind: &'static str,
	record: Record,
	validate: impl FnOnce(&T) -> Result<(), &'static str>,
) -> Result<T, InvalidRecord> {
	let value = serde_json::from_value::<T>(Value::Object(record.clone()))
		.map_err(|e| InvalidRecord::new(kind, &record, e.to_string()))?;

	validate(&value).map_err(|reason| InvalidRecord::new(kind, &record, reason))?;

	Ok(value)
}

pub(crate) fn into_record<T: Serialize>(value: &T) -> Result<Record, serde_json::Error> {
	match serde_json::to_value(value)? {
		Value::Object(map) => Ok(map),
		other => {
			let mut map = Record::new();
			map.insert("value".to_string(), other);
			Ok(map)
		}
	}
}

/// Text field that may arrive as a string, a number, a boolean or `null`.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => s,
		Value::Null => String::new(),
		Value::Number(n) => n.to_string(),
		Value::Bool(b) => b.to_string(),
		other => return Err(serde::de::Error::custom(format!("expected text, got {other}"))),
	})
}

/// Relation field where `null`, `""` and absence all mean "not set".
pub(crate) fn optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: From<String>,
{
	Ok(Option::<String>::deserialize(deserializer)?
		.filter(|id| !id.is_empty())
		.map(T::from))
}

#[cfg(test)]
pub(crate) fn record(value: Value) -> Record {
	match value {
		Value::Object(map) => map,
		other => panic!("expected an object, got {other}"),
	}
}
