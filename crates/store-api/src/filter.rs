use std::fmt;

use serde_json::Value;

use crate::Record;

/// Predicate in the record store's filter language.
///
/// Rendered through [`fmt::Display`] for the `filter` query parameter. The same
/// predicate can be evaluated locally against a [`Record`] with [`Filter::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
	Eq { field: String, value: String },
	And(Vec<Filter>),
}

impl Filter {
	pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Eq {
			field: field.into(),
			value: value.into(),
		}
	}

	pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
		Self::And(filters.into_iter().collect())
	}

	/// Evaluates the predicate against a raw record.
	///
	/// Numbers and booleans compare by their JSON text, a missing field or `null`
	/// compares as the empty string.
	pub fn matches(&self, record: &Record) -> bool {
		match self {
			Self::Eq { field, value } => match record.get(field) {
				Some(Value::String(s)) => s == value,
				Some(Value::Null) | None => value.is_empty(),
				Some(other) => other.to_string() == *value,
			},
			Self::And(filters) => filters.iter().all(|f| f.matches(record)),
		}
	}
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
	f.write_str("\"")?;
	for c in value.chars() {
		match c {
			'"' | '\\' => write!(f, "\\{c}")?,
			c => write!(f, "{c}")?,
		}
	}
	f.write_str("\"")
}

impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Eq { field, value } => {
				write!(f, "{field} = ")?;
				write_quoted(f, value)
			}
			Self::And(filters) => match filters.as_slice() {
				[] => Ok(()),
				[single] => write!(f, "{single}"),
				many => {
					for (i, filter) in many.iter().enumerate() {
						if i > 0 {
							f.write_str(" && ")?;
						}
						write!(f, "({filter})")?;
					}
					Ok(())
				}
			},
		}
	}
}

/// Server-side ordering, rendered as `+field` or `-field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
	pub field: String,
	pub descending: bool,
}

impl Sort {
	pub fn asc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			descending: false,
		}
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			descending: true,
		}
	}
}

impl fmt::Display for Sort {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let prefix = if self.descending { '-' } else { '+' };
		write!(f, "{prefix}{}", self.field)
	}
}
