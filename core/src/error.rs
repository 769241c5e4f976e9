use crate::models::{GateId, InvalidRecord, UserId};

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Store(#[from] cg_store_api::Error),
	#[error(transparent)]
	InvalidRecord(#[from] InvalidRecord),
	#[error("not logged in")]
	NotAuthenticated,
	#[error("the logged in account does not administer a complex")]
	NoComplex,
	#[error("no resident with user id '{0}' in this complex")]
	UnknownResident(UserId),
	#[error("no gate with id '{0}' in this complex")]
	UnknownGate(GateId),
	#[error("request cancelled")]
	Cancelled,
	#[error("session file error: {0}")]
	Io(#[from] std::io::Error),
	#[error("serialization error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Store(e) if e.is_not_found())
	}

	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Store(e) if e.is_unauthorized())
	}
}
