//! Granting and revoking gate access.
//!
//! Each resident has at most one permission record listing every gate they may open.
//! A change is a read-modify-write of that record, so concurrent changes for the same
//! resident are serialized by a per-user lock held from the read until the write lands.

mod locks;

use std::{collections::BTreeSet, sync::Arc};

use cg_store_api::Filter;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
	access::{DataAccess, GATE_PERMISSIONS},
	models::{into_record, FromRecord, Gate, GateId, GatePermission, NewGatePermission, Resident, UserId},
	session::SessionContext,
	store::RecordStore,
	Error,
};

pub use locks::KeyedLocks;

/// Writable collection behind the permissions view.
pub const PERMISSIONS_COLLECTION: &str = "gates_user_permissions";

/// What revoking a resident's last gate does to their record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPermissionPolicy {
	/// Keep the record with an empty gate list.
	#[default]
	Keep,
	Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
	Created(GatePermission),
	Updated {
		permission: GatePermission,
		/// The gate was in the list before this grant.
		already_granted: bool,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
	/// No record, or the gate was not in it. Nothing was written.
	NotGranted,
	Updated(GatePermission),
	Deleted,
}

#[derive(Serialize)]
struct GateIdsPatch<'a> {
	gate_ids: &'a BTreeSet<GateId>,
}

pub struct Permissions {
	store: Arc<dyn RecordStore>,
	access: Arc<DataAccess>,
	locks: KeyedLocks<UserId>,
	policy: EmptyPermissionPolicy,
}

impl Permissions {
	pub fn new(
		store: Arc<dyn RecordStore>,
		access: Arc<DataAccess>,
		policy: EmptyPermissionPolicy,
	) -> Self {
		Self {
			store,
			access,
			locks: KeyedLocks::default(),
			policy,
		}
	}

	/// Adds `gate` to the resident's permission record, creating the record if there is none.
	///
	/// An existing record is always written back, even when it already lists the gate.
	pub async fn grant_access(
		&self,
		ctx: &SessionContext,
		resident: &Resident,
		gate: &Gate,
	) -> Result<GrantOutcome, Error> {
		let complex_id = ctx.require_complex()?;
		let _guard = self.locks.lock(resident.user_id.clone()).await;

		let outcome = match self.find(resident).await? {
			Some(mut permission) => {
				let already_granted = !permission.gate_ids.insert(gate.id.clone());
				let permission = self.write_gates(permission).await?;
				GrantOutcome::Updated {
					permission,
					already_granted,
				}
			}
			None => {
				let fields = into_record(&NewGatePermission::new(
					resident,
					gate.id.clone(),
					complex_id.clone(),
				))?;

				let record = self
					.store
					.create(PERMISSIONS_COLLECTION, fields)
					.await
					.map_err(|e| {
						error!(user_id = %resident.user_id, gate_id = %gate.id, %e, "failed to create permission record");
						Error::from(e)
					})?;

				GrantOutcome::Created(GatePermission::from_record(record)?)
			}
		};

		info!(user_id = %resident.user_id, gate_id = %gate.id, "access granted");
		self.access.invalidate(GATE_PERMISSIONS, complex_id).await;

		Ok(outcome)
	}

	/// Removes `gate` from the resident's permission record.
	pub async fn revoke_access(
		&self,
		ctx: &SessionContext,
		resident: &Resident,
		gate: &Gate,
	) -> Result<RevokeOutcome, Error> {
		let complex_id = ctx.require_complex()?;
		let _guard = self.locks.lock(resident.user_id.clone()).await;

		let Some(mut permission) = self.find(resident).await? else {
			return Ok(RevokeOutcome::NotGranted);
		};

		if !permission.gate_ids.remove(&gate.id) {
			return Ok(RevokeOutcome::NotGranted);
		}

		let outcome = if permission.gate_ids.is_empty() && self.policy == EmptyPermissionPolicy::Delete {
			self.store
				.delete(PERMISSIONS_COLLECTION, permission.id.as_str())
				.await
				.map_err(|e| {
					error!(permission_id = %permission.id, %e, "failed to delete permission record");
					Error::from(e)
				})?;
			RevokeOutcome::Deleted
		} else {
			RevokeOutcome::Updated(self.write_gates(permission).await?)
		};

		info!(user_id = %resident.user_id, gate_id = %gate.id, "access revoked");
		self.access.invalidate(GATE_PERMISSIONS, complex_id).await;

		Ok(outcome)
	}

	/// The resident's permission record; `None` only when the store has none.
	async fn find(&self, resident: &Resident) -> Result<Option<GatePermission>, Error> {
		let filter = Filter::eq("user_id", resident.user_id.as_str());

		match self.store.get_first(PERMISSIONS_COLLECTION, &filter).await {
			Ok(record) => Ok(Some(GatePermission::from_record(record)?)),
			Err(e) if e.is_not_found() => Ok(None),
			Err(e) => {
				error!(user_id = %resident.user_id, %e, "failed to look up permission record");
				Err(e.into())
			}
		}
	}

	async fn write_gates(&self, permission: GatePermission) -> Result<GatePermission, Error> {
		let fields = into_record(&GateIdsPatch {
			gate_ids: &permission.gate_ids,
		})?;

		let record = self
			.store
			.update(PERMISSIONS_COLLECTION, permission.id.as_str(), fields)
			.await
			.map_err(|e| {
				error!(permission_id = %permission.id, %e, "failed to update permission record");
				Error::from(e)
			})?;

		Ok(GatePermission::from_record(record)?)
	}
}
