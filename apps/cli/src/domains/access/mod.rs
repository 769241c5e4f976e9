use anyhow::{Context as _, Result};
use cg_core::{
	models::{GateId, UserId},
	permissions::{GrantOutcome, RevokeOutcome},
};
use clap::Subcommand;
use serde_json::json;

use crate::{context::Context, util::prelude::*};

#[derive(Subcommand, Debug)]
pub enum AccessCmd {
	/// Let a resident open a gate
	Grant {
		/// Resident user id (see `concierge residents`)
		user_id: String,
		/// Gate id (see `concierge gates --format json`)
		gate_id: String,
	},
	/// Take a gate away from a resident
	Revoke { user_id: String, gate_id: String },
}

pub async fn run(ctx: &Context, cmd: AccessCmd) -> Result<()> {
	ctx.require_session().await?;

	match cmd {
		AccessCmd::Grant { user_id, gate_id } => {
			let (user_id, gate_id) = (UserId::new(user_id), GateId::new(gate_id));
			let outcome = ctx
				.dashboard
				.grant_access(&user_id, &gate_id)
				.await
				.with_context(|| format!("Failed to grant {gate_id} to {user_id}"))?;

			let (result, gates) = match &outcome {
				GrantOutcome::Created(permission) => ("created", permission.gate_ids.len()),
				GrantOutcome::Updated {
					permission,
					already_granted: true,
				} => ("already_granted", permission.gate_ids.len()),
				GrantOutcome::Updated { permission, .. } => ("granted", permission.gate_ids.len()),
			};

			print_output!(
				ctx,
				json!({ "user_id": user_id, "gate_id": gate_id, "result": result, "gates": gates }),
				|_| match result {
					"already_granted" => println!("{user_id} could already open {gate_id}"),
					_ => println!("{user_id} can now open {gate_id} ({gates} gates in total)"),
				}
			);
		}
		AccessCmd::Revoke { user_id, gate_id } => {
			let (user_id, gate_id) = (UserId::new(user_id), GateId::new(gate_id));
			let outcome = ctx
				.dashboard
				.revoke_access(&user_id, &gate_id)
				.await
				.with_context(|| format!("Failed to revoke {gate_id} from {user_id}"))?;

			let result = match outcome {
				RevokeOutcome::NotGranted => "not_granted",
				RevokeOutcome::Updated(_) => "revoked",
				RevokeOutcome::Deleted => "deleted",
			};

			print_output!(
				ctx,
				json!({ "user_id": user_id, "gate_id": gate_id, "result": result }),
				|_| match result {
					"not_granted" => println!("{user_id} had no access to {gate_id}"),
					"deleted" => println!("{user_id} can no longer open {gate_id} (permission record removed)"),
					_ => println!("{user_id} can no longer open {gate_id}"),
				}
			);
		}
	}

	Ok(())
}
