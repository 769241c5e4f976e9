use anyhow::{Context as _, Result};
use clap::Args;
use dialoguer::{Input, Password};
use serde::Serialize;

use crate::{context::Context, util::prelude::*};

#[derive(Args, Debug)]
pub struct LoginArgs {
	/// Administrator email, prompted for when omitted
	#[arg(long)]
	pub email: Option<String>,
	/// Password, prompted for when omitted
	#[arg(long, env = "CONCIERGE_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,
}

#[derive(Serialize)]
struct Status<'a> {
	api_url: &'a str,
	logged_in: bool,
	email: Option<&'a str>,
	complex_id: Option<&'a str>,
	complex_name: Option<&'a str>,
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
	let email = match args.email {
		Some(email) => email,
		None => Input::new().with_prompt("Email").interact_text()?,
	};
	let password = match args.password {
		Some(password) => password,
		None => Password::new().with_prompt("Password").interact()?,
	};

	let session = ctx
		.dashboard
		.login(&email, &password)
		.await
		.context("Login failed")?;

	print_output!(ctx, &session, |s: &cg_core::session::SessionContext| {
		match &s.complex {
			Some(complex) => println!("Logged in as {} ({})", s.principal.email, complex.name),
			None => {
				println!("Logged in as {}", s.principal.email);
				println!("This account does not administer a complex; lists will be empty.");
			}
		}
	});

	Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
	ctx.dashboard.logout().await?;
	println!("Logged out");
	Ok(())
}

pub async fn status(ctx: &Context) -> Result<()> {
	let session = ctx
		.dashboard
		.restore_session()
		.await
		.context("Failed to restore the saved session")?;

	let status = Status {
		api_url: &ctx.config.api_url,
		logged_in: session.is_some(),
		email: session.as_ref().map(|s| s.principal.email.as_str()),
		complex_id: session
			.as_ref()
			.and_then(|s| s.complex_id())
			.map(|id| id.as_str()),
		complex_name: session
			.as_ref()
			.and_then(|s| s.complex.as_ref())
			.map(|c| c.name.as_str()),
	};

	print_output!(ctx, &status, |s: &Status| {
		println!("Record store: {}", s.api_url);
		match s.email {
			Some(email) => println!("Logged in as {}", or_dash(email)),
			None => println!("Not logged in"),
		}
		if s.logged_in {
			match (s.complex_name, s.complex_id) {
				(Some(name), Some(id)) => println!("Complex: {name} ({id})"),
				_ => println!("Complex: (none)"),
			}
		}
	});

	Ok(())
}
