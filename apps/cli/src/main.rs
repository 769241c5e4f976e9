mod config;
mod context;
mod domains;
mod util;

use anyhow::Result;
use cg_core::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
	context::{Context, OutputFormat},
	domains::{
		access::AccessCmd, apartments::ApartmentsArgs, auth::LoginArgs, config::ConfigCmd,
		gates::GatesArgs, permissions::PermissionsArgs, residents::ResidentsArgs,
	},
};

#[derive(Parser, Debug)]
#[command(name = "concierge", about = "Access management for a residential complex")]
struct Cli {
	/// Path to the concierge data directory
	#[arg(long, env = "CONCIERGE_DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Record store URL, overriding the configured one for this run
	#[arg(long, env = "CONCIERGE_API_URL")]
	api_url: Option<String>,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Log in as a complex administrator
	Login(LoginArgs),
	/// Forget the saved session
	Logout,
	/// Show the record store and the logged in account
	Status,
	/// List apartments and who lives in them
	Apartments(ApartmentsArgs),
	/// List residents
	Residents(ResidentsArgs),
	/// List gates and barriers with the residents who can open them
	Gates(GatesArgs),
	/// List each resident's gate permissions
	Permissions(PermissionsArgs),
	/// Grant or revoke gate access
	#[command(subcommand)]
	Access(AccessCmd),
	/// Headline numbers for the complex
	Stats,
	/// Configuration
	#[command(subcommand)]
	Config(ConfigCmd),
}

fn init_tracing(config: &AppConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("warn,cg_core={0},cg_store_api={0},concierge={0}", config.log_level)));

	// a second init (tests, embedding) is not an error worth reporting
	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(true).with_writer(std::io::stderr))
		.try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => cg_core::config::default_data_dir()?,
	};

	let mut config = AppConfig::load_from(&data_dir)?;
	init_tracing(&config);

	if let Commands::Config(cmd) = cli.command {
		return domains::config::run(&data_dir, cmd).await;
	}

	if let Some(api_url) = cli.api_url {
		config.set("api_url", &api_url)?;
	}
	let ctx = Context::new(config, cli.format)?;

	match cli.command {
		Commands::Login(args) => domains::auth::login(&ctx, args).await,
		Commands::Logout => domains::auth::logout(&ctx).await,
		Commands::Status => domains::auth::status(&ctx).await,
		Commands::Apartments(args) => domains::apartments::run(&ctx, args).await,
		Commands::Residents(args) => domains::residents::run(&ctx, args).await,
		Commands::Gates(args) => domains::gates::run(&ctx, args).await,
		Commands::Permissions(args) => domains::permissions::run(&ctx, args).await,
		Commands::Access(cmd) => domains::access::run(&ctx, cmd).await,
		Commands::Stats => domains::stats::run(&ctx).await,
		Commands::Config(_) => Ok(()),
	}
}
