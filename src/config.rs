use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "library-desk", version, about = "Library inventory and lending service")]
pub struct Cli {
	#[command(flatten)]
	pub settings: Settings,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Create an administrator account
	CreateSuperuser {
		#[arg(long)]
		email: String,
		#[arg(long)]
		name: String,
		#[arg(long)]
		username: String,
		#[arg(long, env = "LIBRARY_SUPERUSER_PASSWORD")]
		password: String,
	},
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
	#[arg(long, env = "DATABASE_URL", default_value = "sqlite://library.db")]
	pub database_url: String,

	#[arg(long, env = "LIBRARY_BIND", default_value = "0.0.0.0:8080")]
	pub bind: String,

	#[arg(long, env = "LIBRARY_MAX_CONNECTIONS", default_value_t = 5)]
	pub max_connections: u32,

	/// Seconds to wait for a pooled connection
	#[arg(long, env = "LIBRARY_ACQUIRE_TIMEOUT", default_value_t = 3)]
	pub acquire_timeout: u64,

	#[arg(long, env = "LIBRARY_SESSION_TTL_HOURS", default_value_t = 24)]
	pub session_ttl_hours: i64,

	/// Days until a new loan is due when no return date is given
	#[arg(long, env = "LIBRARY_LOAN_DAYS", default_value_t = 14)]
	pub loan_days: i64,

	#[arg(long, env = "LIBRARY_FINE_PER_DAY", default_value_t = 5)]
	pub fine_per_day: i64,

	#[arg(long, env = "LIBRARY_BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
	pub bcrypt_cost: u32,
}

impl Settings {
	pub fn acquire_timeout(&self) -> Duration {
		Duration::from_secs(self.acquire_timeout)
	}

	pub fn session_ttl(&self) -> chrono::Duration {
		chrono::Duration::hours(self.session_ttl_hours)
	}

	pub fn loan_period(&self) -> chrono::Duration {
		chrono::Duration::days(self.loan_days)
	}
}
