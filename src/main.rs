// library system

use std::process::ExitCode;

use axum::ServiceExt;
use clap::Parser;
use garde::Validate;
use tracing_subscriber::EnvFilter;

use library_desk::{
	app,
	auth,
	config::{Cli, Command, Settings},
	error::AppResult,
	sql,
	store,
	types::FormRegister,
};

#[tokio::main]
async fn main() -> ExitCode {
	if let Err(err) = dotenvy::dotenv() {
		if !err.not_found() {
			eprintln!("can't read .env: {err}");
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("library_desk=info,tower_http=info")),
		)
		.init();

	let cli = Cli::parse();
	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			tracing::error!(error = %err, cause = ?err, "exiting");
			ExitCode::FAILURE
		},
	}
}

async fn run(cli: Cli) -> AppResult<()> {
	let db = sql::open(&cli.settings).await?;
	sql::migrate(&db).await?;

	match cli.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(db, cli.settings).await,
		Command::CreateSuperuser { email, name, username, password } => {
			let form = FormRegister { email, name, username, ba_no: None, password }.trimmed();
			form.validate()?;
			let pass_hash = auth::hash_password(form.password.clone(), cli.settings.bcrypt_cost).await?;
			let account = store::accounts::create_superuser(&db, form, pass_hash).await?;
			println!("created superuser {} ({})", account.username, account.id);
			Ok(())
		},
	}
}

async fn serve(db: sql::DB, settings: Settings) -> AppResult<()> {
	let bind = settings.bind.clone();
	let service = app::service(app::new_shared_state(db, settings));

	let listener = tokio::net::TcpListener::bind(&bind).await?;
	tracing::info!(%bind, "listening");
	axum::serve(listener, ServiceExt::<axum::extract::Request>::into_make_service(service))
		.with_graceful_shutdown(shutdown_signal())
		.await?;
	tracing::info!("server stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "can't listen for shutdown signal");
		std::future::pending::<()>().await;
	}
}
