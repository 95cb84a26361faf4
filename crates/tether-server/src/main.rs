// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tether sign-up server binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tether_server::cleanup::{spawn_cleanup_task, DEFAULT_CLEANUP_INTERVAL};
use tether_server::{create_app_state, create_router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tether server - identity-linking sign-up over HTTP.
#[derive(Parser, Debug)]
#[command(name = "tether-server", about = "Tether sign-up server", version)]
struct Args {
	/// Config file layered over /etc/tether/server.toml.
	#[arg(long, env = "TETHER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("tether-server version: {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => tether_server_config::load_config_with_file(path.clone())?,
		None => tether_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		implicit_sign_up = config.signup.implicit_sign_up,
		"starting tether-server"
	);

	let pool = tether_server_db::create_pool(&config.database.url).await?;
	tether_server_db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config);
	let cleanup = spawn_cleanup_task(state.clone(), DEFAULT_CLEANUP_INTERVAL);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	cleanup.abort();
	tracing::info!("Server shutdown complete");
	Ok(())
}
