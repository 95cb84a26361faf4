// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Tether server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`TETHER_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use tether_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub signup: SignUpConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`TETHER_SERVER_*`)
/// 2. Config file (`/etc/tether/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let signup = layer.signup.unwrap_or_default().finalize();

	validate_config(&signup)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		deep_link_redirect = signup.use_social_authentication_filter,
		implicit_sign_up = signup.implicit_sign_up,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		logging,
		signup,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(signup: &SignUpConfig) -> Result<(), ConfigError> {
	let url = &signup.authentication_url;
	if !url.starts_with('/') || url.starts_with("//") {
		return Err(ConfigError::Validation(format!(
			"authentication_url must be a relative path starting with '/', got '{url}'"
		)));
	}
	if signup.sign_up_view.trim().is_empty() {
		return Err(ConfigError::Validation(
			"sign_up_view must not be empty".to_string(),
		));
	}
	if signup.presession_cookie_name == signup.session_cookie_name {
		return Err(ConfigError::Validation(
			"presession and session cookies must have different names".to_string(),
		));
	}
	Ok(())
}
