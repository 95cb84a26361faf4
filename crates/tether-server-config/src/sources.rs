// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, SignUpConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/tether/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: TETHER_SERVER_<FIELD>
pub struct EnvSource;

impl EnvSource {
	/// Build a layer from an arbitrary variable lookup.
	pub fn load_with<F>(lookup: F) -> Result<ServerConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let env = EnvReader { lookup };
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env.var("TETHER_SERVER_HOST"),
				port: env.parse("TETHER_SERVER_PORT", "u16")?,
			}),
			database: Some(DatabaseConfigLayer {
				url: env.var("TETHER_SERVER_DATABASE_URL"),
			}),
			logging: Some(LoggingConfigLayer {
				level: env.var("TETHER_SERVER_LOG_LEVEL"),
			}),
			signup: Some(SignUpConfigLayer {
				sign_up_view: env.var("TETHER_SERVER_SIGNUP_VIEW"),
				use_social_authentication_filter: env
					.bool("TETHER_SERVER_USE_SOCIAL_AUTHENTICATION_FILTER"),
				authentication_url: env.var("TETHER_SERVER_AUTHENTICATION_URL"),
				pending_identity_ttl_secs: env.parse("TETHER_SERVER_PENDING_IDENTITY_TTL_SECS", "u64")?,
				presession_cookie_name: env.var("TETHER_SERVER_PRESESSION_COOKIE_NAME"),
				session_cookie_name: env.var("TETHER_SERVER_SESSION_COOKIE_NAME"),
				implicit_sign_up: env.bool("TETHER_SERVER_IMPLICIT_SIGNUP"),
			}),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_with(|name| std::env::var(name).ok())
	}
}

struct EnvReader<F> {
	lookup: F,
}

impl<F> EnvReader<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: std::str::FromStr>(
		&self,
		name: &str,
		type_name: &str,
	) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {type_name} value '{v}'"),
			}),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.signup.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/config.toml").load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(
			&path,
			r#"
[http]
port = 9001

[signup]
use_social_authentication_filter = true
authentication_url = "/auth"
"#,
		)
		.unwrap();

		let layer = TomlSource::new(&path).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9001));
		let signup = layer.signup.unwrap();
		assert_eq!(signup.use_social_authentication_filter, Some(true));
		assert_eq!(signup.authentication_url.as_deref(), Some("/auth"));
	}

	#[test]
	fn test_toml_source_parse_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(&path, "[http\nport = ").unwrap();

		let result = TomlSource::new(&path).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_reads_signup_vars() {
		let layer = EnvSource::load_with(lookup(&[
			("TETHER_SERVER_SIGNUP_VIEW", "register"),
			("TETHER_SERVER_USE_SOCIAL_AUTHENTICATION_FILTER", "1"),
			("TETHER_SERVER_AUTHENTICATION_URL", "/auth"),
			("TETHER_SERVER_PENDING_IDENTITY_TTL_SECS", "30"),
			("TETHER_SERVER_IMPLICIT_SIGNUP", "TRUE"),
		]))
		.unwrap();

		let signup = layer.signup.unwrap();
		assert_eq!(signup.sign_up_view.as_deref(), Some("register"));
		assert_eq!(signup.use_social_authentication_filter, Some(true));
		assert_eq!(signup.authentication_url.as_deref(), Some("/auth"));
		assert_eq!(signup.pending_identity_ttl_secs, Some(30));
		assert_eq!(signup.implicit_sign_up, Some(true));
		assert!(signup.session_cookie_name.is_none());
	}

	#[test]
	fn test_env_empty_values_are_unset() {
		let layer = EnvSource::load_with(lookup(&[("TETHER_SERVER_HOST", "")])).unwrap();
		assert!(layer.http.unwrap().host.is_none());
	}

	#[test]
	fn test_env_invalid_port() {
		let result = EnvSource::load_with(lookup(&[("TETHER_SERVER_PORT", "eighty")]));
		match result {
			Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "TETHER_SERVER_PORT"),
			other => panic!("expected InvalidValue, got {other:?}"),
		}
	}
}
