// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local account types and username rules.
//!
//! This module provides:
//! - [`LocalAccount`] - a locally registered account keyed by a unique username
//! - [`validate_username`] - syntactic username rules used by the sign-up form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// Minimum username length.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 39;

/// Reserved usernames that cannot be chosen at sign-up.
/// These collide with routes, system identities, or could cause confusion.
pub const RESERVED_USERNAMES: &[&str] = &[
	// System/admin
	"root",
	"admin",
	"administrator",
	"sudo",
	"system",
	"postmaster",
	"webmaster",
	"hostmaster",
	"abuse",
	"security",
	"support",
	"help",
	"noreply",
	"no-reply",
	// Routes
	"api",
	"auth",
	"authenticate",
	"oauth",
	"login",
	"logout",
	"signin",
	"signup",
	"register",
	"settings",
	"profile",
	"account",
	"health",
	"static",
	"assets",
	// Misc reserved
	"null",
	"undefined",
	"none",
	"anonymous",
	"guest",
	"user",
	"users",
];

/// Check if a username is reserved (case-insensitive).
pub fn is_username_reserved(username: &str) -> bool {
	let lower = username.to_lowercase();
	RESERVED_USERNAMES.iter().any(|&reserved| reserved == lower)
}

/// A locally registered account.
///
/// Accounts are created exactly once per successful sign-up. Username
/// uniqueness is enforced by the store (case-insensitive), not merely by a
/// prior availability check.
///
/// # PII Handling
///
/// `display_name`, `image_url` and `profile_url` usually originate from the
/// external provider and should be treated as PII in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAccount {
	/// Unique identifier for this account.
	pub id: AccountId,

	/// Globally unique username.
	pub username: String,

	/// Display name shown in the UI.
	pub display_name: Option<String>,

	/// Argon2 PHC string of the local password, if one was chosen.
	/// Only needed for persistent ("remember me") logins.
	#[serde(skip_serializing)]
	pub password_hash: Option<String>,

	/// URL to the account's avatar image.
	pub image_url: Option<String>,

	/// URL of the account's public profile page.
	pub profile_url: Option<String>,

	/// When the account was created.
	pub created_at: DateTime<Utc>,

	/// When the account was last updated.
	pub updated_at: DateTime<Utc>,
}

impl LocalAccount {
	/// Create a new account with the given username and no optional attributes.
	pub fn new(username: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: AccountId::generate(),
			username: username.into(),
			display_name: None,
			password_hash: None,
			image_url: None,
			profile_url: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns true if the account has a local password credential.
	pub fn has_password(&self) -> bool {
		self.password_hash.is_some()
	}
}

/// Validates a username.
/// Rules:
/// - 3-39 characters
/// - ASCII letters, digits, underscores and hyphens only
/// - Cannot start with underscore or hyphen
/// - Cannot be all numeric
/// - Cannot be a reserved username
pub fn validate_username(username: &str) -> Result<(), &'static str> {
	if username.len() < USERNAME_MIN_LEN {
		return Err("Username must be at least 3 characters");
	}
	if username.len() > USERNAME_MAX_LEN {
		return Err("Username must be at most 39 characters");
	}
	if !username
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
	{
		return Err("Username can only contain letters, numbers, underscores and hyphens");
	}
	if username.starts_with('_') || username.starts_with('-') {
		return Err("Username cannot start with an underscore or hyphen");
	}
	if username.chars().all(|c| c.is_ascii_digit()) {
		return Err("Username cannot be all numbers");
	}
	if is_username_reserved(username) {
		return Err("This username is reserved");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	mod local_account {
		use super::*;

		#[test]
		fn new_account_has_no_optional_attributes() {
			let account = LocalAccount::new("alice");
			assert_eq!(account.username, "alice");
			assert!(account.display_name.is_none());
			assert!(!account.has_password());
			assert_eq!(account.created_at, account.updated_at);
		}

		#[test]
		fn password_hash_is_never_serialized() {
			let mut account = LocalAccount::new("alice");
			account.password_hash = Some("$argon2id$secret".to_string());
			let json = serde_json::to_string(&account).unwrap();
			assert!(!json.contains("argon2id"));
		}
	}

	mod username_validation {
		use super::*;

		#[test]
		fn accepts_valid_usernames() {
			assert!(validate_username("alice").is_ok());
			assert!(validate_username("alice_smith").is_ok());
			assert!(validate_username("octo-cat").is_ok());
			assert!(validate_username("user123").is_ok());
		}

		#[test]
		fn rejects_too_short() {
			assert!(validate_username("ab").is_err());
		}

		#[test]
		fn rejects_too_long() {
			assert!(validate_username(&"a".repeat(40)).is_err());
		}

		#[test]
		fn rejects_invalid_chars() {
			assert!(validate_username("alice smith").is_err());
			assert!(validate_username("alice@home").is_err());
			assert!(validate_username("alice.smith").is_err());
		}

		#[test]
		fn rejects_leading_separator() {
			assert!(validate_username("_alice").is_err());
			assert!(validate_username("-alice").is_err());
		}

		#[test]
		fn rejects_all_numbers() {
			assert!(validate_username("12345").is_err());
		}

		#[test]
		fn rejects_reserved_case_insensitively() {
			assert!(validate_username("admin").is_err());
			assert!(validate_username("SignUp").is_err());
		}
	}
}
