// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local password hashing.
//!
//! A local password is optional for accounts created through a federated
//! identity; it is only required for persistent ("remember me") logins.
//! Passwords are stored as Argon2id PHC strings, never in plaintext.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::PasswordVerifier;

use crate::argon2_config::argon2_instance;
use crate::error::AuthError;

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored PHC string.
///
/// Returns `false` for a mismatch or an unparseable hash.
pub fn verify_password(password: &str, phc: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(phc) else {
		tracing::warn!("stored password hash is not a valid PHC string");
		return false;
	};
	argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}
