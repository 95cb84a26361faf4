// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core authentication types for Tether.
//!
//! This crate holds the data model shared by the persistence layer, the
//! sign-up core and the HTTP server:
//!
//! - [`LocalAccount`] - a locally registered account keyed by a unique username
//! - [`IdentityLink`] - a persisted association between an account and an
//!   external provider identity
//! - [`PendingIdentity`] - the result of a completed federated handshake that
//!   has not yet been linked to a local account
//! - [`Session`] - an authenticated web session
//!
//! Username rules, password hashing and token hashing helpers live here too,
//! so every crate applies them identically.

pub mod account;
mod argon2_config;
pub mod error;
pub mod identity;
pub mod password;
pub mod secret;
pub mod session;
pub mod types;

pub use account::{is_username_reserved, validate_username, LocalAccount, RESERVED_USERNAMES};
pub use error::AuthError;
pub use identity::{IdentityLink, PendingIdentity, Provider, ProviderCredentials};
pub use password::{hash_password, verify_password};
pub use secret::{Secret, SecretString, REDACTED};
pub use session::{generate_session_token, Session, SESSION_EXPIRY_DAYS};
pub use types::{AccountId, IdentityLinkId, SessionId};

/// Hash an opaque token (session token) for storage using SHA-256.
///
/// Tokens are random and high-entropy, so a fast hash is sufficient; the
/// plaintext is only ever held by the client.
pub fn hash_token(token: &str) -> String {
	use sha2::{Digest, Sha256};
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_token_is_deterministic() {
		assert_eq!(hash_token("abc"), hash_token("abc"));
	}

	#[test]
	fn hash_token_is_hex_sha256() {
		let hashed = hash_token("abc");
		assert_eq!(hashed.len(), 64);
		assert_eq!(
			hashed,
			"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
		);
	}
}
