// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authenticated web sessions.
//!
//! - **Session creation**: new sessions with a 60-day expiry
//! - **Token generation**: 32 bytes of cryptographic randomness, hex encoded
//!
//! Tokens are stored hashed (see [`hash_token`](crate::hash_token)); only the
//! client ever holds the plaintext.

use crate::{AccountId, SessionId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Session lifetime (60 days).
pub const SESSION_EXPIRY_DAYS: i64 = 60;

/// An authenticated web session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub account_id: AccountId,
	pub created_at: DateTime<Utc>,
	pub last_used_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
	pub ip_address: Option<String>,
	pub user_agent: Option<String>,
}

impl Session {
	/// Create a new session with the default 60-day expiry.
	#[instrument(level = "debug", skip(account_id), fields(account_id = %account_id))]
	pub fn new(account_id: AccountId) -> Self {
		let now = Utc::now();
		Self {
			id: SessionId::generate(),
			account_id,
			created_at: now,
			last_used_at: now,
			expires_at: now + Duration::days(SESSION_EXPIRY_DAYS),
			ip_address: None,
			user_agent: None,
		}
	}

	/// Set IP address.
	pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
		self.ip_address = Some(ip.into());
		self
	}

	/// Set user agent.
	pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
		self.user_agent = Some(ua.into());
		self
	}

	/// Seconds until the session expires, clamped at zero.
	pub fn max_age_seconds(&self) -> i64 {
		(self.expires_at - Utc::now()).num_seconds().max(0)
	}
}

/// Generates a cryptographically secure random session token.
pub fn generate_session_token() -> String {
	use rand::Rng;
	let mut rng = rand::thread_rng();
	let bytes: [u8; 32] = rng.gen();
	hex::encode(bytes)
}
