// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External identity types.
//!
//! - [`Provider`] - provider-agnostic name of an identity provider
//! - [`PendingIdentity`] - a completed federated handshake awaiting linkage
//! - [`IdentityLink`] - the persisted association between a local account and
//!   one external identity
//!
//! # PII Handling
//!
//! `provider_user_id` may be linkable to external accounts and the suggested
//! attributes are user-provided PII. Credential material is always wrapped in
//! [`SecretString`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;
use crate::secret::SecretString;
use crate::types::{AccountId, IdentityLinkId};

/// Name of an external identity provider (e.g. `github`, `google`).
///
/// Names are lowercase ASCII identifiers so they can be used as stable keys
/// in the link table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Provider(String);

impl Provider {
	/// Parse and normalize a provider name.
	pub fn new(name: impl AsRef<str>) -> Result<Self, AuthError> {
		let normalized = name.as_ref().trim().to_ascii_lowercase();
		let valid = !normalized.is_empty()
			&& normalized
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
		if !valid {
			return Err(AuthError::InvalidProvider(name.as_ref().to_string()));
		}
		Ok(Self(normalized))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for Provider {
	type Error = AuthError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Provider::new(value)
	}
}

impl From<Provider> for String {
	fn from(provider: Provider) -> Self {
		provider.0
	}
}

/// Opaque credential material obtained during the handshake.
///
/// Persisted alongside the [`IdentityLink`] so the application can later call
/// the provider's API on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
	pub access_token: SecretString,
	pub refresh_token: Option<SecretString>,
	/// OAuth 1.0a token secret, for providers that still use one.
	pub secret: Option<SecretString>,
	pub expires_at: Option<DateTime<Utc>>,
}

impl ProviderCredentials {
	pub fn new(access_token: impl Into<SecretString>) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token: None,
			secret: None,
			expires_at: None,
		}
	}

	pub fn with_refresh_token(mut self, refresh_token: impl Into<SecretString>) -> Self {
		self.refresh_token = Some(refresh_token.into());
		self
	}

	pub fn with_secret(mut self, secret: impl Into<SecretString>) -> Self {
		self.secret = Some(secret.into());
		self
	}

	pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
		self.expires_at = Some(expires_at);
		self
	}
}

/// A completed federated handshake that has not yet been linked to a local
/// account.
///
/// Held in session storage, exclusively owned by one session, and consumed
/// exactly once on successful sign-up. Every suggested attribute is optional;
/// providers differ in what they expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIdentity {
	pub provider: Provider,
	pub provider_user_id: String,
	pub suggested_username: Option<String>,
	pub display_name: Option<String>,
	pub image_url: Option<String>,
	pub profile_url: Option<String>,
	pub credentials: ProviderCredentials,
}

impl PendingIdentity {
	pub fn new(
		provider: Provider,
		provider_user_id: impl Into<String>,
		credentials: ProviderCredentials,
	) -> Self {
		Self {
			provider,
			provider_user_id: provider_user_id.into(),
			suggested_username: None,
			display_name: None,
			image_url: None,
			profile_url: None,
			credentials,
		}
	}

	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.suggested_username = Some(username.into());
		self
	}

	pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = Some(display_name.into());
		self
	}

	pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
		self.image_url = Some(image_url.into());
		self
	}

	pub fn with_profile_url(mut self, profile_url: impl Into<String>) -> Self {
		self.profile_url = Some(profile_url.into());
		self
	}

	/// Build the link record that associates this identity with `account_id`.
	pub fn to_link(&self, account_id: AccountId) -> IdentityLink {
		IdentityLink {
			id: IdentityLinkId::generate(),
			account_id,
			provider: self.provider.clone(),
			provider_user_id: self.provider_user_id.clone(),
			display_name: self.display_name.clone(),
			profile_url: self.profile_url.clone(),
			image_url: self.image_url.clone(),
			credentials: self.credentials.clone(),
			created_at: Utc::now(),
		}
	}
}

/// Persisted association between a local account and one external identity.
///
/// At most one link exists per (`provider`, `provider_user_id`) pair; the
/// store enforces it with a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLink {
	pub id: IdentityLinkId,
	pub account_id: AccountId,
	pub provider: Provider,
	pub provider_user_id: String,
	pub display_name: Option<String>,
	pub profile_url: Option<String>,
	pub image_url: Option<String>,
	pub credentials: ProviderCredentials,
	pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn github() -> Provider {
		Provider::new("github").unwrap()
	}

	mod provider {
		use super::*;

		#[test]
		fn normalizes_case_and_whitespace() {
			assert_eq!(Provider::new(" GitHub ").unwrap().as_str(), "github");
		}

		#[test]
		fn rejects_empty_name() {
			assert!(Provider::new("").is_err());
			assert!(Provider::new("   ").is_err());
		}

		#[test]
		fn rejects_unexpected_characters() {
			assert!(Provider::new("git hub").is_err());
			assert!(Provider::new("github/evil").is_err());
		}

		#[test]
		fn serde_round_trips_through_string() {
			let json = serde_json::to_string(&github()).unwrap();
			assert_eq!(json, "\"github\"");
			let back: Provider = serde_json::from_str(&json).unwrap();
			assert_eq!(back, github());
		}
	}

	mod pending_identity {
		use super::*;

		#[test]
		fn builder_sets_suggested_attributes() {
			let identity = PendingIdentity::new(github(), "42", ProviderCredentials::new("tok"))
				.with_username("octocat")
				.with_display_name("The Octocat")
				.with_image_url("https://example.com/a.png")
				.with_profile_url("https://github.com/octocat");

			assert_eq!(identity.suggested_username.as_deref(), Some("octocat"));
			assert_eq!(identity.display_name.as_deref(), Some("The Octocat"));
			assert_eq!(identity.image_url.as_deref(), Some("https://example.com/a.png"));
			assert_eq!(
				identity.profile_url.as_deref(),
				Some("https://github.com/octocat")
			);
		}

		#[test]
		fn to_link_copies_identity_and_credentials() {
			let credentials = ProviderCredentials::new("tok").with_refresh_token("refresh");
			let identity = PendingIdentity::new(github(), "42", credentials.clone())
				.with_display_name("The Octocat");
			let account_id = AccountId::generate();

			let link = identity.to_link(account_id);

			assert_eq!(link.account_id, account_id);
			assert_eq!(link.provider, github());
			assert_eq!(link.provider_user_id, "42");
			assert_eq!(link.display_name.as_deref(), Some("The Octocat"));
			assert_eq!(link.credentials, credentials);
		}

		#[test]
		fn debug_output_redacts_credentials() {
			let identity = PendingIdentity::new(github(), "42", ProviderCredentials::new("gho_secret"));
			let debug = format!("{identity:?}");
			assert!(!debug.contains("gho_secret"));
			assert!(debug.contains("[REDACTED]"));
		}
	}
}
