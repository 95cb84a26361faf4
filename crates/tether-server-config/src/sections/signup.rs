// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up workflow configuration.
//!
//! # Redirect strategy
//!
//! With `use_social_authentication_filter = false` (the default) a new user is
//! always sent to `authentication_url`. With it enabled, the saved
//! pre-authentication request is restored if it was a GET, else the user
//! lands on `/`.

use serde::Deserialize;

const DEFAULT_SIGN_UP_VIEW: &str = "signup";
const DEFAULT_AUTHENTICATION_URL: &str = "/authenticate";
const DEFAULT_PENDING_IDENTITY_TTL_SECS: u64 = 600;
const DEFAULT_PRESESSION_COOKIE: &str = "tether_presession";
const DEFAULT_SESSION_COOKIE: &str = "tether_session";

/// Sign-up configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpConfig {
	/// Template identifier returned with the rendered form.
	pub sign_up_view: String,
	pub use_social_authentication_filter: bool,
	pub authentication_url: String,
	pub pending_identity_ttl_secs: u64,
	pub presession_cookie_name: String,
	pub session_cookie_name: String,
	/// Allow form-less sign-up when the provider's suggested username is usable.
	pub implicit_sign_up: bool,
}

impl Default for SignUpConfig {
	fn default() -> Self {
		SignUpConfigLayer::default().finalize()
	}
}

/// Sign-up configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpConfigLayer {
	#[serde(default)]
	pub sign_up_view: Option<String>,
	#[serde(default)]
	pub use_social_authentication_filter: Option<bool>,
	#[serde(default)]
	pub authentication_url: Option<String>,
	#[serde(default)]
	pub pending_identity_ttl_secs: Option<u64>,
	#[serde(default)]
	pub presession_cookie_name: Option<String>,
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub implicit_sign_up: Option<bool>,
}

impl SignUpConfigLayer {
	pub fn merge(&mut self, other: SignUpConfigLayer) {
		if other.sign_up_view.is_some() {
			self.sign_up_view = other.sign_up_view;
		}
		if other.use_social_authentication_filter.is_some() {
			self.use_social_authentication_filter = other.use_social_authentication_filter;
		}
		if other.authentication_url.is_some() {
			self.authentication_url = other.authentication_url;
		}
		if other.pending_identity_ttl_secs.is_some() {
			self.pending_identity_ttl_secs = other.pending_identity_ttl_secs;
		}
		if other.presession_cookie_name.is_some() {
			self.presession_cookie_name = other.presession_cookie_name;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.implicit_sign_up.is_some() {
			self.implicit_sign_up = other.implicit_sign_up;
		}
	}

	pub fn finalize(self) -> SignUpConfig {
		SignUpConfig {
			sign_up_view: self
				.sign_up_view
				.unwrap_or_else(|| DEFAULT_SIGN_UP_VIEW.to_string()),
			use_social_authentication_filter: self.use_social_authentication_filter.unwrap_or(false),
			authentication_url: self
				.authentication_url
				.unwrap_or_else(|| DEFAULT_AUTHENTICATION_URL.to_string()),
			pending_identity_ttl_secs: self
				.pending_identity_ttl_secs
				.unwrap_or(DEFAULT_PENDING_IDENTITY_TTL_SECS),
			presession_cookie_name: self
				.presession_cookie_name
				.unwrap_or_else(|| DEFAULT_PRESESSION_COOKIE.to_string()),
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
			implicit_sign_up: self.implicit_sign_up.unwrap_or(false),
		}
	}
}
