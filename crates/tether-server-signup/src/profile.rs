// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The sign-up form model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behaviour the orchestrator needs from a sign-up form model.
///
/// Implementations may carry extra fields; the orchestrator only ever reads,
/// trims and clears the username.
pub trait SignUpProfile: Clone + Send + Sync + 'static {
	fn username(&self) -> Option<&str>;

	fn set_username(&mut self, username: String);

	fn clear_username(&mut self);

	/// True when no usable username was chosen (absent, empty or whitespace).
	fn is_username_blank(&self) -> bool {
		self.username().map_or(true, |u| u.trim().is_empty())
	}
}

/// Draft local-account profile, as rendered on and submitted by the form.
///
/// The password is accepted on submission but never serialized back out.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
	#[serde(default)]
	pub user_name: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default, skip_serializing)]
	pub password: Option<String>,
	#[serde(default)]
	pub image_url: Option<String>,
	#[serde(default)]
	pub profile_url: Option<String>,
}

impl ProfileDraft {
	/// Trim the username and collapse empty optional inputs to `None`.
	///
	/// Browsers submit untouched text fields as empty strings.
	pub fn normalized(self) -> Self {
		Self {
			user_name: self.user_name.map(|u| u.trim().to_string()),
			display_name: non_empty(self.display_name),
			password: non_empty(self.password),
			image_url: non_empty(self.image_url),
			profile_url: non_empty(self.profile_url),
		}
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

impl SignUpProfile for ProfileDraft {
	fn username(&self) -> Option<&str> {
		self.user_name.as_deref()
	}

	fn set_username(&mut self, username: String) {
		self.user_name = Some(username);
	}

	fn clear_username(&mut self) {
		self.user_name = None;
	}
}

impl fmt::Debug for ProfileDraft {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProfileDraft")
			.field("user_name", &self.user_name)
			.field("display_name", &self.display_name)
			.field(
				"password",
				&self.password.as_ref().map(|_| tether_auth::REDACTED),
			)
			.field("image_url", &self.image_url)
			.field("profile_url", &self.profile_url)
			.finish()
	}
}
