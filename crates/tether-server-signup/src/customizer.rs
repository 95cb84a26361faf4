// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Extension hooks run by the orchestrator.

use tether_auth::{validate_username, PendingIdentity};

use crate::profile::SignUpProfile;
use crate::validation::{ValidationErrors, USERNAME_FIELD};

/// Optional customisation of form rendering and validation.
///
/// Both hooks default to no-ops.
pub trait SignUpCustomizer<P: SignUpProfile>: Send + Sync {
	/// Runs on every render after the draft has been built from the identity.
	fn customize_form(&self, _profile: &mut P, _identity: Option<&PendingIdentity>) {}

	/// Runs after the blank-username check. Any error added here stops the
	/// submission before the availability check.
	fn validate(&self, _profile: &P, _errors: &mut ValidationErrors) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCustomizer;

impl<P: SignUpProfile> SignUpCustomizer<P> for DefaultCustomizer {}

/// Applies the account username rules (length, charset, reserved names).
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernameRulesCustomizer;

impl<P: SignUpProfile> SignUpCustomizer<P> for UsernameRulesCustomizer {
	fn validate(&self, profile: &P, errors: &mut ValidationErrors) {
		if let Some(username) = profile.username() {
			if let Err(message) = validate_username(username) {
				errors.add(USERNAME_FIELD, message);
			}
		}
	}
}
