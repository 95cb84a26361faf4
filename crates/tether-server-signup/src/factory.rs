// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tether_auth::PendingIdentity;

use crate::profile::{ProfileDraft, SignUpProfile};

/// Builds draft profiles for the sign-up form.
///
/// `create` must be a pure mapping: if it sets a username, that username is
/// the identity's suggested username, verbatim.
pub trait ProfileFactory: Send + Sync {
	type Profile: SignUpProfile;

	fn create(&self, identity: &PendingIdentity) -> Self::Profile;

	fn instantiate(&self) -> Self::Profile;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProfileFactory;

impl ProfileFactory for DefaultProfileFactory {
	type Profile = ProfileDraft;

	fn create(&self, identity: &PendingIdentity) -> ProfileDraft {
		ProfileDraft {
			user_name: identity.suggested_username.clone(),
			display_name: identity.display_name.clone(),
			password: None,
			image_url: identity.image_url.clone(),
			profile_url: identity.profile_url.clone(),
		}
	}

	fn instantiate(&self) -> ProfileDraft {
		ProfileDraft::default()
	}
}
