// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Form-less sign-up straight from a pending identity.
//!
//! Succeeds only when the provider suggested a username that passes the
//! account rules and is free. Any other case falls back to the explicit form.

use tether_auth::{validate_username, PendingIdentity};

use crate::error::{CommitError, Result};
use crate::factory::ProfileFactory;
use crate::pending::SignUpSession;
use crate::profile::SignUpProfile;
use crate::service::SignUpService;

pub struct ImplicitSignUp<F, S> {
	factory: F,
	service: S,
}

impl<F, S> ImplicitSignUp<F, S>
where
	F: ProfileFactory,
	S: SignUpService<F::Profile>,
{
	pub fn new(factory: F, service: S) -> Self {
		Self { factory, service }
	}

	/// Create an account for `identity` without user input.
	///
	/// Returns the new username, or `None` when the caller should show the
	/// sign-up form instead.
	#[tracing::instrument(skip(self, identity), fields(provider = %identity.provider))]
	pub async fn execute(&self, identity: &PendingIdentity) -> Result<Option<String>> {
		let profile = self.factory.create(identity);
		let Some(username) = profile.username().map(str::to_owned) else {
			tracing::debug!("No suggested username");
			return Ok(None);
		};
		if let Err(reason) = validate_username(&username) {
			tracing::debug!(reason, "Suggested username fails account rules");
			return Ok(None);
		}
		if !self.service.is_username_available(&username).await? {
			tracing::debug!("Suggested username taken");
			return Ok(None);
		}

		match self.service.sign_up(&profile, Some(identity)).await {
			Ok(account) => {
				tracing::info!(account_id = %account.id, "Implicit sign-up committed");
				Ok(Some(account.username))
			}
			Err(CommitError::UsernameTaken(_)) | Err(CommitError::IdentityAlreadyLinked(_)) => {
				Ok(None)
			}
			Err(CommitError::Failed(e)) => Err(e),
		}
	}

	/// Run [`execute`](Self::execute) against the session's pending identity.
	///
	/// The identity is consumed only when an account was created; otherwise it
	/// is put back for the explicit form.
	pub async fn execute_for_session(
		&self,
		session: &dyn SignUpSession,
	) -> Result<Option<(String, PendingIdentity)>> {
		let Some(taken) = session.take_pending_identity().await else {
			return Ok(None);
		};

		let outcome = self.execute(taken.identity()).await;
		match outcome {
			Ok(Some(username)) => Ok(Some((username, taken.into_identity()))),
			Ok(None) => {
				session.restore_pending_identity(taken).await;
				Ok(None)
			}
			Err(e) => {
				session.restore_pending_identity(taken).await;
				Err(e)
			}
		}
	}
}
