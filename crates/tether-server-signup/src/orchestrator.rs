// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up orchestration: form pre-population, validation, uniqueness
//! enforcement and the atomic account + link commit.
//!
//! A submission moves through `validating -> committing -> {success, rejected}`.
//! Every rejection is a [`SignUpOutcome::ValidationFailed`] value; only
//! collaborator failures surface as [`SignUpError`](crate::SignUpError).
//!
//! # Retry safety
//!
//! A rejected submission leaves no state behind, so it can be retried. A
//! successful one cannot: resubmitting would try to create the account again.

use tether_auth::PendingIdentity;

use crate::customizer::{DefaultCustomizer, SignUpCustomizer};
use crate::error::{CommitError, Result};
use crate::factory::ProfileFactory;
use crate::pending::{SignUpSession, TakenIdentity};
use crate::profile::SignUpProfile;
use crate::service::SignUpService;
use crate::validation::{
	username_unavailable, ValidationErrors, IDENTITY_FIELD, USERNAME_FIELD, USERNAME_REQUIRED,
};

#[derive(Debug)]
pub enum SignUpOutcome {
	/// The account was committed. `identity` is the pending identity consumed
	/// by this submission, if any.
	Success {
		username: String,
		identity: Option<PendingIdentity>,
	},
	ValidationFailed(ValidationErrors),
}

impl SignUpOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, SignUpOutcome::Success { .. })
	}

	fn username_unavailable(username: &str) -> Self {
		SignUpOutcome::ValidationFailed(ValidationErrors::single(
			USERNAME_FIELD,
			username_unavailable(username),
		))
	}
}

pub struct SignUpOrchestrator<F, S, C = DefaultCustomizer> {
	factory: F,
	service: S,
	customizer: C,
}

impl<F, S> SignUpOrchestrator<F, S, DefaultCustomizer>
where
	F: ProfileFactory,
	S: SignUpService<F::Profile>,
{
	pub fn new(factory: F, service: S) -> Self {
		Self::with_customizer(factory, service, DefaultCustomizer)
	}
}

impl<F, S, C> SignUpOrchestrator<F, S, C>
where
	F: ProfileFactory,
	S: SignUpService<F::Profile>,
	C: SignUpCustomizer<F::Profile>,
{
	pub fn with_customizer(factory: F, service: S, customizer: C) -> Self {
		Self {
			factory,
			service,
			customizer,
		}
	}

	pub fn factory(&self) -> &F {
		&self.factory
	}

	pub fn service(&self) -> &S {
		&self.service
	}

	/// Build the draft shown on the sign-up form.
	///
	/// A suggested username that is already taken is cleared so the user has to
	/// pick another. The check runs on every render. Session state is not
	/// modified.
	#[tracing::instrument(skip(self, session))]
	pub async fn render_form(&self, session: &dyn SignUpSession) -> Result<F::Profile> {
		let Some(identity) = session.pending_identity().await else {
			let mut profile = self.factory.instantiate();
			self.customizer.customize_form(&mut profile, None);
			return Ok(profile);
		};

		let mut profile = self.factory.create(&identity);
		let suggested = profile.username().map(|u| u.trim().to_owned());
		match suggested {
			Some(username) if !username.is_empty() => {
				if !self.service.is_username_available(&username).await? {
					tracing::debug!(provider = %identity.provider, "Suggested username taken, clearing");
					profile.clear_username();
				}
			}
			Some(_) => profile.clear_username(),
			None => {}
		}

		self.customizer.customize_form(&mut profile, Some(&identity));
		Ok(profile)
	}

	/// Validate and commit a submitted draft.
	///
	/// The pending identity is taken from the session only at commit time. If
	/// the commit fails for any reason it is put back unchanged. If another
	/// request already consumed it, the account is committed without a link.
	#[tracing::instrument(skip(self, session, profile), fields(username = ?profile.username()))]
	pub async fn submit(
		&self,
		session: &dyn SignUpSession,
		profile: &F::Profile,
	) -> Result<SignUpOutcome> {
		if profile.is_username_blank() {
			return Ok(SignUpOutcome::ValidationFailed(ValidationErrors::single(
				USERNAME_FIELD,
				USERNAME_REQUIRED,
			)));
		}
		let raw = profile.username().unwrap_or_default();
		let username = raw.trim().to_owned();
		let trimmed;
		let profile = if raw.len() == username.len() {
			profile
		} else {
			let mut copy = profile.clone();
			copy.set_username(username.clone());
			trimmed = copy;
			&trimmed
		};

		let mut errors = ValidationErrors::new();
		self.customizer.validate(profile, &mut errors);
		if !errors.is_empty() {
			tracing::debug!(errors = errors.len(), "Custom validation rejected sign-up");
			return Ok(SignUpOutcome::ValidationFailed(errors));
		}

		if !self.service.is_username_available(&username).await? {
			return Ok(SignUpOutcome::username_unavailable(&username));
		}

		let taken = session.take_pending_identity().await;
		if taken.is_none() {
			tracing::debug!("No pending identity in session, committing account only");
		}

		let committed = self
			.service
			.sign_up(profile, taken.as_ref().map(TakenIdentity::identity))
			.await;
		match committed {
			Ok(account) => {
				tracing::info!(
					account_id = %account.id,
					linked = taken.is_some(),
					"Sign-up committed"
				);
				Ok(SignUpOutcome::Success {
					username: account.username,
					identity: taken.map(TakenIdentity::into_identity),
				})
			}
			Err(e) => {
				if let Some(taken) = taken {
					session.restore_pending_identity(taken).await;
				}
				match e {
					CommitError::UsernameTaken(_) => {
						tracing::info!("Lost username race at commit");
						Ok(SignUpOutcome::username_unavailable(&username))
					}
					CommitError::IdentityAlreadyLinked(provider) => {
						tracing::warn!(provider = %provider, "Pending identity already linked elsewhere");
						Ok(SignUpOutcome::ValidationFailed(ValidationErrors::single(
							IDENTITY_FIELD,
							format!("This {provider} account is already linked to another user"),
						)))
					}
					CommitError::Failed(e) => Err(e),
				}
			}
		}
	}
}
