// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity-linking sign-up for Tether.
//!
//! After a federated handshake the external identity is parked in the
//! caller's pre-authentication session as a [`PendingIdentity`]. This crate
//! turns it into a local account:
//!
//! 1. [`SignUpOrchestrator::render_form`] builds a draft from the identity via
//!    a [`ProfileFactory`], clearing a suggested username that is taken.
//! 2. [`SignUpOrchestrator::submit`] validates the draft, checks availability
//!    and commits the account together with its [`IdentityLink`] atomically.
//!    Expected conflicts come back as [`SignUpOutcome::ValidationFailed`].
//! 3. [`SessionCompletionService`] signs the new account in.
//! 4. [`RedirectResolver`] picks where to send the user.
//!
//! [`ImplicitSignUp`] skips the form when the provider's suggested username
//! can be used as-is.
//!
//! [`PendingIdentity`]: tether_auth::PendingIdentity
//! [`IdentityLink`]: tether_auth::IdentityLink

pub mod availability;
pub mod completion;
pub mod customizer;
pub mod error;
pub mod factory;
pub mod implicit;
pub mod orchestrator;
pub mod pending;
pub mod profile;
pub mod redirect;
pub mod service;
pub mod validation;

#[cfg(test)]
mod testing;

pub use availability::UsernameAvailability;
pub use completion::{AuthenticatedSession, RequestContext, SessionCompletionService};
pub use customizer::{DefaultCustomizer, SignUpCustomizer, UsernameRulesCustomizer};
pub use error::{CommitError, Result, SignUpError};
pub use factory::{DefaultProfileFactory, ProfileFactory};
pub use implicit::ImplicitSignUp;
pub use orchestrator::{SignUpOrchestrator, SignUpOutcome};
pub use pending::{
	PendingIdentityStore, PresessionHandle, SignUpSession, TakenIdentity,
	DEFAULT_PENDING_IDENTITY_TTL,
};
pub use profile::{ProfileDraft, SignUpProfile};
pub use redirect::{
	InMemoryRequestCache, RedirectResolver, RedirectStrategy, RequestCache, SavedRequest, SITE_ROOT,
};
pub use service::{AccountSignUpService, SignUpService};
pub use validation::{FieldError, ValidationErrors, IDENTITY_FIELD, USERNAME_FIELD};
