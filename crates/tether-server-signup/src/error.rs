// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tether_auth::{AuthError, Provider};
use tether_server_db::{CreateAccountError, DbError};
use tether_server_session::SessionError;

/// Collaborator failures. Fatal to the request, never a validation outcome.
#[derive(Debug, thiserror::Error)]
pub enum SignUpError {
	#[error(transparent)]
	Db(#[from] DbError),

	#[error(transparent)]
	Session(#[from] SessionError),

	#[error("password hashing failed: {0}")]
	PasswordHash(String),
}

impl From<AuthError> for SignUpError {
	fn from(e: AuthError) -> Self {
		SignUpError::PasswordHash(e.to_string())
	}
}

pub type Result<T> = std::result::Result<T, SignUpError>;

/// Why an account commit did not happen.
///
/// The first two variants are expected conflicts that the orchestrator turns
/// into form errors.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
	#[error("username '{0}' is already taken")]
	UsernameTaken(String),

	#[error("{0} identity is already linked to another account")]
	IdentityAlreadyLinked(Provider),

	#[error(transparent)]
	Failed(#[from] SignUpError),
}

impl From<CreateAccountError> for CommitError {
	fn from(e: CreateAccountError) -> Self {
		match e {
			CreateAccountError::UsernameTaken(username) => CommitError::UsernameTaken(username),
			CreateAccountError::IdentityAlreadyLinked { provider, .. } => {
				CommitError::IdentityAlreadyLinked(provider)
			}
			CreateAccountError::Db(e) => CommitError::Failed(e.into()),
		}
	}
}
