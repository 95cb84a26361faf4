// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tether_auth::Provider;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Outcome of an atomic account (+ link) insert that did not commit.
///
/// The two uniqueness conflicts are split out because callers surface them
/// as ordinary validation errors rather than storage faults.
#[derive(Debug, thiserror::Error)]
pub enum CreateAccountError {
	#[error("username '{0}' is already taken")]
	UsernameTaken(String),

	#[error("{provider} identity {provider_user_id} is already linked to an account")]
	IdentityAlreadyLinked {
		provider: Provider,
		provider_user_id: String,
	},

	#[error(transparent)]
	Db(#[from] DbError),
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
	matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
