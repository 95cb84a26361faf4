// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
	#[error("password hashing failed: {0}")]
	PasswordHash(String),

	#[error("invalid provider name: {0:?}")]
	InvalidProvider(String),
}
