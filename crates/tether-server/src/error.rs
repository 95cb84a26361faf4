// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use tether_server_signup::SignUpError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// A sign-up collaborator (store, session service) failed.
	#[error("Sign-up error: {0}")]
	SignUp(#[from] SignUpError),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error_response) = match &self {
			ServerError::SignUp(SignUpError::Db(e)) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse {
						error: "database_error".to_string(),
						message: "A database error occurred".to_string(),
					},
				)
			}
			ServerError::SignUp(SignUpError::Session(e)) => {
				tracing::error!(error = %e, "session error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse {
						error: "session_error".to_string(),
						message: "Could not establish a session".to_string(),
					},
				)
			}
			ServerError::SignUp(SignUpError::PasswordHash(e)) => {
				tracing::error!(error = %e, "password hashing error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse {
						error: "internal_error".to_string(),
						message: "An internal error occurred".to_string(),
					},
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse {
						error: "internal_error".to_string(),
						message: "An internal error occurred".to_string(),
					},
				)
			}
		};

		(status, Json(error_response)).into_response()
	}
}
