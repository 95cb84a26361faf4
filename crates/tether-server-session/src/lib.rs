// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session creation service for Tether sign-in flows.
//!
//! Handles:
//!
//! - Session object creation with client metadata
//! - Token generation and hashing
//! - Database persistence
//! - Cookie header formatting

use std::sync::Arc;
use tether_auth::{generate_session_token, hash_token, AccountId, Session};
use tether_server_db::SessionStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
	#[error("failed to create session: {0}")]
	Database(#[from] tether_server_db::DbError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
	pub ip_address: Option<String>,
	pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct SessionRequest {
	pub account_id: AccountId,
	pub client_info: ClientInfo,
}

impl SessionRequest {
	pub fn new(account_id: AccountId, client_info: ClientInfo) -> Self {
		Self {
			account_id,
			client_info,
		}
	}
}

pub struct SessionResponse {
	pub session: Session,
	pub token: String,
	pub cookie_header: String,
}

pub struct SessionService {
	session_repo: Arc<dyn SessionStore>,
	cookie_name: String,
}

impl SessionService {
	pub fn new(session_repo: Arc<dyn SessionStore>, cookie_name: impl Into<String>) -> Self {
		Self {
			session_repo,
			cookie_name: cookie_name.into(),
		}
	}

	pub fn cookie_name(&self) -> &str {
		&self.cookie_name
	}

	#[tracing::instrument(skip(self, request), fields(account_id = %request.account_id))]
	pub async fn create_session(&self, request: SessionRequest) -> Result<SessionResponse> {
		let mut session = Session::new(request.account_id);
		if let Some(ip) = request.client_info.ip_address {
			session = session.with_ip(ip);
		}
		if let Some(ua) = request.client_info.user_agent {
			session = session.with_user_agent(ua);
		}

		let token = generate_session_token();
		let token_hash = hash_token(&token);

		self
			.session_repo
			.create_session(&session, &token_hash)
			.await?;

		let cookie_header = format!(
			"{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
			self.cookie_name,
			token,
			session.max_age_seconds()
		);

		tracing::info!(
			account_id = %request.account_id,
			session_id = %session.id,
			"Session created"
		);

		Ok(SessionResponse {
			session,
			token,
			cookie_header,
		})
	}

}
