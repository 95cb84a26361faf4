// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tether_auth::{AccountId, Session, SessionId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError>;
	async fn get_session_by_token_hash(&self, token_hash: &str)
		-> Result<Option<Session>, DbError>;
	async fn delete_expired_sessions(&self) -> Result<u64, DbError>;
}

#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Persist a session. Only the token hash is stored.
	#[tracing::instrument(skip(self, session, token_hash), fields(session_id = %session.id, account_id = %session.account_id))]
	pub async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, account_id, token_hash, created_at, last_used_at,
			                      expires_at, ip_address, user_agent)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.account_id.to_string())
		.bind(token_hash)
		.bind(session.created_at.to_rfc3339())
		.bind(session.last_used_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.bind(&session.ip_address)
		.bind(&session.user_agent)
		.execute(&self.pool)
		.await?;

		tracing::debug!("session created");
		Ok(())
	}

	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<Session>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, account_id, created_at, last_used_at, expires_at, ip_address, user_agent
			FROM sessions
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_session(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn delete_expired_sessions(&self) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected();
		if deleted > 0 {
			tracing::info!(deleted, "expired sessions removed");
		}
		Ok(deleted)
	}
}

#[async_trait]
impl SessionStore for SessionRepository {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError> {
		self.create_session(session, token_hash).await
	}

	async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<Session>, DbError> {
		self.get_session_by_token_hash(token_hash).await
	}

	async fn delete_expired_sessions(&self) -> Result<u64, DbError> {
		self.delete_expired_sessions().await
	}
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DbError> {
	let id: String = row.get("id");
	let account_id: String = row.get("account_id");
	let created_at: String = row.get("created_at");
	let last_used_at: String = row.get("last_used_at");
	let expires_at: String = row.get("expires_at");

	let parse = |value: &str, field: &str| -> Result<DateTime<Utc>, DbError> {
		Ok(
			DateTime::parse_from_rfc3339(value)
				.map_err(|e| DbError::Internal(format!("Invalid {field}: {e}")))?
				.with_timezone(&Utc),
		)
	};

	Ok(Session {
		id: SessionId::new(
			Uuid::parse_str(&id).map_err(|e| DbError::Internal(format!("Invalid session id: {e}")))?,
		),
		account_id: AccountId::new(
			Uuid::parse_str(&account_id)
				.map_err(|e| DbError::Internal(format!("Invalid account_id: {e}")))?,
		),
		created_at: parse(&created_at, "created_at")?,
		last_used_at: parse(&last_used_at, "last_used_at")?,
		expires_at: parse(&expires_at, "expires_at")?,
		ip_address: row.get("ip_address"),
		user_agent: row.get("user_agent"),
	})
}
