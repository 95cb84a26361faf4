// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account and identity-link persistence.
//!
//! Account creation and the optional identity link are written in a single
//! transaction: either both rows exist afterwards or neither does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tether_auth::{
	AccountId, IdentityLink, IdentityLinkId, LocalAccount, Provider, ProviderCredentials,
	SecretString,
};
use uuid::Uuid;

use crate::error::{is_unique_violation, CreateAccountError, DbError};

#[async_trait]
pub trait AccountStore: Send + Sync {
	async fn is_username_available(&self, username: &str) -> Result<bool, DbError>;
	async fn get_account_by_id(&self, id: &AccountId) -> Result<Option<LocalAccount>, DbError>;
	async fn get_account_by_username(&self, username: &str)
		-> Result<Option<LocalAccount>, DbError>;
	async fn create_account(
		&self,
		account: &LocalAccount,
		link: Option<&IdentityLink>,
	) -> Result<(), CreateAccountError>;
	async fn get_link_by_provider(
		&self,
		provider: &Provider,
		provider_user_id: &str,
	) -> Result<Option<IdentityLink>, DbError>;
	async fn create_link(&self, link: &IdentityLink) -> Result<(), DbError>;
	async fn list_links_for_account(
		&self,
		account_id: &AccountId,
	) -> Result<Vec<IdentityLink>, DbError>;
}

#[derive(Clone)]
pub struct AccountRepository {
	pool: SqlitePool,
}

impl AccountRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Check whether a username is free. Comparison is case-insensitive.
	#[tracing::instrument(skip(self))]
	pub async fn is_username_available(&self, username: &str) -> Result<bool, DbError> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM accounts WHERE username = ?")
			.bind(username)
			.fetch_one(&self.pool)
			.await?;
		let count: i64 = row.get("count");
		Ok(count == 0)
	}

	#[tracing::instrument(skip(self), fields(account_id = %id))]
	pub async fn get_account_by_id(&self, id: &AccountId) -> Result<Option<LocalAccount>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, display_name, password_hash, image_url, profile_url,
			       created_at, updated_at
			FROM accounts
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_account(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_account_by_username(
		&self,
		username: &str,
	) -> Result<Option<LocalAccount>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, display_name, password_hash, image_url, profile_url,
			       created_at, updated_at
			FROM accounts
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_account(&r)).transpose()
	}

	/// Insert an account and, optionally, its first identity link atomically.
	///
	/// # Errors
	/// - `CreateAccountError::UsernameTaken` if the username is already registered
	/// - `CreateAccountError::IdentityAlreadyLinked` if the link's identity
	///   belongs to another account
	#[tracing::instrument(skip(self, account, link), fields(account_id = %account.id, username = %account.username, with_link = link.is_some()))]
	pub async fn create_account(
		&self,
		account: &LocalAccount,
		link: Option<&IdentityLink>,
	) -> Result<(), CreateAccountError> {
		let mut tx = self.pool.begin().await.map_err(DbError::from)?;

		let inserted = sqlx::query(
			r#"
			INSERT INTO accounts (id, username, display_name, password_hash, image_url,
			                      profile_url, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(account.id.to_string())
		.bind(&account.username)
		.bind(&account.display_name)
		.bind(&account.password_hash)
		.bind(&account.image_url)
		.bind(&account.profile_url)
		.bind(account.created_at.to_rfc3339())
		.bind(account.updated_at.to_rfc3339())
		.execute(&mut *tx)
		.await;

		if let Err(e) = inserted {
			if is_unique_violation(&e) {
				return Err(CreateAccountError::UsernameTaken(account.username.clone()));
			}
			return Err(DbError::from(e).into());
		}

		if let Some(link) = link {
			if let Err(e) = insert_link(&mut *tx, link).await {
				if is_unique_violation(&e) {
					return Err(CreateAccountError::IdentityAlreadyLinked {
						provider: link.provider.clone(),
						provider_user_id: link.provider_user_id.clone(),
					});
				}
				return Err(DbError::from(e).into());
			}
		}

		tx.commit().await.map_err(DbError::from)?;

		tracing::info!("account created");
		Ok(())
	}

	#[tracing::instrument(skip(self, provider_user_id), fields(provider = %provider))]
	pub async fn get_link_by_provider(
		&self,
		provider: &Provider,
		provider_user_id: &str,
	) -> Result<Option<IdentityLink>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, account_id, provider, provider_user_id, display_name, profile_url,
			       image_url, access_token, refresh_token, secret, expires_at, created_at
			FROM identity_links
			WHERE provider = ? AND provider_user_id = ?
			"#,
		)
		.bind(provider.as_str())
		.bind(provider_user_id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_link(&r)).transpose()
	}

	/// Link an external identity to an existing account.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the identity is already linked.
	#[tracing::instrument(skip(self, link), fields(account_id = %link.account_id, provider = %link.provider))]
	pub async fn create_link(&self, link: &IdentityLink) -> Result<(), DbError> {
		insert_link(&self.pool, link).await.map_err(|e| {
			if is_unique_violation(&e) {
				DbError::Conflict(format!(
					"{} identity is already linked to an account",
					link.provider
				))
			} else {
				DbError::from(e)
			}
		})?;
		tracing::debug!("identity link created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(account_id = %account_id))]
	pub async fn list_links_for_account(
		&self,
		account_id: &AccountId,
	) -> Result<Vec<IdentityLink>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, account_id, provider, provider_user_id, display_name, profile_url,
			       image_url, access_token, refresh_token, secret, expires_at, created_at
			FROM identity_links
			WHERE account_id = ?
			ORDER BY created_at
			"#,
		)
		.bind(account_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_link).collect()
	}
}

async fn insert_link<'e, E>(executor: E, link: &IdentityLink) -> Result<(), sqlx::Error>
where
	E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
	let creds = &link.credentials;
	sqlx::query(
		r#"
		INSERT INTO identity_links (id, account_id, provider, provider_user_id, display_name,
		                            profile_url, image_url, access_token, refresh_token, secret,
		                            expires_at, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(link.id.to_string())
	.bind(link.account_id.to_string())
	.bind(link.provider.as_str())
	.bind(&link.provider_user_id)
	.bind(&link.display_name)
	.bind(&link.profile_url)
	.bind(&link.image_url)
	.bind(creds.access_token.expose())
	.bind(creds.refresh_token.as_ref().map(|t| t.expose().clone()))
	.bind(creds.secret.as_ref().map(|s| s.expose().clone()))
	.bind(creds.expires_at.map(|t| t.to_rfc3339()))
	.bind(link.created_at.to_rfc3339())
	.execute(executor)
	.await?;
	Ok(())
}

#[async_trait]
impl AccountStore for AccountRepository {
	async fn is_username_available(&self, username: &str) -> Result<bool, DbError> {
		self.is_username_available(username).await
	}

	async fn get_account_by_id(&self, id: &AccountId) -> Result<Option<LocalAccount>, DbError> {
		self.get_account_by_id(id).await
	}

	async fn get_account_by_username(
		&self,
		username: &str,
	) -> Result<Option<LocalAccount>, DbError> {
		self.get_account_by_username(username).await
	}

	async fn create_account(
		&self,
		account: &LocalAccount,
		link: Option<&IdentityLink>,
	) -> Result<(), CreateAccountError> {
		self.create_account(account, link).await
	}

	async fn get_link_by_provider(
		&self,
		provider: &Provider,
		provider_user_id: &str,
	) -> Result<Option<IdentityLink>, DbError> {
		self.get_link_by_provider(provider, provider_user_id).await
	}

	async fn create_link(&self, link: &IdentityLink) -> Result<(), DbError> {
		self.create_link(link).await
	}

	async fn list_links_for_account(
		&self,
		account_id: &AccountId,
	) -> Result<Vec<IdentityLink>, DbError> {
		self.list_links_for_account(account_id).await
	}
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, DbError> {
	Ok(
		DateTime::parse_from_rfc3339(value)
			.map_err(|e| DbError::Internal(format!("Invalid {field}: {e}")))?
			.with_timezone(&Utc),
	)
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(value).map_err(|e| DbError::Internal(format!("Invalid {field}: {e}")))
}

fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<LocalAccount, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(LocalAccount {
		id: AccountId::new(parse_uuid(&id, "account id")?),
		username: row.get("username"),
		display_name: row.get("display_name"),
		password_hash: row.get("password_hash"),
		image_url: row.get("image_url"),
		profile_url: row.get("profile_url"),
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

fn row_to_link(row: &sqlx::sqlite::SqliteRow) -> Result<IdentityLink, DbError> {
	let id: String = row.get("id");
	let account_id: String = row.get("account_id");
	let provider: String = row.get("provider");
	let access_token: String = row.get("access_token");
	let refresh_token: Option<String> = row.get("refresh_token");
	let secret: Option<String> = row.get("secret");
	let expires_at: Option<String> = row.get("expires_at");
	let created_at: String = row.get("created_at");

	let provider =
		Provider::new(&provider).map_err(|e| DbError::Internal(format!("Invalid provider: {e}")))?;

	let credentials = ProviderCredentials {
		access_token: SecretString::new(access_token),
		refresh_token: refresh_token.map(SecretString::new),
		secret: secret.map(SecretString::new),
		expires_at: expires_at
			.as_deref()
			.map(|t| parse_timestamp(t, "expires_at"))
			.transpose()?,
	};

	Ok(IdentityLink {
		id: IdentityLinkId::new(parse_uuid(&id, "link id")?),
		account_id: AccountId::new(parse_uuid(&account_id, "account_id")?),
		provider,
		provider_user_id: row.get("provider_user_id"),
		display_name: row.get("display_name"),
		profile_url: row.get("profile_url"),
		image_url: row.get("image_url"),
		credentials,
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}
