// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for the sign-up tests.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tether_auth::{
	AccountId, IdentityLink, LocalAccount, PendingIdentity, Provider, ProviderCredentials,
};
use tether_server_db::{
	run_migrations, AccountRepository, AccountStore, CreateAccountError, DbError,
	SessionRepository,
};

pub async fn test_pool() -> sqlx::SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn account_store() -> Arc<dyn AccountStore> {
	Arc::new(AccountRepository::new(test_pool().await))
}

pub async fn stores() -> (Arc<dyn AccountStore>, Arc<SessionRepository>) {
	let pool = test_pool().await;
	(
		Arc::new(AccountRepository::new(pool.clone())),
		Arc::new(SessionRepository::new(pool)),
	)
}

pub fn github_identity(user_id: &str, username: Option<&str>) -> PendingIdentity {
	let identity = PendingIdentity::new(
		Provider::new("github").unwrap(),
		user_id,
		ProviderCredentials::new(format!("gho_{user_id}")),
	)
	.with_display_name("GitHub User")
	.with_profile_url(format!("https://github.com/u/{user_id}"));
	match username {
		Some(username) => identity.with_username(username),
		None => identity,
	}
}

/// Account store wrapper that counts calls and can be told to fail.
pub struct CountingAccounts {
	inner: Arc<dyn AccountStore>,
	availability_lookups: AtomicUsize,
	creates: AtomicUsize,
	/// Report every username as free, to open the commit-time race window.
	pub always_available: bool,
	pub fail_creates: bool,
}

impl CountingAccounts {
	pub fn new(inner: Arc<dyn AccountStore>) -> Self {
		Self {
			inner,
			availability_lookups: AtomicUsize::new(0),
			creates: AtomicUsize::new(0),
			always_available: false,
			fail_creates: false,
		}
	}

	pub fn availability_lookups(&self) -> usize {
		self.availability_lookups.load(Ordering::SeqCst)
	}

	pub fn creates(&self) -> usize {
		self.creates.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl AccountStore for CountingAccounts {
	async fn is_username_available(&self, username: &str) -> Result<bool, DbError> {
		self.availability_lookups.fetch_add(1, Ordering::SeqCst);
		if self.always_available {
			return Ok(true);
		}
		self.inner.is_username_available(username).await
	}

	async fn get_account_by_id(&self, id: &AccountId) -> Result<Option<LocalAccount>, DbError> {
		self.inner.get_account_by_id(id).await
	}

	async fn get_account_by_username(
		&self,
		username: &str,
	) -> Result<Option<LocalAccount>, DbError> {
		self.inner.get_account_by_username(username).await
	}

	async fn create_account(
		&self,
		account: &LocalAccount,
		link: Option<&IdentityLink>,
	) -> Result<(), CreateAccountError> {
		self.creates.fetch_add(1, Ordering::SeqCst);
		if self.fail_creates {
			return Err(DbError::Internal("store offline".to_string()).into());
		}
		self.inner.create_account(account, link).await
	}

	async fn get_link_by_provider(
		&self,
		provider: &Provider,
		provider_user_id: &str,
	) -> Result<Option<IdentityLink>, DbError> {
		self.inner.get_link_by_provider(provider, provider_user_id).await
	}

	async fn create_link(&self, link: &IdentityLink) -> Result<(), DbError> {
		self.inner.create_link(link).await
	}

	async fn list_links_for_account(
		&self,
		account_id: &AccountId,
	) -> Result<Vec<IdentityLink>, DbError> {
		self.inner.list_links_for_account(account_id).await
	}
}
