// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use tether_server_db::{AccountStore, DbError};

/// Read-only username availability check against the account store.
///
/// The answer is advisory: a username can be claimed between this check and
/// the commit, so the store's uniqueness constraint stays authoritative.
#[derive(Clone)]
pub struct UsernameAvailability {
	accounts: Arc<dyn AccountStore>,
}

impl UsernameAvailability {
	pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
		Self { accounts }
	}

	/// Blank input is reported unavailable without touching the store.
	#[tracing::instrument(skip(self))]
	pub async fn is_available(&self, username: &str) -> Result<bool, DbError> {
		if username.trim().is_empty() {
			return Ok(false);
		}
		self.accounts.is_username_available(username).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{account_store, CountingAccounts};
	use tether_auth::LocalAccount;

	#[tokio::test]
	async fn reports_taken_and_free_usernames() {
		let accounts = account_store().await;
		accounts
			.create_account(&LocalAccount::new("taken"), None)
			.await
			.unwrap();

		let availability = UsernameAvailability::new(accounts);
		assert!(!availability.is_available("taken").await.unwrap());
		assert!(!availability.is_available("TAKEN").await.unwrap());
		assert!(availability.is_available("free").await.unwrap());
	}

	#[tokio::test]
	async fn blank_input_never_reaches_store() {
		let accounts = Arc::new(CountingAccounts::new(account_store().await));
		let availability = UsernameAvailability::new(accounts.clone());

		for blank in ["", " ", "\t\n"] {
			assert!(!availability.is_available(blank).await.unwrap());
		}
		assert_eq!(accounts.availability_lookups(), 0);
	}
}
