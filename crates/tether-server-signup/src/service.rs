// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use std::sync::Arc;
use tether_auth::{hash_password, LocalAccount, PendingIdentity};
use tether_server_db::AccountStore;

use crate::availability::UsernameAvailability;
use crate::error::{CommitError, Result};
use crate::profile::{ProfileDraft, SignUpProfile};

/// Account-creation capability used by the orchestrator.
#[async_trait]
pub trait SignUpService<P: SignUpProfile>: Send + Sync {
	async fn is_username_available(&self, username: &str) -> Result<bool>;

	/// Persist the account and, when `identity` is given, its link in one
	/// atomic step.
	async fn sign_up(
		&self,
		profile: &P,
		identity: Option<&PendingIdentity>,
	) -> std::result::Result<LocalAccount, CommitError>;
}

/// [`SignUpService`] over the account store, for [`ProfileDraft`] forms.
#[derive(Clone)]
pub struct AccountSignUpService {
	accounts: Arc<dyn AccountStore>,
	availability: UsernameAvailability,
}

impl AccountSignUpService {
	pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
		let availability = UsernameAvailability::new(accounts.clone());
		Self {
			accounts,
			availability,
		}
	}

	fn build_account(&self, profile: &ProfileDraft, username: &str) -> Result<LocalAccount> {
		let mut account = LocalAccount::new(username);
		account.display_name = profile.display_name.clone();
		account.image_url = profile.image_url.clone();
		account.profile_url = profile.profile_url.clone();
		if let Some(password) = profile.password.as_deref() {
			account.password_hash = Some(hash_password(password)?);
		}
		Ok(account)
	}
}

#[async_trait]
impl SignUpService<ProfileDraft> for AccountSignUpService {
	async fn is_username_available(&self, username: &str) -> Result<bool> {
		Ok(self.availability.is_available(username).await?)
	}

	#[tracing::instrument(skip(self, profile, identity), fields(username = ?profile.username(), with_identity = identity.is_some()))]
	async fn sign_up(
		&self,
		profile: &ProfileDraft,
		identity: Option<&PendingIdentity>,
	) -> std::result::Result<LocalAccount, CommitError> {
		let username = profile.username().unwrap_or_default();
		let account = self.build_account(profile, username)?;
		let link = identity.map(|identity| identity.to_link(account.id));

		self
			.accounts
			.create_account(&account, link.as_ref())
			.await?;

		Ok(account)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{account_store, github_identity};
	use tether_auth::verify_password;

	fn draft(username: &str) -> ProfileDraft {
		ProfileDraft {
			user_name: Some(username.to_string()),
			display_name: Some("Display".to_string()),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn sign_up_without_identity_creates_bare_account() {
		let accounts = account_store().await;
		let service = AccountSignUpService::new(accounts.clone());

		let account = service.sign_up(&draft("plain"), None).await.unwrap();

		let stored = accounts.get_account_by_username("plain").await.unwrap().unwrap();
		assert_eq!(stored.id, account.id);
		assert_eq!(stored.display_name.as_deref(), Some("Display"));
		assert!(stored.password_hash.is_none());
		assert!(accounts
			.list_links_for_account(&account.id)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn sign_up_with_identity_links_it() {
		let accounts = account_store().await;
		let service = AccountSignUpService::new(accounts.clone());
		let identity = github_identity("99", None);

		let account = service
			.sign_up(&draft("linked"), Some(&identity))
			.await
			.unwrap();

		let link = accounts
			.get_link_by_provider(&identity.provider, "99")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(link.account_id, account.id);
	}

	#[tokio::test]
	async fn password_is_stored_hashed() {
		let accounts = account_store().await;
		let service = AccountSignUpService::new(accounts.clone());
		let mut profile = draft("withpass");
		profile.password = Some("correct horse".to_string());

		service.sign_up(&profile, None).await.unwrap();

		let stored = accounts
			.get_account_by_username("withpass")
			.await
			.unwrap()
			.unwrap();
		let hash = stored.password_hash.unwrap();
		assert_ne!(hash, "correct horse");
		assert!(verify_password("correct horse", &hash));
	}

	#[tokio::test]
	async fn duplicate_username_maps_to_commit_conflict() {
		let accounts = account_store().await;
		let service = AccountSignUpService::new(accounts);
		service.sign_up(&draft("dupe"), None).await.unwrap();

		let err = service.sign_up(&draft("dupe"), None).await.unwrap_err();
		assert!(matches!(err, CommitError::UsernameTaken(_)));
	}
}
