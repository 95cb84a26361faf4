// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Establishes the authenticated session once a sign-up has committed.

use std::sync::Arc;
use tether_auth::{LocalAccount, PendingIdentity, Session};
use tether_server_db::{AccountStore, DbError};
use tether_server_session::{ClientInfo, SessionRequest, SessionService};

use crate::error::Result;

/// Request-scoped data needed to finish sign-in.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	/// Pre-authentication session id (keys pending identities and saved
	/// requests).
	pub session_id: String,
	pub client_info: ClientInfo,
}

impl RequestContext {
	pub fn new(session_id: impl Into<String>, client_info: ClientInfo) -> Self {
		Self {
			session_id: session_id.into(),
			client_info,
		}
	}
}

pub struct AuthenticatedSession {
	pub account: LocalAccount,
	pub session: Session,
	pub cookie_header: String,
}

pub struct SessionCompletionService {
	accounts: Arc<dyn AccountStore>,
	sessions: Arc<SessionService>,
}

impl SessionCompletionService {
	pub fn new(accounts: Arc<dyn AccountStore>, sessions: Arc<SessionService>) -> Self {
		Self { accounts, sessions }
	}

	/// Sign `username` in.
	///
	/// Must only be called after a committed sign-up. When `identity` is given
	/// and no link exists yet it is linked here; without an identity no link is
	/// created.
	#[tracing::instrument(skip(self, identity, ctx), fields(with_identity = identity.is_some()))]
	pub async fn complete_sign_in(
		&self,
		username: &str,
		identity: Option<&PendingIdentity>,
		ctx: &RequestContext,
	) -> Result<AuthenticatedSession> {
		let account = self
			.accounts
			.get_account_by_username(username)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("account '{username}'")))?;

		if let Some(identity) = identity {
			self.ensure_link(&account, identity).await?;
		}

		let response = self
			.sessions
			.create_session(SessionRequest::new(account.id, ctx.client_info.clone()))
			.await?;

		Ok(AuthenticatedSession {
			account,
			session: response.session,
			cookie_header: response.cookie_header,
		})
	}

	async fn ensure_link(&self, account: &LocalAccount, identity: &PendingIdentity) -> Result<()> {
		let existing = self
			.accounts
			.get_link_by_provider(&identity.provider, &identity.provider_user_id)
			.await?;

		match existing {
			Some(link) if link.account_id == account.id => {}
			Some(link) => {
				tracing::warn!(
					provider = %identity.provider,
					linked_account_id = %link.account_id,
					"Identity already linked to a different account, not relinking"
				);
			}
			None => match self.accounts.create_link(&identity.to_link(account.id)).await {
				Ok(()) => tracing::info!(provider = %identity.provider, "Linked identity at sign-in"),
				Err(DbError::Conflict(_)) => {
					tracing::warn!(provider = %identity.provider, "Identity linked concurrently");
				}
				Err(e) => return Err(e.into()),
			},
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{github_identity, stores};
	use crate::SignUpError;
	use tether_server_db::SessionRepository;

	async fn setup() -> (Arc<dyn AccountStore>, Arc<SessionRepository>, SessionCompletionService) {
		let (accounts, sessions) = stores().await;
		let service = SessionCompletionService::new(
			accounts.clone(),
			Arc::new(SessionService::new(sessions.clone(), "tether_session")),
		);
		(accounts, sessions, service)
	}

	fn ctx() -> RequestContext {
		RequestContext::new(
			"presession-1",
			ClientInfo {
				ip_address: Some("192.0.2.1".to_string()),
				user_agent: Some("test-agent".to_string()),
			},
		)
	}

	#[tokio::test]
	async fn creates_session_for_committed_account() {
		let (accounts, sessions, service) = setup().await;
		let account = LocalAccount::new("alice");
		accounts.create_account(&account, None).await.unwrap();

		let authed = service.complete_sign_in("alice", None, &ctx()).await.unwrap();

		assert_eq!(authed.account.id, account.id);
		assert_eq!(authed.session.account_id, account.id);
		assert_eq!(authed.session.ip_address.as_deref(), Some("192.0.2.1"));
		assert!(authed.cookie_header.starts_with("tether_session="));

		let token = authed
			.cookie_header
			.trim_start_matches("tether_session=")
			.split(';')
			.next()
			.unwrap();
		let stored = sessions
			.get_session_by_token_hash(&tether_auth::hash_token(token))
			.await
			.unwrap();
		assert!(stored.is_some());
	}

	#[tokio::test]
	async fn without_identity_no_link_is_fabricated() {
		let (accounts, _, service) = setup().await;
		let account = LocalAccount::new("bare");
		accounts.create_account(&account, None).await.unwrap();

		service.complete_sign_in("bare", None, &ctx()).await.unwrap();

		assert!(accounts
			.list_links_for_account(&account.id)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn links_identity_when_missing() {
		let (accounts, _, service) = setup().await;
		let account = LocalAccount::new("late");
		accounts.create_account(&account, None).await.unwrap();
		let identity = github_identity("77", None);

		service
			.complete_sign_in("late", Some(&identity), &ctx())
			.await
			.unwrap();

		let links = accounts.list_links_for_account(&account.id).await.unwrap();
		assert_eq!(links.len(), 1);
		assert_eq!(links[0].provider_user_id, "77");
	}

	#[tokio::test]
	async fn existing_link_is_left_alone() {
		let (accounts, _, service) = setup().await;
		let account = LocalAccount::new("linked");
		let identity = github_identity("88", None);
		accounts
			.create_account(&account, Some(&identity.to_link(account.id)))
			.await
			.unwrap();

		service
			.complete_sign_in("linked", Some(&identity), &ctx())
			.await
			.unwrap();

		assert_eq!(
			accounts.list_links_for_account(&account.id).await.unwrap().len(),
			1
		);
	}

	#[tokio::test]
	async fn identity_owned_by_other_account_is_not_moved() {
		let (accounts, _, service) = setup().await;
		let owner = LocalAccount::new("owner");
		let identity = github_identity("55", None);
		accounts
			.create_account(&owner, Some(&identity.to_link(owner.id)))
			.await
			.unwrap();
		let other = LocalAccount::new("other");
		accounts.create_account(&other, None).await.unwrap();

		service
			.complete_sign_in("other", Some(&identity), &ctx())
			.await
			.unwrap();

		let link = accounts
			.get_link_by_provider(&identity.provider, "55")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(link.account_id, owner.id);
	}

	#[tokio::test]
	async fn unknown_username_is_an_error() {
		let (_, _, service) = setup().await;
		let result = service.complete_sign_in("ghost", None, &ctx()).await;
		assert!(matches!(result, Err(SignUpError::Db(DbError::NotFound(_)))));
	}
}
