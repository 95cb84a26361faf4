// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Periodic eviction of expired pending identities and sessions.

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::AppState;

pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Run one cleanup pass. Returns `(pending_identities, sessions)` removed.
pub async fn run_cleanup(state: &AppState) -> (usize, u64) {
	let identities = state.pending_identities.cleanup_expired().await;
	let sessions = match state.session_repo.delete_expired_sessions().await {
		Ok(count) => count,
		Err(e) => {
			tracing::warn!(error = %e, "Failed to delete expired sessions");
			0
		}
	};

	if identities > 0 || sessions > 0 {
		tracing::info!(identities, sessions, "Evicted expired sign-up state");
	}
	(identities, sessions)
}

pub fn spawn_cleanup_task(state: AppState, interval: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			run_cleanup(&state).await;
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::create_app_state;
	use chrono::{Duration as ChronoDuration, Utc};
	use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
	use std::str::FromStr;
	use tether_auth::{LocalAccount, PendingIdentity, Provider, ProviderCredentials, Session};
	use tether_server_config::ServerConfig;
	use tether_server_db::{run_migrations, AccountRepository};

	async fn state_with_ttl(ttl_secs: u64) -> (AppState, AccountRepository) {
		let options = SqliteConnectOptions::from_str(":memory:")
			.unwrap()
			.foreign_keys(true);
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect_with(options)
			.await
			.unwrap();
		run_migrations(&pool).await.unwrap();
		let mut config = ServerConfig::default();
		config.signup.pending_identity_ttl_secs = ttl_secs;
		(
			create_app_state(pool.clone(), &config),
			AccountRepository::new(pool),
		)
	}

	fn identity() -> PendingIdentity {
		PendingIdentity::new(
			Provider::new("github").unwrap(),
			"42",
			ProviderCredentials::new("token"),
		)
	}

	#[tokio::test]
	async fn evicts_expired_pending_identities() {
		let (state, _) = state_with_ttl(0).await;
		state.pending_identities.store("p1", identity()).await;
		tokio::time::sleep(Duration::from_millis(5)).await;

		let (identities, sessions) = run_cleanup(&state).await;
		assert_eq!(identities, 1);
		assert_eq!(sessions, 0);
		assert!(state.pending_identities.is_empty().await);
	}

	#[tokio::test]
	async fn fresh_identities_survive() {
		let (state, _) = state_with_ttl(600).await;
		state.pending_identities.store("p1", identity()).await;

		let (identities, _) = run_cleanup(&state).await;
		assert_eq!(identities, 0);
		assert!(state.pending_identities.peek("p1").await.is_some());
	}

	#[tokio::test]
	async fn evicts_expired_sessions_only() {
		let (state, accounts) = state_with_ttl(600).await;
		let account = LocalAccount::new("alice");
		accounts.create_account(&account, None).await.unwrap();

		let live = Session::new(account.id);
		let mut stale = Session::new(account.id);
		stale.expires_at = Utc::now() - ChronoDuration::hours(1);
		state.session_repo.create_session(&live, "live").await.unwrap();
		state.session_repo.create_session(&stale, "stale").await.unwrap();

		let (_, sessions) = run_cleanup(&state).await;
		assert_eq!(sessions, 1);
		assert!(state
			.session_repo
			.get_session_by_token_hash("live")
			.await
			.unwrap()
			.is_some());
	}
}
