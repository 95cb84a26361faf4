// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session-scoped storage for pending external identities.
//!
//! A [`PendingIdentity`] is parked here by the federated handshake, keyed by
//! the pre-authentication session id, and consumed at most once by a
//! successful sign-up.
//!
//! # Consume-once
//!
//! [`PendingIdentityStore::take`] removes the entry under the write lock, so
//! when two requests from the same session race, exactly one receives the
//! identity. The loser sees `None`.
//!
//! # Cleanup
//!
//! Entries expire after the configured TTL. Call
//! [`PendingIdentityStore::cleanup_expired`] periodically to drop abandoned
//! handshakes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tether_auth::PendingIdentity;
use tokio::sync::RwLock;
use tracing::instrument;

/// Default lifetime of a pending identity (10 minutes).
pub const DEFAULT_PENDING_IDENTITY_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct PendingEntry {
	identity: PendingIdentity,
	stored_at: Instant,
}

/// An identity removed by [`PendingIdentityStore::take`].
///
/// Carries the original parking time so that a restored identity keeps its
/// expiry instead of starting a fresh TTL.
#[derive(Debug, Clone)]
pub struct TakenIdentity {
	identity: PendingIdentity,
	stored_at: Instant,
}

impl TakenIdentity {
	pub fn identity(&self) -> &PendingIdentity {
		&self.identity
	}

	pub fn into_identity(self) -> PendingIdentity {
		self.identity
	}
}

#[derive(Debug, Clone)]
pub struct PendingIdentityStore {
	entries: Arc<RwLock<HashMap<String, PendingEntry>>>,
	ttl: Duration,
}

impl Default for PendingIdentityStore {
	fn default() -> Self {
		Self::new(DEFAULT_PENDING_IDENTITY_TTL)
	}
}

impl PendingIdentityStore {
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: Arc::new(RwLock::new(HashMap::new())),
			ttl,
		}
	}

	/// Park an identity for a session, replacing any earlier one.
	#[instrument(skip(self, session_id, identity), fields(provider = %identity.provider))]
	pub async fn store(&self, session_id: &str, identity: PendingIdentity) {
		let mut entries = self.entries.write().await;
		entries.insert(
			session_id.to_string(),
			PendingEntry {
				identity,
				stored_at: Instant::now(),
			},
		);
		tracing::debug!(total = entries.len(), "Stored pending identity");
	}

	/// Read the identity without consuming it.
	pub async fn peek(&self, session_id: &str) -> Option<PendingIdentity> {
		let entries = self.entries.read().await;
		entries
			.get(session_id)
			.filter(|e| e.stored_at.elapsed() < self.ttl)
			.map(|e| e.identity.clone())
	}

	/// Remove and return the identity. At most one caller gets `Some`.
	#[instrument(skip(self, session_id))]
	pub async fn take(&self, session_id: &str) -> Option<TakenIdentity> {
		let mut entries = self.entries.write().await;
		let entry = entries.remove(session_id)?;
		if entry.stored_at.elapsed() >= self.ttl {
			tracing::debug!("Pending identity expired");
			return None;
		}
		Some(TakenIdentity {
			identity: entry.identity,
			stored_at: entry.stored_at,
		})
	}

	/// Put back an identity taken by a submission that did not commit.
	///
	/// The original parking time is kept. An identity parked in the meantime
	/// is left alone.
	#[instrument(skip(self, session_id, taken))]
	pub async fn restore(&self, session_id: &str, taken: TakenIdentity) {
		let mut entries = self.entries.write().await;
		entries
			.entry(session_id.to_string())
			.or_insert(PendingEntry {
				identity: taken.identity,
				stored_at: taken.stored_at,
			});
	}

	#[instrument(skip(self))]
	pub async fn cleanup_expired(&self) -> usize {
		let mut entries = self.entries.write().await;
		let before = entries.len();
		entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
		let removed = before - entries.len();
		if removed > 0 {
			tracing::debug!(
				removed = removed,
				remaining = entries.len(),
				"Cleaned up expired pending identities"
			);
		}
		removed
	}

	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}
}

/// Explicit handle to the caller's session, passed into the orchestrator.
#[async_trait]
pub trait SignUpSession: Send + Sync {
	fn session_id(&self) -> &str;

	async fn pending_identity(&self) -> Option<PendingIdentity>;

	async fn take_pending_identity(&self) -> Option<TakenIdentity>;

	async fn restore_pending_identity(&self, taken: TakenIdentity);
}

/// [`SignUpSession`] backed by a [`PendingIdentityStore`] and a presession id.
#[derive(Debug, Clone)]
pub struct PresessionHandle {
	store: PendingIdentityStore,
	session_id: String,
}

impl PresessionHandle {
	pub fn new(store: PendingIdentityStore, session_id: impl Into<String>) -> Self {
		Self {
			store,
			session_id: session_id.into(),
		}
	}
}

#[async_trait]
impl SignUpSession for PresessionHandle {
	fn session_id(&self) -> &str {
		&self.session_id
	}

	async fn pending_identity(&self) -> Option<PendingIdentity> {
		self.store.peek(&self.session_id).await
	}

	async fn take_pending_identity(&self) -> Option<TakenIdentity> {
		self.store.take(&self.session_id).await
	}

	async fn restore_pending_identity(&self, taken: TakenIdentity) {
		self.store.restore(&self.session_id, taken).await
	}
}
