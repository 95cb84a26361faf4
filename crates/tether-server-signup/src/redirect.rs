// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-sign-up redirect decisions.
//!
//! Two strategies exist: a static post-authentication URL, or deep-link
//! restoration from a saved request. Restoration only replays GET requests;
//! anything else falls back to the site root.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

pub const SITE_ROOT: &str = "/";

/// A request that was denied before the user authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRequest {
	pub url: String,
	pub method: String,
}

impl SavedRequest {
	pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			method: method.into(),
		}
	}

	pub fn is_get(&self) -> bool {
		self.method.eq_ignore_ascii_case("GET")
	}
}

/// Saved-request lookup, keyed by the pre-authentication session id.
#[async_trait]
pub trait RequestCache: Send + Sync {
	async fn save(&self, session_id: &str, request: SavedRequest);

	/// Read the saved request and invalidate it.
	async fn take(&self, session_id: &str) -> Option<SavedRequest>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRequestCache {
	requests: Arc<RwLock<HashMap<String, SavedRequest>>>,
}

impl InMemoryRequestCache {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RequestCache for InMemoryRequestCache {
	async fn save(&self, session_id: &str, request: SavedRequest) {
		self
			.requests
			.write()
			.await
			.insert(session_id.to_string(), request);
	}

	async fn take(&self, session_id: &str) -> Option<SavedRequest> {
		self.requests.write().await.remove(session_id)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectStrategy {
	/// Always send the user to a fixed URL.
	Static { authentication_url: String },
	/// Restore the saved request when it was a GET.
	DeepLink,
}

impl RedirectStrategy {
	pub fn from_flag(use_deep_link: bool, authentication_url: impl Into<String>) -> Self {
		if use_deep_link {
			RedirectStrategy::DeepLink
		} else {
			RedirectStrategy::Static {
				authentication_url: authentication_url.into(),
			}
		}
	}
}

#[derive(Clone)]
pub struct RedirectResolver {
	cache: Arc<dyn RequestCache>,
	strategy: RedirectStrategy,
}

impl RedirectResolver {
	pub fn new(cache: Arc<dyn RequestCache>, strategy: RedirectStrategy) -> Self {
		Self { cache, strategy }
	}

	/// Swap the saved-request cache.
	pub fn with_request_cache(mut self, cache: Arc<dyn RequestCache>) -> Self {
		self.cache = cache;
		self
	}

	pub fn strategy(&self) -> &RedirectStrategy {
		&self.strategy
	}

	pub fn request_cache(&self) -> &Arc<dyn RequestCache> {
		&self.cache
	}

	/// Pick the destination for a freshly signed-in session.
	///
	/// In deep-link mode the saved request is consumed whatever the outcome.
	#[instrument(skip(self, session_id))]
	pub async fn resolve(&self, session_id: &str) -> String {
		match &self.strategy {
			RedirectStrategy::Static { authentication_url } => authentication_url.clone(),
			RedirectStrategy::DeepLink => match self.cache.take(session_id).await {
				Some(saved) if saved.is_get() && !saved.url.is_empty() => saved.url,
				Some(saved) => {
					tracing::debug!(method = %saved.method, "Not restoring non-GET saved request");
					SITE_ROOT.to_string()
				}
				None => SITE_ROOT.to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn resolver_with(saved: Option<SavedRequest>, strategy: RedirectStrategy) -> RedirectResolver {
		let cache = Arc::new(InMemoryRequestCache::new());
		if let Some(saved) = saved {
			cache.save("s1", saved).await;
		}
		RedirectResolver::new(cache, strategy)
	}

	#[tokio::test]
	async fn deep_link_restores_saved_get() {
		let resolver = resolver_with(
			Some(SavedRequest::new("/protected", "GET")),
			RedirectStrategy::DeepLink,
		)
		.await;
		assert_eq!(resolver.resolve("s1").await, "/protected");
	}

	#[tokio::test]
	async fn deep_link_method_match_is_case_insensitive() {
		let resolver = resolver_with(
			Some(SavedRequest::new("/protected", "get")),
			RedirectStrategy::DeepLink,
		)
		.await;
		assert_eq!(resolver.resolve("s1").await, "/protected");
	}

	#[tokio::test]
	async fn deep_link_refuses_saved_post() {
		let resolver = resolver_with(
			Some(SavedRequest::new("/protected", "POST")),
			RedirectStrategy::DeepLink,
		)
		.await;
		assert_eq!(resolver.resolve("s1").await, "/");
	}

	#[tokio::test]
	async fn deep_link_without_saved_request_goes_to_root() {
		let resolver = resolver_with(None, RedirectStrategy::DeepLink).await;
		assert_eq!(resolver.resolve("s1").await, "/");
	}

	#[tokio::test]
	async fn deep_link_consumes_saved_request() {
		let resolver = resolver_with(
			Some(SavedRequest::new("/protected", "GET")),
			RedirectStrategy::DeepLink,
		)
		.await;
		assert_eq!(resolver.resolve("s1").await, "/protected");
		assert_eq!(resolver.resolve("s1").await, "/");
	}

	#[tokio::test]
	async fn static_mode_ignores_saved_request() {
		let resolver = resolver_with(
			Some(SavedRequest::new("/protected", "GET")),
			RedirectStrategy::from_flag(false, "/auth"),
		)
		.await;
		assert_eq!(resolver.resolve("s1").await, "/auth");
		assert!(resolver.request_cache().take("s1").await.is_some());
	}

	#[tokio::test]
	async fn replacement_cache_is_consulted() {
		let replacement = Arc::new(InMemoryRequestCache::new());
		replacement
			.save("s1", SavedRequest::new("/elsewhere", "GET"))
			.await;

		let resolver = resolver_with(None, RedirectStrategy::DeepLink)
			.await
			.with_request_cache(replacement);
		assert_eq!(resolver.resolve("s1").await, "/elsewhere");
	}

	#[test]
	fn from_flag_selects_strategy() {
		assert_eq!(RedirectStrategy::from_flag(true, "/auth"), RedirectStrategy::DeepLink);
		assert_eq!(
			RedirectStrategy::from_flag(false, "/auth"),
			RedirectStrategy::Static {
				authentication_url: "/auth".to_string()
			}
		);
	}
}
