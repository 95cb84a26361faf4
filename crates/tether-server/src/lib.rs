// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for Tether identity-linking sign-up.
//!
//! Routes:
//! - `GET /signup` renders the (possibly pre-filled) sign-up form as JSON
//! - `POST /signup` validates and commits a submitted form
//! - `POST /signup/implicit` attempts a form-less sign-up
//! - `GET /health`
//!
//! The federated handshake is not served here. Whatever completes it parks
//! the resulting identity in [`AppState::pending_identities`] under the
//! caller's pre-authentication session id.

pub mod cleanup;
pub mod client_info;
pub mod error;
pub mod presession;
pub mod routes;

pub use error::{ErrorResponse, ServerError};

use axum::{
	routing::{get, post},
	Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tether_server_config::{ServerConfig, SignUpConfig};
use tether_server_db::{AccountRepository, AccountStore, SessionRepository};
use tether_server_session::SessionService;
use tether_server_signup::{
	AccountSignUpService, DefaultProfileFactory, ImplicitSignUp, InMemoryRequestCache,
	PendingIdentityStore, RedirectResolver, RedirectStrategy, RequestCache,
	SessionCompletionService, SignUpOrchestrator, UsernameRulesCustomizer,
};

pub type Orchestrator =
	SignUpOrchestrator<DefaultProfileFactory, AccountSignUpService, UsernameRulesCustomizer>;

pub type Implicit = ImplicitSignUp<DefaultProfileFactory, AccountSignUpService>;

#[derive(Clone)]
pub struct AppState {
	pub signup_config: SignUpConfig,
	pub orchestrator: Arc<Orchestrator>,
	pub implicit: Arc<Implicit>,
	pub completion: Arc<SessionCompletionService>,
	pub redirect: Arc<RedirectResolver>,
	pub pending_identities: PendingIdentityStore,
	pub request_cache: Arc<dyn RequestCache>,
	pub session_repo: Arc<SessionRepository>,
}

/// Wire repositories and sign-up services over a migrated pool.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let signup_config = config.signup.clone();

	let accounts: Arc<dyn AccountStore> = Arc::new(AccountRepository::new(pool.clone()));
	let session_repo = Arc::new(SessionRepository::new(pool));
	let sessions = Arc::new(SessionService::new(
		session_repo.clone(),
		signup_config.session_cookie_name.clone(),
	));

	let service = AccountSignUpService::new(accounts.clone());
	let orchestrator = SignUpOrchestrator::with_customizer(
		DefaultProfileFactory,
		service.clone(),
		UsernameRulesCustomizer,
	);
	let implicit = ImplicitSignUp::new(DefaultProfileFactory, service);

	let request_cache: Arc<dyn RequestCache> = Arc::new(InMemoryRequestCache::new());
	let redirect = RedirectResolver::new(
		request_cache.clone(),
		RedirectStrategy::from_flag(
			signup_config.use_social_authentication_filter,
			signup_config.authentication_url.clone(),
		),
	);

	let pending_identities =
		PendingIdentityStore::new(Duration::from_secs(signup_config.pending_identity_ttl_secs));

	AppState {
		orchestrator: Arc::new(orchestrator),
		implicit: Arc::new(implicit),
		completion: Arc::new(SessionCompletionService::new(accounts, sessions)),
		redirect: Arc::new(redirect),
		pending_identities,
		request_cache,
		session_repo,
		signup_config,
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route(
			routes::signup::SIGNUP_PATH,
			get(routes::signup::show_form).post(routes::signup::submit_form),
		)
		.route("/signup/implicit", post(routes::signup::implicit_sign_up))
		.route("/health", get(routes::health::health))
		.with_state(state)
}
