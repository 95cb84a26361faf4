// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up HTTP handlers.
//!
//! The form is exchanged as JSON (`GET`) and urlencoded fields (`POST`).
//! Validation failures re-render with `200` and field errors; success signs
//! the new account in and answers `303 See Other`.

use axum::{
	extract::State,
	http::{header, HeaderMap, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	Form, Json,
};
use serde::Serialize;
use tether_auth::PendingIdentity;
use tether_server_signup::{
	PresessionHandle, ProfileDraft, RequestContext, SignUpOutcome, SignUpSession, ValidationErrors,
};

use crate::client_info::client_info_from_headers;
use crate::error::ServerError;
use crate::presession::{issue_presession, presession_id};
use crate::AppState;

pub const SIGNUP_PATH: &str = "/signup";

/// Body of a rendered sign-up form.
#[derive(Debug, Serialize)]
pub struct SignUpFormResponse {
	pub view: String,
	pub form: ProfileDraft,
	pub errors: ValidationErrors,
	/// Provider of the pending identity, if one is waiting to be linked.
	pub provider: Option<String>,
}

struct Presession {
	handle: PresessionHandle,
	issued_cookie: Option<String>,
}

fn resolve_presession(state: &AppState, headers: &HeaderMap) -> Presession {
	let cookie_name = &state.signup_config.presession_cookie_name;
	let (id, issued_cookie) = match presession_id(headers, cookie_name) {
		Some(id) => (id, None),
		None => {
			let issued = issue_presession(cookie_name);
			(issued.id, Some(issued.cookie_header))
		}
	};
	Presession {
		handle: PresessionHandle::new(state.pending_identities.clone(), id),
		issued_cookie,
	}
}

fn with_cookie(mut response: Response, cookie: Option<&str>) -> Result<Response, ServerError> {
	if let Some(cookie) = cookie {
		let value = HeaderValue::from_str(cookie)
			.map_err(|e| ServerError::Internal(format!("invalid cookie header: {e}")))?;
		response.headers_mut().append(header::SET_COOKIE, value);
	}
	Ok(response)
}

fn see_other(location: &str, cookie: Option<&str>) -> Result<Response, ServerError> {
	let location = HeaderValue::from_str(location)
		.map_err(|e| ServerError::Internal(format!("invalid redirect target: {e}")))?;
	let response = (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response();
	with_cookie(response, cookie)
}

async fn form_response(
	state: &AppState,
	session: &dyn SignUpSession,
	form: ProfileDraft,
	errors: ValidationErrors,
) -> SignUpFormResponse {
	let provider = session
		.pending_identity()
		.await
		.map(|identity| identity.provider.to_string());
	SignUpFormResponse {
		view: state.signup_config.sign_up_view.clone(),
		form,
		errors,
		provider,
	}
}

/// Sign the committed account in and redirect.
async fn complete(
	state: &AppState,
	headers: &HeaderMap,
	session_id: &str,
	username: &str,
	identity: Option<&PendingIdentity>,
	presession_cookie: Option<&str>,
) -> Result<Response, ServerError> {
	let ctx = RequestContext::new(session_id, client_info_from_headers(headers));
	let authenticated = state
		.completion
		.complete_sign_in(username, identity, &ctx)
		.await?;
	let target = state.redirect.resolve(session_id).await;

	tracing::info!(
		account_id = %authenticated.account.id,
		session_id = %authenticated.session.id,
		"Sign-up complete, redirecting"
	);

	let response = see_other(&target, Some(&authenticated.cookie_header))?;
	with_cookie(response, presession_cookie)
}

#[tracing::instrument(skip(state, headers))]
pub async fn show_form(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ServerError> {
	let presession = resolve_presession(&state, &headers);
	let form = state.orchestrator.render_form(&presession.handle).await?;
	let body = form_response(&state, &presession.handle, form, ValidationErrors::new()).await;

	with_cookie(Json(body).into_response(), presession.issued_cookie.as_deref())
}

#[tracing::instrument(skip(state, headers, draft))]
pub async fn submit_form(
	State(state): State<AppState>,
	headers: HeaderMap,
	Form(draft): Form<ProfileDraft>,
) -> Result<Response, ServerError> {
	let presession = resolve_presession(&state, &headers);
	let draft = draft.normalized();

	match state.orchestrator.submit(&presession.handle, &draft).await? {
		SignUpOutcome::ValidationFailed(errors) => {
			let body = form_response(&state, &presession.handle, draft, errors).await;
			with_cookie(Json(body).into_response(), presession.issued_cookie.as_deref())
		}
		SignUpOutcome::Success { username, identity } => {
			complete(
				&state,
				&headers,
				presession.handle.session_id(),
				&username,
				identity.as_ref(),
				presession.issued_cookie.as_deref(),
			)
			.await
		}
	}
}

#[tracing::instrument(skip(state, headers))]
pub async fn implicit_sign_up(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ServerError> {
	let presession = resolve_presession(&state, &headers);
	let issued = presession.issued_cookie.as_deref();

	if !state.signup_config.implicit_sign_up {
		tracing::debug!("Implicit sign-up disabled");
		return see_other(SIGNUP_PATH, issued);
	}

	match state.implicit.execute_for_session(&presession.handle).await? {
		Some((username, identity)) => {
			complete(
				&state,
				&headers,
				presession.handle.session_id(),
				&username,
				Some(&identity),
				issued,
			)
			.await
		}
		None => see_other(SIGNUP_PATH, issued),
	}
}
