// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pre-authentication session cookie.
//!
//! Before sign-in the browser carries only an opaque random id. Pending
//! identities and saved requests are keyed by it.

use axum::http::{header, HeaderMap};

/// Read the pre-authentication session id from the `Cookie` header.
pub fn presession_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, value)| *name == cookie_name && !value.is_empty())
		.map(|(_, value)| value.to_string())
}

/// A freshly issued pre-authentication session.
pub struct IssuedPresession {
	pub id: String,
	pub cookie_header: String,
}

/// Mint a new pre-authentication session id and its `Set-Cookie` value.
///
/// The cookie has no `Max-Age`, so it ends with the browser session.
pub fn issue_presession(cookie_name: &str) -> IssuedPresession {
	let id = uuid::Uuid::new_v4().simple().to_string();
	let cookie_header = format!("{cookie_name}={id}; Path=/; HttpOnly; Secure; SameSite=Lax");
	IssuedPresession { id, cookie_header }
}
