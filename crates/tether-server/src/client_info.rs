// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client information extraction for session metadata.

use axum::http::HeaderMap;
use tether_server_session::ClientInfo;

/// Extract client info from request headers.
#[tracing::instrument(level = "debug", skip(headers))]
pub fn client_info_from_headers(headers: &HeaderMap) -> ClientInfo {
	let ip_address = extract_client_ip(headers);
	let user_agent = headers
		.get("user-agent")
		.and_then(|v| v.to_str().ok())
		.map(|s| s.to_string());

	ClientInfo {
		ip_address,
		user_agent,
	}
}

/// Extract client IP from request headers.
///
/// Checks headers in order of preference:
/// 1. `X-Forwarded-For` (first IP in chain, for reverse proxies)
/// 2. `X-Real-IP` (nginx style)
/// 3. `CF-Connecting-IP` (Cloudflare)
fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
	if let Some(first) = header_str(headers, "x-forwarded-for").and_then(|v| v.split(',').next()) {
		let ip = first.trim();
		if !ip.is_empty() {
			return Some(ip.to_string());
		}
	}

	["x-real-ip", "cf-connecting-ip"]
		.iter()
		.filter_map(|name| header_str(headers, name))
		.map(str::trim)
		.find(|ip| !ip.is_empty())
		.map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	#[test]
	fn forwarded_for_takes_first_hop() {
		let mut headers = HeaderMap::new();
		headers.insert(
			"x-forwarded-for",
			HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
		);
		headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
		headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

		let info = client_info_from_headers(&headers);
		assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
		assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
	}

	#[test]
	fn falls_back_to_real_ip_then_cloudflare() {
		let mut headers = HeaderMap::new();
		headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.3"));
		assert_eq!(
			client_info_from_headers(&headers).ip_address.as_deref(),
			Some("198.51.100.3")
		);

		headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
		assert_eq!(
			client_info_from_headers(&headers).ip_address.as_deref(),
			Some("198.51.100.9")
		);
	}

	#[test]
	fn empty_headers_yield_nothing() {
		assert_eq!(client_info_from_headers(&HeaderMap::new()), ClientInfo::default());
	}
}
