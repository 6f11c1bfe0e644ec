//! Client address extraction
//!
//! The rate limiter and the audit trail both key on the client address. How
//! it is found depends on whether the server faces clients directly or sits
//! behind a reverse proxy.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::app::ServerMode;

/// Extract client IP from request parts based on ServerMode
///
/// - Standalone mode: Use peer IP directly from ConnectInfo
/// - Proxy mode: Check forwarding headers first, fall back to the peer IP
pub fn extract_client_ip(parts: &Parts, mode: ServerMode) -> Option<IpAddr> {
	let peer = || parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());
	match mode {
		ServerMode::Standalone => peer(),
		ServerMode::Proxy => extract_from_xff(&parts.headers)
			.or_else(|| extract_from_x_real_ip(&parts.headers))
			.or_else(|| extract_from_forwarded(&parts.headers))
			.or_else(peer),
	}
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff(headers: &HeaderMap) -> Option<IpAddr> {
	headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()).and_then(|s| {
		// "client, proxy1, proxy2": the leftmost entry is the original client
		s.split(',').next().map(str::trim).and_then(|ip| ip.parse().ok())
	})
}

/// Extract IP from X-Real-IP header
fn extract_from_x_real_ip(headers: &HeaderMap) -> Option<IpAddr> {
	headers
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from Forwarded header (RFC 7239)
fn extract_from_forwarded(headers: &HeaderMap) -> Option<IpAddr> {
	headers.get("forwarded").and_then(|h| h.to_str().ok()).and_then(|s| {
		// "for=192.0.2.60;proto=http;by=203.0.113.43" or "for=\"[2001:db8::1]\""
		s.split([';', ',']).find_map(|part| {
			let part = part.trim();
			let (key, value) = part.split_once('=')?;
			if !key.eq_ignore_ascii_case("for") {
				return None;
			}
			value.trim_matches('"').trim_start_matches('[').trim_end_matches(']').parse().ok()
		})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::Request;
	use std::net::{Ipv4Addr, Ipv6Addr};

	fn parts_with(headers: &[(&str, &str)], peer: Option<SocketAddr>) -> Parts {
		let mut builder = Request::builder().uri("/");
		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}
		let (mut parts, ()) = builder.body(()).unwrap().into_parts();
		if let Some(peer) = peer {
			parts.extensions.insert(ConnectInfo(peer));
		}
		parts
	}

	#[test]
	fn test_standalone_ignores_forwarding_headers() {
		let peer: SocketAddr = "10.0.0.7:5000".parse().unwrap();
		let parts = parts_with(&[("x-forwarded-for", "203.0.113.9")], Some(peer));

		assert_eq!(
			extract_client_ip(&parts, ServerMode::Standalone),
			Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
		);
	}

	#[test]
	fn test_proxy_takes_leftmost_xff() {
		let parts = parts_with(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1, 10.0.0.2")], None);

		assert_eq!(
			extract_client_ip(&parts, ServerMode::Proxy),
			Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)))
		);
	}

	#[test]
	fn test_proxy_header_fallbacks() {
		let parts = parts_with(&[("x-real-ip", " 198.51.100.4 ")], None);
		assert_eq!(
			extract_client_ip(&parts, ServerMode::Proxy),
			Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4)))
		);

		let parts = parts_with(&[("forwarded", "proto=https;For=\"[2001:db8::1]\"")], None);
		assert_eq!(
			extract_client_ip(&parts, ServerMode::Proxy),
			Some(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)))
		);

		let peer: SocketAddr = "127.0.0.1:1234".parse().unwrap();
		let parts = parts_with(&[("x-forwarded-for", "not-an-ip")], Some(peer));
		assert_eq!(
			extract_client_ip(&parts, ServerMode::Proxy),
			Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
		);
	}

	#[test]
	fn test_no_address_available() {
		let parts = parts_with(&[], None);
		assert_eq!(extract_client_ip(&parts, ServerMode::Standalone), None);
		assert_eq!(extract_client_ip(&parts, ServerMode::Proxy), None);
	}
}

// vim: ts=4
