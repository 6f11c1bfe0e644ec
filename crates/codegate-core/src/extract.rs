//! Custom extractors for codegate request data

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;

use crate::app::App;
use crate::rate_limit::extract_client_ip;

// ClientIp //
//**********//
/// Client address as used for rate limiting and auditing.
/// `"unknown"` when no address can be determined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub Box<str>);

impl ClientIp {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl FromRequestParts<App> for ClientIp {
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		let ip = extract_client_ip(parts, state.opts.mode)
			.map_or_else(|| "unknown".into(), |ip| ip.to_string().into_boxed_str());
		Ok(ClientIp(ip))
	}
}

// SessionJar //
//************//
/// Private cookie jar keyed with the session cookie key
#[derive(Clone, Debug)]
pub struct SessionJar(pub PrivateCookieJar);

impl FromRequestParts<App> for SessionJar {
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		Ok(SessionJar(state.session_cookie.jar(&parts.headers)))
	}
}

// vim: ts=4
