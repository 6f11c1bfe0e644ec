//! Login, session check and logout

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::persist_session;
use crate::gate;
use crate::prelude::*;
use crate::session::SessionDecision;
use codegate_core::{ClientIp, SessionJar};

#[derive(Debug, Deserialize)]
pub struct LoginReq {
	password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRes {
	success: bool,
	session_id: Box<str>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRes {
	authenticated: bool,
	session_id: Option<Box<str>>,
}

#[derive(Debug, Serialize)]
pub struct LogoutRes {
	success: bool,
}

/// # POST /api/auth/login
pub async fn post_login(
	State(app): State<App>,
	ClientIp(ip): ClientIp,
	SessionJar(jar): SessionJar,
	body: Result<Json<LoginReq>, JsonRejection>,
) -> CgResult<(PrivateCookieJar, Json<LoginRes>)> {
	// An unreadable body is treated as a missing password
	let password = match &body {
		Ok(Json(req)) => req.password.as_deref(),
		Err(err) => {
			debug!("Unreadable login body: {}", err);
			None
		}
	};

	let record = gate::login(&app, &ip, password)?;
	let jar = app.session_cookie.write(jar, &record)?;

	Ok((jar, Json(LoginRes { success: true, session_id: record.session_id })))
}

/// # GET /api/auth/session
pub async fn get_session(
	State(app): State<App>,
	SessionJar(jar): SessionJar,
) -> (StatusCode, PrivateCookieJar, Json<SessionRes>) {
	let (record, decision) = gate::verify_session(&app, app.session_cookie.read(&jar));
	let jar = persist_session(&app, jar, record.as_ref());

	match record {
		Some(record) if decision == SessionDecision::Active => (
			StatusCode::OK,
			jar,
			Json(SessionRes { authenticated: true, session_id: Some(record.session_id) }),
		),
		_ => (
			StatusCode::UNAUTHORIZED,
			jar,
			Json(SessionRes { authenticated: false, session_id: None }),
		),
	}
}

/// # POST /api/auth/logout
///
/// Always succeeds, with or without a session.
pub async fn post_logout(
	State(app): State<App>,
	SessionJar(jar): SessionJar,
) -> (PrivateCookieJar, Json<LogoutRes>) {
	(app.session_cookie.clear(jar), Json(LogoutRes { success: true }))
}

// vim: ts=4
