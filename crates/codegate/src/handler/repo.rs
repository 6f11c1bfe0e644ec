//! Protected repository endpoints: browse, view and search
//!
//! Each call passes the gate (session, then the endpoint's rate limit),
//! validates its parameters, calls the repository adapter, and records the
//! outcome in the audit log.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::persist_session;
use crate::audit_adapter::AuditEventType;
use crate::gate::{self, Admission, with_error};
use crate::prelude::*;
use crate::rate_limit::EndpointCategory;
use crate::repo_adapter::{RepoEntry, SearchHit};
use codegate_core::{ClientIp, SessionJar};

const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Unix seconds at which the oldest request leaves the window
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

#[derive(Debug, Serialize)]
pub struct Success<T> {
	success: bool,
	#[serde(flatten)]
	payload: T,
}

type GateResponse<T> = Result<
	(PrivateCookieJar, [(&'static str, String); 2], Json<Success<T>>),
	(PrivateCookieJar, Error),
>;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
	path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
	q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrowseRes {
	path: String,
	entries: Vec<RepoEntry>,
}

#[derive(Debug, Serialize)]
pub struct SearchRes {
	query: String,
	results: Vec<SearchHit>,
}

/// Pass the gate, keeping the jar for whatever response follows
fn enter(
	app: &App,
	category: EndpointCategory,
	ip: &str,
	jar: PrivateCookieJar,
	details: &serde_json::Value,
) -> Result<(PrivateCookieJar, Admission), (PrivateCookieJar, Error)> {
	let record = app.session_cookie.read(&jar);
	let (record, result) = gate::admit(app, category, ip, record, details);
	let jar = persist_session(app, jar, record.as_ref());
	match result {
		Ok(admission) => Ok((jar, admission)),
		Err(err) => Err((jar, err)),
	}
}

/// Reject a missing parameter after admission
fn invalid(
	app: &App,
	event_type: AuditEventType,
	admission: &Admission,
	ip: &str,
	details: &serde_json::Value,
	msg: &str,
) -> Error {
	app.audit.record(event_type, &admission.session_id, ip, false, with_error(details, msg));
	Error::ValidationError(msg.into())
}

/// Reject an unreadable query string after admission
fn malformed(
	app: &App,
	event_type: AuditEventType,
	admission: &Admission,
	ip: &str,
	rejection: &QueryRejection,
) -> Error {
	debug!(event = event_type.as_str(), "Malformed query string: {}", rejection.body_text());
	invalid(app, event_type, admission, ip, &json!({}), "Invalid query parameters")
}

/// Audit the repository call's outcome; any adapter error is a collaborator failure
fn settle<T>(
	app: &App,
	event_type: AuditEventType,
	admission: &Admission,
	ip: &str,
	details: serde_json::Value,
	result: CgResult<T>,
) -> CgResult<T> {
	match result {
		Ok(value) => {
			app.audit.record(event_type, &admission.session_id, ip, true, details);
			Ok(value)
		}
		Err(err) => {
			warn!(event = event_type.as_str(), "Repository request failed: {}", err);
			let msg = err.to_string();
			app.audit.record(event_type, &admission.session_id, ip, false, with_error(&details, &msg));
			Err(Error::CollaboratorFailure(msg))
		}
	}
}

fn respond<T>(jar: PrivateCookieJar, admission: &Admission, payload: T) -> GateResponse<T> {
	let headers = [
		(X_RATELIMIT_REMAINING, admission.decision.remaining.to_string()),
		(X_RATELIMIT_RESET, admission.decision.reset_at.0.div_euclid(1000).to_string()),
	];
	Ok((jar, headers, Json(Success { success: true, payload })))
}

/// # GET /api/repo/browse?path=
pub async fn get_browse(
	State(app): State<App>,
	ClientIp(ip): ClientIp,
	SessionJar(jar): SessionJar,
	query: Result<Query<PathQuery>, QueryRejection>,
) -> GateResponse<BrowseRes> {
	let details = match &query {
		Ok(Query(query)) => json!({ "path": query.path.as_deref().unwrap_or_default() }),
		Err(_) => json!({}),
	};
	let (jar, admission) = enter(&app, EndpointCategory::Browse, &ip, jar, &details)?;

	let path = match query {
		Ok(Query(query)) => query.path.unwrap_or_default(),
		Err(rejection) => {
			return Err((jar, malformed(&app, AuditEventType::Browse, &admission, &ip, &rejection)));
		}
	};

	let result = app.repo_adapter.browse(&path).await;
	match settle(&app, AuditEventType::Browse, &admission, &ip, details, result) {
		Ok(entries) => respond(jar, &admission, BrowseRes { path, entries }),
		Err(err) => Err((jar, err)),
	}
}

/// # GET /api/repo/view?path=
pub async fn get_view(
	State(app): State<App>,
	ClientIp(ip): ClientIp,
	SessionJar(jar): SessionJar,
	query: Result<Query<PathQuery>, QueryRejection>,
) -> GateResponse<crate::repo_adapter::FileContent> {
	let details = match &query {
		Ok(Query(query)) => json!({ "path": query.path }),
		Err(_) => json!({}),
	};
	let (jar, admission) = enter(&app, EndpointCategory::View, &ip, jar, &details)?;

	let query = match query {
		Ok(Query(query)) => query,
		Err(rejection) => {
			return Err((jar, malformed(&app, AuditEventType::View, &admission, &ip, &rejection)));
		}
	};
	let Some(path) = query.path.filter(|p| !p.is_empty()) else {
		let err = invalid(&app, AuditEventType::View, &admission, &ip, &details, "Path is required");
		return Err((jar, err));
	};

	let result = app.repo_adapter.view(&path).await;
	match settle(&app, AuditEventType::View, &admission, &ip, details, result) {
		Ok(file) => respond(jar, &admission, file),
		Err(err) => Err((jar, err)),
	}
}

/// # GET /api/repo/search?q=
pub async fn get_search(
	State(app): State<App>,
	ClientIp(ip): ClientIp,
	SessionJar(jar): SessionJar,
	query: Result<Query<SearchQuery>, QueryRejection>,
) -> GateResponse<SearchRes> {
	let details = match &query {
		Ok(Query(query)) => json!({ "query": query.q }),
		Err(_) => json!({}),
	};
	let (jar, admission) = enter(&app, EndpointCategory::Search, &ip, jar, &details)?;

	let query = match query {
		Ok(Query(query)) => query,
		Err(rejection) => {
			return Err((jar, malformed(&app, AuditEventType::Search, &admission, &ip, &rejection)));
		}
	};
	let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
		let err =
			invalid(&app, AuditEventType::Search, &admission, &ip, &details, "Search query is required");
		return Err((jar, err));
	};

	let result = app.repo_adapter.search(q.trim(), app.opts.search_limit).await;
	match settle(&app, AuditEventType::Search, &admission, &ip, details, result) {
		Ok(results) => respond(jar, &admission, SearchRes { query: q, results }),
		Err(err) => Err((jar, err)),
	}
}

// vim: ts=4
