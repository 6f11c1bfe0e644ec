//! Audit log viewer

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use super::persist_session;
use crate::audit_adapter::AuditEntry;
use crate::gate;
use crate::prelude::*;
use crate::session::SessionDecision;
use codegate_core::SessionJar;

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
	limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AuditRes {
	success: bool,
	entries: Vec<AuditEntry>,
}

/// # GET /api/audit?limit=
///
/// Durable entries only, newest first. Requires a session.
pub async fn get_audit(
	State(app): State<App>,
	SessionJar(jar): SessionJar,
	query: Result<Query<AuditQuery>, QueryRejection>,
) -> Result<(PrivateCookieJar, Json<AuditRes>), (PrivateCookieJar, Error)> {
	let (record, decision) = gate::verify_session(&app, app.session_cookie.read(&jar));
	let jar = persist_session(&app, jar, record.as_ref());
	if decision != SessionDecision::Active {
		return Err((jar, Error::Unauthenticated));
	}

	let query = match query {
		Ok(Query(query)) => query,
		Err(rejection) => {
			debug!("Malformed audit query: {}", rejection.body_text());
			return Err((jar, Error::ValidationError("Invalid query parameters".into())));
		}
	};
	let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(app.audit.config().max_entries);
	match app.audit.get_recent(limit).await {
		Ok(entries) => Ok((jar, Json(AuditRes { success: true, entries }))),
		Err(err) => {
			warn!("Cannot read audit log: {}", err);
			Err((jar, err))
		}
	}
}

// vim: ts=4
