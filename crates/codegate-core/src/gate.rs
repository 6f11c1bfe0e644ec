//! Gate orchestration
//!
//! Login: rate limit by client IP, then the credential check, then a new
//! session. Protected calls: session verification first, so the rate limit
//! key can include the session id, then the endpoint's rate limit policy.
//! Every decision, including rejections, produces an audit entry.

use serde_json::json;

use codegate_types::audit_adapter::AuditEventType;
use codegate_types::utils::secret_eq;

use crate::app::AppState;
use crate::prelude::*;
use crate::rate_limit::{EndpointCategory, RateLimitDecision};
use crate::session::{SessionDecision, SessionRecord};

/// Audit session id of a login rejected by the rate limiter
pub const RATE_LIMITED_SESSION: &str = "rate-limited";
/// Audit session id of a failed login
pub const ANONYMOUS_SESSION: &str = "anonymous";
/// Audit session id of a protected call without a valid session
pub const UNAUTHENTICATED_SESSION: &str = "unauthenticated";

impl From<EndpointCategory> for AuditEventType {
	fn from(category: EndpointCategory) -> Self {
		match category {
			EndpointCategory::Auth => AuditEventType::Auth,
			EndpointCategory::Browse => AuditEventType::Browse,
			EndpointCategory::View => AuditEventType::View,
			EndpointCategory::Search => AuditEventType::Search,
		}
	}
}

/// Copy of `details` with an `error` field added
pub fn with_error(details: &serde_json::Value, error: &str) -> serde_json::Value {
	let mut details = details.clone();
	match details.as_object_mut() {
		Some(map) => {
			map.insert("error".into(), error.into());
			details
		}
		None => json!({ "error": error }),
	}
}

/// Establish a session from a submitted password
pub fn login(app: &AppState, ip: &str, password: Option<&str>) -> CgResult<SessionRecord> {
	if let Err(err) = app.rate_limiter.admit(EndpointCategory::Auth, ip) {
		app.audit.record(
			AuditEventType::Auth,
			RATE_LIMITED_SESSION,
			ip,
			false,
			json!({ "error": "Rate limit exceeded" }),
		);
		return Err(err.into());
	}

	let Some(password) = password.filter(|p| !p.is_empty()) else {
		app.audit.record(
			AuditEventType::Auth,
			ANONYMOUS_SESSION,
			ip,
			false,
			json!({ "error": "Password missing" }),
		);
		return Err(Error::ValidationError("Password is required".into()));
	};

	if !secret_eq(password, &app.opts.access_password) {
		app.audit.record(
			AuditEventType::Auth,
			ANONYMOUS_SESSION,
			ip,
			false,
			json!({ "passwordAttempt": true, "error": "Invalid password" }),
		);
		return Err(Error::InvalidCredential);
	}

	let record = SessionRecord::new(app.clock.now());
	app.audit.record(
		AuditEventType::Auth,
		&record.session_id,
		ip,
		true,
		json!({ "passwordAttempt": true }),
	);
	info!(ip = %ip, "Login succeeded");
	Ok(record)
}

/// Verify the session carried by a request.
///
/// Returns the record to write back (refreshed or flipped to
/// unauthenticated) alongside the decision. `None` means there was no
/// session to begin with.
pub fn verify_session(
	app: &AppState,
	record: Option<SessionRecord>,
) -> (Option<SessionRecord>, SessionDecision) {
	let Some(record) = record else {
		return (None, SessionDecision::Unauthenticated);
	};
	let (record, decision) = record.verify(app.clock.now(), app.opts.inactivity_limit);
	if decision == SessionDecision::Expired {
		debug!(session_id = %record.session_id, "Session expired after inactivity");
	}
	(Some(record), decision)
}

/// A protected call that passed the gate
#[derive(Debug, Clone)]
pub struct Admission {
	pub session_id: Box<str>,
	pub decision: RateLimitDecision,
}

/// Gate a protected call: session first, then the endpoint's rate limit.
///
/// `details` describes the request (path or query) and is what rejection
/// audit entries carry. The returned record must be persisted whatever the
/// outcome.
pub fn admit(
	app: &AppState,
	category: EndpointCategory,
	ip: &str,
	record: Option<SessionRecord>,
	details: &serde_json::Value,
) -> (Option<SessionRecord>, CgResult<Admission>) {
	let event_type = AuditEventType::from(category);
	let (record, session) = verify_session(app, record);

	let session_id = match (&record, session) {
		(Some(record), SessionDecision::Active) => record.session_id.clone(),
		_ => {
			app.audit.record(
				event_type,
				UNAUTHENTICATED_SESSION,
				ip,
				false,
				with_error(details, "Authentication required"),
			);
			return (record, Err(Error::Unauthenticated));
		}
	};

	let key = format!("{}:{}", ip, session_id);
	let decision = match app.rate_limiter.admit(category, &key) {
		Ok(decision) => decision,
		Err(err) => {
			app.audit.record(event_type, &session_id, ip, false, with_error(details, "Rate limit exceeded"));
			return (record, Err(err.into()));
		}
	};

	(record, Ok(Admission { session_id, decision }))
}


// vim: ts=4
