//! Error taxonomy shared by every codegate crate.
//!
//! Variants map onto HTTP responses in [`IntoResponse`]. Response bodies are
//! always `{"error": "..."}` (plus `retryAfter` for admission denials) and
//! never include the underlying cause.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type CgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	/// Missing, expired or invalid session. Callers cannot tell these apart.
	Unauthenticated,
	/// Wrong password
	InvalidCredential,
	/// Missing or malformed request parameter
	ValidationError(String),
	/// Rate limit exceeded or identifier blocked
	RateLimited {
		retry_after: u64,
	},
	/// The repository collaborator failed; the message is for logs only
	CollaboratorFailure(String),
	/// Durable audit store failure; never surfaced to the request path
	PersistenceFailure(String),
	ConfigError(String),
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("json error: {}", err);
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Unauthenticated => write!(f, "unauthenticated"),
			Error::InvalidCredential => write!(f, "invalid credential"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::RateLimited { retry_after } => {
				write!(f, "rate limited, retry after {}s", retry_after)
			}
			Error::CollaboratorFailure(msg) => write!(f, "collaborator failure: {}", msg),
			Error::PersistenceFailure(msg) => write!(f, "persistence failure: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		match self {
			Error::NotFound => {
				(StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "Not found" })))
					.into_response()
			}
			Error::Unauthenticated => (
				StatusCode::UNAUTHORIZED,
				Json(serde_json::json!({ "error": "Authentication required" })),
			)
				.into_response(),
			Error::InvalidCredential => (
				StatusCode::UNAUTHORIZED,
				Json(serde_json::json!({ "error": "Invalid password" })),
			)
				.into_response(),
			Error::ValidationError(msg) => {
				(StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response()
			}
			Error::RateLimited { retry_after } => {
				let body = serde_json::json!({
					"error": "Too many requests. Please try again later.",
					"retryAfter": retry_after,
				});
				let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
				if let Ok(val) = retry_after.to_string().parse() {
					response.headers_mut().insert(header::RETRY_AFTER, val);
				}
				response
			}
			Error::CollaboratorFailure(_) => (
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(serde_json::json!({ "error": "Failed to fetch repository content" })),
			)
				.into_response(),
			_ => (
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(serde_json::json!({ "error": "Internal server error" })),
			)
				.into_response(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		assert_eq!(Error::Unauthenticated.into_response().status(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::InvalidCredential.into_response().status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			Error::ValidationError("missing".into()).into_response().status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			Error::CollaboratorFailure("boom".into()).into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(Error::Parse.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_rate_limited_sets_retry_after() {
		let response = Error::RateLimited { retry_after: 1800 }.into_response();
		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(
			response.headers().get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
			Some("1800")
		);
	}
}

// vim: ts=4
