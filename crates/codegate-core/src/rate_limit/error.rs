//! Rate Limiting Error Types

use codegate_types::error::Error;
use codegate_types::types::Timestamp;

use super::config::EndpointCategory;

#[derive(Debug, Clone)]
pub enum RateLimitError {
	/// Request rejected; the identifier is blocked until `blocked_until`
	Limited { category: EndpointCategory, retry_after: u64, blocked_until: Timestamp },
	/// A policy that can never admit a request
	InvalidPolicy { category: EndpointCategory, reason: &'static str },
}

impl std::fmt::Display for RateLimitError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Limited { category, retry_after, .. } => {
				write!(f, "rate limited ({}), retry after {}s", category, retry_after)
			}
			Self::InvalidPolicy { category, reason } => {
				write!(f, "invalid rate limit policy for {}: {}", category, reason)
			}
		}
	}
}

impl std::error::Error for RateLimitError {}

impl From<RateLimitError> for Error {
	fn from(err: RateLimitError) -> Self {
		match err {
			RateLimitError::Limited { retry_after, .. } => Error::RateLimited { retry_after },
			err @ RateLimitError::InvalidPolicy { .. } => Error::ConfigError(err.to_string()),
		}
	}
}

// vim: ts=4
