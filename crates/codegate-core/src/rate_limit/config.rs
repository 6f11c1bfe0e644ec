//! Rate Limiting Configuration
//!
//! One sliding-window policy per endpoint category, plus the housekeeping
//! cadence of the limiter's sweeper.

use std::time::Duration;

use serde::Serialize;

use super::error::RateLimitError;

/// Endpoint category a request is limited under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointCategory {
	Auth,
	Browse,
	View,
	Search,
}

impl EndpointCategory {
	pub const ALL: [EndpointCategory; 4] = [Self::Auth, Self::Browse, Self::View, Self::Search];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Auth => "auth",
			Self::Browse => "browse",
			Self::View => "view",
			Self::Search => "search",
		}
	}
}

impl std::fmt::Display for EndpointCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Sliding-window policy for one endpoint category
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
	/// Length of the sliding window
	pub window: Duration,
	/// Requests admitted per window
	pub max_requests: u32,
	/// How long an identifier stays blocked after exceeding the window
	pub block_duration: Duration,
}

impl RateLimitPolicy {
	pub const fn new(window: Duration, max_requests: u32, block_duration: Duration) -> Self {
		Self { window, max_requests, block_duration }
	}

	/// A policy that can ever admit a request
	pub fn is_usable(&self) -> bool {
		self.max_requests > 0 && !self.window.is_zero()
	}

	pub fn validate(&self, category: EndpointCategory) -> Result<(), RateLimitError> {
		let reason = if self.window.is_zero() {
			"window must be greater than zero"
		} else if self.max_requests == 0 {
			"max_requests must be greater than zero"
		} else if self.block_duration.is_zero() {
			"block_duration must be greater than zero"
		} else {
			return Ok(());
		};
		Err(RateLimitError::InvalidPolicy { category, reason })
	}
}

/// Complete rate limiting configuration
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
	/// Login attempts, keyed by client IP
	pub auth: RateLimitPolicy,
	/// Directory listings, keyed by `ip:sessionId`
	pub browse: RateLimitPolicy,
	/// File views, keyed by `ip:sessionId`
	pub view: RateLimitPolicy,
	/// Searches, keyed by `ip:sessionId`
	pub search: RateLimitPolicy,
	/// How often the sweeper runs
	pub sweep_interval: Duration,
	/// Unblocked entries with no request newer than this are swept
	pub stale_after: Duration,
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		Self {
			// 5 attempts per 15 minutes, then 30 minutes blocked
			auth: RateLimitPolicy::new(
				Duration::from_secs(15 * 60),
				5,
				Duration::from_secs(30 * 60),
			),
			browse: RateLimitPolicy::new(Duration::from_secs(60), 100, Duration::from_secs(5 * 60)),
			view: RateLimitPolicy::new(Duration::from_secs(60), 50, Duration::from_secs(5 * 60)),
			search: RateLimitPolicy::new(Duration::from_secs(60), 10, Duration::from_secs(10 * 60)),
			sweep_interval: Duration::from_secs(10 * 60),
			stale_after: Duration::from_secs(60),
		}
	}
}

impl RateLimitConfig {
	pub fn policy(&self, category: EndpointCategory) -> &RateLimitPolicy {
		match category {
			EndpointCategory::Auth => &self.auth,
			EndpointCategory::Browse => &self.browse,
			EndpointCategory::View => &self.view,
			EndpointCategory::Search => &self.search,
		}
	}

	/// Checked once at startup; a failing config is rejected before serving
	pub fn validate(&self) -> Result<(), RateLimitError> {
		for category in EndpointCategory::ALL {
			self.policy(category).validate(category)?;
		}
		Ok(())
	}
}


// vim: ts=4
