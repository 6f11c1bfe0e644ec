//! Rate Limit Manager
//!
//! Sliding-window limiter with a punitive block. Every (category, identifier)
//! pair keeps the timestamps of its admitted requests inside the window; the
//! request that would exceed the window blocks the identifier for the
//! category's block duration.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use super::config::{EndpointCategory, RateLimitConfig};
use super::error::RateLimitError;
use crate::prelude::*;

/// Outcome of a single rate limit check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
	pub allowed: bool,
	/// Requests still admissible in the current window
	pub remaining: u32,
	/// When the window frees up (admitted) or the block ends (rejected)
	pub reset_at: Timestamp,
	/// Whole seconds the client should wait; set only on rejection
	pub retry_after: Option<u64>,
}

impl RateLimitDecision {
	fn rejected(now: Timestamp, until: Timestamp) -> Self {
		Self { allowed: false, remaining: 0, reset_at: until, retry_after: Some(now.secs_until(until)) }
	}
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimiterStats {
	pub tracked_entries: usize,
	pub active_blocks: usize,
	pub total_blocks_issued: u64,
	pub total_rejected: u64,
}

#[derive(Debug, Default)]
struct RateLimitEntry {
	/// Admitted request times, oldest first
	requests: VecDeque<Timestamp>,
	blocked_until: Option<Timestamp>,
}

type EntryKey = (EndpointCategory, Box<str>);

pub struct RateLimitManager {
	config: RateLimitConfig,
	clock: Arc<dyn Clock>,
	entries: Mutex<HashMap<EntryKey, RateLimitEntry>>,
	total_blocks: AtomicU64,
	total_rejected: AtomicU64,
}

impl std::fmt::Debug for RateLimitManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RateLimitManager")
			.field("config", &self.config)
			.field("entries", &self.entries.lock().len())
			.finish_non_exhaustive()
	}
}

impl RateLimitManager {
	pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
		Self {
			config,
			clock,
			entries: Mutex::new(HashMap::new()),
			total_blocks: AtomicU64::new(0),
			total_rejected: AtomicU64::new(0),
		}
	}

	pub fn config(&self) -> &RateLimitConfig {
		&self.config
	}

	/// Check (and on admission, count) one request for `identifier`
	pub fn check(&self, category: EndpointCategory, identifier: &str) -> RateLimitDecision {
		let policy = self.config.policy(category);
		let now = self.clock.now();

		if !policy.is_usable() {
			// Never admits, never blocks
			self.total_rejected.fetch_add(1, Ordering::Relaxed);
			warn!(category = %category, "Rate limit policy admits no requests");
			return RateLimitDecision::rejected(now, now.add(policy.window));
		}

		let mut entries = self.entries.lock();
		let entry = entries.entry((category, identifier.into())).or_default();

		if let Some(until) = entry.blocked_until {
			if now < until {
				self.total_rejected.fetch_add(1, Ordering::Relaxed);
				debug!(category = %category, identifier = %identifier, "Request rejected while blocked");
				return RateLimitDecision::rejected(now, until);
			}
			// Block expired: start from a clean history
			entry.blocked_until = None;
			entry.requests.clear();
		}

		let window_start = now.sub(policy.window);
		entry.requests.retain(|t| *t > window_start);

		let max = policy.max_requests as usize;
		if entry.requests.len() >= max {
			let until = now.add(policy.block_duration);
			entry.blocked_until = Some(until);
			self.total_blocks.fetch_add(1, Ordering::Relaxed);
			self.total_rejected.fetch_add(1, Ordering::Relaxed);
			warn!(
				category = %category,
				identifier = %identifier,
				blocked_until = %until,
				"Rate limit exceeded, identifier blocked"
			);
			return RateLimitDecision::rejected(now, until);
		}

		entry.requests.push_back(now);
		let oldest = entry.requests.front().copied().unwrap_or(now);
		let remaining = u32::try_from(max - entry.requests.len()).unwrap_or(0);
		RateLimitDecision {
			allowed: true,
			remaining,
			reset_at: oldest.add(policy.window),
			retry_after: None,
		}
	}

	/// Like [`check`](Self::check), but a rejection becomes an error
	pub fn admit(
		&self,
		category: EndpointCategory,
		identifier: &str,
	) -> Result<RateLimitDecision, RateLimitError> {
		let decision = self.check(category, identifier);
		if decision.allowed {
			Ok(decision)
		} else {
			Err(RateLimitError::Limited {
				category,
				retry_after: decision.retry_after.unwrap_or(0),
				blocked_until: decision.reset_at,
			})
		}
	}

	/// Drop expired blocks and idle entries, returning how many were removed
	pub fn sweep(&self) -> usize {
		let now = self.clock.now();
		let idle_start = now.sub(self.config.stale_after);
		let mut entries = self.entries.lock();
		let before = entries.len();

		entries.retain(|_, entry| match entry.blocked_until {
			Some(until) => now < until,
			None => entry.requests.iter().any(|t| *t > idle_start),
		});

		let removed = before - entries.len();
		if removed > 0 {
			debug!(removed, remaining = entries.len(), "Rate limit sweep");
		}
		removed
	}

	pub fn is_blocked(&self, category: EndpointCategory, identifier: &str) -> bool {
		let now = self.clock.now();
		self.entries
			.lock()
			.get(&(category, identifier.into()))
			.and_then(|entry| entry.blocked_until)
			.is_some_and(|until| now < until)
	}

	pub fn stats(&self) -> RateLimiterStats {
		let now = self.clock.now();
		let entries = self.entries.lock();
		RateLimiterStats {
			tracked_entries: entries.len(),
			active_blocks: entries
				.values()
				.filter(|e| e.blocked_until.is_some_and(|until| now < until))
				.count(),
			total_blocks_issued: self.total_blocks.load(Ordering::Relaxed),
			total_rejected: self.total_rejected.load(Ordering::Relaxed),
		}
	}
}


// vim: ts=4
