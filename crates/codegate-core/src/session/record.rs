//! Session record and its verification transition

use std::time::Duration;

use serde::{Deserialize, Serialize};

use codegate_types::types::{Timestamp, duration_millis};
use codegate_types::utils::random_id_len;

const SESSION_ID_PREFIX: &str = "session_";
/// 32 characters of a 62 symbol alphabet, ~190 bits
const SESSION_ID_RANDOM_LEN: usize = 32;

pub fn new_session_id() -> String {
	format!("{}{}", SESSION_ID_PREFIX, random_id_len(SESSION_ID_RANDOM_LEN))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
	pub session_id: Box<str>,
	pub authenticated: bool,
	pub created_at: Timestamp,
	pub last_activity: Timestamp,
}

/// Result of checking a session record against the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionDecision {
	/// Authenticated and within the inactivity limit; activity was refreshed
	Active,
	/// Was authenticated but idle too long; now unauthenticated
	Expired,
	/// Not authenticated to begin with
	Unauthenticated,
}

impl SessionRecord {
	/// Fresh authenticated session
	pub fn new(now: Timestamp) -> Self {
		Self {
			session_id: new_session_id().into_boxed_str(),
			authenticated: true,
			created_at: now,
			last_activity: now,
		}
	}

	/// Check the record at `now`.
	///
	/// An active session gets `last_activity = now`. A session idle for
	/// strictly more than `inactivity_limit` flips to unauthenticated and
	/// keeps its old `last_activity`. Once unauthenticated, a record stays
	/// that way; only a new login creates an authenticated one.
	pub fn verify(mut self, now: Timestamp, inactivity_limit: Duration) -> (Self, SessionDecision) {
		if !self.authenticated {
			return (self, SessionDecision::Unauthenticated);
		}

		let idle = now.millis_since(self.last_activity);
		if idle > duration_millis(inactivity_limit) {
			self.authenticated = false;
			return (self, SessionDecision::Expired);
		}

		// Clock skew must never move activity backwards
		self.last_activity = self.last_activity.max(now);
		(self, SessionDecision::Active)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const HOUR: Duration = Duration::from_secs(3600);
	const START: Timestamp = Timestamp(1_700_000_000_000);

	#[test]
	fn test_new_session_id_format() {
		let id = new_session_id();
		assert!(id.starts_with("session_"));
		assert_eq!(id.len(), "session_".len() + 32);
		assert_ne!(id, new_session_id());
	}

	#[test]
	fn test_active_session_refreshes_activity() {
		let record = SessionRecord::new(START);
		let (record, decision) = record.verify(START.add(Duration::from_secs(59 * 60)), HOUR);

		assert_eq!(decision, SessionDecision::Active);
		assert!(record.authenticated);
		assert_eq!(record.created_at, START);
		assert_eq!(record.last_activity, START.add(Duration::from_secs(59 * 60)));
	}

	#[test]
	fn test_inactivity_limit_is_inclusive() {
		let record = SessionRecord::new(START);
		let (_, decision) = record.clone().verify(START.add(HOUR), HOUR);
		assert_eq!(decision, SessionDecision::Active);

		let (expired, decision) = record.verify(START.add(HOUR).add(Duration::from_millis(1)), HOUR);
		assert_eq!(decision, SessionDecision::Expired);
		assert!(!expired.authenticated);
		assert_eq!(expired.last_activity, START);
	}

	#[test]
	fn test_expired_session_stays_unauthenticated() {
		let record = SessionRecord::new(START);
		let (expired, _) = record.verify(START.add(Duration::from_secs(61 * 60)), HOUR);

		// Coming back right away does not revive it
		let (again, decision) = expired.clone().verify(START.add(Duration::from_secs(61 * 60)), HOUR);
		assert_eq!(decision, SessionDecision::Unauthenticated);
		assert_eq!(again, expired);
	}

	#[test]
	fn test_serialized_field_names() {
		let record = SessionRecord {
			session_id: "session_abc".into(),
			authenticated: true,
			created_at: Timestamp(1),
			last_activity: Timestamp(2),
		};
		let json = serde_json::to_value(&record).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"sessionId": "session_abc",
				"authenticated": true,
				"createdAt": 1,
				"lastActivity": 2,
			})
		);
	}
}

// vim: ts=4
