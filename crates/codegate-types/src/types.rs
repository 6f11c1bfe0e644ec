//! Common types used throughout codegate.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime};

// Timestamp //
//***********//
/// Milliseconds since the Unix epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let millis = SystemTime::now()
			.duration_since(SystemTime::UNIX_EPOCH)
			.map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
			.unwrap_or(0);
		Timestamp(millis)
	}

	pub fn add(&self, duration: Duration) -> Timestamp {
		Timestamp(self.0.saturating_add(duration_millis(duration)))
	}

	pub fn sub(&self, duration: Duration) -> Timestamp {
		Timestamp(self.0.saturating_sub(duration_millis(duration)))
	}

	/// Milliseconds elapsed from `earlier` to `self` (negative if `earlier` is later)
	pub fn millis_since(&self, earlier: Timestamp) -> i64 {
		self.0.saturating_sub(earlier.0)
	}

	/// Whole seconds from `self` until `later`, rounded up, never negative
	pub fn secs_until(&self, later: Timestamp) -> u64 {
		let millis = u64::try_from(later.0.saturating_sub(self.0)).unwrap_or(0);
		millis.div_ceil(1000)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

pub fn duration_millis(duration: Duration) -> i64 {
	i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

// Clock //
//*******//
/// Time source for every time-dependent component
pub trait Clock: Send + Sync {
	fn now(&self) -> Timestamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Timestamp {
		Timestamp::now()
	}
}

/// Manually driven clock for simulations and tests
#[derive(Debug, Default)]
pub struct ManualClock {
	millis: AtomicI64,
}

impl ManualClock {
	pub fn new(start: Timestamp) -> Self {
		Self { millis: AtomicI64::new(start.0) }
	}

	pub fn set(&self, ts: Timestamp) {
		self.millis.store(ts.0, Ordering::SeqCst);
	}

	pub fn advance(&self, duration: Duration) {
		self.millis.fetch_add(duration_millis(duration), Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Timestamp {
		Timestamp(self.millis.load(Ordering::SeqCst))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secs_until_rounds_up() {
		let now = Timestamp(1_000);
		assert_eq!(now.secs_until(Timestamp(1_001)), 1);
		assert_eq!(now.secs_until(Timestamp(2_000)), 1);
		assert_eq!(now.secs_until(Timestamp(2_001)), 2);
		assert_eq!(now.secs_until(Timestamp(500)), 0);
	}

	#[test]
	fn test_manual_clock() {
		let clock = ManualClock::new(Timestamp(10_000));
		assert_eq!(clock.now(), Timestamp(10_000));

		clock.advance(Duration::from_secs(61 * 60));
		assert_eq!(clock.now(), Timestamp(10_000 + 3_660_000));

		clock.set(Timestamp(5));
		assert_eq!(clock.now(), Timestamp(5));
	}

	#[test]
	fn test_timestamp_serializes_as_number() {
		let json = serde_json::to_string(&Timestamp(1_700_000_000_000)).unwrap();
		assert_eq!(json, "1700000000000");
	}
}

// vim: ts=4
