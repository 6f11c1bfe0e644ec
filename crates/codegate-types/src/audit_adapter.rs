//! Adapter that persists the audit trail of gate decisions.
//!
//! The adapter only stores and loads whole entry lists; buffering, retention
//! and flush scheduling live in the core audit log.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEventType {
	Auth,
	Browse,
	View,
	Search,
}

impl AuditEventType {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditEventType::Auth => "auth",
			AuditEventType::Browse => "browse",
			AuditEventType::View => "view",
			AuditEventType::Search => "search",
		}
	}
}

/// One gate decision. Append-only, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
	pub timestamp: Timestamp,
	pub event_type: AuditEventType,
	pub session_id: Box<str>,
	pub ip: Box<str>,
	pub success: bool,
	#[serde(default)]
	pub details: serde_json::Value,
}

#[async_trait]
pub trait AuditAdapter: Debug + Send + Sync {
	/// Reads all durable entries, oldest first. A store that does not exist yet is empty.
	async fn read_entries(&self) -> CgResult<Vec<AuditEntry>>;

	/// Replaces the durable entries. Readers must never observe a partial write.
	async fn write_entries(&self, entries: &[AuditEntry]) -> CgResult<()>;
}

/// Volatile store, for tests and for running without a data directory
#[derive(Debug, Default)]
pub struct MemoryAuditAdapter {
	entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entries(entries: Vec<AuditEntry>) -> Self {
		Self { entries: Mutex::new(entries) }
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[async_trait]
impl AuditAdapter for MemoryAuditAdapter {
	async fn read_entries(&self) -> CgResult<Vec<AuditEntry>> {
		Ok(self.entries.lock().clone())
	}

	async fn write_entries(&self, entries: &[AuditEntry]) -> CgResult<()> {
		*self.entries.lock() = entries.to_vec();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_entry_wire_format() {
		let entry = AuditEntry {
			timestamp: Timestamp(1_700_000_000_000),
			event_type: AuditEventType::Search,
			session_id: "session_abc".into(),
			ip: "10.0.0.1".into(),
			success: false,
			details: serde_json::json!({ "query": "fn main" }),
		};

		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["eventType"], "search");
		assert_eq!(json["sessionId"], "session_abc");
		assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
		assert_eq!(json["details"]["query"], "fn main");
	}

	#[tokio::test]
	async fn test_memory_adapter_replaces_entries() {
		let adapter = MemoryAuditAdapter::new();
		assert!(adapter.read_entries().await.unwrap().is_empty());

		let entry = AuditEntry {
			timestamp: Timestamp(1),
			event_type: AuditEventType::Auth,
			session_id: "anonymous".into(),
			ip: "127.0.0.1".into(),
			success: true,
			details: serde_json::Value::Null,
		};
		adapter.write_entries(&[entry.clone(), entry]).await.unwrap();
		assert_eq!(adapter.len(), 2);
	}
}

// vim: ts=4
