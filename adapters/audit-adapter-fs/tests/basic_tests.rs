//! Basic tests for the filesystem audit store

#![allow(clippy::unwrap_used, clippy::expect_used)]

use codegate::audit_adapter::{AuditAdapter, AuditEntry, AuditEventType};
use codegate::types::Timestamp;
use codegate_audit_adapter_fs::AuditAdapterFs;
use tempfile::TempDir;

fn entry(ts: i64, success: bool) -> AuditEntry {
	AuditEntry {
		timestamp: Timestamp(ts),
		event_type: AuditEventType::Auth,
		session_id: "anonymous".into(),
		ip: "127.0.0.1".into(),
		success,
		details: serde_json::json!({ "passwordAttempt": true }),
	}
}

async fn create_test_adapter() -> (AuditAdapterFs, TempDir) {
	let temp_dir = TempDir::new().unwrap();
	let file = temp_dir.path().join("logs").join("audit.json");
	let adapter = AuditAdapterFs::new(file.into()).await.unwrap();
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_missing_file_reads_empty() {
	let (adapter, _temp) = create_test_adapter().await;
	assert!(!adapter.path().exists());
	assert!(adapter.read_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_replaces_contents() {
	let (adapter, temp) = create_test_adapter().await;

	adapter.write_entries(&[entry(1, false), entry(2, true)]).await.unwrap();
	assert_eq!(adapter.read_entries().await.unwrap(), vec![entry(1, false), entry(2, true)]);

	adapter.write_entries(&[entry(3, true)]).await.unwrap();
	assert_eq!(adapter.read_entries().await.unwrap(), vec![entry(3, true)]);

	// No temporary files left behind
	let names: Vec<_> = std::fs::read_dir(temp.path().join("logs"))
		.unwrap()
		.map(|e| e.unwrap().file_name().into_string().unwrap())
		.collect();
	assert_eq!(names, vec!["audit.json".to_string()]);
}

#[tokio::test]
async fn test_file_format() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter.write_entries(&[entry(1_700_000_000_000, true)]).await.unwrap();

	let raw: serde_json::Value =
		serde_json::from_slice(&std::fs::read(adapter.path()).unwrap()).unwrap();
	assert_eq!(
		raw,
		serde_json::json!([{
			"timestamp": 1_700_000_000_000_i64,
			"eventType": "auth",
			"sessionId": "anonymous",
			"ip": "127.0.0.1",
			"success": true,
			"details": { "passwordAttempt": true },
		}])
	);
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
	let (adapter, _temp) = create_test_adapter().await;
	std::fs::write(adapter.path(), b"[{\"timestamp\":").unwrap();

	let err = adapter.read_entries().await.unwrap_err();
	assert!(matches!(err, codegate::error::Error::PersistenceFailure(_)));
}

#[tokio::test]
async fn test_blank_file_reads_empty() {
	let (adapter, _temp) = create_test_adapter().await;
	std::fs::write(adapter.path(), b"\n").unwrap();
	assert!(adapter.read_entries().await.unwrap().is_empty());
}

// vim: ts=4
