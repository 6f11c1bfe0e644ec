//! Audit log buffer
//!
//! Gate decisions are appended to an in-memory buffer and written to the
//! durable store in batches: when the buffer reaches the flush threshold, on
//! a fixed interval, and once more at shutdown. The durable store keeps only
//! the most recent `max_entries`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use codegate_types::audit_adapter::{AuditAdapter, AuditEntry, AuditEventType};

use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct AuditConfig {
	/// Buffer size that triggers an immediate background flush
	pub flush_threshold: usize,
	pub flush_interval: Duration,
	/// Retention cap of the durable store
	pub max_entries: usize,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self { flush_threshold: 50, flush_interval: Duration::from_secs(5 * 60), max_entries: 1000 }
	}
}

impl AuditConfig {
	pub fn validate(&self) -> CgResult<()> {
		if self.flush_threshold == 0 || self.max_entries == 0 || self.flush_interval.is_zero() {
			return Err(Error::ConfigError("audit thresholds and interval must be non-zero".into()));
		}
		Ok(())
	}
}

pub struct AuditLog {
	adapter: Arc<dyn AuditAdapter>,
	clock: Arc<dyn Clock>,
	config: AuditConfig,
	buffer: Mutex<Vec<AuditEntry>>,
	/// Serializes flushes so the read-merge-write cycle never interleaves
	flush_lock: tokio::sync::Mutex<()>,
	flush_scheduled: AtomicBool,
}

impl std::fmt::Debug for AuditLog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuditLog")
			.field("adapter", &self.adapter)
			.field("config", &self.config)
			.field("pending", &self.pending())
			.finish_non_exhaustive()
	}
}

impl AuditLog {
	pub fn new(adapter: Arc<dyn AuditAdapter>, clock: Arc<dyn Clock>, config: AuditConfig) -> Self {
		Self {
			adapter,
			clock,
			config,
			buffer: Mutex::new(Vec::new()),
			flush_lock: tokio::sync::Mutex::new(()),
			flush_scheduled: AtomicBool::new(false),
		}
	}

	pub fn config(&self) -> &AuditConfig {
		&self.config
	}

	/// Entries recorded but not yet durable
	pub fn pending(&self) -> usize {
		self.buffer.lock().len()
	}

	/// Append one gate decision. Never waits on the durable store.
	pub fn record(
		self: &Arc<Self>,
		event_type: AuditEventType,
		session_id: &str,
		ip: &str,
		success: bool,
		details: serde_json::Value,
	) {
		let entry = AuditEntry {
			timestamp: self.clock.now(),
			event_type,
			session_id: session_id.into(),
			ip: ip.into(),
			success,
			details,
		};
		info!(
			event = event_type.as_str(),
			session_id = %entry.session_id,
			ip = %entry.ip,
			success,
			"audit"
		);

		let pending = {
			let mut buffer = self.buffer.lock();
			buffer.push(entry);
			buffer.len()
		};
		if pending >= self.config.flush_threshold {
			self.schedule_flush();
		}
	}

	fn schedule_flush(self: &Arc<Self>) {
		if self.flush_scheduled.swap(true, Ordering::AcqRel) {
			return;
		}
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				let log = Arc::clone(self);
				handle.spawn(async move {
					log.flush_scheduled.store(false, Ordering::Release);
					// Failure is logged by flush(); entries stay buffered
					let _ = log.flush().await;
				});
			}
			Err(_) => {
				self.flush_scheduled.store(false, Ordering::Release);
				debug!("No async runtime, audit flush deferred to the next timer tick");
			}
		}
	}

	/// Write buffered entries to the durable store, returning how many were written
	pub async fn flush(&self) -> CgResult<usize> {
		let _guard = self.flush_lock.lock().await;

		let batch = self.buffer.lock().clone();
		if batch.is_empty() {
			return Ok(0);
		}
		let count = batch.len();

		match self.merge_and_write(batch).await {
			Ok(()) => {
				// Only this flush removes entries, so the first `count` are exactly the batch
				self.buffer.lock().drain(..count);
				debug!(count, "Audit entries flushed");
				Ok(count)
			}
			Err(err) => {
				warn!("Audit flush failed, {} entries kept in buffer: {}", count, err);
				Err(err)
			}
		}
	}

	async fn merge_and_write(&self, batch: Vec<AuditEntry>) -> CgResult<()> {
		let mut entries = self.adapter.read_entries().await?;
		entries.extend(batch);
		if entries.len() > self.config.max_entries {
			let excess = entries.len() - self.config.max_entries;
			entries.drain(..excess);
		}
		self.adapter.write_entries(&entries).await
	}

	/// Periodic flush task; the first flush happens one interval after spawning
	pub fn spawn_flush_timer(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let log = Arc::clone(self);
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(log.config.flush_interval);
			interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			interval.tick().await;
			loop {
				interval.tick().await;
				let _ = log.flush().await;
			}
		})
	}

	/// Final best-effort flush
	pub async fn shutdown(&self) {
		match self.flush().await {
			Ok(count) => info!(count, "Audit log flushed at shutdown"),
			Err(err) => error!("Audit entries lost at shutdown ({} pending): {}", self.pending(), err),
		}
	}

	/// Most recent durable entries, newest first. Buffered entries are not included.
	pub async fn get_recent(&self, limit: usize) -> CgResult<Vec<AuditEntry>> {
		let entries = self.adapter.read_entries().await?;
		Ok(entries.into_iter().rev().take(limit).collect())
	}
}


// vim: ts=4
