//! Durable audit store kept as a single JSON array in a local file.
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the log, so readers see either the old or the new array, never a
//! partial one.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, create_dir_all, read, remove_file, rename};
use tokio::io::AsyncWriteExt;

use codegate::audit_adapter::{AuditAdapter, AuditEntry};
use codegate::prelude::*;
use codegate::utils::random_id;

fn persistence(context: &str, err: impl std::fmt::Display) -> Error {
	Error::PersistenceFailure(format!("{}: {}", context, err))
}

#[derive(Debug)]
pub struct AuditAdapterFs {
	file: Box<Path>,
}

impl AuditAdapterFs {
	/// Store backed by `file`; its directory is created if missing
	pub async fn new(file: Box<Path>) -> CgResult<Self> {
		if let Some(dir) = file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			create_dir_all(dir).await?;
		}
		Ok(Self { file })
	}

	pub fn path(&self) -> &Path {
		&self.file
	}

	fn tmp_file_path(&self) -> PathBuf {
		let name = self.file.file_name().and_then(|n| n.to_str()).unwrap_or("audit");
		self.file.with_file_name(format!(".{}.tmp-{}", name, random_id()))
	}
}

#[async_trait]
impl AuditAdapter for AuditAdapterFs {
	async fn read_entries(&self) -> CgResult<Vec<AuditEntry>> {
		let bytes = match read(&self.file).await {
			Ok(bytes) => bytes,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
			Err(err) => return Err(persistence("read audit log", err)),
		};
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Vec::new());
		}
		serde_json::from_slice(&bytes).map_err(|err| persistence("decode audit log", err))
	}

	async fn write_entries(&self, entries: &[AuditEntry]) -> CgResult<()> {
		let data =
			serde_json::to_vec_pretty(entries).map_err(|err| persistence("encode audit log", err))?;
		let tmp_path = self.tmp_file_path();

		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(&data).await?;
			file.sync_all().await?;
			rename(&tmp_path, &self.file).await
		}
		.await;

		if let Err(err) = res {
			debug!("Audit log write failed, removing tmpfile: {:?}", &tmp_path);
			let _ = remove_file(&tmp_path).await;
			return Err(persistence("write audit log", err));
		}
		Ok(())
	}
}


// vim: ts=4
