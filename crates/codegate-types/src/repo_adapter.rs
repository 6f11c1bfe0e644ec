//! Adapter for the read-only repository the gateway protects.
//!
//! Implementations fetch content from wherever the repository lives (a
//! source-control host, a local checkout). Caching and retries are the
//! adapter's concern, not the gate's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
	File,
	Dir,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
	pub name: Box<str>,
	pub path: Box<str>,
	#[serde(rename = "type")]
	pub kind: EntryKind,
	pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
	pub path: Box<str>,
	pub content: String,
	pub size: u64,
	/// Content was cut at the adapter's size limit
	pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
	pub name: Box<str>,
	pub path: Box<str>,
}

#[async_trait]
pub trait RepoAdapter: Debug + Send + Sync {
	/// Lists a directory. An empty path is the repository root.
	async fn browse(&self, path: &str) -> CgResult<Vec<RepoEntry>>;

	/// Reads a file
	async fn view(&self, path: &str) -> CgResult<FileContent>;

	/// Finds files matching `query`, at most `limit` results
	async fn search(&self, query: &str, limit: usize) -> CgResult<Vec<SearchHit>>;
}

// vim: ts=4
