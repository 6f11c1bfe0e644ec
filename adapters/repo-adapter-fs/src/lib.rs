//! Read-only repository source backed by a local directory.
//!
//! Paths coming from clients are relative to the repository root. Anything
//! that is not a plain relative path (`..`, absolute paths, drive prefixes)
//! is rejected, and resolved paths must stay below the root after symlinks
//! are followed. Version control metadata directories are never listed.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, canonicalize, metadata, read_dir};
use tokio::io::AsyncReadExt;

use codegate::prelude::*;
use codegate::repo_adapter::{EntryKind, FileContent, RepoAdapter, RepoEntry, SearchHit};

/// Files larger than this are cut off when viewed
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
const HIDDEN_DIRS: [&str; 3] = [".git", ".hg", ".svn"];

fn map_io(err: std::io::Error) -> Error {
	match err.kind() {
		ErrorKind::NotFound | ErrorKind::PermissionDenied => Error::NotFound,
		_ => Error::Io(err),
	}
}

/// Validate a client path and split it into plain components
fn relative_components(path: &str) -> CgResult<Vec<&str>> {
	let mut parts = Vec::new();
	for component in Path::new(path.trim_matches('/')).components() {
		match component {
			Component::Normal(part) => {
				let part = part.to_str().ok_or(Error::NotFound)?;
				if HIDDEN_DIRS.contains(&part) {
					return Err(Error::NotFound);
				}
				parts.push(part);
			}
			Component::CurDir => {}
			Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
				return Err(Error::ValidationError("Invalid path".into()));
			}
		}
	}
	Ok(parts)
}

/// Repository-relative path with `/` separators
fn join_rel(base: &str, name: &str) -> String {
	if base.is_empty() { name.to_string() } else { format!("{}/{}", base, name) }
}

#[derive(Debug)]
pub struct RepoAdapterFs {
	root: Box<Path>,
	max_file_size: u64,
}

impl RepoAdapterFs {
	pub async fn new(root: impl AsRef<Path>) -> CgResult<Self> {
		let root = canonicalize(root.as_ref()).await?;
		if !metadata(&root).await?.is_dir() {
			return Err(Error::ConfigError(format!("{} is not a directory", root.display())));
		}
		info!("Serving repository from {}", root.display());
		Ok(Self { root: root.into(), max_file_size: DEFAULT_MAX_FILE_SIZE })
	}

	pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
		self.max_file_size = max_file_size;
		self
	}

	/// Resolve a client path to an existing location below the root
	async fn resolve(&self, path: &str) -> CgResult<(PathBuf, String)> {
		let parts = relative_components(path)?;
		let rel = parts.join("/");
		let joined = parts.iter().fold(self.root.to_path_buf(), |acc, part| acc.join(part));
		let resolved = canonicalize(&joined).await.map_err(map_io)?;
		if !resolved.starts_with(&self.root) {
			warn!("Path escapes repository root: {}", path);
			return Err(Error::NotFound);
		}
		Ok((resolved, rel))
	}
}

#[async_trait]
impl RepoAdapter for RepoAdapterFs {
	async fn browse(&self, path: &str) -> CgResult<Vec<RepoEntry>> {
		let (dir, rel) = self.resolve(path).await?;
		let mut reader = read_dir(&dir).await.map_err(map_io)?;
		let mut entries = Vec::new();

		while let Some(entry) = reader.next_entry().await? {
			let Ok(name) = entry.file_name().into_string() else {
				continue;
			};
			if HIDDEN_DIRS.contains(&name.as_str()) {
				continue;
			}
			// Follows symlinks; dangling links are skipped
			let Ok(meta) = metadata(entry.path()).await else {
				continue;
			};
			let (kind, size) =
				if meta.is_dir() { (EntryKind::Dir, None) } else { (EntryKind::File, Some(meta.len())) };
			entries.push(RepoEntry {
				path: join_rel(&rel, &name).into(),
				name: name.into(),
				kind,
				size,
			});
		}

		// Directories first, then by name
		entries.sort_by(|a, b| {
			(a.kind != EntryKind::Dir, &a.name).cmp(&(b.kind != EntryKind::Dir, &b.name))
		});
		Ok(entries)
	}

	async fn view(&self, path: &str) -> CgResult<FileContent> {
		let (file_path, rel) = self.resolve(path).await?;
		let meta = metadata(&file_path).await.map_err(map_io)?;
		if !meta.is_file() {
			return Err(Error::NotFound);
		}

		let file = File::open(&file_path).await.map_err(map_io)?;
		let mut buf = Vec::new();
		file.take(self.max_file_size).read_to_end(&mut buf).await?;

		let truncated = meta.len() > self.max_file_size;
		if truncated {
			buf.truncate(utf8_boundary(&buf));
		}
		Ok(FileContent {
			path: rel.into(),
			content: String::from_utf8_lossy(&buf).into_owned(),
			size: meta.len(),
			truncated,
		})
	}

	async fn search(&self, query: &str, limit: usize) -> CgResult<Vec<SearchHit>> {
		let mut hits = Vec::new();
		if limit == 0 {
			return Ok(hits);
		}
		let needle = query.to_lowercase();
		// Breadth-first, so shallow matches come first
		let mut pending = std::collections::VecDeque::from([(self.root.to_path_buf(), String::new())]);

		while let Some((dir, rel)) = pending.pop_front() {
			let mut reader = match read_dir(&dir).await {
				Ok(reader) => reader,
				Err(err) => {
					debug!("Skipping unreadable directory {:?}: {}", dir, err);
					continue;
				}
			};
			let mut names = Vec::new();
			while let Some(entry) = reader.next_entry().await? {
				if let Ok(name) = entry.file_name().into_string() {
					names.push((name, entry));
				}
			}
			names.sort_by(|a, b| a.0.cmp(&b.0));

			for (name, entry) in names {
				if HIDDEN_DIRS.contains(&name.as_str()) {
					continue;
				}
				// Do not follow symlinked directories while walking
				let Ok(file_type) = entry.file_type().await else {
					continue;
				};
				let entry_rel = join_rel(&rel, &name);
				if file_type.is_dir() {
					pending.push_back((entry.path(), entry_rel));
				} else if name.to_lowercase().contains(&needle) {
					hits.push(SearchHit { name: name.into(), path: entry_rel.into() });
					if hits.len() >= limit {
						return Ok(hits);
					}
				}
			}
		}
		Ok(hits)
	}
}

/// Length of `buf` without a multibyte character cut off at its end
fn utf8_boundary(buf: &[u8]) -> usize {
	match std::str::from_utf8(buf) {
		Ok(_) => buf.len(),
		// error_len() is None only when the input ends mid-character
		Err(err) if err.error_len().is_none() => err.valid_up_to(),
		Err(_) => buf.len(),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_relative_components() {
		assert_eq!(relative_components("").unwrap(), Vec::<&str>::new());
		assert_eq!(relative_components("/src/lib.rs").unwrap(), vec!["src", "lib.rs"]);
		assert_eq!(relative_components("./src/./main.rs").unwrap(), vec!["src", "main.rs"]);
		assert!(matches!(relative_components("../etc/passwd"), Err(Error::ValidationError(_))));
		assert!(matches!(relative_components("src/../../x"), Err(Error::ValidationError(_))));
		assert!(matches!(relative_components(".git/config"), Err(Error::NotFound)));
	}

	#[test]
	fn test_utf8_boundary() {
		let text = "héllo".as_bytes();
		assert_eq!(utf8_boundary(text), 6);
		// Cut inside the two-byte "é"
		assert_eq!(utf8_boundary(&text[..2]), 1);
		// Invalid bytes before the end are left for lossy decoding
		assert_eq!(utf8_boundary(&[0xff, b'a']), 2);
	}

	#[test]
	fn test_join_rel() {
		assert_eq!(join_rel("", "src"), "src");
		assert_eq!(join_rel("src", "lib.rs"), "src/lib.rs");
	}
}

// vim: ts=4
