//! Shared helpers for the gateway integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use codegate::audit_adapter::{AuditAdapter, AuditEntry, MemoryAuditAdapter};
use codegate::error::{CgResult, Error};
use codegate::repo_adapter::{EntryKind, FileContent, RepoAdapter, RepoEntry, SearchHit};
use codegate::types::{ManualClock, Timestamp};
use codegate::{App, AppBuilder, ServerMode};

pub const PASSWORD: &str = "correct";
pub const START: Timestamp = Timestamp(1_700_000_000_000);

/// In-memory repository with a switch to make every call fail
#[derive(Debug, Default)]
pub struct MockRepo {
	pub failing: AtomicBool,
}

impl MockRepo {
	fn check(&self) -> CgResult<()> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(Error::Internal("upstream unavailable".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl RepoAdapter for MockRepo {
	async fn browse(&self, path: &str) -> CgResult<Vec<RepoEntry>> {
		self.check()?;
		let prefix = if path.is_empty() { String::new() } else { format!("{}/", path) };
		Ok(vec![
			RepoEntry {
				name: "src".into(),
				path: format!("{}src", prefix).into(),
				kind: EntryKind::Dir,
				size: None,
			},
			RepoEntry {
				name: "README.md".into(),
				path: format!("{}README.md", prefix).into(),
				kind: EntryKind::File,
				size: Some(12),
			},
		])
	}

	async fn view(&self, path: &str) -> CgResult<FileContent> {
		self.check()?;
		if path != "README.md" {
			return Err(Error::NotFound);
		}
		Ok(FileContent { path: path.into(), content: "# Hello\n".into(), size: 8, truncated: false })
	}

	async fn search(&self, query: &str, limit: usize) -> CgResult<Vec<SearchHit>> {
		self.check()?;
		Ok(vec![SearchHit { name: format!("{}.rs", query).into(), path: format!("src/{}.rs", query).into() }]
			.into_iter()
			.take(limit)
			.collect())
	}
}

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub clock: Arc<ManualClock>,
	pub audit_store: Arc<MemoryAuditAdapter>,
	pub repo: Arc<MockRepo>,
}

impl TestApp {
	pub fn new() -> Self {
		let clock = Arc::new(ManualClock::new(START));
		let audit_store = Arc::new(MemoryAuditAdapter::new());
		let repo = Arc::new(MockRepo::default());

		let mut builder = AppBuilder::new();
		builder
			.mode(ServerMode::Proxy)
			.access_password(PASSWORD)
			.session_secret("integration test secret")
			.clock(clock.clone())
			.audit_adapter(audit_store.clone())
			.repo_adapter(repo.clone());
		let (app, router) = builder.build().unwrap();

		Self { app, router, clock, audit_store, repo }
	}

	pub async fn send(&self, req: Request<Body>) -> Reply {
		let res = self.router.clone().oneshot(req).await.unwrap();
		let status = res.status();
		let headers = res.headers().clone();
		let bytes = res.into_body().collect().await.unwrap().to_bytes();
		let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
		Reply { status, headers, body }
	}

	pub async fn login(&self, ip: &str, password: Option<&str>) -> Reply {
		let body = match password {
			Some(password) => serde_json::json!({ "password": password }),
			None => serde_json::json!({}),
		};
		let req = Request::builder()
			.method("POST")
			.uri("/api/auth/login")
			.header("content-type", "application/json")
			.header("x-forwarded-for", ip)
			.body(Body::from(body.to_string()))
			.unwrap();
		self.send(req).await
	}

	/// Log in with the right password and return the session cookie
	pub async fn session(&self, ip: &str) -> String {
		let reply = self.login(ip, Some(PASSWORD)).await;
		assert_eq!(reply.status, StatusCode::OK);
		reply.cookie().expect("login sets the session cookie")
	}

	pub async fn get(&self, uri: &str, ip: &str, cookie: Option<&str>) -> Reply {
		self.request("GET", uri, ip, cookie).await
	}

	pub async fn request(&self, method: &str, uri: &str, ip: &str, cookie: Option<&str>) -> Reply {
		let mut req = Request::builder().method(method).uri(uri).header("x-forwarded-for", ip);
		if let Some(cookie) = cookie {
			req = req.header(header::COOKIE, cookie);
		}
		self.send(req.body(Body::empty()).unwrap()).await
	}

	/// Everything recorded so far, after forcing a flush
	pub async fn audit_entries(&self) -> Vec<AuditEntry> {
		self.app.audit.flush().await.unwrap();
		self.audit_store.read_entries().await.unwrap()
	}
}

pub struct Reply {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: serde_json::Value,
}

impl Reply {
	pub fn set_cookie(&self) -> Option<&str> {
		self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
	}

	/// The `name=value` pair of the Set-Cookie header, ready for a Cookie header
	pub fn cookie(&self) -> Option<String> {
		self.set_cookie().and_then(|c| c.split(';').next()).map(str::to_string)
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

// vim: ts=4
