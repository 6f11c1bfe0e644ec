//! App state type

use std::sync::Arc;
use std::time::Duration;

use codegate_types::repo_adapter::RepoAdapter;
use codegate_types::types::Clock;

use crate::audit::{AuditConfig, AuditLog};
use crate::rate_limit::{RateLimitConfig, RateLimitManager};
use crate::session::SessionCookie;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
	/// Clients connect directly; the peer address identifies them
	Standalone,
	/// Behind a reverse proxy; forwarding headers identify clients
	Proxy,
}

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub clock: Arc<dyn Clock>,
	pub session_cookie: SessionCookie,

	pub rate_limiter: Arc<RateLimitManager>,
	pub audit: Arc<AuditLog>,

	pub repo_adapter: Arc<dyn RepoAdapter>,
}

pub type App = Arc<AppState>;

pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	/// The single shared access password
	pub access_password: Box<str>,
	/// Secret the session cookie key is derived from
	pub session_secret: Box<str>,
	/// Secure attribute on the session cookie; off only for development
	pub secure_cookies: bool,
	pub inactivity_limit: Duration,
	/// Upper bound on hits returned by a repository search
	pub search_limit: usize,
	pub rate_limit: RateLimitConfig,
	pub audit: AuditConfig,
}

impl std::fmt::Debug for AppBuilderOpts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppBuilderOpts")
			.field("mode", &self.mode)
			.field("listen", &self.listen)
			.field("access_password", &"<redacted>")
			.field("session_secret", &"<redacted>")
			.field("secure_cookies", &self.secure_cookies)
			.field("inactivity_limit", &self.inactivity_limit)
			.field("search_limit", &self.search_limit)
			.field("rate_limit", &self.rate_limit)
			.field("audit", &self.audit)
			.finish()
	}
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			mode: ServerMode::Standalone,
			listen: "127.0.0.1:3000".into(),
			access_password: "".into(),
			session_secret: "".into(),
			secure_cookies: true,
			inactivity_limit: Duration::from_secs(60 * 60),
			search_limit: 50,
			rate_limit: RateLimitConfig::default(),
			audit: AuditConfig::default(),
		}
	}
}

// vim: ts=4
