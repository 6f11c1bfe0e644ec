//! App builder - constructs and runs the codegate application

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

use crate::audit_adapter::{AuditAdapter, MemoryAuditAdapter};
use crate::prelude::*;
use crate::repo_adapter::RepoAdapter;
use crate::routes;
use crate::types::SystemClock;
use codegate_core::audit::{AuditConfig, AuditLog};
use codegate_core::rate_limit::{RateLimitConfig, RateLimitManager};
use codegate_core::session::SessionCookie;

pub use codegate_core::app::{App, AppBuilderOpts, AppState, ServerMode, VERSION};

pub struct AppBuilder {
	opts: AppBuilderOpts,
	clock: Option<Arc<dyn Clock>>,
	audit_adapter: Option<Arc<dyn AuditAdapter>>,
	repo_adapter: Option<Arc<dyn RepoAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Several apps may be built in one process (tests); only the first installs the subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			clock: None,
			audit_adapter: None,
			repo_adapter: None,
		}
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn access_password(&mut self, access_password: impl Into<Box<str>>) -> &mut Self {
		self.opts.access_password = access_password.into();
		self
	}
	pub fn session_secret(&mut self, session_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.session_secret = session_secret.into();
		self
	}
	pub fn secure_cookies(&mut self, secure: bool) -> &mut Self {
		self.opts.secure_cookies = secure;
		self
	}
	pub fn inactivity_limit(&mut self, limit: Duration) -> &mut Self {
		self.opts.inactivity_limit = limit;
		self
	}
	pub fn search_limit(&mut self, limit: usize) -> &mut Self {
		self.opts.search_limit = limit;
		self
	}
	pub fn rate_limit(&mut self, config: RateLimitConfig) -> &mut Self {
		self.opts.rate_limit = config;
		self
	}
	pub fn audit(&mut self, config: AuditConfig) -> &mut Self {
		self.opts.audit = config;
		self
	}
	pub fn clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
		self.clock = Some(clock);
		self
	}

	// Adapters
	pub fn audit_adapter(&mut self, audit_adapter: Arc<dyn AuditAdapter>) -> &mut Self {
		self.audit_adapter = Some(audit_adapter);
		self
	}
	pub fn repo_adapter(&mut self, repo_adapter: Arc<dyn RepoAdapter>) -> &mut Self {
		self.repo_adapter = Some(repo_adapter);
		self
	}

	/// Validate the configuration and assemble the app and its router
	pub fn build(self) -> CgResult<(App, Router)> {
		if self.opts.access_password.is_empty() {
			error!("FATAL: No access password configured");
			return Err(Error::ConfigError("access password must not be empty".into()));
		}
		let session_cookie =
			SessionCookie::new(&self.opts.session_secret, self.opts.secure_cookies).inspect_err(|e| {
				error!("FATAL: Invalid session secret: {}", e);
			})?;
		self.opts.rate_limit.validate().map_err(|e| {
			error!("FATAL: {}", e);
			Error::from(e)
		})?;
		if self.opts.rate_limit.sweep_interval.is_zero() {
			return Err(Error::ConfigError("rate limit sweep interval must be non-zero".into()));
		}
		self.opts.audit.validate()?;
		if !self.opts.secure_cookies {
			warn!("Session cookies are sent without the Secure attribute (development mode)");
		}

		let Some(repo_adapter) = self.repo_adapter else {
			error!("FATAL: No repository adapter configured");
			return Err(Error::ConfigError("No repository adapter configured".into()));
		};
		let audit_adapter: Arc<dyn AuditAdapter> = match self.audit_adapter {
			Some(adapter) => adapter,
			None => {
				warn!("No audit adapter configured, audit trail is kept in memory only");
				Arc::new(MemoryAuditAdapter::new())
			}
		};
		let clock: Arc<dyn Clock> = match self.clock {
			Some(clock) => clock,
			None => Arc::new(SystemClock),
		};

		let app: App = Arc::new(AppState {
			clock: clock.clone(),
			session_cookie,
			rate_limiter: Arc::new(RateLimitManager::new(self.opts.rate_limit.clone(), clock.clone())),
			audit: Arc::new(AuditLog::new(audit_adapter, clock, self.opts.audit.clone())),
			repo_adapter,
			opts: self.opts,
		});
		let router = routes::init(app.clone());

		Ok((app, router))
	}

	pub async fn run(self) -> CgResult<()> {
		info!("codegate V{}", VERSION);

		let (app, router) = self.build()?;
		debug!("Options: {:?}", app.opts);
		let tasks = spawn_background_tasks(&app);

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			e
		})?;
		info!("Listening on {} ({:?} mode)", app.opts.listen, app.opts.mode);

		let served =
			axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
				.with_graceful_shutdown(shutdown_signal())
				.await;

		for task in tasks {
			task.abort();
		}
		app.audit.shutdown().await;
		info!("Stopped");

		served.map_err(Error::from)
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Start the rate limit sweeper and the periodic audit flush
pub fn spawn_background_tasks(app: &App) -> Vec<JoinHandle<()>> {
	let limiter = app.rate_limiter.clone();
	let sweep_interval = limiter.config().sweep_interval;
	let sweeper = tokio::spawn(async move {
		loop {
			tokio::time::sleep(sweep_interval).await;
			let removed = limiter.sweep();
			let stats = limiter.stats();
			debug!(
				"Rate limiter: {} removed, {} tracked, {} blocked",
				removed, stats.tracked_entries, stats.active_blocks
			);
		}
	});

	vec![sweeper, app.audit.spawn_flush_timer()]
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => info!("Shutdown signal received"),
		Err(e) => {
			error!("Cannot listen for shutdown signal: {}", e);
			std::future::pending::<()>().await;
		}
	}
}

// vim: ts=4
