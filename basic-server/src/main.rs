//! Runs the codegate gateway over a local repository checkout.
//!
//! Configuration comes from the environment:
//!
//! | Variable          | Default          |                                        |
//! |-------------------|------------------|----------------------------------------|
//! | `LISTEN`          | `127.0.0.1:3000` | listen address                         |
//! | `SERVER_MODE`     | `standalone`     | `standalone` or `proxy`                |
//! | `ACCESS_PASSWORD` |                  | required                               |
//! | `SESSION_SECRET`  |                  | required                               |
//! | `DATA_DIR`        | `./data`         | holds `audit.json`                     |
//! | `REPO_DIR`        | `.`              | repository served read-only            |
//! | `DEV_MODE`        | off              | `1`/`true` drops the cookie Secure flag |

use std::path::PathBuf;
use std::process::ExitCode;
use std::{env, sync::Arc};

use codegate::error::{CgResult, Error};
use codegate::{AppBuilder, ServerMode};
use codegate_audit_adapter_fs::AuditAdapterFs;
use codegate_repo_adapter_fs::RepoAdapterFs;
use tracing::{error, info};

pub struct Config {
	pub listen: String,
	pub mode: ServerMode,
	pub access_password: String,
	pub session_secret: String,
	pub data_dir: PathBuf,
	pub repo_dir: PathBuf,
	pub dev_mode: bool,
}

fn required(name: &str) -> CgResult<String> {
	match env::var(name) {
		Ok(value) if !value.is_empty() => Ok(value),
		_ => Err(Error::ConfigError(format!("{} must be set", name))),
	}
}

impl Config {
	fn from_env() -> CgResult<Self> {
		let mode = match env::var("SERVER_MODE").as_deref() {
			Ok("proxy") => ServerMode::Proxy,
			Ok("standalone") | Err(_) => ServerMode::Standalone,
			Ok(other) => return Err(Error::ConfigError(format!("unknown SERVER_MODE: {}", other))),
		};
		Ok(Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
			mode,
			access_password: required("ACCESS_PASSWORD")?,
			session_secret: required("SESSION_SECRET")?,
			data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string())),
			repo_dir: PathBuf::from(env::var("REPO_DIR").unwrap_or_else(|_| ".".to_string())),
			dev_mode: matches!(env::var("DEV_MODE").as_deref(), Ok("1" | "true")),
		})
	}
}

async fn run(mut builder: AppBuilder) -> CgResult<()> {
	let config = Config::from_env()?;

	let audit_adapter = AuditAdapterFs::new(config.data_dir.join("audit.json").into()).await?;
	let repo_adapter = RepoAdapterFs::new(&config.repo_dir).await?;
	info!(audit_log = %audit_adapter.path().display(), repo = %config.repo_dir.display(), "Adapters ready");

	builder
		.mode(config.mode)
		.listen(config.listen)
		.access_password(config.access_password)
		.session_secret(config.session_secret)
		.secure_cookies(!config.dev_mode)
		.audit_adapter(Arc::new(audit_adapter))
		.repo_adapter(Arc::new(repo_adapter));

	builder.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
	let builder = AppBuilder::new();
	match run(builder).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("FATAL: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
