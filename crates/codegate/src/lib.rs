//! codegate puts a single shared password in front of a read-only
//! repository viewer.
//!
//! # Features
//!
//! - Password login with an encrypted, HTTP-only session cookie
//!     - one hour inactivity timeout
//!     - no server-side session table
//! - Sliding-window rate limiting per endpoint, with temporary blocks
//! - Buffered audit trail of every gate decision
//! - Pluggable repository source (`RepoAdapter`) and audit store (`AuditAdapter`)

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from codegate-types
pub use codegate_types::audit_adapter;
pub use codegate_types::error;
pub use codegate_types::repo_adapter;
pub use codegate_types::types;
pub use codegate_types::utils;

pub use codegate_core::audit;
pub use codegate_core::gate;
pub use codegate_core::rate_limit;
pub use codegate_core::session;

// Local modules
pub mod app;
pub mod handler;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder, ServerMode};

// vim: ts=4
