//! Core of the codegate gateway.
//!
//! Admission control (sliding-window rate limiting with temporary blocks),
//! the password session gate, and the buffered audit trail that records
//! every gate decision. The HTTP surface lives in the `codegate` crate.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod audit;
pub mod extract;
pub mod gate;
pub mod prelude;
pub mod rate_limit;
pub mod session;

pub use app::{App, AppBuilderOpts, AppState, ServerMode};
pub use extract::{ClientIp, SessionJar};

// vim: ts=4
