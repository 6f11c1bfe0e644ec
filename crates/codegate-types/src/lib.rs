//! Shared types, adapter traits, and core utilities for the codegate gateway.
//!
//! This crate contains the foundational types that are shared between the
//! core crate, the HTTP crate and all adapter implementations.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod audit_adapter;
pub mod error;
pub mod prelude;
pub mod repo_adapter;
pub mod types;
pub mod utils;

// vim: ts=4
