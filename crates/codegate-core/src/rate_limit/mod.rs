//! Rate Limiting System
//!
//! Sliding-window admission control with a punitive temporary block. Each
//! endpoint category has its own policy; identifiers are the client IP for
//! the login endpoint and `ip:sessionId` for protected endpoints.

mod config;
mod error;
mod extractors;
mod limiter;

pub use config::{EndpointCategory, RateLimitConfig, RateLimitPolicy};
pub use error::RateLimitError;
pub use extractors::extract_client_ip;
pub use limiter::{RateLimitDecision, RateLimitManager, RateLimiterStats};

// vim: ts=4
