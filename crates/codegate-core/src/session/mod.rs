//! Session gate
//!
//! A session is a small record carried by the client inside an encrypted,
//! authenticated cookie. There is no server-side session table: the cookie
//! is the whole session, and verifying it means decrypting it and checking
//! inactivity against the clock.

mod cookie;
mod record;

pub use cookie::{SESSION_COOKIE_NAME, SessionCookie};
pub use record::{SessionDecision, SessionRecord, new_session_id};

// vim: ts=4
