//! HTTP handlers
//!
//! Handlers hand every cookie jar they touch back to axum, including on
//! error paths, so a refreshed or expired session is always written back.

pub mod audit;
pub mod auth;
pub mod repo;

use axum_extra::extract::PrivateCookieJar;

use crate::prelude::*;
use crate::session::SessionRecord;

/// Write the session record, as last verified, back into the jar
pub(crate) fn persist_session(
	app: &App,
	jar: PrivateCookieJar,
	record: Option<&SessionRecord>,
) -> PrivateCookieJar {
	let Some(record) = record else {
		return jar;
	};
	match app.session_cookie.write(jar.clone(), record) {
		Ok(jar) => jar,
		Err(err) => {
			warn!("Cannot encode session cookie: {}", err);
			jar
		}
	}
}

// vim: ts=4
