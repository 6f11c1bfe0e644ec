//! Session cookie codec
//!
//! The record is serialized to JSON and stored in a private cookie
//! (AES-256-GCM via `axum_extra`'s `PrivateCookieJar`), so clients can
//! neither read nor forge it. The cookie key is derived from the configured
//! session secret.

use axum::http::HeaderMap;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use sha2::{Digest, Sha512};

use super::record::SessionRecord;
use crate::prelude::*;

pub const SESSION_COOKIE_NAME: &str = "codegate_session";
const SESSION_COOKIE_MAX_AGE: time::Duration = time::Duration::hours(1);

#[derive(Clone)]
pub struct SessionCookie {
	key: Key,
	secure: bool,
}

impl std::fmt::Debug for SessionCookie {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionCookie").field("secure", &self.secure).finish_non_exhaustive()
	}
}

impl SessionCookie {
	/// `secure` sets the cookie's Secure attribute; off only in development
	pub fn new(secret: &str, secure: bool) -> CgResult<Self> {
		if secret.is_empty() {
			return Err(Error::ConfigError("session secret must not be empty".into()));
		}
		let digest = Sha512::digest(secret.as_bytes());
		let key = Key::try_from(&digest[..])
			.map_err(|_| Error::ConfigError("cannot derive session cookie key".into()))?;
		Ok(Self { key, secure })
	}

	pub fn jar(&self, headers: &HeaderMap) -> PrivateCookieJar {
		PrivateCookieJar::from_headers(headers, self.key.clone())
	}

	/// Decrypt and decode the session record, if the request carries a valid one
	pub fn read(&self, jar: &PrivateCookieJar) -> Option<SessionRecord> {
		let cookie = jar.get(SESSION_COOKIE_NAME)?;
		match serde_json::from_str(cookie.value()) {
			Ok(record) => Some(record),
			Err(err) => {
				debug!("Discarding undecodable session cookie: {}", err);
				None
			}
		}
	}

	pub fn write(&self, jar: PrivateCookieJar, record: &SessionRecord) -> CgResult<PrivateCookieJar> {
		let value = serde_json::to_string(record)?;
		let cookie = Cookie::build((SESSION_COOKIE_NAME, value))
			.http_only(true)
			.secure(self.secure)
			.same_site(SameSite::Lax)
			.path("/")
			.max_age(SESSION_COOKIE_MAX_AGE)
			.build();
		Ok(jar.add(cookie))
	}

	pub fn clear(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
		jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::header;
	use axum::response::IntoResponse;

	/// Turn the jar's Set-Cookie output into a request Cookie header
	fn round_trip_headers(jar: PrivateCookieJar) -> (HeaderMap, String) {
		let res = jar.into_response();
		let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
		let pair = set_cookie.split(';').next().unwrap().to_string();

		let mut headers = HeaderMap::new();
		headers.insert(header::COOKIE, pair.parse().unwrap());
		(headers, set_cookie)
	}

	#[test]
	fn test_write_then_read() {
		let codec = SessionCookie::new("a secret of reasonable length", true).unwrap();
		let record = SessionRecord::new(Timestamp(42));

		let jar = codec.write(codec.jar(&HeaderMap::new()), &record).unwrap();
		let (headers, set_cookie) = round_trip_headers(jar);

		assert!(set_cookie.starts_with("codegate_session="));
		assert!(set_cookie.contains("HttpOnly"));
		assert!(set_cookie.contains("Secure"));
		assert!(set_cookie.contains("SameSite=Lax"));
		assert!(set_cookie.contains("Path=/"));
		assert!(set_cookie.contains("Max-Age=3600"));
		// Encrypted: the session id is not visible to the client
		assert!(!set_cookie.contains(&*record.session_id));

		assert_eq!(codec.read(&codec.jar(&headers)), Some(record));
	}

	#[test]
	fn test_other_secret_cannot_read() {
		let codec = SessionCookie::new("first secret", false).unwrap();
		let other = SessionCookie::new("second secret", false).unwrap();

		let jar = codec.write(codec.jar(&HeaderMap::new()), &SessionRecord::new(Timestamp(1))).unwrap();
		let (headers, set_cookie) = round_trip_headers(jar);

		assert!(!set_cookie.contains("Secure"));
		assert_eq!(other.read(&other.jar(&headers)), None);
	}

	#[test]
	fn test_tampered_cookie_rejected() {
		let codec = SessionCookie::new("secret", true).unwrap();
		let mut headers = HeaderMap::new();
		headers.insert(header::COOKIE, "codegate_session=bm90LWVuY3J5cHRlZA".parse().unwrap());

		assert_eq!(codec.read(&codec.jar(&headers)), None);
	}

	#[test]
	fn test_empty_secret_rejected() {
		assert!(matches!(SessionCookie::new("", true), Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
