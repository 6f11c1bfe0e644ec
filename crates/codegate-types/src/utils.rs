//! Utility functions

use rand::RngExt;
use sha2::{Digest, Sha256};

pub const ID_LENGTH: usize = 24;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// Random identifier of `len` characters from [`SAFE`], drawn from the thread-local CSPRNG
pub fn random_id_len(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);

	for _ in 0..len {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

pub fn random_id() -> String {
	random_id_len(ID_LENGTH)
}

/// Compares two secrets without short-circuiting on the first mismatch.
///
/// Both sides are hashed first so the comparison time does not depend on
/// the length of the submitted value either.
pub fn secret_eq(a: &str, b: &str) -> bool {
	let a = Sha256::digest(a.as_bytes());
	let b = Sha256::digest(b.as_bytes());

	let mut diff = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		diff |= x ^ y;
	}
	diff == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_random_id() {
		let id = random_id();
		assert_eq!(id.len(), ID_LENGTH);
		assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(id, random_id());
	}

	#[test]
	fn test_secret_eq() {
		assert!(secret_eq("correct horse", "correct horse"));
		assert!(!secret_eq("correct horse", "correct hors"));
		assert!(!secret_eq("correct horse", ""));
		assert!(secret_eq("", ""));
	}
}

// vim: ts=4
