//! API secret generation, hashing, and verification.
//!
//! New hashes are Argon2id PHC strings. Stored bcrypt hashes (`$2a$`, `$2b$`, `$2y$`) still verify.

use argon2::{
	Argon2,
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};

use crate::Result;

pub const DEFAULT_SECRET_LEN: usize = 32;

pub fn generate_secret(len: usize) -> String {
	OsRng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

pub fn hash_secret(secret: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;

	Ok(hash.to_string())
}

/// Constant-time check of `secret` against a stored Argon2 PHC or bcrypt hash. A malformed hash
/// never verifies.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
	if stored_hash.starts_with("$2") {
		return bcrypt::verify(secret, stored_hash).unwrap_or(false);
	}

	let Ok(parsed) = PasswordHash::new(stored_hash) else {
		return false;
	};

	Argon2::default().verify_password(secret.as_bytes(), &parsed).is_ok()
}
