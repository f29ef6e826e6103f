//! Client secret generation and verification.
//!
//! # Security
//!
//! - Generated secrets are 256-bit random values (32 bytes)
//! - Verification compares SHA-256 digests of both inputs, so the
//!   comparison always runs over fixed-length values and its timing does
//!   not depend on where or whether the secrets differ

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a new cryptographically secure client secret.
///
/// The secret is a 256-bit (32 bytes) random value encoded as
/// hexadecimal (64 characters).
///
/// # Example
///
/// ```
/// use brainstorm_auth::secret::generate_client_secret;
///
/// let secret = generate_client_secret();
/// assert_eq!(secret.len(), 64);
/// ```
#[must_use]
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// Verify a presented secret against the registered one in constant time.
///
/// Both values are hashed with SHA-256 before comparison; the digests
/// have fixed length, so no early exit correlates with the position of a
/// mismatch in the original secrets.
#[must_use]
pub fn verify_secret(presented: &str, registered: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let registered = Sha256::digest(registered.as_bytes());
    presented == registered
}
