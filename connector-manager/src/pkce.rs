//! PKCE (RFC 7636) verifier and S256 challenge.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use linkhub::oauth::generate_token;
use sha2::{Digest, Sha256};

/// Verifier entropy in bytes; encodes to 43 characters, the RFC minimum
const VERIFIER_BYTES: usize = 32;

/// Generates a fresh code verifier.
pub fn generate_verifier() -> String {
    generate_token(VERIFIER_BYTES)
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
