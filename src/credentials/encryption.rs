//! AES-256-GCM sealing for serialized credential records.
//!
//! A sealed value is a single string `enc:v1:{nonce}:{ciphertext}` (both
//! base64) so it fits any string key-value backend.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Size of the encryption key in bytes (256 bits)
const KEY_SIZE: usize = 32;

/// Size of the nonce in bytes (96 bits, standard for GCM)
const NONCE_SIZE: usize = 12;

/// Marker prefix of sealed values
const SEALED_PREFIX: &str = "enc:v1:";

/// Validates that the master key is exactly 32 bytes when base64 decoded.
pub fn validate_key(key_base64: &str) -> Result<Vec<u8>> {
    let key_bytes = BASE64
        .decode(key_base64.trim())
        .context("Failed to decode base64 encryption key")?;

    if key_bytes.len() != KEY_SIZE {
        return Err(anyhow!(
            "Encryption key must be {} bytes (256 bits), got {} bytes",
            KEY_SIZE,
            key_bytes.len()
        ));
    }

    Ok(key_bytes)
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
pub fn seal(plaintext: &str, key: &[u8]) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    Ok(format!(
        "{}{}:{}",
        SEALED_PREFIX,
        BASE64.encode(nonce),
        BASE64.encode(ciphertext)
    ))
}

/// Decrypts a value produced by [`seal`].
///
/// Fails on a missing prefix, wrong key, or any tampering.
pub fn open(sealed: &str, key: &[u8]) -> Result<String> {
    let body = sealed
        .strip_prefix(SEALED_PREFIX)
        .ok_or_else(|| anyhow!("Value is not sealed"))?;
    let (nonce, ciphertext) = body
        .split_once(':')
        .ok_or_else(|| anyhow!("Sealed value is malformed"))?;

    let nonce_bytes = BASE64.decode(nonce).context("Failed to decode nonce")?;
    let ciphertext_bytes = BASE64
        .decode(ciphertext)
        .context("Failed to decode ciphertext")?;

    if nonce_bytes.len() != NONCE_SIZE {
        return Err(anyhow!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext_bytes.as_ref())
        .map_err(|e| anyhow!("Decryption failed (wrong key or corrupted data): {}", e))?;

    String::from_utf8(plaintext).context("Decrypted data is not valid UTF-8")
}
