// ============================================
// File: crates/securetalk-core/src/crypto/seal.rs
// ============================================
//! # Message Sealing
//!
//! ## Creation Reason
//! Turns UTF-8 chat text into self-describing encrypted blobs that survive
//! any byte- or text-oriented channel, and turns blobs back into text with
//! tampering detected rather than silently misread.
//!
//! ## Main Functionality
//! - `encrypt`: seal text under the shared key with a fresh random nonce
//! - `decrypt`: authenticate and open a blob, with structural checks first
//!
//! ## Blob Format
//! ```text
//! base64( ┌──────────────────┬───────────────────────────────┐
//!         │ Nonce (16 bytes) │ Ciphertext + Tag (≥ 16 bytes) │
//!         └──────────────────┴───────────────────────────────┘ )
//! ```
//! Decoded length is therefore at least 32 bytes even for an empty
//! message; anything shorter is rejected before the AEAD runs.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never reuse a (key, nonce) pair - catastrophic security failure
//! - A tag failure MUST stay an opaque error; do not attach detail that
//!   distinguishes tampering from a wrong key
//!
//! ## Last Modified
//! v0.1.0 - Initial sealing implementation

use ascon_aead::aead::{Aead, KeyInit};
use ascon_aead::{Ascon128, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CoreError, Result};

use super::keys::SharedKey;
use super::{MIN_BLOB_SIZE, NONCE_SIZE};

// ============================================
// Encryption
// ============================================

/// Encrypts UTF-8 text into a base64 blob of `nonce || ciphertext+tag`.
///
/// A fresh 16-byte nonce is drawn from the OS random number generator for
/// every call. Uniqueness under the shared key is probabilistic, not
/// enforced: with a 128-bit nonce the collision risk is negligible for any
/// realistic session length, but it is a statistical guarantee, not a
/// structural one.
///
/// # Arguments
/// * `key` - The pre-shared session key
/// * `plaintext` - Message text (empty string is valid)
///
/// # Errors
/// - `Encryption` if the AEAD seal fails (does not happen with valid
///   inputs; surfaced rather than swallowed)
pub fn encrypt(key: &SharedKey, plaintext: &str) -> Result<String> {
    let cipher = Ascon128::new(Key::<Ascon128>::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::<Ascon128>::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CoreError::encryption("ASCON-128 seal failed"))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&sealed);

    Ok(BASE64.encode(blob))
}

// ============================================
// Decryption
// ============================================

/// Decrypts a base64 blob back into the original UTF-8 text.
///
/// Structural checks run before any cryptography: the base64 must decode
/// and the decoded length must reach the 32-byte nonce+tag floor. Only then
/// is the AEAD opened.
///
/// # Arguments
/// * `key` - The pre-shared session key
/// * `blob` - Base64 text produced by [`encrypt`]
///
/// # Errors
/// - `MalformedBlob` for bad base64, a sub-floor decoded length, or
///   plaintext that is not valid UTF-8
/// - `Authentication` if the tag does not verify (tampered, corrupted, or
///   wrong key). No partial plaintext is ever returned.
pub fn decrypt(key: &SharedKey, blob: &str) -> Result<String> {
    let decoded = BASE64
        .decode(blob.trim())
        .map_err(|e| CoreError::malformed(format!("invalid base64: {e}")))?;

    if decoded.len() < MIN_BLOB_SIZE {
        return Err(CoreError::malformed(format!(
            "decoded length {} below the {}-byte nonce+tag floor",
            decoded.len(),
            MIN_BLOB_SIZE
        )));
    }

    let (nonce_bytes, sealed) = decoded.split_at(NONCE_SIZE);
    let cipher = Ascon128::new(Key::<Ascon128>::from_slice(key.as_bytes()));

    let plaintext = cipher
        .decrypt(Nonce::<Ascon128>::from_slice(nonce_bytes), sealed)
        .map_err(|_| CoreError::Authentication)?;

    String::from_utf8(plaintext).map_err(|_| CoreError::malformed("plaintext is not valid UTF-8"))
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::super::TAG_SIZE;
    use super::*;

    fn test_key() -> SharedKey {
        SharedKey::from_bytes([0x42u8; 16])
    }

    #[test]
    fn test_roundtrip() {
        let key = test_key();
        let blob = encrypt(&key, "hello").unwrap();
        assert_eq!(decrypt(&key, &blob).unwrap(), "hello");
    }

    #[test]
    fn test_roundtrip_empty_string() {
        let key = test_key();
        let blob = encrypt(&key, "").unwrap();

        // Even an empty message decodes to nonce + tag.
        let decoded = BASE64.decode(&blob).unwrap();
        assert_eq!(decoded.len(), MIN_BLOB_SIZE);

        assert_eq!(decrypt(&key, &blob).unwrap(), "");
    }

    #[test]
    fn test_roundtrip_multibyte_code_points() {
        let key = test_key();
        let text = "héllo wörld 你好 🔐";
        let blob = encrypt(&key, text).unwrap();
        assert_eq!(decrypt(&key, &blob).unwrap(), text);
    }

    #[test]
    fn test_nonces_are_fresh_per_call() {
        let key = test_key();
        let a = BASE64.decode(encrypt(&key, "same text").unwrap()).unwrap();
        let b = BASE64.decode(encrypt(&key, "same text").unwrap()).unwrap();

        assert_ne!(&a[..NONCE_SIZE], &b[..NONCE_SIZE]);
        // Different nonce means different ciphertext too.
        assert_ne!(&a[NONCE_SIZE..], &b[NONCE_SIZE..]);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = encrypt(&test_key(), "hello").unwrap();
        let other = SharedKey::from_bytes([0x43u8; 16]);

        let result = decrypt(&other, &blob);
        assert!(matches!(result, Err(CoreError::Authentication)));
    }

    #[test]
    fn test_any_single_byte_flip_fails_authentication() {
        let key = test_key();
        let blob = encrypt(&key, "tamper target").unwrap();
        let decoded = BASE64.decode(&blob).unwrap();

        // Flip every ciphertext/tag byte position in turn; each corruption
        // must fail closed, never return altered plaintext.
        for i in NONCE_SIZE..decoded.len() {
            let mut corrupted = decoded.clone();
            corrupted[i] ^= 0x01;
            let result = decrypt(&key, &BASE64.encode(&corrupted));
            assert!(
                matches!(result, Err(CoreError::Authentication)),
                "flip at byte {i} was not detected"
            );
        }
    }

    #[test]
    fn test_tampered_nonce_fails_authentication() {
        let key = test_key();
        let blob = encrypt(&key, "hello").unwrap();
        let mut decoded = BASE64.decode(&blob).unwrap();

        decoded[0] ^= 0xFF;
        let result = decrypt(&key, &BASE64.encode(&decoded));
        assert!(matches!(result, Err(CoreError::Authentication)));
    }

    #[test]
    fn test_blob_below_floor_rejected_before_aead() {
        let key = test_key();

        // 31 decoded bytes: one short of nonce + tag.
        let short = BASE64.encode([0u8; MIN_BLOB_SIZE - 1]);
        let result = decrypt(&key, &short);
        assert!(matches!(result, Err(CoreError::MalformedBlob { .. })));

        // Exactly at the floor the structural check passes and the AEAD
        // takes over (and fails on garbage).
        let at_floor = BASE64.encode([0u8; MIN_BLOB_SIZE]);
        let result = decrypt(&key, &at_floor);
        assert!(matches!(result, Err(CoreError::Authentication)));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let result = decrypt(&test_key(), "not base64 at all!!!");
        assert!(matches!(result, Err(CoreError::MalformedBlob { .. })));
    }

    #[test]
    fn test_blob_overhead_is_nonce_plus_tag() {
        let key = test_key();
        let text = "sized";
        let decoded = BASE64.decode(encrypt(&key, text).unwrap()).unwrap();
        assert_eq!(decoded.len(), NONCE_SIZE + text.len() + TAG_SIZE);
    }
}
