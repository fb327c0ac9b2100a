//! Keyed signatures for QR payload URLs
//!
//! A signature is HMAC-SHA-256 over the code bytes under a shared secret,
//! truncated to six digest bytes and base-32 encoded without padding. It
//! is a one-way authentication tag: the redemption service checks it by
//! recomputation, never by decoding.

use std::fmt;

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Code, RedeemError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Digest bytes kept in the signature tag.
const TAG_BYTES: usize = 6;

/// Secret key material for signing QR payloads.
///
/// Anyone holding the key can forge valid signatures for arbitrary codes,
/// so it must stay confidential. Construct it from injected configuration
/// and pass it explicitly; it is never read from ambient state.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
    weak: bool,
}

impl SigningKey {
    /// Length below which a key counts as weak.
    pub const RECOMMENDED_MIN_LEN: usize = 32;

    pub fn new(material: &[u8]) -> Result<Self> {
        if material.is_empty() {
            return Err(RedeemError::EmptyKey);
        }
        // HMAC-SHA-256 accepts any non-empty key length
        let mac = HmacSha256::new_from_slice(material).map_err(|_| RedeemError::EmptyKey)?;
        Ok(Self {
            mac,
            weak: material.len() < Self::RECOMMENDED_MIN_LEN,
        })
    }

    /// Whether the key is shorter than [`Self::RECOMMENDED_MIN_LEN`].
    pub fn is_weak(&self) -> bool {
        self.weak
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Compute the signature tag for a code.
///
/// Deterministic: identical `(code, key)` inputs always yield the identical
/// tag. The output alphabet is `A-Z2-7`, ten characters for six bytes.
pub fn sign_code(key: &SigningKey, code: &Code) -> String {
    let mut mac = key.mac.clone();
    mac.update(code.as_bytes());
    let digest = mac.finalize().into_bytes();
    BASE32_NOPAD.encode(&digest[..TAG_BYTES])
}

/// Build the verification URL embedded in a QR symbol.
///
/// Codes and tags are drawn from URL-safe alphabets, so no percent
/// encoding is needed.
pub fn verification_url(base_url: &str, code: &Code, signature: &str) -> String {
    format!("{base_url}?p={code}&s={signature}")
}

/// Check a tag by recomputation, comparing in constant time.
pub fn verify_code(key: &SigningKey, code: &Code, signature: &str) -> bool {
    constant_time_eq(sign_code(key, code).as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
