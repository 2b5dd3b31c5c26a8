//! Digest engine.
//!
//! The digest covers `header + claim + header + claim`, where both parts are
//! the base64 segment text exactly as it appears on the wire. By default it is
//! a plain SHA-256 with no key material: it detects tokens altered in transit
//! but anyone who can compute SHA-256 can mint a matching digest.
//!
//! A [`DigestKey`] switches the same input over to HMAC-SHA-256 with a
//! server-held secret. This is an opt-in strengthening; the output format
//! (64 lowercase hex characters) does not change.

use crate::error::ConfigError;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of a rendered digest, in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Size of a freshly generated secret, in bytes.
const GENERATED_SECRET_LEN: usize = 32;

/// Compute the unkeyed digest over a header and claim segment.
pub fn compute_digest(header_segment: &str, claim_segment: &str) -> String {
    let mut hasher = Sha256::new();
    feed(&mut hasher, header_segment, claim_segment);
    hex::encode(hasher.finalize())
}

/// Compare a recomputed digest with the one read from the wire.
pub fn digests_match(expected: &str, provided: &str) -> bool {
    constant_time_eq(expected.as_bytes(), provided.as_bytes())
}

fn feed<D: Digest>(hasher: &mut D, header_segment: &str, claim_segment: &str) {
    for _ in 0..2 {
        hasher.update(header_segment.as_bytes());
        hasher.update(claim_segment.as_bytes());
    }
}

/// A server-held secret for the keyed digest.
#[derive(Clone)]
pub struct DigestKey {
    secret: Vec<u8>,
    mac: HmacSha256,
}

impl std::fmt::Debug for DigestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestKey").finish_non_exhaustive()
    }
}

impl DigestKey {
    /// Generate a new random secret.
    pub fn generate() -> Result<Self, ConfigError> {
        let mut rng = rand::rng();
        let mut bytes = [0u8; GENERATED_SECRET_LEN];
        rng.fill_bytes(&mut bytes);

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Err(ConfigError::InvalidSecret("secret is empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(bytes)
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;
        Ok(Self {
            secret: bytes.to_vec(),
            mac,
        })
    }

    /// Load a secret from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(hex.trim())
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The secret as a hex string, for storage.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.secret)
    }

    fn compute(&self, header_segment: &str, claim_segment: &str) -> String {
        let mut mac = self.mac.clone();
        for _ in 0..2 {
            mac.update(header_segment.as_bytes());
            mac.update(claim_segment.as_bytes());
        }
        hex::encode(mac.finalize().into_bytes())
    }
}

/// How digests are computed for a given issuer or verifier.
#[derive(Debug, Clone, Default)]
pub enum DigestMode {
    /// Plain SHA-256, no key material.
    #[default]
    Unkeyed,
    /// HMAC-SHA-256 with a server-held secret.
    Keyed(DigestKey),
}

impl DigestMode {
    pub fn compute(&self, header_segment: &str, claim_segment: &str) -> String {
        match self {
            DigestMode::Unkeyed => compute_digest(header_segment, claim_segment),
            DigestMode::Keyed(key) => key.compute(header_segment, claim_segment),
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, DigestMode::Keyed(_))
    }
}
