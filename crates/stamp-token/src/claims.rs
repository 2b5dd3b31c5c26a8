//! Token header, claims and the assembled token record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Free-form metadata carried by a claim.
///
/// Keys are kept sorted, which keeps the encoded claim segment stable for a
/// given set of entries.
pub type Meta = serde_json::Map<String, Value>;

/// Scheme label that must prefix a token presented for parsing or verification.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Descriptive algorithm/type tags.
///
/// No algorithm named here is actually applied; the digest is always computed
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    #[serde(deserialize_with = "null_as_default")]
    pub alg: String,

    #[serde(deserialize_with = "null_as_default")]
    pub typ: String,
}

impl Header {
    pub fn new(alg: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            typ: typ.into(),
        }
    }
}

/// The token payload: identity, validity window and metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Claim {
    /// User identity (may be empty).
    #[serde(rename = "usr", deserialize_with = "null_as_default")]
    pub user: String,

    /// Expiry, in epoch seconds.
    #[serde(rename = "exp", deserialize_with = "null_as_default")]
    pub expired_time: i64,

    /// Issuance time, in epoch seconds.
    #[serde(rename = "iat", deserialize_with = "null_as_default")]
    pub issued_time: i64,

    #[serde(rename = "mta", deserialize_with = "null_as_default")]
    pub meta: Meta,
}

impl Claim {
    /// Create claims for a user, leaving timestamps for the lifecycle policy.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    /// Check whether the claim is expired at `now` (epoch seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expired_time < now
    }

    /// Seconds of validity left at `now`, or `None` once expired.
    pub fn remaining_at(&self, now: i64) -> Option<i64> {
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.expired_time - now)
        }
    }
}

/// A header, a claim and the digest stamped over them.
///
/// The digest can only be set by issuing the token or by reading it from the
/// wire; callers never assign it directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Token {
    #[serde(flatten)]
    pub header: Header,

    #[serde(flatten)]
    pub claim: Claim,

    digest: String,
}

impl Token {
    /// Start a draft token from claims, with an empty header.
    pub fn new(claim: Claim) -> Self {
        Self {
            header: Header::default(),
            claim,
            digest: String::new(),
        }
    }

    /// Start a draft token for a user.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self::new(Claim::new(user))
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    pub fn with_issued_time(mut self, issued_time: i64) -> Self {
        self.claim.issued_time = issued_time;
        self
    }

    pub fn with_expired_time(mut self, expired_time: i64) -> Self {
        self.claim.expired_time = expired_time;
        self
    }

    /// Add one metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claim.meta.insert(key.into(), value.into());
        self
    }

    /// The stamped digest; empty for a draft that has not been issued.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub(crate) fn from_parts(header: Header, claim: Claim, digest: String) -> Self {
        Self {
            header,
            claim,
            digest,
        }
    }

    pub(crate) fn stamp(&mut self, digest: String) {
        self.digest = digest;
    }

    /// Prefix a rendered token with the bearer scheme, ready for an
    /// `Authorization` header.
    pub fn bearer(wire: &str) -> String {
        format!("{BEARER_PREFIX}{wire}")
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
