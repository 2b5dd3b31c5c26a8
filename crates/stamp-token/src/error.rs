//! Error types for token issuance and verification.

use thiserror::Error;

/// Errors that can occur while issuing, parsing or verifying a token.
///
/// Every variant is terminal. Callers are expected to treat any of them as
/// "unauthenticated" and may log [`TokenError::kind`] for diagnostics.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The value does not start with the `Bearer ` scheme label.
    #[error("invalid token: missing bearer scheme")]
    Scheme,

    /// The value does not split into exactly three non-empty segments.
    #[error("invalid token: expected 3 non-empty segments, found {segments}")]
    Structure { segments: usize },

    /// A segment is not valid base64.
    #[error("invalid token: {segment} segment is not valid base64: {source}")]
    Encoding {
        segment: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// A segment decoded to bytes that are not the expected JSON shape.
    #[error("invalid token: {segment} segment is malformed: {source}")]
    Format {
        segment: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The recomputed digest does not match the one carried by the token.
    #[error("invalid token: digest mismatch")]
    Integrity,

    /// The token's expiry time is in the past.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },

    /// A header or claim could not be rendered as JSON.
    #[error("failed to serialize token segment: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Coarse classification of a [`TokenError`], stable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenErrorKind {
    Scheme,
    Structure,
    Encoding,
    Format,
    Integrity,
    Expiry,
    Serialization,
}

impl TokenErrorKind {
    /// Short label used in log fields and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenErrorKind::Scheme => "scheme",
            TokenErrorKind::Structure => "structure",
            TokenErrorKind::Encoding => "encoding",
            TokenErrorKind::Format => "format",
            TokenErrorKind::Integrity => "integrity",
            TokenErrorKind::Expiry => "expiry",
            TokenErrorKind::Serialization => "serialization",
        }
    }
}

impl std::fmt::Display for TokenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TokenError {
    pub fn kind(&self) -> TokenErrorKind {
        match self {
            TokenError::Scheme => TokenErrorKind::Scheme,
            TokenError::Structure { .. } => TokenErrorKind::Structure,
            TokenError::Encoding { .. } => TokenErrorKind::Encoding,
            TokenError::Format { .. } => TokenErrorKind::Format,
            TokenError::Integrity => TokenErrorKind::Integrity,
            TokenError::Expired { .. } => TokenErrorKind::Expiry,
            TokenError::Serialization(_) => TokenErrorKind::Serialization,
        }
    }
}

/// Result alias for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors raised while turning a [`crate::config::TokenConfig`] into runtime types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The validity window is not a valid duration string.
    #[error("invalid validity window '{value}': {source}")]
    InvalidValidity {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    /// The validity window does not fit in a signed seconds count.
    #[error("validity window '{0}' is out of range")]
    ValidityOutOfRange(String),

    /// The digest secret is not hex or is empty.
    #[error("invalid digest secret: {0}")]
    InvalidSecret(String),

    /// IO error (reading the secret file).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
