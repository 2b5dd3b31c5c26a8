//! Token issuance, parsing and verification.

use crate::claims::{BEARER_PREFIX, Claim, Header, Token};
use crate::codec;
use crate::digest::{DigestMode, digests_match};
use crate::error::{Result, TokenError};
use crate::lifecycle::{Clock, LifecyclePolicy, SystemClock};
use serde::Serialize;

/// Issues tokens: fills defaults, encodes and stamps the digest.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<C: Clock = SystemClock> {
    policy: LifecyclePolicy,
    digest: DigestMode,
    clock: C,
}

impl TokenIssuer {
    /// Create an issuer with the default policy, unkeyed digest and wall clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> TokenIssuer<C> {
    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_digest(mut self, digest: DigestMode) -> Self {
        self.digest = digest;
        self
    }

    /// Swap the time source, e.g. for a [`crate::FixedClock`] in tests.
    pub fn with_clock<K: Clock>(self, clock: K) -> TokenIssuer<K> {
        TokenIssuer {
            policy: self.policy,
            digest: self.digest,
            clock,
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Issue a draft token.
    ///
    /// The draft is normalized in place and the computed digest is stamped
    /// into it. Returns `header.claim.digest` without the bearer prefix.
    pub fn issue(&self, token: &mut Token) -> Result<String> {
        self.policy.normalize(token, self.clock.now());

        let header = codec::encode_segment(&token.header)?;
        let claim = codec::encode_segment(&token.claim)?;
        let digest = self.digest.compute(&header, &claim);
        let wire = codec::render(&header, &claim, &digest);
        token.stamp(digest);

        tracing::debug!(
            user = %token.claim.user,
            issued_at = token.claim.issued_time,
            expires_at = token.claim.expired_time,
            keyed = self.digest.is_keyed(),
            "Issued token"
        );

        Ok(wire)
    }
}

/// Verifies presented tokens against their digest and expiry.
#[derive(Debug, Clone, Default)]
pub struct TokenVerifier<C: Clock = SystemClock> {
    digest: DigestMode,
    clock: C,
}

impl TokenVerifier {
    /// Create a verifier for unkeyed digests using the wall clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> TokenVerifier<C> {
    pub fn with_digest(mut self, digest: DigestMode) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_clock<K: Clock>(self, clock: K) -> TokenVerifier<K> {
        TokenVerifier {
            digest: self.digest,
            clock,
        }
    }

    /// Decode a bearer value without checking its digest or expiry.
    pub fn parse(&self, value: &str) -> Result<Token> {
        parse(value)
    }

    /// Verify a bearer value and return the decoded token.
    ///
    /// Checks, in order: the scheme label, the segment structure, the digest
    /// over the raw header and claim segments, the segment contents and
    /// finally the expiry.
    pub fn verify(&self, value: &str) -> Result<Token> {
        self.check(value).inspect_err(|e| {
            tracing::debug!(kind = %e.kind(), error = %e, "Token rejected");
        })
    }

    fn check(&self, value: &str) -> Result<Token> {
        let [header, claim, digest] = codec::split(codec::strip_scheme(value)?)?;

        let expected = self.digest.compute(header, claim);
        if !digests_match(&expected, digest) {
            return Err(TokenError::Integrity);
        }

        let token = parse(value)?;

        let now = self.clock.now();
        if token.claim.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: token.claim.expired_time,
            });
        }

        tracing::debug!(
            user = %token.claim.user,
            expires_at = token.claim.expired_time,
            "Verified token"
        );

        Ok(token)
    }

    /// Decode a token for diagnostics, reporting digest and expiry status
    /// instead of failing on them.
    ///
    /// The bearer prefix is optional here.
    pub fn inspect(&self, value: &str) -> Result<TokenInspection> {
        let wire = value.strip_prefix(BEARER_PREFIX).unwrap_or(value);
        let [header_segment, claim_segment, digest] = codec::split(wire)?;

        let header = codec::decode_header(header_segment)?;
        let claim = codec::decode_claim(claim_segment)?;
        let expected = self.digest.compute(header_segment, claim_segment);
        let now = self.clock.now();

        Ok(TokenInspection {
            digest_valid: digests_match(&expected, digest),
            expired: claim.is_expired_at(now),
            remaining_secs: claim.remaining_at(now),
            header,
            claim,
            digest: digest.to_string(),
        })
    }
}

/// Result of [`TokenVerifier::inspect`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInspection {
    pub header: Header,
    pub claim: Claim,
    pub digest: String,
    /// Whether the carried digest matches the recomputed one.
    pub digest_valid: bool,
    pub expired: bool,
    pub remaining_secs: Option<i64>,
}

/// Issue a draft token with the default policy, unkeyed digest and wall clock.
pub fn issue(token: &mut Token) -> Result<String> {
    TokenIssuer::new().issue(token)
}

/// Decode a bearer value without checking its digest or expiry.
///
/// The returned token carries the raw third segment as its digest.
pub fn parse(value: &str) -> Result<Token> {
    let [header, claim, digest] = codec::split(codec::strip_scheme(value)?)?;
    let header = codec::decode_header(header)?;
    let claim = codec::decode_claim(claim)?;
    Ok(Token::from_parts(header, claim, digest.to_string()))
}

/// Verify a bearer value with the unkeyed digest and wall clock.
pub fn verify(value: &str) -> Result<Token> {
    TokenVerifier::new().verify(value)
}
