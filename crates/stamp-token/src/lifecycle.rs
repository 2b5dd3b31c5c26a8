//! Default filling and validity window rules.

use crate::claims::{Claim, Header, Token};
use chrono::{Duration, Utc};

/// Header `alg` value used when none is supplied.
pub const DEFAULT_ALG: &str = "JWT";

/// Header `typ` value used when none is supplied.
pub const DEFAULT_TYP: &str = "HS256";

/// Validity window, in seconds, applied when a draft carries no usable expiry.
pub const DEFAULT_VALIDITY_SECS: i64 = 15 * 60;

/// Source of the current time, in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Rules for filling a draft token before it is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    validity: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            validity: Duration::seconds(DEFAULT_VALIDITY_SECS),
        }
    }
}

impl LifecyclePolicy {
    pub fn new(validity: Duration) -> Self {
        Self { validity }
    }

    /// Validity window for tokens whose expiry has to be derived.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Fill the header and claim of a draft token.
    pub fn normalize(&self, token: &mut Token, now: i64) {
        fill_header_defaults(&mut token.header);
        self.normalize_claim(&mut token.claim, now);
    }

    /// Derive missing or inconsistent timestamps.
    ///
    /// A non-positive `issued_time` becomes `now`. If the expiry then
    /// precedes issuance, it is reset to `now` plus the validity window.
    /// Claims that already satisfy `0 < issued_time <= expired_time` are
    /// left untouched.
    pub fn normalize_claim(&self, claim: &mut Claim, now: i64) {
        if claim.issued_time <= 0 {
            claim.issued_time = now;
        }
        if claim.expired_time < claim.issued_time {
            claim.expired_time = now.saturating_add(self.validity.num_seconds());
        }
    }
}

/// Fill empty header fields with their defaults.
pub fn fill_header_defaults(header: &mut Header) {
    if header.alg.is_empty() {
        header.alg = DEFAULT_ALG.to_string();
    }
    if header.typ.is_empty() {
        header.typ = DEFAULT_TYP.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_empty_claim_gets_now_and_default_window() {
        let mut claim = Claim::default();
        LifecyclePolicy::default().normalize_claim(&mut claim, NOW);

        assert_eq!(claim.issued_time, NOW);
        assert_eq!(claim.expired_time, NOW + 15 * 60);
    }

    #[test]
    fn test_valid_claim_is_untouched() {
        let mut claim = Claim {
            expired_time: 2,
            issued_time: 1,
            ..Claim::default()
        };
        let before = claim.clone();
        LifecyclePolicy::default().normalize_claim(&mut claim, NOW);
        assert_eq!(claim, before);
    }

    #[test]
    fn test_expiry_before_issuance_is_reset_from_now() {
        // Issued in the past with an inconsistent expiry: the new window
        // starts at `now`, not at `issued_time`.
        let mut claim = Claim {
            expired_time: 10,
            issued_time: 100,
            ..Claim::default()
        };
        LifecyclePolicy::default().normalize_claim(&mut claim, NOW);
        assert_eq!(claim.issued_time, 100);
        assert_eq!(claim.expired_time, NOW + 900);
    }

    #[test]
    fn test_explicit_expiry_kept_when_issued_defaults() {
        let mut claim = Claim {
            expired_time: NOW + 60,
            ..Claim::default()
        };
        LifecyclePolicy::default().normalize_claim(&mut claim, NOW);
        assert_eq!(claim.issued_time, NOW);
        assert_eq!(claim.expired_time, NOW + 60);
    }

    #[test]
    fn test_custom_validity() {
        let policy = LifecyclePolicy::new(Duration::hours(1));
        let mut claim = Claim::new("dave");
        policy.normalize_claim(&mut claim, NOW);
        assert_eq!(claim.expired_time, NOW + 3600);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let policy = LifecyclePolicy::default();
        let mut token = Token::for_user("erin");
        policy.normalize(&mut token, NOW);
        let once = token.clone();
        policy.normalize(&mut token, NOW + 500);
        assert_eq!(token, once);
    }

    #[test]
    fn test_header_defaults_fill_independently() {
        let mut header = Header::new("", "custom");
        fill_header_defaults(&mut header);
        assert_eq!(header, Header::new("JWT", "custom"));

        let mut header = Header::new("custom", "");
        fill_header_defaults(&mut header);
        assert_eq!(header, Header::new("custom", "HS256"));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(42).now(), 42);
        assert!(SystemClock.now() > 0);
    }
}
