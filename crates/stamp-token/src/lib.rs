//! # stamp-token
//!
//! Self-contained bearer tokens for stateless request authentication.
//!
//! A token carries a user identity, a validity window and free-form
//! metadata. Everything a service needs to validate a request travels in
//! the token itself:
//!
//! ```text
//! Bearer <base64(header json)>.<base64(claim json)>.<hex sha-256 digest>
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Lifecycle | [`lifecycle`] | Fill header defaults, derive issued/expiry times |
//! | Codec | [`codec`] | JSON + base64 segments joined by `.` |
//! | Digest | [`digest`] | SHA-256 over `header + claim + header + claim` |
//! | Orchestration | [`token`] | `issue`, `parse`, `verify` |
//!
//! ## Integrity, not authentication
//!
//! The default digest is unkeyed. It rejects tokens that were altered in
//! transit, but anyone who knows the format can compute a valid digest for
//! claims of their choosing. Configure a [`DigestKey`] to switch to
//! HMAC-SHA-256 with a server-held secret when forgery matters.
//!
//! ## Example
//!
//! ```
//! use stamp_token::{Token, issue, verify};
//!
//! let mut token = Token::for_user("alice").with_meta("role", "admin");
//! let wire = issue(&mut token)?;
//!
//! let verified = verify(&Token::bearer(&wire))?;
//! assert_eq!(verified.claim.user, "alice");
//! # Ok::<(), stamp_token::TokenError>(())
//! ```

pub mod claims;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod lifecycle;
pub mod token;

pub use claims::{BEARER_PREFIX, Claim, Header, Meta, Token};
pub use config::TokenConfig;
pub use digest::{DigestKey, DigestMode, compute_digest};
pub use error::{ConfigError, Result, TokenError, TokenErrorKind};
pub use lifecycle::{Clock, FixedClock, LifecyclePolicy, SystemClock};
pub use token::{TokenInspection, TokenIssuer, TokenVerifier, issue, parse, verify};
