//! Wire codec: JSON + base64 segments joined by `.`.

use crate::claims::{BEARER_PREFIX, Claim, Header};
use crate::error::{Result, TokenError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Separator between the header, claim and digest segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Serialize a header or claim to JSON and base64-encode it (padded).
pub fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let body = serde_json::to_vec(value).map_err(TokenError::Serialization)?;
    Ok(STANDARD.encode(body))
}

pub fn decode_header(segment: &str) -> Result<Header> {
    decode_segment(segment, "header")
}

pub fn decode_claim(segment: &str) -> Result<Claim> {
    decode_segment(segment, "claim")
}

fn decode_segment<T: DeserializeOwned>(segment: &str, name: &'static str) -> Result<T> {
    let body = STANDARD
        .decode(segment)
        .map_err(|source| TokenError::Encoding {
            segment: name,
            source,
        })?;
    serde_json::from_slice(&body).map_err(|source| TokenError::Format {
        segment: name,
        source,
    })
}

/// Join the three segments as `header.claim.digest`.
pub fn render(header: &str, claim: &str, digest: &str) -> String {
    format!("{header}{SEGMENT_SEPARATOR}{claim}{SEGMENT_SEPARATOR}{digest}")
}

/// Split a rendered token into its header, claim and digest segments.
pub fn split(wire: &str) -> Result<[&str; 3]> {
    let parts: Vec<&str> = wire.split(SEGMENT_SEPARATOR).collect();
    match parts.as_slice() {
        [header, claim, digest]
            if !header.is_empty() && !claim.is_empty() && !digest.is_empty() =>
        {
            Ok([*header, *claim, *digest])
        }
        _ => Err(TokenError::Structure {
            segments: parts.iter().filter(|p| !p.is_empty()).count(),
        }),
    }
}

/// Remove the `Bearer ` scheme label, failing if it is absent.
pub fn strip_scheme(value: &str) -> Result<&str> {
    value.strip_prefix(BEARER_PREFIX).ok_or(TokenError::Scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenErrorKind;

    #[test]
    fn test_encode_default_header() {
        let segment = encode_segment(&Header::new("JWT", "HS256")).unwrap();
        assert_eq!(segment, "eyJhbGciOiJKV1QiLCJ0eXAiOiJIUzI1NiJ9");
        assert_eq!(decode_header(&segment).unwrap(), Header::new("JWT", "HS256"));
    }

    #[test]
    fn test_encode_claim_keeps_empty_fields() {
        let claim = Claim {
            expired_time: 2,
            issued_time: 1,
            ..Claim::default()
        };
        let segment = encode_segment(&claim).unwrap();
        assert_eq!(segment, "eyJ1c3IiOiIiLCJleHAiOjIsImlhdCI6MSwibXRhIjp7fX0=");
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_claim("not base64!").unwrap_err();
        assert_eq!(err.kind(), TokenErrorKind::Encoding);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let segment = STANDARD.encode(b"hello");
        let err = decode_header(&segment).unwrap_err();
        assert_eq!(err.kind(), TokenErrorKind::Format);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let segment = STANDARD.encode(br#"{"exp":"tomorrow"}"#);
        let err = decode_claim(&segment).unwrap_err();
        assert_eq!(err.kind(), TokenErrorKind::Format);
    }

    #[test]
    fn test_split_requires_three_non_empty_segments() {
        assert_eq!(split("a.b.c").unwrap(), ["a", "b", "c"]);

        for wire in ["", "a.b", "a.b.c.d", "a..c", ".b.c", "a.b."] {
            let err = split(wire).unwrap_err();
            assert_eq!(err.kind(), TokenErrorKind::Structure, "input {wire:?}");
        }
    }

    #[test]
    fn test_render_joins_in_order() {
        assert_eq!(render("h", "c", "d"), "h.c.d");
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("Bearer a.b.c").unwrap(), "a.b.c");
        assert!(matches!(strip_scheme("bearer a.b.c"), Err(TokenError::Scheme)));
        assert!(matches!(strip_scheme("a.b.c"), Err(TokenError::Scheme)));
    }
}
