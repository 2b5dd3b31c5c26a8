//! Token configuration.

use crate::digest::{DigestKey, DigestMode};
use crate::error::ConfigError;
use crate::lifecycle::{LifecyclePolicy, SystemClock};
use crate::token::{TokenIssuer, TokenVerifier};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for issuing and verifying tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Validity window for tokens issued without an explicit expiry
    /// (e.g., "15m", "1h 30m").
    #[serde(default = "default_validity")]
    pub validity: String,

    /// Environment variable containing the digest secret (hex-encoded).
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Path to the digest secret file.
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            validity: default_validity(),
            secret_env: None,
            secret_file: None,
        }
    }
}

impl TokenConfig {
    /// Parse the validity window into a lifecycle policy.
    pub fn policy(&self) -> Result<LifecyclePolicy, ConfigError> {
        let std_duration = humantime::parse_duration(self.validity.trim()).map_err(|source| {
            ConfigError::InvalidValidity {
                value: self.validity.clone(),
                source,
            }
        })?;
        let validity = chrono::Duration::from_std(std_duration)
            .map_err(|_| ConfigError::ValidityOutOfRange(self.validity.clone()))?;
        Ok(LifecyclePolicy::new(validity))
    }

    /// Resolve the digest secret from environment or file.
    ///
    /// Returns `None` when neither source is configured or present, which
    /// leaves the digest unkeyed.
    pub fn resolve_key(&self) -> Result<Option<DigestKey>, ConfigError> {
        // Try environment variable first
        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                return DigestKey::from_hex(&secret).map(Some);
            }
        }

        // Try file path
        if let Some(path) = &self.secret_file {
            if path.exists() {
                let secret = std::fs::read_to_string(path)?;
                return DigestKey::from_hex(secret.trim()).map(Some);
            }
        }

        Ok(None)
    }

    /// Digest mode implied by the configured secret.
    pub fn digest_mode(&self) -> Result<DigestMode, ConfigError> {
        Ok(match self.resolve_key()? {
            Some(key) => DigestMode::Keyed(key),
            None => DigestMode::Unkeyed,
        })
    }

    pub fn issuer(&self) -> Result<TokenIssuer<SystemClock>, ConfigError> {
        Ok(TokenIssuer::new()
            .with_policy(self.policy()?)
            .with_digest(self.digest_mode()?))
    }

    pub fn verifier(&self) -> Result<TokenVerifier<SystemClock>, ConfigError> {
        Ok(TokenVerifier::new().with_digest(self.digest_mode()?))
    }
}

fn default_validity() -> String {
    "15m".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_policy_is_fifteen_minutes() {
        let policy = TokenConfig::default().policy().unwrap();
        assert_eq!(policy, LifecyclePolicy::default());
    }

    #[test]
    fn test_parse_validity() {
        let config = TokenConfig {
            validity: "1h 30m".into(),
            ..TokenConfig::default()
        };
        assert_eq!(
            config.policy().unwrap().validity(),
            chrono::Duration::minutes(90)
        );

        let config = TokenConfig {
            validity: "soon".into(),
            ..TokenConfig::default()
        };
        assert!(matches!(
            config.policy(),
            Err(ConfigError::InvalidValidity { .. })
        ));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: TokenConfig = toml::from_str(
            r#"
            validity = "2h"
            secret_file = "/etc/stamp/secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.validity, "2h");
        assert_eq!(config.secret_file, Some(PathBuf::from("/etc/stamp/secret")));
        assert!(config.secret_env.is_none());

        let empty: TokenConfig = toml::from_str("").unwrap();
        assert_eq!(empty.validity, "15m");
    }

    #[test]
    fn test_no_secret_means_unkeyed() {
        let mode = TokenConfig::default().digest_mode().unwrap();
        assert!(!mode.is_keyed());
    }

    #[test]
    fn test_secret_from_file() {
        let key = DigestKey::generate().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", key.to_hex()).unwrap();

        let config = TokenConfig {
            secret_file: Some(file.path().to_path_buf()),
            ..TokenConfig::default()
        };
        let resolved = config.resolve_key().unwrap().unwrap();
        assert_eq!(resolved.to_hex(), key.to_hex());
    }

    #[test]
    fn test_secret_from_env_takes_precedence() {
        let env_key = DigestKey::generate().unwrap();
        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("STAMP_TEST_SECRET_PRECEDENCE", env_key.to_hex());
        }

        let config = TokenConfig {
            secret_env: Some("STAMP_TEST_SECRET_PRECEDENCE".into()),
            secret_file: Some(PathBuf::from("/nonexistent/secret")),
            ..TokenConfig::default()
        };
        let resolved = config.resolve_key().unwrap().unwrap();
        assert_eq!(resolved.to_hex(), env_key.to_hex());
    }

    #[test]
    fn test_invalid_secret_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not hex").unwrap();

        let config = TokenConfig {
            secret_file: Some(file.path().to_path_buf()),
            ..TokenConfig::default()
        };
        assert!(matches!(
            config.resolve_key(),
            Err(ConfigError::InvalidSecret(_))
        ));
    }
}
