//! Config file loading.

use anyhow::Context;
use serde::Deserialize;
use stamp_token::TokenConfig;
use std::path::Path;

/// Top-level layout of the TOML config file.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    token: TokenConfig,
}

/// Load the token configuration, falling back to defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<TokenConfig> {
    let Some(path) = path else {
        return Ok(TokenConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    tracing::debug!(path = %path.display(), validity = %file.token.validity, "Loaded config");
    Ok(file.token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path_uses_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config.validity, "15m");
        assert!(config.secret_env.is_none());
    }

    #[test]
    fn test_load_token_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stamp.toml");
        std::fs::write(
            &path,
            r#"
            [token]
            validity = "45m"
            secret_env = "STAMP_SECRET"
            "#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.validity, "45m");
        assert_eq!(config.secret_env.as_deref(), Some("STAMP_SECRET"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stamp.toml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(load(Some(&path)).unwrap().validity, "15m");
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
