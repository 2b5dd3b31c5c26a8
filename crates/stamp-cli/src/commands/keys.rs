//! Key management commands.
//!
//! `stamp keys generate` - Generate a new digest secret.

use stamp_token::DigestKey;
use std::fs;
use std::path::PathBuf;

/// Generate a new digest secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let key = DigestKey::generate()?;

    if let Some(output_path) = output {
        if let Some(parent) = output_path.parent() {
            // Create output directory if it doesn't exist
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, key.to_hex())?;

        println!("✔ Generated digest secret: {}", output_path.display());
        println!();
        println!("⚠️  Keep this secret secure! Never commit it to version control.");
        println!();
        println!("Reference it from your config file:");
        println!("  [token]");
        println!("  secret_file = \"{}\"", output_path.display());
    } else {
        println!("{}", key.to_hex());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_writes_loadable_secret() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("secret.key");

        generate(Some(path.clone())).unwrap();

        let hex = fs::read_to_string(&path).unwrap();
        assert_eq!(hex.len(), 64);
        assert!(DigestKey::from_hex(&hex).is_ok());
    }
}
