//! Token commands.
//!
//! `stamp token issue` - Issue a new token.
//! `stamp token parse` - Decode a token without verifying it.
//! `stamp token verify` - Verify a token's digest and expiry.
//! `stamp token inspect` - Show a token's contents and status.

use anyhow::Context;
use serde_json::Value;
use stamp_token::{LifecyclePolicy, Meta, Token, TokenConfig, TokenVerifier};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for `stamp token issue`.
#[derive(Debug, Default)]
pub struct IssueArgs {
    pub user: String,
    pub meta: Vec<String>,
    pub meta_json: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
    pub ttl: Option<String>,
    pub bearer: bool,
}

/// Load a token from a file if the argument names one, otherwise use it as-is.
fn read_token_arg(token: String) -> anyhow::Result<String> {
    let path = Path::new(&token);
    if path.is_file() {
        return Ok(fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?
            .trim()
            .to_string());
    }
    Ok(token)
}

fn with_scheme(token: String, raw: bool) -> String {
    if raw { Token::bearer(&token) } else { token }
}

/// Parse a metadata value: valid JSON keeps its type, anything else is a string.
fn parse_meta_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Merge `--meta-json` and `--meta key=value` entries, later entries winning.
fn parse_meta(meta_json: Option<&str>, entries: &[String]) -> anyhow::Result<Meta> {
    let mut meta = match meta_json {
        Some(text) => match serde_json::from_str::<Value>(text)
            .context("Failed to parse --meta-json")?
        {
            Value::Object(map) => map,
            other => anyhow::bail!("--meta-json must be a JSON object, got: {}", other),
        },
        None => Meta::new(),
    };

    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Invalid --meta entry '{}'. Expected KEY=VALUE", entry))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid --meta entry '{}'. Key is empty", entry);
        }
        meta.insert(key.to_string(), parse_meta_value(value));
    }

    Ok(meta)
}

/// Parse a duration string like "30m", "24h" or "1h 30m".
fn parse_ttl(s: &str) -> anyhow::Result<chrono::Duration> {
    let std_duration = humantime::parse_duration(s.trim())
        .with_context(|| format!("Invalid duration '{}'", s))?;
    chrono::Duration::from_std(std_duration).with_context(|| format!("Duration '{}' is too large", s))
}

/// Build the draft token described by the issue arguments.
fn build_draft(args: &IssueArgs) -> anyhow::Result<Token> {
    let mut token = Token::for_user(args.user.clone());
    token.claim.meta = parse_meta(args.meta_json.as_deref(), &args.meta)?;
    if let Some(iat) = args.iat {
        token = token.with_issued_time(iat);
    }
    if let Some(exp) = args.exp {
        token = token.with_expired_time(exp);
    }
    Ok(token)
}

/// Issue a token and return the issued record with its rendered value.
pub fn issue_token(config: &TokenConfig, args: &IssueArgs) -> anyhow::Result<(Token, String)> {
    let mut issuer = config.issuer().context("Invalid token configuration")?;
    if let Some(ttl) = &args.ttl {
        issuer = issuer.with_policy(LifecyclePolicy::new(parse_ttl(ttl)?));
    }

    let mut token = build_draft(args)?;
    let wire = issuer.issue(&mut token)?;
    let rendered = if args.bearer { Token::bearer(&wire) } else { wire };
    Ok((token, rendered))
}

/// Issue a new token.
pub fn issue(config: &TokenConfig, args: IssueArgs, output: Option<PathBuf>) -> anyhow::Result<()> {
    let (token, rendered) = issue_token(config, &args)?;

    if let Some(output_path) = output {
        fs::write(&output_path, &rendered)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  User: {}", token.claim.user);
        println!("  Issued at: {}", format_epoch(token.claim.issued_time));
        println!("  Expires at: {}", format_epoch(token.claim.expired_time));
        if !token.claim.meta.is_empty() {
            println!("  Meta: {}", Value::Object(token.claim.meta.clone()));
        }
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

/// Decode a token without verification.
pub fn parse(token: String, raw: bool) -> anyhow::Result<()> {
    let value = with_scheme(read_token_arg(token)?, raw);
    let parsed = stamp_token::parse(&value)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

/// Verify a token, returning the verified record.
pub fn verify_token(config: &TokenConfig, token: String, raw: bool) -> anyhow::Result<Token> {
    let verifier = config.verifier().context("Invalid token configuration")?;
    let value = with_scheme(read_token_arg(token)?, raw);
    Ok(verifier.verify(&value)?)
}

/// Verify a token is valid.
pub fn verify(config: &TokenConfig, token: String, raw: bool) -> anyhow::Result<()> {
    match verify_token(config, token, raw) {
        Ok(verified) => {
            println!("✔ Token is valid");
            println!();
            println!("Token Details:");
            println!("  User: {}", verified.claim.user);
            println!("  Issued at: {}", format_epoch(verified.claim.issued_time));
            println!("  Expires at: {}", format_epoch(verified.claim.expired_time));
            println!("  Meta: {}", Value::Object(verified.claim.meta.clone()));
        }
        Err(e) => {
            let kind = e
                .downcast_ref::<stamp_token::TokenError>()
                .map(|t| t.kind().as_str())
                .unwrap_or("config");
            tracing::debug!(kind, "Verification failed");
            println!("✖ Token verification failed ({}): {:#}", kind, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Inspect a token's contents and status.
pub fn inspect(config: &TokenConfig, token: String) -> anyhow::Result<()> {
    let verifier: TokenVerifier = config.verifier().context("Invalid token configuration")?;
    let report = verifier.inspect(&read_token_arg(token)?)?;

    println!("Token Information:");
    println!("  Header: alg={} typ={}", report.header.alg, report.header.typ);
    println!("  User: {}", report.claim.user);
    println!("  Issued at: {}", format_epoch(report.claim.issued_time));
    println!("  Expires at: {}", format_epoch(report.claim.expired_time));
    println!("  Meta: {}", Value::Object(report.claim.meta.clone()));
    println!("  Digest: {}", report.digest);
    println!(
        "  Digest valid: {}",
        if report.digest_valid { "yes" } else { "no" }
    );
    match report.remaining_secs {
        Some(secs) => println!("  Status: valid for {}s", secs),
        None => println!("  Status: expired"),
    }

    Ok(())
}

fn format_epoch(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| format!("{} ({})", dt.to_rfc3339(), secs))
        .unwrap_or_else(|| secs.to_string())
}
