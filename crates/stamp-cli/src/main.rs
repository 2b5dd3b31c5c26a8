use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "stamp", version, about = "Issue and verify stamp bearer tokens")]
struct Cli {
    /// Path to a TOML config file with a [token] section.
    #[arg(long, global = true, env = "STAMP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Token operations (issue/parse/verify/inspect)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Digest secret management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a new token.
    Issue {
        /// User identity to embed.
        #[arg(long, default_value = "")]
        user: String,

        /// Metadata entry as key=value. Values that parse as JSON keep their type.
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Metadata as a JSON object, merged before --meta entries.
        #[arg(long = "meta-json", value_name = "JSON")]
        meta_json: Option<String>,

        /// Issued-at time in epoch seconds (defaults to now).
        #[arg(long)]
        iat: Option<i64>,

        /// Expiry time in epoch seconds (defaults to now plus the validity window).
        #[arg(long)]
        exp: Option<i64>,

        /// Override the configured validity window (e.g., "30m", "24h").
        #[arg(long)]
        ttl: Option<String>,

        /// Prefix the output with the bearer scheme.
        #[arg(long, default_value_t = false)]
        bearer: bool,

        /// Write the token to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Decode a token without checking its digest or expiry.
    Parse {
        /// Token value, or a path to a file containing it.
        token: String,

        /// The value has no "Bearer " prefix; add it before parsing.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },

    /// Verify a token's digest and expiry.
    Verify {
        /// Token value, or a path to a file containing it.
        token: String,

        /// The value has no "Bearer " prefix; add it before verifying.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },

    /// Show a token's contents with digest and expiry status.
    Inspect {
        /// Token value, or a path to a file containing it.
        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new digest secret.
    Generate {
        /// Write the secret to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    match cli.cmd {
        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                user,
                meta,
                meta_json,
                iat,
                exp,
                ttl,
                bearer,
                output,
            } => commands::token::issue(
                &config,
                commands::token::IssueArgs {
                    user,
                    meta,
                    meta_json,
                    iat,
                    exp,
                    ttl,
                    bearer,
                },
                output,
            )?,
            TokenCommand::Parse { token, raw } => commands::token::parse(token, raw)?,
            TokenCommand::Verify { token, raw } => commands::token::verify(&config, token, raw)?,
            TokenCommand::Inspect { token } => commands::token::inspect(&config, token)?,
        },
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },
    }

    Ok(())
}
