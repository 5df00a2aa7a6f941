//! `cadenza`: command-line client for the Cadenza practice tracker.
//!
//! # Usage
//!
//! ```text
//! cadenza --url http://localhost:8080 --email clara@example.org --password secret missions
//! cadenza --config ~/.config/cadenza/config.toml missions claim daily-practice-30
//! ```
//!
//! Ctrl-C abandons the request in flight.

mod client;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use client::{ApiClient, ApiConfig};
use commands::Command;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cadenza", version, about = "Command-line client for the Cadenza practice tracker")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the Cadenza server (default: http://localhost:8080).
  #[arg(long, env = "CADENZA_URL")]
  url: Option<String>,

  /// Account email.
  #[arg(long, env = "CADENZA_EMAIL")]
  email: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "CADENZA_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

/// CLI flags override the config file, which overrides defaults.
fn resolve(
  url: Option<String>,
  email: Option<String>,
  password: Option<String>,
  file: ConfigFile,
) -> ApiConfig {
  let or_file = |flag: Option<String>, file: String| flag.or((!file.is_empty()).then_some(file));
  ApiConfig {
    base_url: or_file(url, file.url).unwrap_or_else(|| "http://localhost:8080".to_owned()),
    email:    or_file(email, file.email).unwrap_or_default(),
    password: or_file(password, file.password).unwrap_or_default(),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = match &args.config {
    Some(path) => {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
      toml::from_str(&raw).context("parsing config file")?
    }
    None => ConfigFile::default(),
  };

  let api_config = resolve(args.url, args.email, args.password, file_cfg);
  tracing::debug!(base_url = %api_config.base_url, "using server");
  let client = ApiClient::new(api_config)?;

  let output = tokio::select! {
    res = commands::run(&client, args.command) => res?,
    _ = tokio::signal::ctrl_c() => bail!("interrupted"),
  };
  print!("{output}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_beat_file_which_beats_defaults() {
    let file = ConfigFile {
      url:      "http://studio:9000".into(),
      email:    "file@example.org".into(),
      password: String::new(),
    };
    let cfg = resolve(None, Some("flag@example.org".into()), None, file);
    assert_eq!(cfg.base_url, "http://studio:9000");
    assert_eq!(cfg.email, "flag@example.org");
    assert_eq!(cfg.password, "");

    let cfg = resolve(None, None, None, ConfigFile::default());
    assert_eq!(cfg.base_url, "http://localhost:8080");
  }

  #[test]
  fn config_file_parses() {
    let cfg: ConfigFile = toml::from_str("url = \"http://x\"\nemail = \"a@b.c\"").unwrap();
    assert_eq!(cfg.url, "http://x");
    assert!(cfg.password.is_empty());
  }

  #[test]
  fn subcommands_parse() {
    let args = Args::try_parse_from(["cadenza", "missions", "claim", "daily-practice-30"]).unwrap();
    assert!(matches!(
      args.command,
      Command::Missions { action: Some(commands::MissionAction::Claim { .. }), .. }
    ));
  }
}
