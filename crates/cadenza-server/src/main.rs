//! cadenza-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), applies
//! `CADENZA_*` environment overrides, opens the SQLite store, seeds the
//! catalog on first start, and serves the REST API over HTTP.
//!
//! Nested keys use a double underscore, e.g. `CADENZA_TUTOR__API_KEY`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use cadenza_api::{ApiConfig, AppState, EventBus};
use cadenza_server::{ServerConfig, auth::hash_password, seed::CatalogSeed};
use cadenza_store_sqlite::SqliteStore;
use cadenza_tutor::Tutor;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cadenza practice tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CADENZA").prefix_separator("_").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let seed_text = match &server_cfg.catalog_seed {
    Some(path) => std::fs::read_to_string(expand_tilde(path))
      .with_context(|| format!("failed to read catalog seed {path:?}"))?,
    None => cadenza_server::seed::BUNDLED.to_owned(),
  };
  if let Some(count) = CatalogSeed::parse(&seed_text)?.apply(&store).await? {
    tracing::info!(
      composers = count.composers,
      pieces = count.pieces,
      achievements = count.achievements,
      challenges = count.challenges,
      events = count.events,
      "seeded catalog"
    );
  }

  let tutor = Tutor::new(&server_cfg.tutor).context("failed to build tutor client")?;
  if server_cfg.tutor.api_key.is_none() {
    tracing::info!("no tutor api key configured; replies use templates unless a user sets one");
  }

  let events = EventBus::new(server_cfg.event_buffer);
  let event_log = cadenza_server::spawn_event_log(&events);

  let state = AppState::new(
    Arc::new(store),
    tutor,
    events,
    ApiConfig { leveling_policy: server_cfg.leveling_policy },
  );
  let app = cadenza_server::app(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      tracing::info!("shutting down");
    })
    .await
    .context("server error")?;

  event_log.abort();
  Ok(())
}

fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  match (s.strip_prefix("~/"), std::env::var("HOME")) {
    (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
