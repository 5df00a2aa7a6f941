//! HTTP server wiring for Cadenza.
//!
//! Combines the REST router from `cadenza-api` with Basic authentication,
//! sign-up, request tracing, and a task that logs every studio event.

pub mod auth;
pub mod seed;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::post};
use cadenza_api::{AppState, EventBus};
use cadenza_core::{progression::LevelingPolicy, store::StudioStore};
use cadenza_tutor::UpstreamConfig;
use serde::Deserialize;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CADENZA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// TOML catalog imported on first start. The bundled one when unset.
  pub catalog_seed:    Option<PathBuf>,
  pub leveling_policy: LevelingPolicy,
  pub event_buffer:    usize,
  pub tutor:           UpstreamConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_owned(),
      port:            8080,
      store_path:      PathBuf::from("cadenza.db"),
      catalog_seed:    None,
      leveling_policy: LevelingPolicy::default(),
      event_buffer:    256,
      tutor:           UpstreamConfig::default(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application: `/auth/signup` is open, everything else
/// requires Basic credentials.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: StudioStore + 'static,
{
  let store = Arc::clone(&state.store);

  let protected = cadenza_api::router(state).layer(middleware::from_fn_with_state(
    Arc::clone(&store),
    auth::require_user::<S>,
  ));

  Router::new()
    .route("/auth/signup", post(auth::signup::<S>))
    .with_state(store)
    .merge(protected)
    .layer(TraceLayer::new_for_http())
}

// ─── Event log ────────────────────────────────────────────────────────────────

/// Log every published event until the bus is dropped.
pub fn spawn_event_log(events: &EventBus) -> JoinHandle<()> {
  let mut rx = events.subscribe();
  tokio::spawn(async move {
    loop {
      match rx.recv().await {
        Ok(envelope) => {
          let payload = serde_json::to_string(&envelope.event).unwrap_or_default();
          tracing::info!(event = envelope.event.name(), %payload, "studio event");
        }
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "event log fell behind");
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}
