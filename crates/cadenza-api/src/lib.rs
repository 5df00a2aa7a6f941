//! JSON REST API for Cadenza.
//!
//! Exposes an axum [`Router`] backed by any [`cadenza_core::store::StudioStore`].
//! Credential checks, TLS, and transport concerns are the caller's
//! responsibility: the caller must insert a [`CurrentUser`] into each
//! request's extensions before it reaches these handlers.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = cadenza_api::router(state).layer(middleware::from_fn_with_state(.., basic_auth));
//! ```

pub mod auth;
pub mod catalog;
pub mod challenges;
pub mod connections;
pub mod error;
pub mod events;
pub mod functions;
pub mod missions;
pub mod practice;
pub mod profile;
pub mod repertoire;
pub mod settings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use cadenza_core::{progression::LevelingPolicy, store::StudioStore};
use cadenza_tutor::Tutor;
use rand_core::{OsRng, RngCore as _};
use serde::Deserialize;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use events::EventBus;

/// Behaviour knobs the handlers read at request time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub leveling_policy: LevelingPolicy,
}

/// Shared state handed to every handler.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tutor:  Arc<Tutor>,
  pub events: EventBus,
  pub config: Arc<ApiConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, tutor: Tutor, events: EventBus, config: ApiConfig) -> Self {
    Self { store, tutor: Arc::new(tutor), events, config: Arc::new(config) }
  }
}

// Derived Clone would demand `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tutor:  Arc::clone(&self.tutor),
      events: self.events.clone(),
      config: Arc::clone(&self.config),
    }
  }
}

/// Randomness for default profile cosmetics.
pub(crate) fn pick() -> u32 { OsRng.next_u32() }

/// Build the full router: `/auth/me`, `/api/*` and `/functions/*`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: StudioStore + 'static,
{
  Router::new()
    .route("/auth/me", get(profile::me::<S>))
    // Profiles
    .route("/api/profile", get(profile::get_own::<S>).patch(profile::update::<S>))
    .route("/api/profiles/{id}", get(profile::get_other::<S>))
    .route("/api/progress", get(profile::progress::<S>))
    .route("/api/leaderboard", get(profile::leaderboard::<S>))
    .route("/api/users/search", get(profile::search_users::<S>))
    // Catalog
    .route("/api/pieces", get(catalog::list_pieces::<S>))
    .route("/api/pieces/{id}", get(catalog::get_piece::<S>))
    .route("/api/composers", get(catalog::list_composers::<S>))
    .route("/api/composers/{id}", get(catalog::get_composer::<S>))
    .route("/api/search", get(catalog::search::<S>))
    .route("/api/events", get(catalog::upcoming_events::<S>))
    .route("/api/events/{id}/register", post(catalog::register::<S>))
    // Repertoire
    .route("/api/repertoire", get(repertoire::list::<S>))
    .route(
      "/api/repertoire/{piece_id}",
      put(repertoire::set_status::<S>)
        .patch(repertoire::update::<S>)
        .delete(repertoire::remove::<S>),
    )
    // Missions
    .route("/api/missions", get(missions::list::<S>))
    .route("/api/missions/{id}/progress", put(missions::set_progress::<S>))
    .route("/api/missions/{id}/claim", post(missions::claim::<S>))
    // Challenges
    .route("/api/challenges", get(challenges::list::<S>))
    .route("/api/challenges/{id}/join", post(challenges::join::<S>))
    .route("/api/challenges/{id}/progress", post(challenges::progress::<S>))
    .route("/api/achievements", get(challenges::achievements::<S>))
    // Connections
    .route("/api/connections", get(connections::list::<S>).post(connections::request::<S>))
    .route("/api/connections/requests", get(connections::requests::<S>))
    .route("/api/connections/{id}/respond", post(connections::respond::<S>))
    // Practice
    .route("/api/practice", get(practice::recent::<S>).post(practice::log::<S>))
    .route("/api/practice/streak", get(practice::streak::<S>))
    // Settings
    .route("/api/settings", get(settings::get::<S>).patch(settings::update::<S>))
    // AI teacher
    .route("/functions/ai-teacher", post(functions::ai_teacher::<S>))
    .route("/functions/piece-ai-assistant", post(functions::piece_assistant::<S>))
    .route("/functions/practice-tips-ai", post(functions::practice_tips::<S>))
    .with_state(state)
}
