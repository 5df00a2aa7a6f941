//! Handlers for the caller's account, profiles, and the leaderboard.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/auth/me` | Account plus profile |
//! | `GET`   | `/api/profile` | Created with defaults on first read |
//! | `PATCH` | `/api/profile` | Partial update; xp and level are not writable |
//! | `GET`   | `/api/profiles/{id}` | 404 if not found |
//! | `GET`   | `/api/progress` | `{xp, level, xp_to_next_level}` |
//! | `GET`   | `/api/leaderboard` | `?sort=level\|xp&search=&instrument=` |
//! | `GET`   | `/api/users/search` | `?q=` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use cadenza_core::{
  account::Account,
  profile::{
    LEADERBOARD_SIZE, Leaderboard, LeaderboardSort, Profile, ProfileUpdate, filter_entries,
    rank,
  },
  progression::LevelProgress,
  social::MusicianHit,
  store::StudioStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError, pick};

const SEARCH_LIMIT: usize = 20;

// ─── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Me {
  pub account: Account,
  pub profile: Profile,
}

/// `GET /auth/me`
pub async fn me<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Me>, ApiError> {
  let account = state
    .store
    .account_by_email(&user.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;
  let profile = state
    .store
    .ensure_profile(user.user_id, &user.email, pick())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Me { account, profile }))
}

// ─── Own profile ──────────────────────────────────────────────────────────────

/// `GET /api/profile`
pub async fn get_own<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Profile>, ApiError> {
  let profile = state
    .store
    .ensure_profile(user.user_id, &user.email, pick())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile))
}

/// `PATCH /api/profile`
pub async fn update<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
  state
    .store
    .ensure_profile(user.user_id, &user.email, pick())
    .await
    .map_err(ApiError::store)?;
  let profile = state
    .store
    .update_profile(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile))
}

/// `GET /api/profiles/{id}`
pub async fn get_other<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
  state
    .store
    .get_profile(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("profile {id}")))
}

/// `GET /api/progress`
pub async fn progress<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<LevelProgress>, ApiError> {
  let profile = state
    .store
    .ensure_profile(user.user_id, &user.email, pick())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile.progress()))
}

// ─── Leaderboard ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
  #[serde(default)]
  pub sort:       LeaderboardSort,
  pub search:     Option<String>,
  pub instrument: Option<String>,
}

/// `GET /api/leaderboard`
///
/// Ranks come from the unfiltered top list; the name and instrument filters
/// only hide rows.
pub async fn leaderboard<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<LeaderboardParams>,
) -> Result<Json<Leaderboard>, ApiError> {
  state
    .store
    .ensure_profile(user.user_id, &user.email, pick())
    .await
    .map_err(ApiError::store)?;

  let rows = state
    .store
    .leaderboard(params.sort, LEADERBOARD_SIZE)
    .await
    .map_err(ApiError::store)?;
  let entries = rank(rows, user.user_id);

  let current_user_rank = match entries.iter().find(|e| e.is_current_user) {
    Some(e) => e.rank,
    None => state
      .store
      .rank_of(user.user_id, params.sort)
      .await
      .map_err(ApiError::store)?,
  };

  Ok(Json(Leaderboard {
    sort: params.sort,
    entries: filter_entries(entries, params.search.as_deref(), params.instrument.as_deref()),
    current_user_rank: Some(current_user_rank),
  }))
}

// ─── Musician search ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /api/users/search?q=`
pub async fn search_users<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MusicianHit>>, ApiError> {
  if params.q.trim().is_empty() {
    return Ok(Json(Vec::new()));
  }
  let hits = state
    .store
    .search_musicians(user.user_id, params.q.trim(), SEARCH_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(hits))
}
