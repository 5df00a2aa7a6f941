//! Handlers for challenges and earned achievements.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadenza_core::{
  challenge::{ChallengeAdvance, ChallengeView, EarnedAchievement},
  event::StudioEvent,
  store::StudioStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError};

/// `GET /api/challenges`
pub async fn list<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<ChallengeView>>, ApiError> {
  let challenges = state.store.list_challenges(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(challenges))
}

/// `POST /api/challenges/{id}/join`
pub async fn join<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let participation = state
    .store
    .join_challenge(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(participation)))
}

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
  pub delta: u32,
}

/// `POST /api/challenges/{id}/progress`, body: `{"delta":1}`
pub async fn progress<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<ProgressBody>,
) -> Result<Json<ChallengeAdvance>, ApiError> {
  let advance = state
    .store
    .record_challenge_progress(user.user_id, id, body.delta)
    .await
    .map_err(ApiError::store)?;

  if advance.just_completed {
    state.events.emit(StudioEvent::ChallengeCompleted {
      user_id:      user.user_id,
      challenge_id: id,
      achievement:  advance.granted_achievement,
    });
  }
  Ok(Json(advance))
}

/// `GET /api/achievements`
pub async fn achievements<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<EarnedAchievement>>, ApiError> {
  let earned = state.store.achievements(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(earned))
}
