//! Handlers for the practice log and streak.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadenza_core::{
  event::StudioEvent,
  practice::{NewPracticeSession, PracticeSession, PracticeStreak, RECENT_SESSIONS},
  store::StudioStore,
};
use serde::Deserialize;

use crate::{AppState, CurrentUser, error::ApiError};

const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

/// `GET /api/practice[?limit=]`, newest first.
pub async fn recent<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<PracticeSession>>, ApiError> {
  let limit = params.limit.unwrap_or(RECENT_SESSIONS).clamp(1, MAX_LIMIT);
  let sessions = state
    .store
    .recent_practice(user.user_id, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

/// `POST /api/practice`, body: `{"duration":30,"rating":4}`
pub async fn log<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewPracticeSession>,
) -> Result<impl IntoResponse, ApiError> {
  let logged = state
    .store
    .log_practice(user.user_id, body)
    .await
    .map_err(ApiError::store)?;

  state.events.emit(StudioEvent::PracticeLogged {
    user_id:        user.user_id,
    session_id:     logged.session.session_id,
    duration:       logged.session.duration,
    current_streak: logged.streak.current_streak,
  });
  Ok((StatusCode::CREATED, Json(logged)))
}

/// `GET /api/practice/streak`
pub async fn streak<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<PracticeStreak>, ApiError> {
  let streak = state.store.practice_streak(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(streak))
}
