//! Handlers for missions and XP claims.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use cadenza_core::{
  event::StudioEvent,
  mission::{ClaimOutcome, MissionFilter, MissionView},
  repertoire::validate_progress,
  store::StudioStore,
};
use serde::Deserialize;

use crate::{AppState, CurrentUser, error::ApiError};

/// `GET /api/missions[?category=&kind=]`
pub async fn list<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(filter): Query<MissionFilter>,
) -> Result<Json<Vec<MissionView>>, ApiError> {
  let missions = state
    .store
    .list_missions(user.user_id, filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(missions))
}

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
  pub progress: i64,
}

/// `PUT /api/missions/{id}/progress`, body: `{"progress":60}`
pub async fn set_progress<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<String>,
  Json(body): Json<ProgressBody>,
) -> Result<Json<MissionView>, ApiError> {
  let progress = validate_progress(body.progress).map_err(ApiError::store)?;
  let view = state
    .store
    .set_mission_progress(user.user_id, &id, progress)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(view))
}

/// `POST /api/missions/{id}/claim`
///
/// 409 on a second claim; XP is only ever awarded once per mission.
pub async fn claim<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<String>,
) -> Result<Json<ClaimOutcome>, ApiError> {
  let outcome = state
    .store
    .claim_mission(user.user_id, &id, state.config.leveling_policy)
    .await
    .map_err(ApiError::store)?;

  state.events.emit(StudioEvent::MissionClaimed {
    user_id:    user.user_id,
    mission_id: outcome.completion.mission_id.clone(),
    xp_earned:  outcome.completion.xp_earned,
  });
  if outcome.award.leveled_up() {
    state.events.emit(StudioEvent::LevelUp {
      user_id:   user.user_id,
      old_level: outcome.award.before.level,
      new_level: outcome.award.after.level,
      xp:        outcome.award.after.xp,
    });
  }

  Ok(Json(outcome))
}
