//! Handlers for `/api/settings`. The stored API key is never echoed back.

use axum::{Json, extract::State};
use cadenza_core::{
  settings::{SettingsUpdate, SettingsView},
  store::StudioStore,
};

use crate::{AppState, CurrentUser, error::ApiError};

/// `GET /api/settings`
pub async fn get<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<SettingsView>, ApiError> {
  let settings = state.store.settings(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(settings.view()))
}

/// `PATCH /api/settings`
pub async fn update<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<SettingsUpdate>,
) -> Result<Json<SettingsView>, ApiError> {
  let settings = state
    .store
    .update_settings(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(settings.view()))
}
