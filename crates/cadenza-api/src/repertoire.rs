//! Handlers for the caller's repertoire.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/repertoire` | Grouped into current, wishlist, mastered |
//! | `PUT`    | `/api/repertoire/{piece_id}` | Body: `{"status":"current"}` |
//! | `PATCH`  | `/api/repertoire/{piece_id}` | Body: `{"progress":40,"notes":"…"}` |
//! | `DELETE` | `/api/repertoire/{piece_id}` | 404 if not in repertoire |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use cadenza_core::{
  event::StudioEvent,
  repertoire::{PieceStatus, Repertoire, RepertoireUpdate, StatusChange, UserPiece},
  store::StudioStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError};

/// `GET /api/repertoire`
pub async fn list<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Repertoire>, ApiError> {
  let repertoire = state.store.repertoire(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(repertoire))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: PieceStatus,
}

/// `PUT /api/repertoire/{piece_id}`
pub async fn set_status<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(piece_id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<StatusChange>, ApiError> {
  let change = state
    .store
    .set_piece_status(user.user_id, piece_id, body.status)
    .await
    .map_err(ApiError::store)?;

  if change.changed() {
    state.events.emit(StudioEvent::PieceStatusChanged {
      user_id: user.user_id,
      piece_id,
      from: change.previous,
      to: change.entry.status,
    });
  }
  Ok(Json(change))
}

/// `PATCH /api/repertoire/{piece_id}`
pub async fn update<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(piece_id): Path<Uuid>,
  Json(body): Json<RepertoireUpdate>,
) -> Result<Json<UserPiece>, ApiError> {
  let entry = state
    .store
    .update_repertoire(user.user_id, piece_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entry))
}

/// `DELETE /api/repertoire/{piece_id}`
pub async fn remove<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(piece_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .remove_from_repertoire(user.user_id, piece_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
