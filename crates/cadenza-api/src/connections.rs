//! Handlers for the connection handshake between musicians.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/connections` | Accepted, either direction |
//! | `POST` | `/api/connections` | Body: `{"user_id":"…"}`; 409 if a row exists either way |
//! | `GET`  | `/api/connections/requests` | Pending, split into incoming and outgoing |
//! | `POST` | `/api/connections/{id}/respond` | Body: `{"accept":true}`; receiver only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadenza_core::{
  event::StudioEvent,
  social::{ConnectionRequests, ConnectionView, UserConnection},
  store::StudioStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError};

/// `GET /api/connections`
pub async fn list<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<ConnectionView>>, ApiError> {
  let connections = state.store.connections(user.user_id).await.map_err(ApiError::store)?;
  Ok(Json(connections))
}

#[derive(Debug, Deserialize)]
pub struct RequestBody {
  pub user_id: Uuid,
}

/// `POST /api/connections`
pub async fn request<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<RequestBody>,
) -> Result<impl IntoResponse, ApiError> {
  let connection = state
    .store
    .request_connection(user.user_id, body.user_id)
    .await
    .map_err(ApiError::store)?;

  state.events.emit(StudioEvent::ConnectionRequested {
    connection_id: connection.connection_id,
    requester:     connection.user_id,
    receiver:      connection.connected_user_id,
  });
  Ok((StatusCode::CREATED, Json(connection)))
}

/// `GET /api/connections/requests`
pub async fn requests<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<ConnectionRequests>, ApiError> {
  let pending = state
    .store
    .connection_requests(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(pending))
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub accept: bool,
}

/// `POST /api/connections/{id}/respond`
pub async fn respond<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<RespondBody>,
) -> Result<Json<UserConnection>, ApiError> {
  let connection = state
    .store
    .respond_connection(user.user_id, id, body.accept)
    .await
    .map_err(ApiError::store)?;

  state.events.emit(StudioEvent::ConnectionResolved {
    connection_id: connection.connection_id,
    requester:     connection.user_id,
    receiver:      connection.connected_user_id,
    status:        connection.status,
  });
  Ok(Json(connection))
}
