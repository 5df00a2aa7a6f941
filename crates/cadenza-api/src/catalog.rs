//! Handlers for the piece and composer catalog, quick search, and events.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadenza_core::{
  catalog::{Composer, ComposerDetail, Event, Piece, PieceFilter, QuickSearch},
  repertoire::UserPiece,
  store::StudioStore,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError};

// ─── Pieces ───────────────────────────────────────────────────────────────────

/// `GET /api/pieces[?search=&instrument=&difficulty=]`
pub async fn list_pieces<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(filter): Query<PieceFilter>,
) -> Result<Json<Vec<Piece>>, ApiError> {
  let pieces = state.store.list_pieces(&filter).await.map_err(ApiError::store)?;
  Ok(Json(pieces))
}

/// A piece page: the piece, its composer if linked, and where it sits in the
/// caller's repertoire.
#[derive(Debug, Serialize)]
pub struct PieceDetail {
  #[serde(flatten)]
  pub piece:           Piece,
  /// `piece.composer` already holds the display name.
  pub composer_detail: Option<Composer>,
  pub repertoire:      Option<UserPiece>,
}

/// `GET /api/pieces/{id}`
pub async fn get_piece<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<PieceDetail>, ApiError> {
  let piece = state
    .store
    .get_piece(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("piece {id}")))?;

  let composer_detail = match piece.composer_id {
    Some(cid) => state.store.get_composer(cid).await.map_err(ApiError::store)?,
    None => None,
  };
  let repertoire = state
    .store
    .get_user_piece(user.user_id, id)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(PieceDetail { piece, composer_detail, repertoire }))
}

// ─── Composers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ComposerParams {
  pub search: Option<String>,
}

/// `GET /api/composers[?search=]`
pub async fn list_composers<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ComposerParams>,
) -> Result<Json<Vec<Composer>>, ApiError> {
  let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
  let composers = state.store.list_composers(search).await.map_err(ApiError::store)?;
  Ok(Json(composers))
}

/// `GET /api/composers/{id}`
pub async fn get_composer<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<ComposerDetail>, ApiError> {
  let composer = state
    .store
    .get_composer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("composer {id}")))?;
  let pieces = state.store.composer_pieces(id).await.map_err(ApiError::store)?;
  Ok(Json(ComposerDetail { composer, pieces }))
}

// ─── Quick search ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /api/search?q=`
pub async fn search<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<QuickSearch>, ApiError> {
  let hits = state.store.quick_search(&params.q).await.map_err(ApiError::store)?;
  Ok(Json(hits))
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// `GET /api/events`
pub async fn upcoming_events<S: StudioStore>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
) -> Result<Json<Vec<Event>>, ApiError> {
  let events = state.store.upcoming_events(Utc::now()).await.map_err(ApiError::store)?;
  Ok(Json(events))
}

/// `POST /api/events/{id}/register`
pub async fn register<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let registration = state
    .store
    .register_for_event(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(registration)))
}
