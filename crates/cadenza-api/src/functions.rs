//! AI teacher endpoints under `/functions`.
//!
//! Each request uses the caller's own API key from their settings when one is
//! stored, otherwise the server's configured key, otherwise templates. When a
//! `piece_id` is given, missing piece details are filled from the catalog.

use axum::{Json, extract::State};
use cadenza_core::{catalog::Piece, store::StudioStore};
use cadenza_tutor::{PieceQuestion, Reply, TeacherRequest, TipsReply, TipsRequest};
use uuid::Uuid;

use crate::{AppState, CurrentUser, error::ApiError};

async fn user_key<S: StudioStore>(
  state: &AppState<S>,
  user: &CurrentUser,
) -> Result<Option<String>, ApiError> {
  let settings = state.store.settings(user.user_id).await.map_err(ApiError::store)?;
  Ok(settings.api_key)
}

async fn catalog_piece<S: StudioStore>(
  state: &AppState<S>,
  id: Option<Uuid>,
) -> Result<Option<Piece>, ApiError> {
  let Some(id) = id else { return Ok(None) };
  state
    .store
    .get_piece(id)
    .await
    .map_err(ApiError::store)?
    .map(Some)
    .ok_or_else(|| ApiError::NotFound(format!("piece {id}")))
}

/// `POST /functions/ai-teacher`, body: `{"message":"…"}`
pub async fn ai_teacher<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(mut body): Json<TeacherRequest>,
) -> Result<Json<Reply>, ApiError> {
  body.user_email.get_or_insert_with(|| user.email.clone());
  let key = user_key(&state, &user).await?;
  let reply = state.tutor.ask_teacher(&body, key.as_deref()).await?;
  Ok(Json(reply))
}

/// `POST /functions/piece-ai-assistant`
pub async fn piece_assistant<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(mut body): Json<PieceQuestion>,
) -> Result<Json<Reply>, ApiError> {
  if let Some(piece) = catalog_piece(&state, body.piece_id).await? {
    body.piece_title.get_or_insert(piece.title);
    body.composer.get_or_insert(piece.composer);
    body.instrument.get_or_insert(piece.instrument);
    if body.period.is_none() {
      body.period = piece.period;
    }
    if body.difficulty.is_none() {
      body.difficulty = piece.difficulty;
    }
  }
  body.user_email.get_or_insert_with(|| user.email.clone());

  let key = user_key(&state, &user).await?;
  let reply = state.tutor.ask_about_piece(&body, key.as_deref()).await?;
  Ok(Json(reply))
}

/// `POST /functions/practice-tips-ai`
///
/// Responds with `{technicalFocus, practiceSchedule, interpretation, source}`.
pub async fn practice_tips<S: StudioStore>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(mut body): Json<TipsRequest>,
) -> Result<Json<TipsReply>, ApiError> {
  if let Some(piece) = catalog_piece(&state, body.piece_id).await? {
    if body.piece_title.trim().is_empty() {
      body.piece_title = piece.title;
    }
    body.composer.get_or_insert(piece.composer);
    body.instrument.get_or_insert(piece.instrument);
    if body.period.is_none() {
      body.period = piece.period;
    }
    if body.genre.is_none() {
      body.genre = piece.genre;
    }
    if body.difficulty.is_none() {
      body.difficulty = piece.difficulty;
    }
  }

  let key = user_key(&state, &user).await?;
  let reply = state.tutor.practice_tips(&body, key.as_deref()).await?;
  Ok(Json(reply))
}
