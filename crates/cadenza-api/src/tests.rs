//! Router tests: real handlers over an in-memory `SqliteStore`.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
};
use cadenza_core::{
  catalog::NewPiece,
  event::StudioEvent,
  progression::LevelingPolicy,
  store::{NewAccount, StudioStore},
};
use cadenza_store_sqlite::SqliteStore;
use cadenza_tutor::{Tutor, UpstreamConfig};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ApiConfig, AppState, CurrentUser, EventBus, router};

struct Harness {
  store:  Arc<SqliteStore>,
  events: EventBus,
  app:    Router,
}

async fn harness() -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  // No key configured: the tutor answers from templates without touching
  // the network.
  let tutor = Tutor::new(&UpstreamConfig::default()).unwrap();
  let events = EventBus::new(64);
  let state = AppState::new(store.clone(), tutor, events.clone(), ApiConfig::default());
  Harness { store, events, app: router(state) }
}

async fn signup(store: &SqliteStore, email: &str, name: &str) -> CurrentUser {
  let (account, _) = store
    .create_account(NewAccount {
      email:         email.into(),
      password_hash: "$argon2id$v=19$test".into(),
      full_name:     Some(name.into()),
      pick:          0,
    })
    .await
    .unwrap();
  CurrentUser { user_id: account.user_id, email: account.email }
}

async fn call(
  app: &Router,
  user: Option<&CurrentUser>,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if body.is_some() {
    req = req.header(header::CONTENT_TYPE, "application/json");
  }
  let mut req = req
    .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
    .unwrap();
  if let Some(user) = user {
    req.extensions_mut().insert(user.clone());
  }

  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

#[tokio::test]
async fn requests_without_a_user_are_unauthorized() {
  let h = harness().await;
  let req = Request::get("/api/profile").body(Body::empty()).unwrap();
  let res = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn me_returns_account_without_password_hash() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;

  let (status, body) = call(&h.app, Some(&ada), Method::GET, "/auth/me", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["account"]["email"], "ada@example.org");
  assert!(body["account"].get("password_hash").is_none());
  assert_eq!(body["profile"]["level"], 1);
}

#[tokio::test]
async fn claim_levels_up_once_and_emits_events() {
  let h = harness().await;
  let mut rx = h.events.subscribe();
  let ada = signup(&h.store, "ada@example.org", "Ada").await;

  let (status, _) = call(
    &h.app,
    Some(&ada),
    Method::PUT,
    "/api/missions/weekly-five-sessions/progress",
    Some(json!({ "progress": 100 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let uri = "/api/missions/weekly-five-sessions/claim";
  let (status, body) = call(&h.app, Some(&ada), Method::POST, uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["progress"], json!({ "xp": 100, "level": 2, "xp_to_next_level": 200 }));

  let (status, body) = call(&h.app, Some(&ada), Method::POST, uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("weekly-five-sessions"));

  let (_, progress) = call(&h.app, Some(&ada), Method::GET, "/api/progress", None).await;
  assert_eq!(progress["xp"], 100);

  assert!(matches!(rx.recv().await.unwrap().event, StudioEvent::MissionClaimed { .. }));
  assert!(matches!(
    rx.recv().await.unwrap().event,
    StudioEvent::LevelUp { old_level: 1, new_level: 2, .. }
  ));
}

#[tokio::test]
async fn unfinished_mission_claim_is_bad_request() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  let (status, _) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/api/missions/daily-practice-30/claim",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = call(
    &h.app,
    Some(&ada),
    Method::PUT,
    "/api/missions/daily-practice-30/progress",
    Some(json!({ "progress": 140 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connection_handshake_over_http() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  let ben = signup(&h.store, "ben@example.org", "Ben").await;

  let (status, conn) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/api/connections",
    Some(json!({ "user_id": ben.user_id })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = conn["connection_id"].as_str().unwrap().to_owned();

  // Ben asking Ada back is a duplicate of the same pair.
  let (status, _) = call(
    &h.app,
    Some(&ben),
    Method::POST,
    "/api/connections",
    Some(json!({ "user_id": ada.user_id })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let respond = format!("/api/connections/{id}/respond");
  let (status, _) =
    call(&h.app, Some(&ada), Method::POST, &respond, Some(json!({ "accept": true }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) =
    call(&h.app, Some(&ben), Method::POST, &respond, Some(json!({ "accept": true }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "accepted");

  let (_, list) = call(&h.app, Some(&ada), Method::GET, "/api/connections", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["other"]["full_name"], "Ben");
}

#[tokio::test]
async fn repertoire_status_round_trip() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  let piece = h
    .store
    .add_piece(NewPiece {
      title: "Gymnopédie No. 1".into(),
      composer: "Satie".into(),
      instrument: "piano".into(),
      difficulty: Some(3),
      ..Default::default()
    })
    .await
    .unwrap();
  let uri = format!("/api/repertoire/{}", piece.piece_id);

  let (status, change) =
    call(&h.app, Some(&ada), Method::PUT, &uri, Some(json!({ "status": "current" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(change["previous"].is_null());

  let (_, detail) =
    call(&h.app, Some(&ada), Method::GET, &format!("/api/pieces/{}", piece.piece_id), None).await;
  assert_eq!(detail["title"], "Gymnopédie No. 1");
  assert_eq!(detail["repertoire"]["status"], "current");

  let (status, _) =
    call(&h.app, Some(&ada), Method::PATCH, &uri, Some(json!({ "progress": 101 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = call(&h.app, Some(&ada), Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&h.app, Some(&ada), Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  let missing = Uuid::new_v4();
  for uri in [
    format!("/api/pieces/{missing}"),
    format!("/api/composers/{missing}"),
    format!("/api/profiles/{missing}"),
  ] {
    let (status, body) = call(&h.app, Some(&ada), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    assert!(body["error"].is_string());
  }
}

#[tokio::test]
async fn leaderboard_reports_current_rank() {
  let h = harness().await;
  signup(&h.store, "ben@example.org", "Ben").await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  h.store.set_mission_progress(ada.user_id, "daily-record-practice", 100).await.unwrap();
  h.store
    .claim_mission(ada.user_id, "daily-record-practice", LevelingPolicy::SingleStep)
    .await
    .unwrap();

  let (status, board) =
    call(&h.app, Some(&ada), Method::GET, "/api/leaderboard?sort=xp&search=ada", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(board["sort"], "xp");
  assert_eq!(board["entries"].as_array().unwrap().len(), 1);
  assert_eq!(board["entries"][0]["is_current_user"], true);
  assert_eq!(board["current_user_rank"], 1);
}

#[tokio::test]
async fn settings_hide_the_stored_key() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;

  let (status, view) = call(
    &h.app,
    Some(&ada),
    Method::PATCH,
    "/api/settings",
    Some(json!({ "theme": "dark", "api_key": "sk-secret" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["theme"], "dark");
  assert_eq!(view["has_api_key"], true);
  assert!(!view.to_string().contains("sk-secret"));
}

#[tokio::test]
async fn practice_log_starts_streak() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;

  let (status, logged) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/api/practice",
    Some(json!({ "duration": 30, "rating": 4 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(logged["streak"]["current_streak"], 1);

  let (status, _) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/api/practice",
    Some(json!({ "duration": 0 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, recent) = call(&h.app, Some(&ada), Method::GET, "/api/practice", None).await;
  assert_eq!(recent.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn teacher_answers_from_templates_without_a_key() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;

  let (status, reply) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/functions/ai-teacher",
    Some(json!({ "message": "any tips for Bach?" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(reply["source"], "template");
  assert!(reply["response"].as_str().unwrap().contains("Bach"));

  let (status, _) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/functions/ai-teacher",
    Some(json!({ "message": "  " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tips_fill_from_catalog_and_flatten() {
  let h = harness().await;
  let ada = signup(&h.store, "ada@example.org", "Ada").await;
  let piece = h
    .store
    .add_piece(NewPiece {
      title: "Caprice No. 24".into(),
      composer: "Paganini".into(),
      instrument: "violin".into(),
      period: Some("Romantic".into()),
      difficulty: Some(10),
      ..Default::default()
    })
    .await
    .unwrap();

  let (status, tips) = call(
    &h.app,
    Some(&ada),
    Method::POST,
    "/functions/practice-tips-ai",
    Some(json!({ "piece_id": piece.piece_id })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tips["source"], "template");
  for key in ["technicalFocus", "practiceSchedule", "interpretation"] {
    assert!(tips[key].is_string(), "{key}");
  }
}
