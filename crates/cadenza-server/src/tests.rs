//! End-to-end tests through the full application router.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use cadenza_api::{ApiConfig, AppState, EventBus};
use cadenza_store_sqlite::SqliteStore;
use cadenza_tutor::{Tutor, UpstreamConfig};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::app;

async fn test_app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let tutor = Tutor::new(&UpstreamConfig::default()).unwrap();
  app(AppState::new(Arc::new(store), tutor, EventBus::default(), ApiConfig::default()))
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn signup(email: &str, password: &str) -> Request<Body> {
  Request::post("/auth/signup")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(
      json!({ "email": email, "password": password, "full_name": "Clara" }).to_string(),
    ))
    .unwrap()
}

fn get(uri: &str, auth: Option<String>) -> Request<Body> {
  let mut req = Request::get(uri);
  if let Some(auth) = auth {
    req = req.header(header::AUTHORIZATION, auth);
  }
  req.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn signup_then_authenticated_profile() {
  let app = test_app().await;

  let (status, body) = send(&app, signup("Clara@Example.org", "kreisleriana")).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["account"]["email"], "clara@example.org");
  assert_eq!(body["profile"]["full_name"], "Clara");

  // Email lookup is case-insensitive.
  let auth = basic("CLARA@example.org", "kreisleriana");
  let (status, profile) = send(&app, get("/api/profile", Some(auth))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(profile["level"], 1);
  assert_eq!(profile["xp"], 0);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
  let app = test_app().await;
  send(&app, signup("clara@example.org", "kreisleriana")).await;

  for auth in [
    None,
    Some(basic("clara@example.org", "wrong")),
    Some(basic("nobody@example.org", "kreisleriana")),
    Some("Basic !!!not-base64!!!".to_owned()),
  ] {
    let res = app.clone().oneshot(get("/auth/me", auth)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}

#[tokio::test]
async fn signup_validation_and_duplicates() {
  let app = test_app().await;

  let (status, _) = send(&app, signup("clara@example.org", "short")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, signup("not-an-email", "kreisleriana")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, signup("clara@example.org", "kreisleriana")).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, body) = send(&app, signup("clara@example.org", "another-one")).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("clara@example.org"));
}
