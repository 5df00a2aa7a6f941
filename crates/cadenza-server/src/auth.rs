//! HTTP Basic authentication against stored accounts, and sign-up.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Request, State},
  http::{HeaderMap, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use cadenza_api::{ApiError, CurrentUser};
use cadenza_core::{
  account::Account,
  profile::Profile,
  store::{NewAccount, StudioStore},
};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Split a `Basic` authorization header into `(email, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (email, password) = creds.split_once(':')?;
  Some((email.to_owned(), password.to_owned()))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Resolve the caller from Basic credentials and attach a [`CurrentUser`].
///
/// Unknown emails and wrong passwords both yield 401.
pub async fn require_user<S: StudioStore>(
  State(store): State<Arc<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let (email, password) = basic_credentials(req.headers()).ok_or(ApiError::Unauthorized)?;
  let account = store
    .account_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&password, &account.password_hash) {
    tracing::debug!(email = %account.email, "rejected credentials");
    return Err(ApiError::Unauthorized);
  }

  req.extensions_mut().insert(CurrentUser { user_id: account.user_id, email: account.email });
  Ok(next.run(req).await)
}

// ─── Sign-up ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email:     String,
  pub password:  String,
  #[serde(default)]
  pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
  pub account: Account,
  pub profile: Profile,
}

/// `POST /auth/signup`. The only unauthenticated route.
pub async fn signup<S: StudioStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  let password_hash =
    hash_password(&body.password).map_err(|e| ApiError::Store(e.to_string().into()))?;

  let (account, profile) = store
    .create_account(NewAccount {
      email: body.email,
      password_hash,
      full_name: body.full_name.filter(|n| !n.trim().is_empty()),
      pick: OsRng.next_u32(),
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %account.user_id, "account created");
  Ok((StatusCode::CREATED, Json(SignupResponse { account, profile })))
}
