//! The authenticated caller.
//!
//! Authentication itself happens outside this crate: whatever layer verifies
//! credentials inserts a [`CurrentUser`] into the request extensions, and
//! handlers pull it back out with the extractor below.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
  pub user_id: Uuid,
  pub email:   String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts.extensions.get::<CurrentUser>().cloned().ok_or(ApiError::Unauthorized)
  }
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request};

  use super::*;

  async fn extract(req: Request<Body>) -> Result<CurrentUser, ApiError> {
    let (mut parts, _) = req.into_parts();
    CurrentUser::from_request_parts(&mut parts, &()).await
  }

  #[tokio::test]
  async fn present_extension_is_extracted() {
    let user = CurrentUser { user_id: Uuid::new_v4(), email: "v@example.org".into() };
    let mut req = Request::builder().body(Body::empty()).unwrap();
    req.extensions_mut().insert(user.clone());
    assert_eq!(extract(req).await.unwrap(), user);
  }

  #[tokio::test]
  async fn missing_extension_is_unauthorized() {
    let req = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized)));
  }
}
