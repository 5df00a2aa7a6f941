//! Account: the authentication record behind a user id.
//!
//! Credentials live here; everything a user sees about themselves lives on
//! their [`Profile`](crate::profile::Profile).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub user_id:       Uuid,
  /// Stored lowercased; lookups are case-insensitive.
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
