//! The connection handshake between two musicians.
//!
//! ```text
//! none ──request──▶ pending ──accept──▶ accepted
//!                          └──reject──▶ rejected
//! ```
//!
//! A pair of users has at most one connection row regardless of direction,
//! and resolved rows are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, profile::ProfileSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
  Pending,
  Accepted,
  Rejected,
}

impl ConnectionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
    }
  }
}

impl std::fmt::Display for ConnectionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConnection {
  pub connection_id:     Uuid,
  /// The requester.
  pub user_id:           Uuid,
  /// The receiver; the only party allowed to resolve.
  pub connected_user_id: Uuid,
  pub status:            ConnectionStatus,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl UserConnection {
  pub fn involves(&self, user: Uuid) -> bool {
    self.user_id == user || self.connected_user_id == user
  }

  /// The party that is not `user`.
  pub fn other(&self, user: Uuid) -> Uuid {
    if self.user_id == user { self.connected_user_id } else { self.user_id }
  }
}

/// Validate a new request from `requester` to `receiver` and build the row.
///
/// `existing` is any row between the pair, in either direction.
pub fn check_request(
  requester: Uuid,
  receiver: Uuid,
  existing: Option<&UserConnection>,
  now: DateTime<Utc>,
) -> Result<UserConnection> {
  if requester == receiver {
    return Err(Error::SelfConnection);
  }
  if let Some(row) = existing {
    return Err(Error::ConnectionExists { status: row.status });
  }
  Ok(UserConnection {
    connection_id:     Uuid::new_v4(),
    user_id:           requester,
    connected_user_id: receiver,
    status:            ConnectionStatus::Pending,
    created_at:        now,
    updated_at:        now,
  })
}

/// Resolve a pending connection on behalf of `actor`.
pub fn resolve(
  connection: &UserConnection,
  actor: Uuid,
  accept: bool,
  now: DateTime<Utc>,
) -> Result<UserConnection> {
  if connection.connected_user_id != actor {
    return Err(Error::NotConnectionReceiver(connection.connection_id));
  }
  if connection.status != ConnectionStatus::Pending {
    return Err(Error::ConnectionAlreadyResolved {
      id:     connection.connection_id,
      status: connection.status,
    });
  }
  Ok(UserConnection {
    status: if accept { ConnectionStatus::Accepted } else { ConnectionStatus::Rejected },
    updated_at: now,
    ..connection.clone()
  })
}

/// A connection paired with the other party's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionView {
  #[serde(flatten)]
  pub connection: UserConnection,
  pub other:      ProfileSummary,
}

/// Pending requests split by direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionRequests {
  pub incoming: Vec<ConnectionView>,
  pub outgoing: Vec<ConnectionView>,
}

/// A user-search hit annotated with any existing connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicianHit {
  #[serde(flatten)]
  pub profile:           ProfileSummary,
  pub connection_status: Option<ConnectionStatus>,
}
