//! A user's repertoire: which pieces they are learning, want to learn, or
//! have mastered.
//!
//! At most one [`UserPiece`] exists per (user, piece). Changing status is an
//! upsert planned by [`plan_status_change`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, catalog::Piece};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceStatus {
  Current,
  Wishlist,
  Mastered,
}

impl PieceStatus {
  /// Progress assigned when a piece enters this status.
  pub fn default_progress(self) -> u8 {
    match self {
      Self::Mastered => 100,
      Self::Current | Self::Wishlist => 0,
    }
  }
}

impl std::fmt::Display for PieceStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Current => "current",
      Self::Wishlist => "wishlist",
      Self::Mastered => "mastered",
    })
  }
}

/// The join row between a user and a catalog piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPiece {
  pub user_piece_id: Uuid,
  pub user_id:       Uuid,
  pub piece_id:      Uuid,
  pub status:        PieceStatus,
  /// Percentage, 0–100.
  pub progress:      u8,
  pub notes:         Option<String>,
  /// Set on insert, never changed afterwards.
  pub started_at:    DateTime<Utc>,
  /// Set on every transition into `Mastered`, cleared on leaving it.
  pub mastered_at:   Option<DateTime<Utc>>,
  pub updated_at:    DateTime<Utc>,
}

/// What the store must do to apply a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPlan {
  Insert(UserPiece),
  Update(UserPiece),
  Unchanged(UserPiece),
}

impl StatusPlan {
  pub fn row(&self) -> &UserPiece {
    match self {
      Self::Insert(r) | Self::Update(r) | Self::Unchanged(r) => r,
    }
  }

  pub fn into_row(self) -> UserPiece {
    match self {
      Self::Insert(r) | Self::Update(r) | Self::Unchanged(r) => r,
    }
  }

  pub fn is_change(&self) -> bool { !matches!(self, Self::Unchanged(_)) }
}

/// The result of applying a [`StatusPlan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
  pub previous: Option<PieceStatus>,
  pub entry:    UserPiece,
}

impl StatusChange {
  pub fn changed(&self) -> bool { self.previous != Some(self.entry.status) }
}

/// Plan the upsert that moves `(user_id, piece_id)` to `status`.
pub fn plan_status_change(
  user_id: Uuid,
  piece_id: Uuid,
  existing: Option<&UserPiece>,
  status: PieceStatus,
  now: DateTime<Utc>,
) -> StatusPlan {
  let mastered_at = (status == PieceStatus::Mastered).then_some(now);

  match existing {
    None => StatusPlan::Insert(UserPiece {
      user_piece_id: Uuid::new_v4(),
      user_id,
      piece_id,
      status,
      progress: status.default_progress(),
      notes: None,
      started_at: now,
      mastered_at,
      updated_at: now,
    }),
    Some(row) if row.status == status => StatusPlan::Unchanged(row.clone()),
    Some(row) => StatusPlan::Update(UserPiece {
      status,
      progress: status.default_progress(),
      mastered_at,
      updated_at: now,
      ..row.clone()
    }),
  }
}

/// Validate a user-supplied progress percentage.
pub fn validate_progress(progress: i64) -> Result<u8> {
  u8::try_from(progress)
    .ok()
    .filter(|p| *p <= 100)
    .ok_or(Error::ProgressOutOfRange(progress))
}

/// Partial edit of a repertoire row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepertoireUpdate {
  pub progress: Option<i64>,
  pub notes:    Option<String>,
}

/// A repertoire row joined with its catalog piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepertoireEntry {
  #[serde(flatten)]
  pub entry: UserPiece,
  pub piece: Piece,
}

/// The repertoire page, split by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repertoire {
  pub current:  Vec<RepertoireEntry>,
  pub wishlist: Vec<RepertoireEntry>,
  pub mastered: Vec<RepertoireEntry>,
}

impl Repertoire {
  pub fn group(entries: impl IntoIterator<Item = RepertoireEntry>) -> Self {
    let mut out = Self::default();
    for e in entries {
      match e.entry.status {
        PieceStatus::Current => out.current.push(e),
        PieceStatus::Wishlist => out.wishlist.push(e),
        PieceStatus::Mastered => out.mastered.push(e),
      }
    }
    out
  }
}
