//! Domain events published after a state change commits.
//!
//! Serialized with an internal `type` tag so subscribers outside Rust can
//! dispatch on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{repertoire::PieceStatus, social::ConnectionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
  /// A user crossed one or more level thresholds.
  LevelUp {
    user_id:   Uuid,
    old_level: u32,
    new_level: u32,
    xp:        u32,
  },

  MissionClaimed {
    user_id:    Uuid,
    mission_id: String,
    xp_earned:  u32,
  },

  /// A repertoire entry was created or moved to a new status.
  PieceStatusChanged {
    user_id:  Uuid,
    piece_id: Uuid,
    from:     Option<PieceStatus>,
    to:       PieceStatus,
  },

  ConnectionRequested {
    connection_id: Uuid,
    requester:     Uuid,
    receiver:      Uuid,
  },

  ConnectionResolved {
    connection_id: Uuid,
    requester:     Uuid,
    receiver:      Uuid,
    status:        ConnectionStatus,
  },

  ChallengeCompleted {
    user_id:      Uuid,
    challenge_id: Uuid,
    achievement:  Option<Uuid>,
  },

  PracticeLogged {
    user_id:        Uuid,
    session_id:     Uuid,
    duration:       u32,
    current_streak: u32,
  },
}

impl StudioEvent {
  pub fn name(&self) -> &'static str {
    match self {
      Self::LevelUp { .. } => "level_up",
      Self::MissionClaimed { .. } => "mission_claimed",
      Self::PieceStatusChanged { .. } => "piece_status_changed",
      Self::ConnectionRequested { .. } => "connection_requested",
      Self::ConnectionResolved { .. } => "connection_resolved",
      Self::ChallengeCompleted { .. } => "challenge_completed",
      Self::PracticeLogged { .. } => "practice_logged",
    }
  }
}

/// An event stamped with the time it was published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
  pub at:    DateTime<Utc>,
  #[serde(flatten)]
  pub event: StudioEvent,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_matches_name() {
    let e = StudioEvent::MissionClaimed {
      user_id:    Uuid::nil(),
      mission_id: "daily-practice-30".into(),
      xp_earned:  50,
    };
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["type"], e.name());
    assert_eq!(serde_json::from_value::<StudioEvent>(json).unwrap(), e);
  }
}
