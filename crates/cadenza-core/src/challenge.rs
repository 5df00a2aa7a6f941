//! Time-boxed challenges and the achievements they grant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
  pub challenge_id:   Uuid,
  pub title:          String,
  pub description:    Option<String>,
  /// Target amount in `goal_type` units; always positive.
  pub goal:           u32,
  /// Unit of the goal, e.g. "minutes" or "sessions".
  pub goal_type:      String,
  /// Display text, e.g. "7 days".
  pub duration:       Option<String>,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
  /// Granted on completion.
  pub achievement_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChallenge {
  pub title:          String,
  pub description:    Option<String>,
  pub goal:           u32,
  pub goal_type:      String,
  pub duration:       Option<String>,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
  pub achievement_id: Option<Uuid>,
}

impl NewChallenge {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::Invalid("challenge title must not be empty".into()));
    }
    if self.goal == 0 {
      return Err(Error::Invalid("challenge goal must be positive".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChallenge {
  pub user_challenge_id: Uuid,
  pub user_id:           Uuid,
  pub challenge_id:      Uuid,
  pub progress:          u32,
  pub completed:         bool,
  pub completed_at:      Option<DateTime<Utc>>,
  pub joined_at:         DateTime<Utc>,
}

impl UserChallenge {
  pub fn join(user_id: Uuid, challenge_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_challenge_id: Uuid::new_v4(),
      user_id,
      challenge_id,
      progress: 0,
      completed: false,
      completed_at: None,
      joined_at: now,
    }
  }
}

/// A challenge as one user sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeView {
  #[serde(flatten)]
  pub challenge:     Challenge,
  pub participation: Option<UserChallenge>,
}

/// Outcome of recording progress on a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeAdvance {
  pub participation:       UserChallenge,
  /// True only on the call that crossed the goal.
  pub just_completed:      bool,
  pub granted_achievement: Option<Uuid>,
}

/// Add `delta` to `progress`, clamped to `goal`.
pub fn advance(progress: u32, delta: u32, goal: u32) -> u32 {
  progress.saturating_add(delta).min(goal)
}

/// Apply `delta` to a participation row.
///
/// `completed_at` is set on the first crossing and kept afterwards.
pub fn apply_progress(
  row: &UserChallenge,
  delta: u32,
  goal: u32,
  now: DateTime<Utc>,
) -> (UserChallenge, bool) {
  let progress = advance(row.progress, delta, goal);
  let crossed = !row.completed && progress >= goal;
  let next = UserChallenge {
    progress,
    completed: row.completed || crossed,
    completed_at: if crossed { Some(now) } else { row.completed_at },
    ..row.clone()
  };
  (next, crossed)
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
  pub achievement_id: Uuid,
  pub name:           String,
  pub description:    Option<String>,
  pub category:       Option<String>,
  pub icon:           Option<String>,
  pub points:         u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAchievement {
  pub name:        String,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub icon:        Option<String>,
  pub points:      u32,
}

/// An achievement a user holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedAchievement {
  #[serde(flatten)]
  pub achievement: Achievement,
  pub earned_at:   DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn advance_clamps_to_goal() {
    assert_eq!(advance(5, 3, 10), 8);
    assert_eq!(advance(8, 30, 10), 10);
    assert_eq!(advance(u32::MAX, 1, 10), 10);
  }

  #[test]
  fn completion_is_stamped_once() {
    let t0 = Utc::now();
    let row = UserChallenge::join(Uuid::new_v4(), Uuid::new_v4(), t0);

    let (row, crossed) = apply_progress(&row, 6, 10, t0);
    assert!(!crossed);
    assert!(row.completed_at.is_none());

    let t1 = t0 + chrono::Duration::hours(1);
    let (row, crossed) = apply_progress(&row, 6, 10, t1);
    assert!(crossed);
    assert!(row.completed);
    assert_eq!(row.progress, 10);
    assert_eq!(row.completed_at, Some(t1));

    let (again, crossed) = apply_progress(&row, 1, 10, t1 + chrono::Duration::hours(1));
    assert!(!crossed);
    assert_eq!(again.completed_at, Some(t1));
  }

  #[test]
  fn zero_goal_is_invalid() {
    let c = NewChallenge {
      title:          "Scales week".into(),
      description:    None,
      goal:           0,
      goal_type:      "sessions".into(),
      duration:       None,
      start_date:     None,
      end_date:       None,
      achievement_id: None,
    };
    assert!(matches!(c.validate(), Err(Error::Invalid(_))));
  }
}
