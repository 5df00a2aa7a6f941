//! Missions: XP-rewarding tasks scoped daily, weekly or monthly.
//!
//! Definitions are data. The store seeds [`builtin_missions`] on open and
//! records one [`UserMission`] per completed (user, mission).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::{Award, LevelProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionCategory {
  Daily,
  Weekly,
  Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
  Practice,
  Technique,
  Repertoire,
  Performance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
  /// Stable slug; also the foreign key in completion records.
  pub mission_id:  String,
  pub title:       String,
  pub description: String,
  pub category:    MissionCategory,
  pub kind:        MissionKind,
  pub xp_reward:   u32,
  /// Human-readable deadline, e.g. "Today" or "5 days left".
  pub deadline:    String,
}

/// A mission as one user sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionView {
  #[serde(flatten)]
  pub mission:      Mission,
  pub progress:     u8,
  pub is_completed: bool,
}

impl MissionView {
  pub fn is_claimable(&self) -> bool { !self.is_completed && self.progress >= 100 }
}

/// Filters for the mission list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MissionFilter {
  pub category: Option<MissionCategory>,
  pub kind:     Option<MissionKind>,
}

impl MissionFilter {
  pub fn matches(&self, m: &Mission) -> bool {
    self.category.is_none_or(|c| c == m.category) && self.kind.is_none_or(|k| k == m.kind)
  }
}

/// Completion record; its existence is what prevents re-claiming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMission {
  pub user_mission_id: Uuid,
  pub user_id:         Uuid,
  pub mission_id:      String,
  pub xp_earned:       u32,
  pub completed_at:    DateTime<Utc>,
}

/// Everything a successful claim changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimOutcome {
  pub completion: UserMission,
  pub award:      Award,
  pub progress:   LevelProgress,
}

fn mission(
  id: &str,
  title: &str,
  description: &str,
  category: MissionCategory,
  kind: MissionKind,
  xp_reward: u32,
  deadline: &str,
) -> Mission {
  Mission {
    mission_id: id.to_owned(),
    title: title.to_owned(),
    description: description.to_owned(),
    category,
    kind,
    xp_reward,
    deadline: deadline.to_owned(),
  }
}

/// The mission set every deployment starts with.
pub fn builtin_missions() -> Vec<Mission> {
  use MissionCategory::*;
  use MissionKind::*;

  vec![
    mission(
      "daily-practice-30",
      "Practice for 30 minutes",
      "Complete a focused practice session of at least 30 minutes",
      Daily, Practice, 50, "Today",
    ),
    mission(
      "daily-difficult-passage",
      "Master a difficult passage",
      "Work on and improve a challenging section of your current piece",
      Daily, Technique, 30, "Today",
    ),
    mission(
      "daily-record-practice",
      "Record your practice",
      "Make a recording of your practice session for self-assessment",
      Daily, Practice, 20, "Today",
    ),
    mission(
      "weekly-five-sessions",
      "Complete 5 practice sessions",
      "Practice consistently throughout the week",
      Weekly, Practice, 100, "5 days left",
    ),
    mission(
      "weekly-new-piece",
      "Learn a new piece",
      "Add a new piece to your repertoire and start learning it",
      Weekly, Repertoire, 150, "5 days left",
    ),
    mission(
      "weekly-scales-all-keys",
      "Practice scales in all keys",
      "Work through major and minor scales in all 12 keys",
      Weekly, Technique, 80, "3 days left",
    ),
    mission(
      "monthly-streak",
      "Complete a month-long practice streak",
      "Practice every day for a full month",
      Monthly, Practice, 500, "6 days left",
    ),
    mission(
      "monthly-perform",
      "Perform for friends or family",
      "Give a small performance of your current repertoire",
      Monthly, Performance, 200, "25 days left",
    ),
    mission(
      "monthly-master-piece",
      "Master a complete piece",
      "Fully learn and polish a piece in your repertoire",
      Monthly, Repertoire, 300, "18 days left",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn builtin_ids_are_unique() {
    let missions = builtin_missions();
    let ids: HashSet<_> = missions.iter().map(|m| m.mission_id.as_str()).collect();
    assert_eq!(ids.len(), missions.len());
  }

  #[test]
  fn filter_by_category_and_kind() {
    let f = MissionFilter {
      category: Some(MissionCategory::Weekly),
      kind:     Some(MissionKind::Practice),
    };
    let hits: Vec<_> = builtin_missions().into_iter().filter(|m| f.matches(m)).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].mission_id, "weekly-five-sessions");
  }

  #[test]
  fn completed_missions_are_not_claimable() {
    let view = MissionView {
      mission:      builtin_missions().remove(0),
      progress:     100,
      is_completed: true,
    };
    assert!(!view.is_claimable());
  }
}
