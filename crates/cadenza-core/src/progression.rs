//! Leveling and XP bookkeeping.
//!
//! XP is cumulative and never reset on level-up. The threshold for leaving
//! level `n` is `100 × n` total XP.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// XP granted per level step.
pub const XP_PER_LEVEL: u32 = 100;

/// Total XP needed to leave `level`.
pub fn xp_to_next_level(level: u32) -> u32 { XP_PER_LEVEL.saturating_mul(level) }

/// How many levels a single award may grant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelingPolicy {
  /// At most one level per award, however large the reward.
  #[default]
  SingleStep,
  /// Keep levelling while the new total crosses the next threshold.
  Cascade,
}

/// The persisted pair that drives progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
  pub xp:    u32,
  pub level: u32,
}

impl LevelState {
  pub const INITIAL: Self = Self { xp: 0, level: 1 };

  pub fn xp_to_next_level(&self) -> u32 { xp_to_next_level(self.level) }
}

impl Default for LevelState {
  fn default() -> Self { Self::INITIAL }
}

/// Progress snapshot as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
  pub xp:               u32,
  pub level:            u32,
  pub xp_to_next_level: u32,
}

impl From<LevelState> for LevelProgress {
  fn from(s: LevelState) -> Self {
    Self { xp: s.xp, level: s.level, xp_to_next_level: s.xp_to_next_level() }
  }
}

/// Result of applying a reward to a [`LevelState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
  pub before:        LevelState,
  pub after:         LevelState,
  pub levels_gained: u32,
}

impl Award {
  pub fn leveled_up(&self) -> bool { self.levels_gained > 0 }

  pub fn progress(&self) -> LevelProgress { self.after.into() }
}

/// Apply `reward` XP to `state` under `policy`.
pub fn award(state: LevelState, reward: u32, policy: LevelingPolicy) -> Award {
  let xp = state.xp.saturating_add(reward);
  let mut level = state.level.max(1);

  match policy {
    LevelingPolicy::SingleStep => {
      if xp >= xp_to_next_level(level) {
        level += 1;
      }
    }
    LevelingPolicy::Cascade => {
      while xp >= xp_to_next_level(level) {
        level += 1;
      }
    }
  }

  let after = LevelState { xp, level };
  Award { before: state, after, levels_gained: level - state.level.max(1) }
}

/// A mission may only be claimed once its progress reaches 100%.
pub fn check_claimable(mission_id: &str, progress: u8) -> Result<()> {
  if progress >= 100 {
    Ok(())
  } else {
    Err(Error::MissionIncomplete { mission_id: mission_id.to_owned(), progress })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn threshold_is_one_hundred_per_level() {
    for level in 1..=50 {
      assert_eq!(xp_to_next_level(level), 100 * level);
    }
  }

  #[test]
  fn reward_below_threshold_keeps_level() {
    let a = award(LevelState { xp: 40, level: 1 }, 30, LevelingPolicy::SingleStep);
    assert_eq!(a.after, LevelState { xp: 70, level: 1 });
    assert!(!a.leveled_up());
  }

  #[test]
  fn reaching_threshold_exactly_levels_up() {
    let a = award(LevelState { xp: 50, level: 1 }, 50, LevelingPolicy::SingleStep);
    assert_eq!(a.after.level, 2);
    assert_eq!(a.levels_gained, 1);
  }

  #[test]
  fn single_step_ignores_reward_magnitude() {
    let a = award(LevelState { xp: 0, level: 1 }, 5_000, LevelingPolicy::SingleStep);
    assert_eq!(a.after, LevelState { xp: 5_000, level: 2 });
    assert_eq!(a.levels_gained, 1);
  }

  #[test]
  fn cascade_crosses_every_threshold() {
    // 100·1, 100·2, 100·3 are all ≤ 350; 100·4 is not.
    let a = award(LevelState { xp: 0, level: 1 }, 350, LevelingPolicy::Cascade);
    assert_eq!(a.after, LevelState { xp: 350, level: 4 });
    assert_eq!(a.levels_gained, 3);
    assert_eq!(a.progress().xp_to_next_level, 400);
  }

  #[test]
  fn mission_claim_scenario() {
    let a = award(LevelState { xp: 90, level: 1 }, 50, LevelingPolicy::SingleStep);
    assert_eq!(
      a.progress(),
      LevelProgress { xp: 140, level: 2, xp_to_next_level: 200 }
    );
  }

  #[test]
  fn claimable_only_when_complete() {
    assert!(check_claimable("daily-practice", 100).is_ok());
    assert!(matches!(
      check_claimable("daily-practice", 75),
      Err(Error::MissionIncomplete { progress: 75, .. })
    ));
  }
}
