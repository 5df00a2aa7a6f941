//! Practice log and daily streaks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Default page size for recent sessions.
pub const RECENT_SESSIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSession {
  pub session_id: Uuid,
  pub user_id:    Uuid,
  pub piece_id:   Option<Uuid>,
  /// Seconds.
  pub duration:   u32,
  pub rating:     Option<u8>,
  pub notes:      Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPracticeSession {
  pub piece_id: Option<Uuid>,
  pub duration: u32,
  pub rating:   Option<u8>,
  pub notes:    Option<String>,
}

impl NewPracticeSession {
  pub fn validate(&self) -> Result<()> {
    if self.duration == 0 {
      return Err(Error::Invalid("practice duration must be positive".into()));
    }
    match self.rating {
      Some(r) if !(1..=5).contains(&r) => {
        Err(Error::Invalid(format!("rating must be between 1 and 5, got {r}")))
      }
      _ => Ok(()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeStreak {
  pub user_id:            Uuid,
  pub current_streak:     u32,
  pub longest_streak:     u32,
  pub last_practice_date: Option<NaiveDate>,
  pub updated_at:         DateTime<Utc>,
}

impl PracticeStreak {
  pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      current_streak: 0,
      longest_streak: 0,
      last_practice_date: None,
      updated_at: now,
    }
  }
}

/// A logged session together with the streak it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeLog {
  pub session: PracticeSession,
  pub streak:  PracticeStreak,
}

/// Fold a practice day into the streak.
pub fn advance_streak(
  streak: &PracticeStreak,
  today: NaiveDate,
  now: DateTime<Utc>,
) -> PracticeStreak {
  let current = match streak.last_practice_date {
    Some(last) if last == today => return streak.clone(),
    Some(last) if last.succ_opt() == Some(today) => streak.current_streak + 1,
    _ => 1,
  };
  PracticeStreak {
    user_id:            streak.user_id,
    current_streak:     current,
    longest_streak:     streak.longest_streak.max(current),
    last_practice_date: Some(today),
    updated_at:         now,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

  #[test]
  fn streak_rules() {
    let now = Utc::now();
    let s = PracticeStreak::empty(Uuid::new_v4(), now);

    let s = advance_streak(&s, day(1), now);
    assert_eq!((s.current_streak, s.longest_streak), (1, 1));

    let same = advance_streak(&s, day(1), now);
    assert_eq!(same, s);

    let s = advance_streak(&s, day(2), now);
    let s = advance_streak(&s, day(3), now);
    assert_eq!((s.current_streak, s.longest_streak), (3, 3));

    let s = advance_streak(&s, day(10), now);
    assert_eq!((s.current_streak, s.longest_streak), (1, 3));
    assert_eq!(s.last_practice_date, Some(day(10)));
  }

  #[test]
  fn session_validation() {
    let ok = NewPracticeSession { duration: 600, rating: Some(5), ..Default::default() };
    assert!(ok.validate().is_ok());

    let zero = NewPracticeSession { duration: 0, ..Default::default() };
    assert!(zero.validate().is_err());

    let bad_rating = NewPracticeSession { duration: 60, rating: Some(6), ..Default::default() };
    assert!(bad_rating.validate().is_err());
  }
}
