//! Plain-text rendering for the responses worth reading at a glance.
//! Everything else is printed as pretty JSON.

use std::fmt::Write as _;

use cadenza_core::{
  mission::{ClaimOutcome, MissionView},
  practice::PracticeStreak,
  profile::Leaderboard,
  repertoire::{Repertoire, RepertoireEntry},
};
use serde_json::Value;

pub fn json(value: &Value) -> String {
  serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn leaderboard(board: &Leaderboard) -> String {
  let mut out = String::new();
  for e in &board.entries {
    let marker = if e.is_current_user { '*' } else { ' ' };
    let instrument = e.profile.instrument.as_deref().unwrap_or("-");
    let _ = writeln!(
      out,
      "{marker}{:>4}  {:<24} {:<12} lvl {:>3}  {:>6} xp",
      e.rank, e.profile.full_name, instrument, e.profile.level, e.profile.xp
    );
  }
  if let Some(rank) = board.current_user_rank {
    let _ = writeln!(out, "your rank: {rank}");
  }
  out
}

pub fn missions(views: &[MissionView]) -> String {
  let mut out = String::new();
  for v in views {
    let state = if v.is_completed {
      "claimed".to_owned()
    } else if v.is_claimable() {
      "ready".to_owned()
    } else {
      format!("{}%", v.progress)
    };
    let _ = writeln!(
      out,
      "{:<26} {:<8} {:>4} xp  {:<8} {}",
      v.mission.mission_id,
      state,
      v.mission.xp_reward,
      v.mission.deadline,
      v.mission.title
    );
  }
  out
}

pub fn claim(outcome: &ClaimOutcome) -> String {
  let mut out = format!(
    "+{} xp for {}\nlevel {} · {} xp · {} xp to next level\n",
    outcome.completion.xp_earned,
    outcome.completion.mission_id,
    outcome.progress.level,
    outcome.progress.xp,
    outcome.progress.xp_to_next_level,
  );
  if outcome.award.leveled_up() {
    let _ = writeln!(
      out,
      "level up! {} → {}",
      outcome.award.before.level, outcome.award.after.level
    );
  }
  out
}

pub fn repertoire(rep: &Repertoire) -> String {
  let mut out = String::new();
  let groups: [(&str, &[RepertoireEntry]); 3] = [
    ("current", &rep.current),
    ("wishlist", &rep.wishlist),
    ("mastered", &rep.mastered),
  ];
  for (label, entries) in groups {
    let _ = writeln!(out, "{label} ({})", entries.len());
    for e in entries {
      let _ = writeln!(
        out,
        "  {:>3}%  {} · {}  [{}]",
        e.entry.progress, e.piece.title, e.piece.composer, e.piece.piece_id
      );
    }
  }
  out
}

pub fn streak(s: &PracticeStreak) -> String {
  match s.last_practice_date {
    Some(day) => format!(
      "current streak {} · longest {} · last practiced {day}\n",
      s.current_streak, s.longest_streak
    ),
    None => "no practice logged yet\n".to_owned(),
  }
}
