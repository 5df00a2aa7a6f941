//! The static catalog: composers, pieces and community events.
//!
//! Users never write to these tables; an operator loads them with a
//! [`CatalogImport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenge::{NewAchievement, NewChallenge};

// ─── Difficulty ──────────────────────────────────────────────────────────────

/// Coarse grouping of the 1–10 difficulty scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
  Beginner,
  Intermediate,
  Advanced,
}

impl DifficultyBand {
  /// `≤ 3` beginner, `≤ 7` intermediate, above that advanced.
  pub fn of(difficulty: u8) -> Self {
    match difficulty {
      0..=3 => Self::Beginner,
      4..=7 => Self::Intermediate,
      _ => Self::Advanced,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Beginner => "beginner",
      Self::Intermediate => "intermediate",
      Self::Advanced => "advanced",
    }
  }
}

// ─── Composer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composer {
  pub composer_id: Uuid,
  pub name:        String,
  pub bio:         Option<String>,
  pub birth_year:  Option<i32>,
  pub death_year:  Option<i32>,
  pub nationality: Option<String>,
  pub period:      Option<String>,
  pub image_url:   Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::StudioStore::add_composer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComposer {
  pub name:        String,
  pub bio:         Option<String>,
  pub birth_year:  Option<i32>,
  pub death_year:  Option<i32>,
  pub nationality: Option<String>,
  pub period:      Option<String>,
  pub image_url:   Option<String>,
}

// ─── Piece ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
  pub piece_id:         Uuid,
  pub title:            String,
  /// Display name; kept even when `composer_id` is set.
  pub composer:         String,
  pub composer_id:      Option<Uuid>,
  pub instrument:       String,
  pub period:           Option<String>,
  pub genre:            Option<String>,
  /// 1 (easiest) to 10.
  pub difficulty:       Option<u8>,
  /// Typical performance length in minutes.
  pub average_duration: Option<u32>,
  pub description:      Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Piece {
  pub fn band(&self) -> Option<DifficultyBand> { self.difficulty.map(DifficultyBand::of) }
}

/// Input to [`crate::store::StudioStore::add_piece`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPiece {
  pub title:            String,
  pub composer:         String,
  pub composer_id:      Option<Uuid>,
  pub instrument:       String,
  pub period:           Option<String>,
  pub genre:            Option<String>,
  pub difficulty:       Option<u8>,
  pub average_duration: Option<u32>,
  pub description:      Option<String>,
}

/// Discovery filters for the piece list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieceFilter {
  /// Case-insensitive match on title or composer name.
  pub search:     Option<String>,
  /// Exact instrument; `"all"` disables the filter.
  pub instrument: Option<String>,
  pub difficulty: Option<DifficultyBand>,
}

impl PieceFilter {
  pub fn matches(&self, piece: &Piece) -> bool {
    let search_ok = match self.search.as_deref().map(str::trim) {
      None | Some("") => true,
      Some(q) => {
        let q = q.to_lowercase();
        piece.title.to_lowercase().contains(&q)
          || piece.composer.to_lowercase().contains(&q)
      }
    };

    let instrument_ok = match self.instrument.as_deref() {
      None | Some("all") | Some("") => true,
      Some(i) => piece.instrument == i,
    };

    let band_ok = match self.difficulty {
      None => true,
      Some(band) => piece.band() == Some(band),
    };

    search_ok && instrument_ok && band_ok
  }
}

/// A composer's page: the composer plus their works, hardest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerDetail {
  pub composer: Composer,
  pub pieces:   Vec<Piece>,
}

/// Sort works hardest first; unknown difficulty goes last.
pub fn sort_by_difficulty_desc(pieces: &mut [Piece]) {
  pieces.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
}

/// Navigation-bar search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickSearch {
  pub pieces:    Vec<Piece>,
  pub composers: Vec<Composer>,
}

/// Result cap per kind for [`QuickSearch`].
pub const QUICK_SEARCH_LIMIT: usize = 5;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub event_date:  DateTime<Utc>,
  pub location:    Option<String>,
  pub url:         Option<String>,
  pub created_by:  Option<Uuid>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub title:       String,
  pub description: Option<String>,
  pub event_date:  DateTime<Utc>,
  pub location:    Option<String>,
  pub url:         Option<String>,
  pub created_by:  Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRegistration {
  pub user_id:       Uuid,
  pub event_id:      Uuid,
  pub registered_at: DateTime<Utc>,
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// A starter catalog, written to the store in one transaction.
#[derive(Debug, Clone, Default)]
pub struct CatalogImport {
  pub composers:    Vec<ImportComposer>,
  pub achievements: Vec<NewAchievement>,
  pub challenges:   Vec<ImportChallenge>,
  pub events:       Vec<NewEvent>,
}

/// A composer with their pieces. Each piece's `composer` and `composer_id`
/// are overwritten with the new composer's.
#[derive(Debug, Clone)]
pub struct ImportComposer {
  pub composer: NewComposer,
  pub pieces:   Vec<NewPiece>,
}

/// A challenge whose achievement is named rather than referenced by id.
/// The name must match an achievement in the same import.
#[derive(Debug, Clone)]
pub struct ImportChallenge {
  pub challenge:   NewChallenge,
  pub achievement: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCount {
  pub composers:    usize,
  pub pieces:       usize,
  pub achievements: usize,
  pub challenges:   usize,
  pub events:       usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn piece(title: &str, composer: &str, instrument: &str, difficulty: Option<u8>) -> Piece {
    Piece {
      piece_id: Uuid::new_v4(),
      title: title.into(),
      composer: composer.into(),
      composer_id: None,
      instrument: instrument.into(),
      period: None,
      genre: None,
      difficulty,
      average_duration: None,
      description: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn band_boundaries() {
    assert_eq!(DifficultyBand::of(3), DifficultyBand::Beginner);
    assert_eq!(DifficultyBand::of(4), DifficultyBand::Intermediate);
    assert_eq!(DifficultyBand::of(7), DifficultyBand::Intermediate);
    assert_eq!(DifficultyBand::of(8), DifficultyBand::Advanced);
  }

  #[test]
  fn filter_matches_composer_name() {
    let p = piece("Nocturne Op. 9 No. 2", "Frédéric Chopin", "Piano", Some(6));
    let f = PieceFilter { search: Some("chopin".into()), ..Default::default() };
    assert!(f.matches(&p));
  }

  #[test]
  fn filter_combines_instrument_and_band() {
    let p = piece("Partita No. 2", "J. S. Bach", "Violin", Some(9));
    let hit = PieceFilter {
      instrument: Some("Violin".into()),
      difficulty: Some(DifficultyBand::Advanced),
      ..Default::default()
    };
    let miss = PieceFilter {
      instrument: Some("Violin".into()),
      difficulty: Some(DifficultyBand::Beginner),
      ..Default::default()
    };
    assert!(hit.matches(&p));
    assert!(!miss.matches(&p));
  }

  #[test]
  fn unknown_difficulty_sorts_last() {
    let mut ps = vec![
      piece("a", "x", "Piano", None),
      piece("b", "x", "Piano", Some(2)),
      piece("c", "x", "Piano", Some(9)),
    ];
    sort_by_difficulty_desc(&mut ps);
    let titles: Vec<_> = ps.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["c", "b", "a"]);
  }
}
