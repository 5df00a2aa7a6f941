//! Starter catalog: composers with their pieces, achievements, challenges and
//! events, loaded from TOML the first time the server starts.

use anyhow::Context as _;
use cadenza_core::{
  catalog::{
    CatalogImport, ImportChallenge, ImportComposer, ImportCount, NewComposer, NewEvent, NewPiece,
  },
  challenge::{NewAchievement, NewChallenge},
  store::StudioStore,
};
use serde::Deserialize;

/// The catalog shipped with the server.
pub const BUNDLED: &str = include_str!("../catalog.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
  pub composers:    Vec<SeedComposer>,
  pub achievements: Vec<NewAchievement>,
  pub challenges:   Vec<SeedChallenge>,
  /// `event_date` must be a quoted RFC 3339 string.
  pub events:       Vec<NewEvent>,
}

#[derive(Debug, Deserialize)]
pub struct SeedComposer {
  pub name:        String,
  pub bio:         Option<String>,
  pub birth_year:  Option<i32>,
  pub death_year:  Option<i32>,
  pub nationality: Option<String>,
  pub period:      Option<String>,
  pub image_url:   Option<String>,
  #[serde(default)]
  pub pieces:      Vec<SeedPiece>,
}

/// A piece nested under its composer. `period` defaults to the composer's.
#[derive(Debug, Deserialize)]
pub struct SeedPiece {
  pub title:            String,
  pub instrument:       String,
  pub period:           Option<String>,
  pub genre:            Option<String>,
  pub difficulty:       Option<u8>,
  pub average_duration: Option<u32>,
  pub description:      Option<String>,
}

/// A challenge that names its achievement instead of referencing it by id.
#[derive(Debug, Deserialize)]
pub struct SeedChallenge {
  pub title:       String,
  pub description: Option<String>,
  pub goal:        u32,
  pub goal_type:   String,
  pub duration:    Option<String>,
  pub achievement: Option<String>,
}

impl CatalogSeed {
  pub fn parse(text: &str) -> anyhow::Result<Self> {
    toml::from_str(text).context("invalid catalog seed")
  }

  /// Load the catalog unless the store has already imported one.
  ///
  /// The store writes everything in one transaction, so a bad file leaves
  /// nothing behind and can be fixed and retried. Returns `None` when the
  /// store was left untouched.
  pub async fn apply<S: StudioStore>(self, store: &S) -> anyhow::Result<Option<ImportCount>> {
    let count = store.import_catalog(self.into_import()).await?;
    Ok(count)
  }

  fn into_import(self) -> CatalogImport {
    let composers = self
      .composers
      .into_iter()
      .map(|c| {
        let pieces = c
          .pieces
          .into_iter()
          .map(|p| NewPiece {
            title:            p.title,
            composer:         c.name.clone(),
            composer_id:      None,
            instrument:       p.instrument,
            period:           p.period.or_else(|| c.period.clone()),
            genre:            p.genre,
            difficulty:       p.difficulty,
            average_duration: p.average_duration,
            description:      p.description,
          })
          .collect();
        ImportComposer {
          composer: NewComposer {
            name:        c.name,
            bio:         c.bio,
            birth_year:  c.birth_year,
            death_year:  c.death_year,
            nationality: c.nationality,
            period:      c.period,
            image_url:   c.image_url,
          },
          pieces,
        }
      })
      .collect();

    let challenges = self
      .challenges
      .into_iter()
      .map(|ch| ImportChallenge {
        challenge:   NewChallenge {
          title:          ch.title,
          description:    ch.description,
          goal:           ch.goal,
          goal_type:      ch.goal_type,
          duration:       ch.duration,
          start_date:     None,
          end_date:       None,
          achievement_id: None,
        },
        achievement: ch.achievement,
      })
      .collect();

    CatalogImport {
      composers,
      achievements: self.achievements,
      challenges,
      events: self.events,
    }
  }
}

#[cfg(test)]
mod tests {
  use cadenza_core::catalog::PieceFilter;
  use cadenza_store_sqlite::SqliteStore;
  use uuid::Uuid;

  use super::*;

  #[test]
  fn bundled_catalog_parses() {
    let seed = CatalogSeed::parse(BUNDLED).unwrap();
    assert_eq!(seed.composers.len(), 5);
    assert!(seed.composers.iter().all(|c| !c.pieces.is_empty()));
    assert_eq!(seed.challenges.len(), 3);
    assert_eq!(seed.events.len(), 3);
  }

  #[tokio::test]
  async fn bundled_catalog_is_seeded_once() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let first = CatalogSeed::parse(BUNDLED).unwrap().apply(&store).await.unwrap();
    let count = first.unwrap();
    assert_eq!(count.composers, 5);
    assert_eq!(count.pieces, 14);
    assert_eq!(count.events, 3);

    let again = CatalogSeed::parse(BUNDLED).unwrap().apply(&store).await.unwrap();
    assert_eq!(again, None);
    let pieces = store.list_pieces(&PieceFilter::default()).await.unwrap();
    assert_eq!(pieces.len(), 14);

    let from = "2027-01-01T00:00:00Z".parse().unwrap();
    let events = store.upcoming_events(from).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].title, "Spring Chamber Music Workshop");
  }

  #[tokio::test]
  async fn pieces_inherit_composer_period_and_link() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    CatalogSeed::parse(BUNDLED).unwrap().apply(&store).await.unwrap();

    let filter = PieceFilter { search: Some("Syrinx".into()), ..Default::default() };
    let syrinx = store.list_pieces(&filter).await.unwrap().remove(0);
    assert_eq!(syrinx.period.as_deref(), Some("Impressionist"));
    assert_eq!(syrinx.composer, "Claude Debussy");

    let composer = store.get_composer(syrinx.composer_id.unwrap()).await.unwrap().unwrap();
    assert_eq!(composer.name, "Claude Debussy");
  }

  const STREAK_ONLY: &str = r#"
    [[achievements]]
    name   = "Week Warrior"
    points = 50

    [[challenges]]
    title       = "Seven-day streak"
    goal        = 7
    goal_type   = "days"
    achievement = "Week Warrior"
  "#;

  #[tokio::test]
  async fn seed_without_composers_is_applied_once() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let first = CatalogSeed::parse(STREAK_ONLY).unwrap().apply(&store).await.unwrap();
    assert_eq!(first.map(|c| c.challenges), Some(1));
    let again = CatalogSeed::parse(STREAK_ONLY).unwrap().apply(&store).await.unwrap();
    assert_eq!(again, None);

    let challenges = store.list_challenges(Uuid::new_v4()).await.unwrap();
    assert_eq!(challenges.len(), 1);
  }

  #[tokio::test]
  async fn failed_seed_can_be_fixed_and_retried() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let broken = r#"
      [[composers]]
      name   = "Erik Satie"
      period = "Modern"

        [[composers.pieces]]
        title      = "Gymnopédie No. 1"
        instrument = "piano"
        difficulty = 3

      [[challenges]]
      title       = "Orphan"
      goal        = 1
      goal_type   = "sessions"
      achievement = "Nope"
    "#;
    let err = CatalogSeed::parse(broken).unwrap().apply(&store).await.unwrap_err();
    assert!(err.to_string().contains("Nope"));
    assert!(store.list_composers(None).await.unwrap().is_empty());
    assert!(store.list_challenges(Uuid::new_v4()).await.unwrap().is_empty());

    let fixed = broken.replace(r#"achievement = "Nope""#, "");
    let retry = CatalogSeed::parse(&fixed).unwrap().apply(&store).await.unwrap();
    let count = retry.unwrap();
    assert_eq!((count.composers, count.pieces, count.challenges), (1, 1, 1));
  }
}
