//! The `StudioStore` trait.
//!
//! Implemented by storage backends (e.g. `cadenza-store-sqlite`). The API and
//! the server depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  DomainError,
  account::Account,
  catalog::{
    CatalogImport, Composer, Event, EventRegistration, ImportCount, NewComposer, NewEvent,
    NewPiece, Piece, PieceFilter, QuickSearch,
  },
  challenge::{
    Achievement, Challenge, ChallengeAdvance, ChallengeView, EarnedAchievement,
    NewAchievement, NewChallenge, UserChallenge,
  },
  mission::{ClaimOutcome, Mission, MissionFilter, MissionView},
  practice::{NewPracticeSession, PracticeLog, PracticeSession, PracticeStreak},
  profile::{LeaderboardSort, Profile, ProfileSummary, ProfileUpdate},
  progression::LevelingPolicy,
  repertoire::{PieceStatus, Repertoire, RepertoireUpdate, StatusChange, UserPiece},
  settings::{SettingsUpdate, UserSettings},
  social::{ConnectionRequests, ConnectionView, MusicianHit, UserConnection},
};

/// Input to [`StudioStore::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  /// Already hashed; the store never sees plaintext.
  pub password_hash: String,
  pub full_name:     Option<String>,
  /// Randomness for the default profile's color and icon.
  pub pick:          u32,
}

/// Abstraction over a Cadenza store backend.
///
/// Every operation that reads state and then writes based on it (claiming a
/// mission, requesting a connection, changing a piece's status) is atomic:
/// the check and the write happen in one backend transaction, so concurrent
/// callers cannot both pass the check.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait StudioStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Accounts & profiles ───────────────────────────────────────────────

  /// Create an account and its default profile together.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<(Account, Profile), Self::Error>> + Send + '_;

  /// Look up an account by email, case-insensitively.
  fn account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Return the profile, creating the default one if it is missing.
  fn ensure_profile<'a>(
    &'a self,
    user_id: Uuid,
    email: &'a str,
    pick: u32,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + 'a;

  fn update_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// The top `limit` profiles ordered by `sort`, descending.
  fn leaderboard(
    &self,
    sort: LeaderboardSort,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ProfileSummary>, Self::Error>> + Send + '_;

  /// 1-based rank: the number of profiles with a strictly higher key, plus one.
  fn rank_of(
    &self,
    user_id: Uuid,
    sort: LeaderboardSort,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Find other musicians by name, annotated with their connection to `user_id`.
  fn search_musicians<'a>(
    &'a self,
    user_id: Uuid,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<MusicianHit>, Self::Error>> + Send + 'a;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Load a starter catalog unless one was imported before.
  ///
  /// All rows are written in one transaction along with a marker recording
  /// the import; a failure leaves the store untouched and unmarked. Returns
  /// `None` if the marker was already present.
  fn import_catalog(
    &self,
    import: CatalogImport,
  ) -> impl Future<Output = Result<Option<ImportCount>, Self::Error>> + Send + '_;

  fn add_composer(
    &self,
    input: NewComposer,
  ) -> impl Future<Output = Result<Composer, Self::Error>> + Send + '_;

  fn add_piece(
    &self,
    input: NewPiece,
  ) -> impl Future<Output = Result<Piece, Self::Error>> + Send + '_;

  fn get_piece(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Piece>, Self::Error>> + Send + '_;

  /// Pieces ordered by title.
  fn list_pieces<'a>(
    &'a self,
    filter: &'a PieceFilter,
  ) -> impl Future<Output = Result<Vec<Piece>, Self::Error>> + Send + 'a;

  fn get_composer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Composer>, Self::Error>> + Send + '_;

  /// Composers ordered by name, optionally matching name or period.
  fn list_composers<'a>(
    &'a self,
    search: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Composer>, Self::Error>> + Send + 'a;

  /// A composer's works, hardest first.
  fn composer_pieces(
    &self,
    composer_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Piece>, Self::Error>> + Send + '_;

  fn quick_search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<QuickSearch, Self::Error>> + Send + 'a;

  // ── Repertoire ────────────────────────────────────────────────────────

  /// Upsert the (user, piece) row to `status`. Same status is a no-op.
  fn set_piece_status(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
    status: PieceStatus,
  ) -> impl Future<Output = Result<StatusChange, Self::Error>> + Send + '_;

  fn update_repertoire(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
    update: RepertoireUpdate,
  ) -> impl Future<Output = Result<UserPiece, Self::Error>> + Send + '_;

  fn remove_from_repertoire(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_user_piece(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserPiece>, Self::Error>> + Send + '_;

  fn repertoire(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Repertoire, Self::Error>> + Send + '_;

  // ── Missions ──────────────────────────────────────────────────────────

  /// Insert missions that are not yet present. Returns how many were new.
  fn seed_missions(
    &self,
    missions: Vec<Mission>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn list_missions(
    &self,
    user_id: Uuid,
    filter: MissionFilter,
  ) -> impl Future<Output = Result<Vec<MissionView>, Self::Error>> + Send + '_;

  fn set_mission_progress<'a>(
    &'a self,
    user_id: Uuid,
    mission_id: &'a str,
    progress: u8,
  ) -> impl Future<Output = Result<MissionView, Self::Error>> + Send + 'a;

  /// Claim a completed mission: record completion and award XP atomically.
  ///
  /// Fails with `AlreadyClaimed` on a second claim, leaving XP untouched.
  fn claim_mission<'a>(
    &'a self,
    user_id: Uuid,
    mission_id: &'a str,
    policy: LevelingPolicy,
  ) -> impl Future<Output = Result<ClaimOutcome, Self::Error>> + Send + 'a;

  // ── Challenges & achievements ─────────────────────────────────────────

  fn add_achievement(
    &self,
    input: NewAchievement,
  ) -> impl Future<Output = Result<Achievement, Self::Error>> + Send + '_;

  fn add_challenge(
    &self,
    input: NewChallenge,
  ) -> impl Future<Output = Result<Challenge, Self::Error>> + Send + '_;

  fn list_challenges(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChallengeView>, Self::Error>> + Send + '_;

  fn join_challenge(
    &self,
    user_id: Uuid,
    challenge_id: Uuid,
  ) -> impl Future<Output = Result<UserChallenge, Self::Error>> + Send + '_;

  /// Add `delta` to the user's progress and grant the achievement on completion.
  fn record_challenge_progress(
    &self,
    user_id: Uuid,
    challenge_id: Uuid,
    delta: u32,
  ) -> impl Future<Output = Result<ChallengeAdvance, Self::Error>> + Send + '_;

  fn achievements(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EarnedAchievement>, Self::Error>> + Send + '_;

  // ── Connections ───────────────────────────────────────────────────────

  fn request_connection(
    &self,
    requester: Uuid,
    receiver: Uuid,
  ) -> impl Future<Output = Result<UserConnection, Self::Error>> + Send + '_;

  fn respond_connection(
    &self,
    actor: Uuid,
    connection_id: Uuid,
    accept: bool,
  ) -> impl Future<Output = Result<UserConnection, Self::Error>> + Send + '_;

  /// Accepted connections in either direction.
  fn connections(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ConnectionView>, Self::Error>> + Send + '_;

  fn connection_requests(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ConnectionRequests, Self::Error>> + Send + '_;

  // ── Practice ──────────────────────────────────────────────────────────

  /// Insert the session and fold today into the streak in one transaction.
  fn log_practice(
    &self,
    user_id: Uuid,
    input: NewPracticeSession,
  ) -> impl Future<Output = Result<PracticeLog, Self::Error>> + Send + '_;

  /// Newest first.
  fn recent_practice(
    &self,
    user_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PracticeSession>, Self::Error>> + Send + '_;

  fn practice_streak(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<PracticeStreak, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Events on or after `from`, soonest first.
  fn upcoming_events(
    &self,
    from: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn register_for_event(
    &self,
    user_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<EventRegistration, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  /// Get-or-create the user's settings.
  fn settings(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<UserSettings, Self::Error>> + Send + '_;

  fn update_settings(
    &self,
    user_id: Uuid,
    update: SettingsUpdate,
  ) -> impl Future<Output = Result<UserSettings, Self::Error>> + Send + '_;
}
