//! Integration tests for `SqliteStore` against an in-memory database.

use cadenza_core::{
  Error as CoreError,
  DomainError,
  catalog::{
    CatalogImport, DifficultyBand, ImportChallenge, ImportComposer, NewComposer, NewEvent,
    NewPiece, PieceFilter,
  },
  challenge::{NewAchievement, NewChallenge},
  mission::{Mission, MissionCategory, MissionFilter, MissionKind},
  practice::NewPracticeSession,
  profile::{LeaderboardSort, ProfileUpdate},
  progression::{LevelProgress, LevelingPolicy},
  repertoire::{PieceStatus, RepertoireUpdate},
  settings::{SettingsUpdate, Theme},
  social::ConnectionStatus,
  store::{NewAccount, StudioStore},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore, store::is_unique_violation};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str, name: &str) -> Uuid {
  let (account, _) = s
    .create_account(NewAccount {
      email:         email.into(),
      password_hash: "$argon2id$v=19$test".into(),
      full_name:     Some(name.into()),
      pick:          3,
    })
    .await
    .unwrap();
  account.user_id
}

fn domain(e: &Error) -> &CoreError {
  e.domain().expect("domain error")
}

async fn complete(s: &SqliteStore, user_id: Uuid, mission_id: &str) {
  s.set_mission_progress(user_id, mission_id, 100).await.unwrap();
}

async fn piece(s: &SqliteStore, title: &str, composer: &str, difficulty: u8) -> Uuid {
  s.add_piece(NewPiece {
    title: title.into(),
    composer: composer.into(),
    instrument: "piano".into(),
    difficulty: Some(difficulty),
    ..Default::default()
  })
  .await
  .unwrap()
  .piece_id
}

// ─── Accounts & profiles ─────────────────────────────────────────────────────

#[tokio::test]
async fn signup_creates_default_profile() {
  let s = store().await;
  let (account, profile) = s
    .create_account(NewAccount {
      email:         "  Clara@Example.org ".into(),
      password_hash: "hash".into(),
      full_name:     None,
      pick:          0,
    })
    .await
    .unwrap();

  assert_eq!(account.email, "clara@example.org");
  assert_eq!((profile.xp, profile.level), (0, 1));
  assert!(profile.avatar_url.as_deref().unwrap().ends_with("clara@example.org"));

  let fetched = s.get_profile(account.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.profile_color, profile.profile_color);
  assert_eq!(fetched.created_at, profile.created_at);

  let found = s.account_by_email("CLARA@example.org").await.unwrap().unwrap();
  assert_eq!(found.user_id, account.user_id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "a@example.org", "A").await;
  let err = s
    .create_account(NewAccount {
      email:         "A@example.org".into(),
      password_hash: "hash".into(),
      full_name:     None,
      pick:          0,
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::EmailTaken(_)));
}

#[tokio::test]
async fn ensure_profile_is_idempotent() {
  let s = store().await;
  let id = user(&s, "b@example.org", "Béla").await;
  let p = s.ensure_profile(id, "b@example.org", 99).await.unwrap();
  assert_eq!(p.full_name, "Béla");
}

#[tokio::test]
async fn profile_update_keeps_progression() {
  let s = store().await;
  let id = user(&s, "c@example.org", "C").await;
  let p = s
    .update_profile(id, ProfileUpdate {
      bio: Some("Cellist".into()),
      instrument: Some("cello".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(p.bio, "Cellist");
  assert_eq!((p.xp, p.level), (0, 1));

  let err = s.update_profile(Uuid::new_v4(), ProfileUpdate::default()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ProfileNotFound(_)));
}

// ─── Missions & progression ──────────────────────────────────────────────────

#[tokio::test]
async fn builtin_missions_are_seeded_once() {
  let s = store().await;
  let id = user(&s, "m@example.org", "M").await;

  let all = s.list_missions(id, MissionFilter::default()).await.unwrap();
  assert_eq!(all.len(), 9);
  assert!(all.iter().all(|m| m.progress == 0 && !m.is_completed));

  let again = s.seed_missions(cadenza_core::mission::builtin_missions()).await.unwrap();
  assert_eq!(again, 0);

  let daily = s
    .list_missions(id, MissionFilter { category: Some(MissionCategory::Daily), kind: None })
    .await
    .unwrap();
  assert_eq!(daily.len(), 3);
}

#[tokio::test]
async fn claim_crosses_level_threshold() {
  let s = store().await;
  let id = user(&s, "l@example.org", "L").await;
  s.seed_missions(vec![Mission {
    mission_id:  "warmup-ninety".into(),
    title:       "Warm up".into(),
    description: "Warm up".into(),
    category:    MissionCategory::Daily,
    kind:        MissionKind::Practice,
    xp_reward:   90,
    deadline:    "Today".into(),
  }])
  .await
  .unwrap();

  complete(&s, id, "warmup-ninety").await;
  let first = s.claim_mission(id, "warmup-ninety", LevelingPolicy::SingleStep).await.unwrap();
  assert!(!first.award.leveled_up());

  complete(&s, id, "daily-practice-30").await;
  let out = s.claim_mission(id, "daily-practice-30", LevelingPolicy::SingleStep).await.unwrap();
  assert_eq!(out.progress, LevelProgress { xp: 140, level: 2, xp_to_next_level: 200 });
  assert_eq!(out.completion.xp_earned, 50);

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!((p.xp, p.level), (140, 2));
}

#[tokio::test]
async fn double_claim_leaves_xp_unchanged() {
  let s = store().await;
  let id = user(&s, "d@example.org", "D").await;
  complete(&s, id, "daily-record-practice").await;

  s.claim_mission(id, "daily-record-practice", LevelingPolicy::SingleStep).await.unwrap();
  let err = s
    .claim_mission(id, "daily-record-practice", LevelingPolicy::SingleStep)
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::AlreadyClaimed(_)));

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.xp, 20);

  let view = s
    .list_missions(id, MissionFilter::default())
    .await
    .unwrap()
    .into_iter()
    .find(|m| m.mission.mission_id == "daily-record-practice")
    .unwrap();
  assert!(view.is_completed);
}

#[tokio::test]
async fn concurrent_claims_award_once() {
  let s = store().await;
  let id = user(&s, "race@example.org", "Race").await;
  complete(&s, id, "weekly-five-sessions").await;

  let (a, b) = (s.clone(), s.clone());
  let (ra, rb) = tokio::join!(
    a.claim_mission(id, "weekly-five-sessions", LevelingPolicy::SingleStep),
    b.claim_mission(id, "weekly-five-sessions", LevelingPolicy::SingleStep),
  );
  assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!((p.xp, p.level), (100, 2));
}

#[tokio::test]
async fn incomplete_mission_cannot_be_claimed() {
  let s = store().await;
  let id = user(&s, "i@example.org", "I").await;
  s.set_mission_progress(id, "monthly-perform", 60).await.unwrap();

  let err = s.claim_mission(id, "monthly-perform", LevelingPolicy::Cascade).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::MissionIncomplete { progress: 60, .. }));

  let err = s.set_mission_progress(id, "monthly-perform", 101).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ProgressOutOfRange(101)));

  let err = s.set_mission_progress(id, "no-such-mission", 10).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::MissionNotFound(_)));
}

#[tokio::test]
async fn cascade_policy_grants_several_levels() {
  let s = store().await;
  let id = user(&s, "k@example.org", "K").await;
  complete(&s, id, "monthly-streak").await;

  let out = s.claim_mission(id, "monthly-streak", LevelingPolicy::Cascade).await.unwrap();
  // 500 XP clears the thresholds for levels 1 through 5.
  assert_eq!(out.progress.level, 6);
  assert_eq!(out.award.levels_gained, 5);
}

// ─── Leaderboard & search ────────────────────────────────────────────────────

#[tokio::test]
async fn leaderboard_orders_and_ranks() {
  let s = store().await;
  let low = user(&s, "low@example.org", "Low").await;
  let high = user(&s, "high@example.org", "High").await;
  complete(&s, high, "weekly-new-piece").await;
  s.claim_mission(high, "weekly-new-piece", LevelingPolicy::SingleStep).await.unwrap();

  let board = s.leaderboard(LeaderboardSort::Xp, 10).await.unwrap();
  assert_eq!(board[0].user_id, high);
  assert_eq!(board[1].user_id, low);

  assert_eq!(s.rank_of(high, LeaderboardSort::Level).await.unwrap(), 1);
  assert_eq!(s.rank_of(low, LeaderboardSort::Level).await.unwrap(), 2);

  let err = s.rank_of(Uuid::new_v4(), LeaderboardSort::Xp).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ProfileNotFound(_)));
}

#[tokio::test]
async fn level_rank_breaks_ties_on_xp() {
  let s = store().await;
  let idle = user(&s, "idle@example.org", "Idle").await;
  let busy = user(&s, "busy@example.org", "Busy").await;
  complete(&s, busy, "daily-record-practice").await;
  s.claim_mission(busy, "daily-record-practice", LevelingPolicy::SingleStep).await.unwrap();

  // Both are level 1; the list orders them by xp.
  let board = s.leaderboard(LeaderboardSort::Level, 10).await.unwrap();
  assert_eq!(board[0].user_id, busy);
  assert_eq!(s.rank_of(busy, LeaderboardSort::Level).await.unwrap(), 1);
  assert_eq!(s.rank_of(idle, LeaderboardSort::Level).await.unwrap(), 2);
}

#[tokio::test]
async fn musician_search_excludes_self_and_shows_status() {
  let s = store().await;
  let me = user(&s, "me@example.org", "Maria Joao").await;
  let other = user(&s, "o@example.org", "Maria Callas").await;
  user(&s, "x@example.org", "Glenn").await;

  s.request_connection(me, other).await.unwrap();

  let hits = s.search_musicians(me, "maria", 20).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].profile.user_id, other);
  assert_eq!(hits[0].connection_status, Some(ConnectionStatus::Pending));
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

fn import(composer: Option<&str>, achievement: &str, challenge_achievement: &str) -> CatalogImport {
  CatalogImport {
    composers:    composer
      .map(|name| ImportComposer {
        composer: NewComposer { name: name.into(), ..Default::default() },
        pieces:   vec![NewPiece {
          title: "Étude Op. 10 No. 3".into(),
          instrument: "piano".into(),
          difficulty: Some(7),
          ..Default::default()
        }],
      })
      .into_iter()
      .collect(),
    achievements: vec![NewAchievement {
      name:        achievement.into(),
      description: None,
      category:    None,
      icon:        None,
      points:      10,
    }],
    challenges:   vec![ImportChallenge {
      challenge:   NewChallenge {
        title:          "Seven days".into(),
        description:    None,
        goal:           7,
        goal_type:      "days".into(),
        duration:       None,
        start_date:     None,
        end_date:       None,
        achievement_id: None,
      },
      achievement: Some(challenge_achievement.into()),
    }],
    events:       vec![],
  }
}

#[tokio::test]
async fn catalog_import_runs_once_even_without_composers() {
  let s = store().await;
  let first = s.import_catalog(import(None, "Streak", "Streak")).await.unwrap();
  assert_eq!(first.map(|c| (c.achievements, c.challenges)), Some((1, 1)));

  let again = s.import_catalog(import(None, "Streak", "Streak")).await.unwrap();
  assert_eq!(again, None);
  assert_eq!(s.list_challenges(Uuid::new_v4()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_import_leaves_nothing_behind() {
  let s = store().await;
  let err = s
    .import_catalog(import(Some("Frédéric Chopin"), "Streak", "Nope"))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Invalid(_)));
  assert!(s.list_composers(None).await.unwrap().is_empty());
  assert!(s.list_pieces(&PieceFilter::default()).await.unwrap().is_empty());

  let retry = s
    .import_catalog(import(Some("Frédéric Chopin"), "Streak", "Streak"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!((retry.composers, retry.pieces, retry.challenges), (1, 1, 1));

  let challenge = s.list_challenges(Uuid::new_v4()).await.unwrap().remove(0);
  assert!(challenge.challenge.achievement_id.is_some());
  let etude = s.list_pieces(&PieceFilter::default()).await.unwrap().remove(0);
  assert_eq!(etude.composer, "Frédéric Chopin");
  assert!(etude.composer_id.is_some());
}

#[tokio::test]
async fn piece_filters_and_composer_page() {
  let s = store().await;
  let chopin = s
    .add_composer(NewComposer {
      name: "Frédéric Chopin".into(),
      period: Some("Romantic".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  for (title, difficulty) in [("Nocturne Op. 9 No. 2", 5), ("Ballade No. 1", 9), ("Prelude in E minor", 2)] {
    s.add_piece(NewPiece {
      title: title.into(),
      composer: chopin.name.clone(),
      composer_id: Some(chopin.composer_id),
      instrument: "piano".into(),
      difficulty: Some(difficulty),
      ..Default::default()
    })
    .await
    .unwrap();
  }
  piece(&s, "Partita No. 2", "Bach", 8).await;

  let all = s.list_pieces(&PieceFilter::default()).await.unwrap();
  let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
  assert_eq!(titles, ["Ballade No. 1", "Nocturne Op. 9 No. 2", "Partita No. 2", "Prelude in E minor"]);

  let hard = s
    .list_pieces(&PieceFilter { difficulty: Some(DifficultyBand::Advanced), ..Default::default() })
    .await
    .unwrap();
  assert!(hard.iter().all(|p| p.difficulty.unwrap() >= 8));

  let works = s.composer_pieces(chopin.composer_id).await.unwrap();
  let order: Vec<_> = works.iter().map(|p| p.difficulty.unwrap()).collect();
  assert_eq!(order, [9, 5, 2]);

  let romantic = s.list_composers(Some("romantic")).await.unwrap();
  assert_eq!(romantic.len(), 1);

  let err = s.composer_pieces(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ComposerNotFound(_)));
}

#[tokio::test]
async fn quick_search_caps_and_ignores_blank() {
  let s = store().await;
  for i in 0..7 {
    piece(&s, &format!("Etude {i}"), "Czerny", 3).await;
  }
  let hits = s.quick_search("etude").await.unwrap();
  assert_eq!(hits.pieces.len(), 5);

  let empty = s.quick_search("   ").await.unwrap();
  assert!(empty.pieces.is_empty() && empty.composers.is_empty());
}

#[tokio::test]
async fn out_of_range_difficulty_is_invalid() {
  let s = store().await;
  let err = s
    .add_piece(NewPiece {
      title: "Impossible".into(),
      composer: "Nobody".into(),
      instrument: "piano".into(),
      difficulty: Some(11),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Invalid(_)));
}

// ─── Repertoire ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_status_is_a_no_op() {
  let s = store().await;
  let id = user(&s, "r@example.org", "R").await;
  let pid = piece(&s, "Clair de lune", "Debussy", 6).await;

  let first = s.set_piece_status(id, pid, PieceStatus::Current).await.unwrap();
  assert_eq!(first.previous, None);
  assert_eq!(first.entry.progress, 0);

  s.update_repertoire(id, pid, RepertoireUpdate { progress: Some(40), notes: None })
    .await
    .unwrap();

  let again = s.set_piece_status(id, pid, PieceStatus::Current).await.unwrap();
  assert!(!again.changed());
  assert_eq!(again.entry.progress, 40);
  assert_eq!(again.entry.started_at, first.entry.started_at);
}

#[tokio::test]
async fn mastering_stamps_and_keeps_started_at() {
  let s = store().await;
  let id = user(&s, "rm@example.org", "RM").await;
  let pid = piece(&s, "Gymnopédie No. 1", "Satie", 2).await;

  let wish = s.set_piece_status(id, pid, PieceStatus::Wishlist).await.unwrap();
  assert!(wish.entry.mastered_at.is_none());

  let done = s.set_piece_status(id, pid, PieceStatus::Mastered).await.unwrap();
  assert_eq!(done.previous, Some(PieceStatus::Wishlist));
  assert_eq!(done.entry.progress, 100);
  assert!(done.entry.mastered_at.is_some());
  assert_eq!(done.entry.started_at, wish.entry.started_at);

  let rep = s.repertoire(id).await.unwrap();
  assert_eq!(rep.mastered.len(), 1);
  assert!(rep.current.is_empty() && rep.wishlist.is_empty());
  assert_eq!(rep.mastered[0].piece.title, "Gymnopédie No. 1");
}

#[tokio::test]
async fn repertoire_edits_require_membership() {
  let s = store().await;
  let id = user(&s, "re@example.org", "RE").await;
  let pid = piece(&s, "Arabesque", "Debussy", 4).await;

  let err = s
    .update_repertoire(id, pid, RepertoireUpdate { progress: Some(10), notes: None })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotInRepertoire(_)));

  s.set_piece_status(id, pid, PieceStatus::Current).await.unwrap();
  let err = s
    .update_repertoire(id, pid, RepertoireUpdate { progress: Some(150), notes: None })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::ProgressOutOfRange(150)));

  s.remove_from_repertoire(id, pid).await.unwrap();
  assert!(s.get_user_piece(id, pid).await.unwrap().is_none());
  let err = s.remove_from_repertoire(id, pid).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotInRepertoire(_)));

  let err = s.set_piece_status(id, Uuid::new_v4(), PieceStatus::Current).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::PieceNotFound(_)));
}

// ─── Connections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_requests_are_rejected_both_ways() {
  let s = store().await;
  let a = user(&s, "ca@example.org", "A").await;
  let b = user(&s, "cb@example.org", "B").await;

  s.request_connection(a, b).await.unwrap();

  let err = s.request_connection(a, b).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ConnectionExists { status: ConnectionStatus::Pending }));
  let err = s.request_connection(b, a).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ConnectionExists { .. }));

  let err = s.request_connection(a, a).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::SelfConnection));
}

#[tokio::test]
async fn only_receiver_may_resolve() {
  let s = store().await;
  let a = user(&s, "ra@example.org", "Alto").await;
  let b = user(&s, "rb@example.org", "Bass").await;
  let req = s.request_connection(a, b).await.unwrap();

  let requests = s.connection_requests(b).await.unwrap();
  assert_eq!(requests.incoming.len(), 1);
  assert_eq!(requests.incoming[0].other.user_id, a);
  assert!(s.connection_requests(a).await.unwrap().incoming.is_empty());

  let err = s.respond_connection(a, req.connection_id, true).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotConnectionReceiver(_)));

  let accepted = s.respond_connection(b, req.connection_id, true).await.unwrap();
  assert_eq!(accepted.status, ConnectionStatus::Accepted);

  let err = s.respond_connection(b, req.connection_id, false).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::ConnectionAlreadyResolved { .. }));

  let mine = s.connections(a).await.unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].other.full_name, "Bass");
  assert_eq!(s.connections(b).await.unwrap()[0].other.user_id, a);
}

// ─── Challenges ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn completing_a_challenge_grants_its_achievement_once() {
  let s = store().await;
  let id = user(&s, "ch@example.org", "Ch").await;
  let badge = s
    .add_achievement(NewAchievement {
      name:        "Scale Master".into(),
      description: None,
      category:    Some("technique".into()),
      icon:        None,
      points:      10,
    })
    .await
    .unwrap();
  let challenge = s
    .add_challenge(NewChallenge {
      title:          "Scales week".into(),
      description:    None,
      goal:           5,
      goal_type:      "sessions".into(),
      duration:       Some("7 days".into()),
      start_date:     None,
      end_date:       None,
      achievement_id: Some(badge.achievement_id),
    })
    .await
    .unwrap();

  let err = s.record_challenge_progress(id, challenge.challenge_id, 1).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotJoined(_)));

  s.join_challenge(id, challenge.challenge_id).await.unwrap();
  let err = s.join_challenge(id, challenge.challenge_id).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::AlreadyJoined(_)));

  let step = s.record_challenge_progress(id, challenge.challenge_id, 3).await.unwrap();
  assert!(!step.just_completed);

  let done = s.record_challenge_progress(id, challenge.challenge_id, 4).await.unwrap();
  assert!(done.just_completed);
  assert_eq!(done.participation.progress, 5);
  assert_eq!(done.granted_achievement, Some(badge.achievement_id));

  let after = s.record_challenge_progress(id, challenge.challenge_id, 1).await.unwrap();
  assert!(!after.just_completed);
  assert_eq!(after.granted_achievement, None);

  let earned = s.achievements(id).await.unwrap();
  assert_eq!(earned.len(), 1);
  assert_eq!(earned[0].achievement.name, "Scale Master");

  let views = s.list_challenges(id).await.unwrap();
  assert!(views[0].participation.as_ref().unwrap().completed);
}

// ─── Practice ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn logging_practice_starts_a_streak() {
  let s = store().await;
  let id = user(&s, "p@example.org", "P").await;

  let empty = s.practice_streak(id).await.unwrap();
  assert_eq!(empty.current_streak, 0);

  let log = s
    .log_practice(id, NewPracticeSession { duration: 1800, rating: Some(4), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(log.streak.current_streak, 1);

  let same_day = s
    .log_practice(id, NewPracticeSession { duration: 600, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(same_day.streak.current_streak, 1);
  assert_eq!(same_day.streak.longest_streak, 1);

  let recent = s.recent_practice(id, 10).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0].duration, 600);

  let err = s
    .log_practice(id, NewPracticeSession { duration: 0, ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Invalid(_)));

  let err = s
    .log_practice(id, NewPracticeSession {
      piece_id: Some(Uuid::new_v4()),
      duration: 60,
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::PieceNotFound(_)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_list_upcoming_and_register_once() {
  let s = store().await;
  let id = user(&s, "e@example.org", "E").await;
  let now = Utc::now();

  let past = s
    .add_event(NewEvent {
      title:       "Last year's recital".into(),
      description: None,
      event_date:  now - Duration::days(30),
      location:    None,
      url:         None,
      created_by:  None,
    })
    .await
    .unwrap();
  let soon = s
    .add_event(NewEvent {
      title:       "Spring recital".into(),
      description: None,
      event_date:  now + Duration::days(3),
      location:    Some("Hall B".into()),
      url:         None,
      created_by:  Some(id),
    })
    .await
    .unwrap();

  let upcoming = s.upcoming_events(now).await.unwrap();
  assert_eq!(upcoming.len(), 1);
  assert_eq!(upcoming[0].event_id, soon.event_id);

  s.register_for_event(id, soon.event_id).await.unwrap();
  let err = s.register_for_event(id, soon.event_id).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::AlreadyRegistered(_)));

  s.register_for_event(id, past.event_id).await.unwrap();
  let err = s.register_for_event(id, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::EventNotFound(_)));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_default_then_update() {
  let s = store().await;
  let id = user(&s, "s@example.org", "S").await;

  let first = s.settings(id).await.unwrap();
  assert_eq!(first.theme, Theme::System);
  assert!(first.notifications_enabled);
  assert_eq!(s.settings(id).await.unwrap(), first);

  let updated = s
    .update_settings(id, SettingsUpdate {
      theme:   Some(Theme::Dark),
      api_key: Some("sk-secret".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.theme, Theme::Dark);
  assert!(updated.view().has_api_key);

  let cleared = s
    .update_settings(id, SettingsUpdate { api_key: Some(String::new()), ..Default::default() })
    .await
    .unwrap();
  assert!(cleared.api_key.is_none());
  assert_eq!(s.settings(id).await.unwrap().theme, Theme::Dark);
}

// ─── Constraint mapping ──────────────────────────────────────────────────────

#[test]
fn only_unique_failures_count_as_duplicates() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn
    .execute_batch("CREATE TABLE t (k TEXT UNIQUE, n INTEGER NOT NULL CHECK (n >= 0));")
    .unwrap();
  conn.execute("INSERT INTO t VALUES ('a', 1)", []).unwrap();

  let dup = conn.execute("INSERT INTO t VALUES ('a', 2)", []).unwrap_err();
  let check = conn.execute("INSERT INTO t VALUES ('b', -1)", []).unwrap_err();
  let not_null = conn.execute("INSERT INTO t VALUES ('c', NULL)", []).unwrap_err();

  assert!(is_unique_violation(&dup));
  assert!(!is_unique_violation(&check));
  assert!(!is_unique_violation(&not_null));
}
