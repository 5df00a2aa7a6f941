//! [`SqliteStore`], the SQLite implementation of [`StudioStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, Transaction, TransactionBehavior, params};
use uuid::Uuid;

use cadenza_core::{
  Error as CoreError,
  account::{Account, normalize_email},
  catalog::{
    CatalogImport, Composer, Event, EventRegistration, ImportCount, NewComposer, NewEvent,
    NewPiece, Piece, PieceFilter, QUICK_SEARCH_LIMIT, QuickSearch, sort_by_difficulty_desc,
  },
  challenge::{
    Achievement, Challenge, ChallengeAdvance, ChallengeView, EarnedAchievement, NewAchievement,
    NewChallenge, UserChallenge, apply_progress,
  },
  mission::{ClaimOutcome, Mission, MissionFilter, MissionView, UserMission, builtin_missions},
  practice::{
    NewPracticeSession, PracticeLog, PracticeSession, PracticeStreak, advance_streak,
  },
  profile::{LeaderboardSort, Profile, ProfileSummary, ProfileUpdate},
  progression::{LevelState, LevelingPolicy, award, check_claimable},
  repertoire::{
    PieceStatus, Repertoire, RepertoireEntry, RepertoireUpdate, StatusChange, StatusPlan,
    UserPiece, plan_status_change, validate_progress,
  },
  settings::{SettingsUpdate, UserSettings},
  social::{
    ConnectionRequests, ConnectionStatus, ConnectionView, MusicianHit, UserConnection,
    check_request, resolve,
  },
  store::{NewAccount, StudioStore},
};

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, ACHIEVEMENT_COLUMNS, CHALLENGE_COLUMNS, COMPOSER_COLUMNS,
    CONNECTION_COLUMNS, EVENT_COLUMNS, MISSION_COLUMNS, PIECE_COLUMNS, PROFILE_COLUMNS,
    RawAccount, RawAchievement, RawChallenge, RawComposer, RawConnection, RawEvent, RawMission,
    RawPiece, RawProfile, RawSession, RawSettings, RawStreak, RawSummary, RawUserChallenge,
    RawUserPiece, SESSION_COLUMNS, SETTINGS_COLUMNS, STREAK_COLUMNS, SUMMARY_COLUMNS,
    USER_CHALLENGE_COLUMNS, USER_PIECE_COLUMNS, decode_connection_status, decode_dt,
    encode_category, encode_connection_status, encode_date, encode_dt, encode_kind,
    encode_piece_status, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadenza store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Because all
/// calls run on the connection's one thread, a transaction opened inside a
/// call is never interleaved with another call's.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and seed
  /// the built-in missions.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open a private in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    self.seed_missions(builtin_missions()).await?;
    Ok(())
  }

  /// Run `f` against the connection outside any explicit transaction.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside one IMMEDIATE transaction; commit only if it succeeds.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<bool> {
  Ok(conn.query_row(sql, params, |_| Ok(())).optional()?.is_some())
}

/// UNIQUE constraints only; CHECK, NOT NULL and foreign-key failures are not
/// duplicates.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// `%text%` for LIKE, or `None` for a blank query.
fn like_pattern(text: Option<&str>) -> Option<String> {
  text.map(str::trim).filter(|t| !t.is_empty()).map(|t| format!("%{t}%"))
}

fn load_profile(conn: &Connection, user_id: Uuid) -> Result<Option<Profile>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
      params![encode_uuid(user_id)],
      RawProfile::from_row,
    )
    .optional()?;
  raw.map(RawProfile::into_profile).transpose()
}

fn require_profile(conn: &Connection, user_id: Uuid) -> Result<Profile> {
  load_profile(conn, user_id)?.ok_or_else(|| CoreError::ProfileNotFound(user_id).into())
}

fn insert_profile(conn: &Connection, p: &Profile) -> Result<()> {
  let accessories = p.profile_accessories.as_ref().map(serde_json::to_string).transpose()?;
  conn.execute(
    &format!(
      "INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES
         (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
          ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
    ),
    params![
      encode_uuid(p.user_id),
      p.full_name,
      p.bio,
      p.instrument,
      p.experience_level,
      p.avatar_url,
      p.xp,
      p.level,
      p.profile_color,
      p.profile_icon,
      p.profile_banner,
      accessories,
      p.discord_username,
      p.telegram_username,
      p.instagram_username,
      p.youtube_channel,
      p.online_status,
      p.last_seen.map(encode_dt),
      encode_dt(p.created_at),
      encode_dt(p.updated_at),
    ],
  )?;
  Ok(())
}

/// Persist the user-editable columns; level and xp are written only by awards.
fn update_profile_row(conn: &Connection, p: &Profile) -> Result<()> {
  let accessories = p.profile_accessories.as_ref().map(serde_json::to_string).transpose()?;
  conn.execute(
    "UPDATE profiles SET
       full_name = ?2, bio = ?3, instrument = ?4, experience_level = ?5,
       avatar_url = ?6, profile_color = ?7, profile_icon = ?8, profile_banner = ?9,
       profile_accessories = ?10, discord_username = ?11, telegram_username = ?12,
       instagram_username = ?13, youtube_channel = ?14, updated_at = ?15
     WHERE user_id = ?1",
    params![
      encode_uuid(p.user_id),
      p.full_name,
      p.bio,
      p.instrument,
      p.experience_level,
      p.avatar_url,
      p.profile_color,
      p.profile_icon,
      p.profile_banner,
      accessories,
      p.discord_username,
      p.telegram_username,
      p.instagram_username,
      p.youtube_channel,
      encode_dt(p.updated_at),
    ],
  )?;
  Ok(())
}

fn load_user_piece(conn: &Connection, user_id: Uuid, piece_id: Uuid) -> Result<Option<UserPiece>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {USER_PIECE_COLUMNS} FROM user_pieces up
         WHERE up.user_id = ?1 AND up.piece_id = ?2"
      ),
      params![encode_uuid(user_id), encode_uuid(piece_id)],
      |r| RawUserPiece::from_row(r, 0),
    )
    .optional()?;
  raw.map(RawUserPiece::into_user_piece).transpose()
}

fn piece_exists(conn: &Connection, piece_id: Uuid) -> Result<bool> {
  exists(conn, "SELECT 1 FROM pieces WHERE piece_id = ?1", params![encode_uuid(piece_id)])
}

/// Mission views for `user_id`, in catalog order; one mission if `only` is set.
fn mission_views(
  conn: &Connection,
  user_id: Uuid,
  only: Option<&str>,
) -> Result<Vec<MissionView>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MISSION_COLUMNS},
            COALESCE(mp.progress, 0),
            um.user_mission_id IS NOT NULL
     FROM missions m
     LEFT JOIN mission_progress mp ON mp.mission_id = m.mission_id AND mp.user_id = ?1
     LEFT JOIN user_missions    um ON um.mission_id = m.mission_id AND um.user_id = ?1
     WHERE ?2 IS NULL OR m.mission_id = ?2
     ORDER BY m.rowid"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(user_id), only], |r| {
      Ok((RawMission::from_row(r)?, r.get::<_, u8>(7)?, r.get::<_, bool>(8)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(raw, progress, is_completed)| {
      Ok(MissionView { mission: raw.into_mission()?, progress, is_completed })
    })
    .collect()
}

fn mission_view(conn: &Connection, user_id: Uuid, mission_id: &str) -> Result<MissionView> {
  mission_views(conn, user_id, Some(mission_id))?
    .pop()
    .ok_or_else(|| CoreError::MissionNotFound(mission_id.to_owned()).into())
}

fn load_connection(conn: &Connection, sql_where: &str, p: impl rusqlite::Params) -> Result<Option<UserConnection>> {
  let raw = conn
    .query_row(
      &format!("SELECT {CONNECTION_COLUMNS} FROM user_connections cn WHERE {sql_where}"),
      p,
      RawConnection::from_row,
    )
    .optional()?;
  raw.map(RawConnection::into_connection).transpose()
}

/// Any row between `a` and `b`, in either direction.
fn connection_between(conn: &Connection, a: Uuid, b: Uuid) -> Result<Option<UserConnection>> {
  load_connection(
    conn,
    "min(cn.user_id, cn.connected_user_id) = min(?1, ?2)
     AND max(cn.user_id, cn.connected_user_id) = max(?1, ?2)",
    params![encode_uuid(a), encode_uuid(b)],
  )
}

#[derive(Clone, Copy)]
enum Direction {
  Either,
  Incoming,
  Outgoing,
}

fn connection_views(
  conn: &Connection,
  user_id: Uuid,
  status: ConnectionStatus,
  direction: Direction,
) -> Result<Vec<ConnectionView>> {
  let side = match direction {
    Direction::Either => "(cn.user_id = ?1 OR cn.connected_user_id = ?1)",
    Direction::Incoming => "cn.connected_user_id = ?1",
    Direction::Outgoing => "cn.user_id = ?1",
  };
  let mut stmt = conn.prepare(&format!(
    "SELECT {CONNECTION_COLUMNS}, {SUMMARY_COLUMNS}
     FROM user_connections cn
     JOIN profiles p ON p.user_id =
       CASE WHEN cn.user_id = ?1 THEN cn.connected_user_id ELSE cn.user_id END
     WHERE {side} AND cn.status = ?2
     ORDER BY cn.updated_at DESC"
  ))?;
  let rows = stmt
    .query_map(
      params![encode_uuid(user_id), encode_connection_status(status)],
      |r| Ok((RawConnection::from_row(r)?, RawSummary::from_row(r, 6)?)),
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(c, p)| Ok(ConnectionView { connection: c.into_connection()?, other: p.into_summary()? }))
    .collect()
}

fn load_streak(conn: &Connection, user_id: Uuid) -> Result<Option<PracticeStreak>> {
  let raw = conn
    .query_row(
      &format!("SELECT {STREAK_COLUMNS} FROM practice_streaks WHERE user_id = ?1"),
      params![encode_uuid(user_id)],
      RawStreak::from_row,
    )
    .optional()?;
  raw.map(RawStreak::into_streak).transpose()
}

/// Get-or-create in a single upsert.
fn ensure_settings(conn: &Connection, user_id: Uuid, at: DateTime<Utc>) -> Result<UserSettings> {
  let d = UserSettings::defaults(user_id, at);
  let raw = conn.query_row(
    &format!(
      "INSERT INTO user_settings ({SETTINGS_COLUMNS}) VALUES (?1, ?2, ?3, NULL, ?4, ?4)
       ON CONFLICT (user_id) DO UPDATE SET user_id = excluded.user_id
       RETURNING {SETTINGS_COLUMNS}"
    ),
    params![encode_uuid(user_id), d.theme.as_str(), d.notifications_enabled, encode_dt(at)],
    RawSettings::from_row,
  )?;
  raw.into_settings()
}

// ─── Catalog rows ────────────────────────────────────────────────────────────

/// `store_meta` key set once a catalog import commits.
const CATALOG_IMPORTED: &str = "catalog_imported_at";

fn new_composer(input: NewComposer) -> Result<Composer> {
  if input.name.trim().is_empty() {
    return Err(CoreError::Invalid("composer name must not be empty".into()).into());
  }
  Ok(Composer {
    composer_id: Uuid::new_v4(),
    name:        input.name,
    bio:         input.bio,
    birth_year:  input.birth_year,
    death_year:  input.death_year,
    nationality: input.nationality,
    period:      input.period,
    image_url:   input.image_url,
    created_at:  now(),
  })
}

fn insert_composer(conn: &Connection, c: &Composer) -> Result<()> {
  conn.execute(
    &format!("INSERT INTO composers ({COMPOSER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
    params![
      encode_uuid(c.composer_id),
      c.name,
      c.bio,
      c.birth_year,
      c.death_year,
      c.nationality,
      c.period,
      c.image_url,
      encode_dt(c.created_at),
    ],
  )?;
  Ok(())
}

fn new_piece(input: NewPiece) -> Result<Piece> {
  if input.title.trim().is_empty() || input.instrument.trim().is_empty() {
    return Err(CoreError::Invalid("piece title and instrument are required".into()).into());
  }
  if let Some(d) = input.difficulty.filter(|d| !(1..=10).contains(d)) {
    return Err(CoreError::Invalid(format!("difficulty must be 1-10, got {d}")).into());
  }
  let at = now();
  Ok(Piece {
    piece_id:         Uuid::new_v4(),
    title:            input.title,
    composer:         input.composer,
    composer_id:      input.composer_id,
    instrument:       input.instrument,
    period:           input.period,
    genre:            input.genre,
    difficulty:       input.difficulty,
    average_duration: input.average_duration,
    description:      input.description,
    created_at:       at,
    updated_at:       at,
  })
}

fn insert_piece(conn: &Connection, p: &Piece) -> Result<()> {
  if let Some(cid) = p.composer_id {
    let cid_s = encode_uuid(cid);
    if !exists(conn, "SELECT 1 FROM composers WHERE composer_id = ?1", params![cid_s])? {
      return Err(CoreError::ComposerNotFound(cid).into());
    }
  }
  conn.execute(
    "INSERT INTO pieces (
       piece_id, title, composer, composer_id, instrument, period, genre,
       difficulty, average_duration, description, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    params![
      encode_uuid(p.piece_id),
      p.title,
      p.composer,
      p.composer_id.map(encode_uuid),
      p.instrument,
      p.period,
      p.genre,
      p.difficulty,
      p.average_duration,
      p.description,
      encode_dt(p.created_at),
      encode_dt(p.updated_at),
    ],
  )?;
  Ok(())
}

fn new_achievement(input: NewAchievement) -> Result<Achievement> {
  if input.name.trim().is_empty() {
    return Err(CoreError::Invalid("achievement name must not be empty".into()).into());
  }
  Ok(Achievement {
    achievement_id: Uuid::new_v4(),
    name:           input.name,
    description:    input.description,
    category:       input.category,
    icon:           input.icon,
    points:         input.points,
  })
}

fn insert_achievement(conn: &Connection, a: &Achievement) -> Result<()> {
  conn.execute(
    "INSERT INTO achievements (achievement_id, name, description, category, icon, points)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![encode_uuid(a.achievement_id), a.name, a.description, a.category, a.icon, a.points],
  )?;
  Ok(())
}

fn new_challenge(input: NewChallenge) -> Result<Challenge> {
  input.validate()?;
  Ok(Challenge {
    challenge_id:   Uuid::new_v4(),
    title:          input.title,
    description:    input.description,
    goal:           input.goal,
    goal_type:      input.goal_type,
    duration:       input.duration,
    start_date:     input.start_date,
    end_date:       input.end_date,
    achievement_id: input.achievement_id,
  })
}

fn insert_challenge(conn: &Connection, c: &Challenge) -> Result<()> {
  if let Some(aid) = c.achievement_id {
    let aid_s = encode_uuid(aid);
    if !exists(conn, "SELECT 1 FROM achievements WHERE achievement_id = ?1", params![aid_s])? {
      return Err(CoreError::Invalid(format!("unknown achievement {aid}")).into());
    }
  }
  conn.execute(
    "INSERT INTO challenges (
       challenge_id, title, description, goal, goal_type, duration,
       start_date, end_date, achievement_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    params![
      encode_uuid(c.challenge_id),
      c.title,
      c.description,
      c.goal,
      c.goal_type,
      c.duration,
      c.start_date.map(encode_dt),
      c.end_date.map(encode_dt),
      c.achievement_id.map(encode_uuid),
    ],
  )?;
  Ok(())
}

fn new_event(input: NewEvent) -> Result<Event> {
  if input.title.trim().is_empty() {
    return Err(CoreError::Invalid("event title must not be empty".into()).into());
  }
  Ok(Event {
    event_id:    Uuid::new_v4(),
    title:       input.title,
    description: input.description,
    event_date:  input.event_date,
    location:    input.location,
    url:         input.url,
    created_by:  input.created_by,
    created_at:  now(),
  })
}

fn insert_event(conn: &Connection, e: &Event) -> Result<()> {
  conn.execute(
    &format!("INSERT INTO events ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
    params![
      encode_uuid(e.event_id),
      e.title,
      e.description,
      encode_dt(e.event_date),
      e.location,
      e.url,
      e.created_by.map(encode_uuid),
      encode_dt(e.created_at),
    ],
  )?;
  Ok(())
}

// ─── StudioStore impl ────────────────────────────────────────────────────────

impl StudioStore for SqliteStore {
  type Error = Error;

  // ── Accounts & profiles ───────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<(Account, Profile)> {
    let email = normalize_email(&input.email);
    if !email.contains('@') {
      return Err(CoreError::Invalid("a valid email address is required".into()).into());
    }

    let at = now();
    let account = Account {
      user_id:       Uuid::new_v4(),
      email:         email.clone(),
      password_hash: input.password_hash,
      created_at:    at,
    };
    let profile = Profile::new_default(account.user_id, &email, input.full_name, input.pick, at);

    let (a, p) = (account.clone(), profile.clone());
    self
      .write(move |tx| {
        if exists(tx, "SELECT 1 FROM accounts WHERE email = ?1", params![a.email])? {
          return Err(CoreError::EmailTaken(a.email).into());
        }
        tx.execute(
          &format!("INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          params![encode_uuid(a.user_id), a.email, a.password_hash, encode_dt(a.created_at)],
        )?;
        insert_profile(tx, &p)
      })
      .await?;

    Ok((account, profile))
  }

  async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
    let email = normalize_email(email);
    self
      .read(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
            params![email],
            RawAccount::from_row,
          )
          .optional()?;
        raw.map(RawAccount::into_account).transpose()
      })
      .await
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    self.read(move |conn| load_profile(conn, user_id)).await
  }

  async fn ensure_profile(&self, user_id: Uuid, email: &str, pick: u32) -> Result<Profile> {
    let email = normalize_email(email);
    self
      .write(move |tx| {
        if let Some(p) = load_profile(tx, user_id)? {
          return Ok(p);
        }
        let p = Profile::new_default(user_id, &email, None, pick, now());
        insert_profile(tx, &p)?;
        Ok(p)
      })
      .await
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile> {
    self
      .write(move |tx| {
        let mut p = require_profile(tx, user_id)?;
        p.apply(update, now());
        update_profile_row(tx, &p)?;
        Ok(p)
      })
      .await
  }

  async fn leaderboard(&self, sort: LeaderboardSort, limit: usize) -> Result<Vec<ProfileSummary>> {
    let order = match sort {
      LeaderboardSort::Level => "p.level DESC, p.xp DESC, p.created_at ASC",
      LeaderboardSort::Xp => "p.xp DESC, p.created_at ASC",
    };
    let limit = limit as i64;

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS} FROM profiles p ORDER BY {order} LIMIT ?1"
        ))?;
        let raws = stmt
          .query_map(params![limit], |r| RawSummary::from_row(r, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawSummary::into_summary).collect()
      })
      .await
  }

  async fn rank_of(&self, user_id: Uuid, sort: LeaderboardSort) -> Result<usize> {
    // Same key as the leaderboard's ORDER BY, minus the created_at tiebreak.
    let key = match sort {
      LeaderboardSort::Level => "level, xp",
      LeaderboardSort::Xp => "xp",
    };

    self
      .read(move |conn| {
        let id = encode_uuid(user_id);
        if !exists(conn, "SELECT 1 FROM profiles WHERE user_id = ?1", params![id])? {
          return Err(CoreError::ProfileNotFound(user_id).into());
        }
        let higher: i64 = conn.query_row(
          &format!(
            "SELECT COUNT(*) FROM profiles
             WHERE ({key}) > (SELECT {key} FROM profiles WHERE user_id = ?1)"
          ),
          params![id],
          |r| r.get(0),
        )?;
        Ok(higher as usize + 1)
      })
      .await
  }

  async fn search_musicians(
    &self,
    user_id: Uuid,
    query: &str,
    limit: usize,
  ) -> Result<Vec<MusicianHit>> {
    let pattern = like_pattern(Some(query)).unwrap_or_else(|| "%".to_owned());
    let limit = limit as i64;

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS}, cn.status
           FROM profiles p
           LEFT JOIN user_connections cn
             ON  min(cn.user_id, cn.connected_user_id) = min(p.user_id, ?1)
             AND max(cn.user_id, cn.connected_user_id) = max(p.user_id, ?1)
           WHERE p.user_id != ?1 AND p.full_name LIKE ?2
           ORDER BY p.full_name COLLATE NOCASE
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(params![encode_uuid(user_id), pattern, limit], |r| {
            Ok((RawSummary::from_row(r, 0)?, r.get::<_, Option<String>>(9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        rows
          .into_iter()
          .map(|(summary, status)| {
            Ok(MusicianHit {
              profile:           summary.into_summary()?,
              connection_status: status.map(decode_connection_status).transpose()?,
            })
          })
          .collect()
      })
      .await
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn import_catalog(&self, import: CatalogImport) -> Result<Option<ImportCount>> {
    self
      .write(move |tx| {
        if exists(tx, "SELECT 1 FROM store_meta WHERE key = ?1", params![CATALOG_IMPORTED])? {
          return Ok(None);
        }
        let mut count = ImportCount::default();

        for ic in import.composers {
          let composer = new_composer(ic.composer)?;
          insert_composer(tx, &composer)?;
          count.composers += 1;
          for mut input in ic.pieces {
            input.composer = composer.name.clone();
            input.composer_id = Some(composer.composer_id);
            insert_piece(tx, &new_piece(input)?)?;
            count.pieces += 1;
          }
        }

        let mut achievements = HashMap::new();
        for input in import.achievements {
          let achievement = new_achievement(input)?;
          insert_achievement(tx, &achievement)?;
          achievements.insert(achievement.name, achievement.achievement_id);
          count.achievements += 1;
        }

        for ic in import.challenges {
          let mut input = ic.challenge;
          if let Some(name) = ic.achievement {
            let id = achievements.get(&name).copied().ok_or_else(|| {
              CoreError::Invalid(format!(
                "challenge {:?} names unknown achievement {name:?}",
                input.title
              ))
            })?;
            input.achievement_id = Some(id);
          }
          insert_challenge(tx, &new_challenge(input)?)?;
          count.challenges += 1;
        }

        for input in import.events {
          insert_event(tx, &new_event(input)?)?;
          count.events += 1;
        }

        tx.execute(
          "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
          params![CATALOG_IMPORTED, encode_dt(now())],
        )?;
        Ok(Some(count))
      })
      .await
  }

  async fn add_composer(&self, input: NewComposer) -> Result<Composer> {
    let composer = new_composer(input)?;
    let c = composer.clone();
    self.write(move |tx| insert_composer(tx, &c)).await?;
    Ok(composer)
  }

  async fn add_piece(&self, input: NewPiece) -> Result<Piece> {
    let piece = new_piece(input)?;
    let p = piece.clone();
    self.write(move |tx| insert_piece(tx, &p)).await?;
    Ok(piece)
  }

  async fn get_piece(&self, id: Uuid) -> Result<Option<Piece>> {
    self
      .read(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {PIECE_COLUMNS} FROM pieces pc WHERE pc.piece_id = ?1"),
            params![encode_uuid(id)],
            |r| RawPiece::from_row(r, 0),
          )
          .optional()?;
        raw.map(RawPiece::into_piece).transpose()
      })
      .await
  }

  async fn list_pieces(&self, filter: &PieceFilter) -> Result<Vec<Piece>> {
    let all = self
      .read(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PIECE_COLUMNS} FROM pieces pc ORDER BY pc.title COLLATE NOCASE"
        ))?;
        let raws = stmt
          .query_map([], |r| RawPiece::from_row(r, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPiece::into_piece).collect::<Result<Vec<_>>>()
      })
      .await?;

    Ok(all.into_iter().filter(|p| filter.matches(p)).collect())
  }

  async fn get_composer(&self, id: Uuid) -> Result<Option<Composer>> {
    self
      .read(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {COMPOSER_COLUMNS} FROM composers WHERE composer_id = ?1"),
            params![encode_uuid(id)],
            RawComposer::from_row,
          )
          .optional()?;
        raw.map(RawComposer::into_composer).transpose()
      })
      .await
  }

  async fn list_composers(&self, search: Option<&str>) -> Result<Vec<Composer>> {
    let pattern = like_pattern(search);

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPOSER_COLUMNS} FROM composers
           WHERE ?1 IS NULL OR name LIKE ?1 OR period LIKE ?1
           ORDER BY name COLLATE NOCASE"
        ))?;
        let raws = stmt
          .query_map(params![pattern], RawComposer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawComposer::into_composer).collect()
      })
      .await
  }

  async fn composer_pieces(&self, composer_id: Uuid) -> Result<Vec<Piece>> {
    let mut pieces = self
      .read(move |conn| {
        let id = encode_uuid(composer_id);
        if !exists(conn, "SELECT 1 FROM composers WHERE composer_id = ?1", params![id])? {
          return Err(CoreError::ComposerNotFound(composer_id).into());
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT {PIECE_COLUMNS} FROM pieces pc
           WHERE pc.composer_id = ?1
           ORDER BY pc.title COLLATE NOCASE"
        ))?;
        let raws = stmt
          .query_map(params![id], |r| RawPiece::from_row(r, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPiece::into_piece).collect::<Result<Vec<_>>>()
      })
      .await?;

    sort_by_difficulty_desc(&mut pieces);
    Ok(pieces)
  }

  async fn quick_search(&self, query: &str) -> Result<QuickSearch> {
    let Some(pattern) = like_pattern(Some(query)) else {
      return Ok(QuickSearch::default());
    };
    let limit = QUICK_SEARCH_LIMIT as i64;

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PIECE_COLUMNS} FROM pieces pc
           WHERE pc.title LIKE ?1 OR pc.composer LIKE ?1
           ORDER BY pc.title COLLATE NOCASE LIMIT ?2"
        ))?;
        let pieces = stmt
          .query_map(params![pattern, limit], |r| RawPiece::from_row(r, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPOSER_COLUMNS} FROM composers
           WHERE name LIKE ?1 ORDER BY name COLLATE NOCASE LIMIT ?2"
        ))?;
        let composers = stmt
          .query_map(params![pattern, limit], RawComposer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(QuickSearch {
          pieces:    pieces.into_iter().map(RawPiece::into_piece).collect::<Result<_>>()?,
          composers: composers.into_iter().map(RawComposer::into_composer).collect::<Result<_>>()?,
        })
      })
      .await
  }

  // ── Repertoire ────────────────────────────────────────────────────────────

  async fn set_piece_status(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
    status: PieceStatus,
  ) -> Result<StatusChange> {
    self
      .write(move |tx| {
        if !piece_exists(tx, piece_id)? {
          return Err(CoreError::PieceNotFound(piece_id).into());
        }
        let existing = load_user_piece(tx, user_id, piece_id)?;
        let previous = existing.as_ref().map(|r| r.status);

        let plan = plan_status_change(user_id, piece_id, existing.as_ref(), status, now());
        match &plan {
          StatusPlan::Insert(row) => {
            tx.execute(
              "INSERT INTO user_pieces (
                 user_piece_id, user_id, piece_id, status, progress, notes,
                 started_at, mastered_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
              params![
                encode_uuid(row.user_piece_id),
                encode_uuid(row.user_id),
                encode_uuid(row.piece_id),
                encode_piece_status(row.status),
                row.progress,
                row.notes,
                encode_dt(row.started_at),
                row.mastered_at.map(encode_dt),
                encode_dt(row.updated_at),
              ],
            )?;
          }
          StatusPlan::Update(row) => {
            tx.execute(
              "UPDATE user_pieces
               SET status = ?2, progress = ?3, mastered_at = ?4, updated_at = ?5
               WHERE user_piece_id = ?1",
              params![
                encode_uuid(row.user_piece_id),
                encode_piece_status(row.status),
                row.progress,
                row.mastered_at.map(encode_dt),
                encode_dt(row.updated_at),
              ],
            )?;
          }
          StatusPlan::Unchanged(_) => {}
        }

        Ok(StatusChange { previous, entry: plan.into_row() })
      })
      .await
  }

  async fn update_repertoire(
    &self,
    user_id: Uuid,
    piece_id: Uuid,
    update: RepertoireUpdate,
  ) -> Result<UserPiece> {
    let progress = update.progress.map(validate_progress).transpose()?;

    self
      .write(move |tx| {
        let mut row = load_user_piece(tx, user_id, piece_id)?
          .ok_or(CoreError::NotInRepertoire(piece_id))?;
        if let Some(p) = progress {
          row.progress = p;
        }
        if let Some(n) = update.notes {
          row.notes = Some(n).filter(|n| !n.trim().is_empty());
        }
        row.updated_at = now();

        tx.execute(
          "UPDATE user_pieces SET progress = ?2, notes = ?3, updated_at = ?4
           WHERE user_piece_id = ?1",
          params![
            encode_uuid(row.user_piece_id),
            row.progress,
            row.notes,
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(row)
      })
      .await
  }

  async fn remove_from_repertoire(&self, user_id: Uuid, piece_id: Uuid) -> Result<()> {
    self
      .write(move |tx| {
        let n = tx.execute(
          "DELETE FROM user_pieces WHERE user_id = ?1 AND piece_id = ?2",
          params![encode_uuid(user_id), encode_uuid(piece_id)],
        )?;
        if n == 0 {
          return Err(CoreError::NotInRepertoire(piece_id).into());
        }
        Ok(())
      })
      .await
  }

  async fn get_user_piece(&self, user_id: Uuid, piece_id: Uuid) -> Result<Option<UserPiece>> {
    self.read(move |conn| load_user_piece(conn, user_id, piece_id)).await
  }

  async fn repertoire(&self, user_id: Uuid) -> Result<Repertoire> {
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_PIECE_COLUMNS}, {PIECE_COLUMNS}
           FROM user_pieces up
           JOIN pieces pc ON pc.piece_id = up.piece_id
           WHERE up.user_id = ?1
           ORDER BY up.updated_at DESC"
        ))?;
        let rows = stmt
          .query_map(params![encode_uuid(user_id)], |r| {
            Ok((RawUserPiece::from_row(r, 0)?, RawPiece::from_row(r, 9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let entries = rows
          .into_iter()
          .map(|(up, pc)| {
            Ok(RepertoireEntry { entry: up.into_user_piece()?, piece: pc.into_piece()? })
          })
          .collect::<Result<Vec<_>>>()?;
        Ok(Repertoire::group(entries))
      })
      .await
  }

  // ── Missions ──────────────────────────────────────────────────────────────

  async fn seed_missions(&self, missions: Vec<Mission>) -> Result<usize> {
    self
      .write(move |tx| {
        let mut stmt = tx.prepare(
          "INSERT OR IGNORE INTO missions (
             mission_id, title, description, category, kind, xp_reward, deadline
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut inserted = 0;
        for m in &missions {
          inserted += stmt.execute(params![
            m.mission_id,
            m.title,
            m.description,
            encode_category(m.category),
            encode_kind(m.kind),
            m.xp_reward,
            m.deadline,
          ])?;
        }
        Ok(inserted)
      })
      .await
  }

  async fn list_missions(&self, user_id: Uuid, filter: MissionFilter) -> Result<Vec<MissionView>> {
    let views = self.read(move |conn| mission_views(conn, user_id, None)).await?;
    Ok(views.into_iter().filter(|v| filter.matches(&v.mission)).collect())
  }

  async fn set_mission_progress(
    &self,
    user_id: Uuid,
    mission_id: &str,
    progress: u8,
  ) -> Result<MissionView> {
    if progress > 100 {
      return Err(CoreError::ProgressOutOfRange(progress.into()).into());
    }
    let mission_id = mission_id.to_owned();

    self
      .write(move |tx| {
        if !exists(tx, "SELECT 1 FROM missions WHERE mission_id = ?1", params![mission_id])? {
          return Err(CoreError::MissionNotFound(mission_id).into());
        }
        tx.execute(
          "INSERT INTO mission_progress (user_id, mission_id, progress, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id, mission_id)
           DO UPDATE SET progress = excluded.progress, updated_at = excluded.updated_at",
          params![encode_uuid(user_id), mission_id, progress, encode_dt(now())],
        )?;
        mission_view(tx, user_id, &mission_id)
      })
      .await
  }

  async fn claim_mission(
    &self,
    user_id: Uuid,
    mission_id: &str,
    policy: LevelingPolicy,
  ) -> Result<ClaimOutcome> {
    let mission_id = mission_id.to_owned();

    self
      .write(move |tx| {
        let view = mission_view(tx, user_id, &mission_id)?;
        if view.is_completed {
          return Err(CoreError::AlreadyClaimed(mission_id).into());
        }
        check_claimable(&mission_id, view.progress)?;

        let profile = require_profile(tx, user_id)?;
        let award = award(profile.level_state(), view.mission.xp_reward, policy);

        let completion = UserMission {
          user_mission_id: Uuid::new_v4(),
          user_id,
          mission_id: mission_id.clone(),
          xp_earned: view.mission.xp_reward,
          completed_at: now(),
        };
        tx.execute(
          "INSERT INTO user_missions (user_mission_id, user_id, mission_id, xp_earned, completed_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            encode_uuid(completion.user_mission_id),
            encode_uuid(user_id),
            completion.mission_id,
            completion.xp_earned,
            encode_dt(completion.completed_at),
          ],
        )
        .map_err(|e| {
          if is_unique_violation(&e) {
            Error::from(CoreError::AlreadyClaimed(mission_id.clone()))
          } else {
            e.into()
          }
        })?;

        let LevelState { xp, level } = award.after;
        tx.execute(
          "UPDATE profiles SET xp = ?2, level = ?3, updated_at = ?4 WHERE user_id = ?1",
          params![encode_uuid(user_id), xp, level, encode_dt(completion.completed_at)],
        )?;

        Ok(ClaimOutcome { completion, award, progress: award.progress() })
      })
      .await
  }

  // ── Challenges & achievements ─────────────────────────────────────────────

  async fn add_achievement(&self, input: NewAchievement) -> Result<Achievement> {
    let achievement = new_achievement(input)?;
    let a = achievement.clone();
    self.write(move |tx| insert_achievement(tx, &a)).await?;
    Ok(achievement)
  }

  async fn add_challenge(&self, input: NewChallenge) -> Result<Challenge> {
    let challenge = new_challenge(input)?;
    let c = challenge.clone();
    self.write(move |tx| insert_challenge(tx, &c)).await?;
    Ok(challenge)
  }

  async fn list_challenges(&self, user_id: Uuid) -> Result<Vec<ChallengeView>> {
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHALLENGE_COLUMNS}, {USER_CHALLENGE_COLUMNS}
           FROM challenges c
           LEFT JOIN user_challenges uc
             ON uc.challenge_id = c.challenge_id AND uc.user_id = ?1
           ORDER BY c.start_date IS NULL, c.start_date, c.title"
        ))?;
        let rows = stmt
          .query_map(params![encode_uuid(user_id)], |r| {
            Ok((RawChallenge::from_row(r)?, RawUserChallenge::from_optional_row(r, 9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        rows
          .into_iter()
          .map(|(c, uc)| {
            Ok(ChallengeView {
              challenge:     c.into_challenge()?,
              participation: uc.map(RawUserChallenge::into_user_challenge).transpose()?,
            })
          })
          .collect()
      })
      .await
  }

  async fn join_challenge(&self, user_id: Uuid, challenge_id: Uuid) -> Result<UserChallenge> {
    self
      .write(move |tx| {
        let cid = encode_uuid(challenge_id);
        if !exists(tx, "SELECT 1 FROM challenges WHERE challenge_id = ?1", params![cid])? {
          return Err(CoreError::ChallengeNotFound(challenge_id).into());
        }
        let row = UserChallenge::join(user_id, challenge_id, now());
        tx.execute(
          "INSERT INTO user_challenges (
             user_challenge_id, user_id, challenge_id, progress, completed, completed_at, joined_at
           ) VALUES (?1, ?2, ?3, 0, 0, NULL, ?4)",
          params![
            encode_uuid(row.user_challenge_id),
            encode_uuid(user_id),
            cid,
            encode_dt(row.joined_at),
          ],
        )
        .map_err(|e| {
          if is_unique_violation(&e) {
            Error::from(CoreError::AlreadyJoined(challenge_id))
          } else {
            e.into()
          }
        })?;
        Ok(row)
      })
      .await
  }

  async fn record_challenge_progress(
    &self,
    user_id: Uuid,
    challenge_id: Uuid,
    delta: u32,
  ) -> Result<ChallengeAdvance> {
    self
      .write(move |tx| {
        let cid = encode_uuid(challenge_id);
        let challenge = tx
          .query_row(
            &format!("SELECT {CHALLENGE_COLUMNS} FROM challenges c WHERE c.challenge_id = ?1"),
            params![cid],
            RawChallenge::from_row,
          )
          .optional()?
          .ok_or(CoreError::ChallengeNotFound(challenge_id))?
          .into_challenge()?;

        let row = tx
          .query_row(
            &format!(
              "SELECT {USER_CHALLENGE_COLUMNS} FROM user_challenges uc
               WHERE uc.user_id = ?1 AND uc.challenge_id = ?2"
            ),
            params![encode_uuid(user_id), cid],
            |r| RawUserChallenge::from_row(r, 0),
          )
          .optional()?
          .ok_or(CoreError::NotJoined(challenge_id))?
          .into_user_challenge()?;

        let at = now();
        let (next, crossed) = apply_progress(&row, delta, challenge.goal, at);
        tx.execute(
          "UPDATE user_challenges SET progress = ?2, completed = ?3, completed_at = ?4
           WHERE user_challenge_id = ?1",
          params![
            encode_uuid(next.user_challenge_id),
            next.progress,
            next.completed,
            next.completed_at.map(encode_dt),
          ],
        )?;

        let mut granted_achievement = None;
        if let Some(aid) = challenge.achievement_id.filter(|_| crossed) {
          let n = tx.execute(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, earned_at)
             VALUES (?1, ?2, ?3)",
            params![encode_uuid(user_id), encode_uuid(aid), encode_dt(at)],
          )?;
          if n > 0 {
            granted_achievement = Some(aid);
          }
        }

        Ok(ChallengeAdvance { participation: next, just_completed: crossed, granted_achievement })
      })
      .await
  }

  async fn achievements(&self, user_id: Uuid) -> Result<Vec<EarnedAchievement>> {
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACHIEVEMENT_COLUMNS}, ua.earned_at
           FROM user_achievements ua
           JOIN achievements a ON a.achievement_id = ua.achievement_id
           WHERE ua.user_id = ?1
           ORDER BY ua.earned_at DESC"
        ))?;
        let rows = stmt
          .query_map(params![encode_uuid(user_id)], |r| {
            Ok((RawAchievement::from_row(r)?, r.get::<_, String>(6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        rows
          .into_iter()
          .map(|(a, earned_at)| {
            Ok(EarnedAchievement { achievement: a.into_achievement()?, earned_at: decode_dt(&earned_at)? })
          })
          .collect()
      })
      .await
  }

  // ── Connections ───────────────────────────────────────────────────────────

  async fn request_connection(&self, requester: Uuid, receiver: Uuid) -> Result<UserConnection> {
    self
      .write(move |tx| {
        if requester != receiver && load_profile(tx, receiver)?.is_none() {
          return Err(CoreError::ProfileNotFound(receiver).into());
        }
        let existing = connection_between(tx, requester, receiver)?;
        let row = check_request(requester, receiver, existing.as_ref(), now())?;

        tx.execute(
          "INSERT INTO user_connections (
             connection_id, user_id, connected_user_id, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            encode_uuid(row.connection_id),
            encode_uuid(row.user_id),
            encode_uuid(row.connected_user_id),
            encode_connection_status(row.status),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )
        .map_err(|e| {
          if is_unique_violation(&e) {
            Error::from(CoreError::ConnectionExists { status: ConnectionStatus::Pending })
          } else {
            e.into()
          }
        })?;
        Ok(row)
      })
      .await
  }

  async fn respond_connection(
    &self,
    actor: Uuid,
    connection_id: Uuid,
    accept: bool,
  ) -> Result<UserConnection> {
    self
      .write(move |tx| {
        let id = encode_uuid(connection_id);
        let row = load_connection(tx, "cn.connection_id = ?1", params![id])?
          .ok_or(CoreError::ConnectionNotFound(connection_id))?;
        let next = resolve(&row, actor, accept, now())?;

        tx.execute(
          "UPDATE user_connections SET status = ?2, updated_at = ?3
           WHERE connection_id = ?1 AND status = 'pending'",
          params![id, encode_connection_status(next.status), encode_dt(next.updated_at)],
        )?;
        Ok(next)
      })
      .await
  }

  async fn connections(&self, user_id: Uuid) -> Result<Vec<ConnectionView>> {
    self
      .read(move |conn| connection_views(conn, user_id, ConnectionStatus::Accepted, Direction::Either))
      .await
  }

  async fn connection_requests(&self, user_id: Uuid) -> Result<ConnectionRequests> {
    self
      .read(move |conn| {
        Ok(ConnectionRequests {
          incoming: connection_views(conn, user_id, ConnectionStatus::Pending, Direction::Incoming)?,
          outgoing: connection_views(conn, user_id, ConnectionStatus::Pending, Direction::Outgoing)?,
        })
      })
      .await
  }

  // ── Practice ──────────────────────────────────────────────────────────────

  async fn log_practice(&self, user_id: Uuid, input: NewPracticeSession) -> Result<PracticeLog> {
    input.validate()?;

    self
      .write(move |tx| {
        match input.piece_id {
          Some(pid) if !piece_exists(tx, pid)? => {
            return Err(CoreError::PieceNotFound(pid).into());
          }
          _ => {}
        }

        let at = now();
        let session = PracticeSession {
          session_id: Uuid::new_v4(),
          user_id,
          piece_id: input.piece_id,
          duration: input.duration,
          rating: input.rating,
          notes: input.notes,
          created_at: at,
        };
        tx.execute(
          &format!("INSERT INTO practice_sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          params![
            encode_uuid(session.session_id),
            encode_uuid(user_id),
            session.piece_id.map(encode_uuid),
            session.duration,
            session.rating,
            session.notes,
            encode_dt(at),
          ],
        )?;

        let streak = load_streak(tx, user_id)?.unwrap_or_else(|| PracticeStreak::empty(user_id, at));
        let streak = advance_streak(&streak, at.date_naive(), at);
        tx.execute(
          &format!(
            "INSERT INTO practice_streaks ({STREAK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET
               current_streak     = excluded.current_streak,
               longest_streak     = excluded.longest_streak,
               last_practice_date = excluded.last_practice_date,
               updated_at         = excluded.updated_at"
          ),
          params![
            encode_uuid(user_id),
            streak.current_streak,
            streak.longest_streak,
            streak.last_practice_date.map(encode_date),
            encode_dt(streak.updated_at),
          ],
        )?;

        Ok(PracticeLog { session, streak })
      })
      .await
  }

  async fn recent_practice(&self, user_id: Uuid, limit: usize) -> Result<Vec<PracticeSession>> {
    let limit = limit as i64;
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM practice_sessions
           WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))?;
        let raws = stmt
          .query_map(params![encode_uuid(user_id), limit], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawSession::into_session).collect()
      })
      .await
  }

  async fn practice_streak(&self, user_id: Uuid) -> Result<PracticeStreak> {
    self
      .read(move |conn| {
        Ok(load_streak(conn, user_id)?.unwrap_or_else(|| PracticeStreak::empty(user_id, now())))
      })
      .await
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    let event = new_event(input)?;
    let e = event.clone();
    self.write(move |tx| insert_event(tx, &e)).await?;
    Ok(event)
  }

  async fn upcoming_events(&self, from: DateTime<Utc>) -> Result<Vec<Event>> {
    let from = encode_dt(from);
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events WHERE event_date >= ?1 ORDER BY event_date"
        ))?;
        let raws = stmt
          .query_map(params![from], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawEvent::into_event).collect()
      })
      .await
  }

  async fn register_for_event(&self, user_id: Uuid, event_id: Uuid) -> Result<EventRegistration> {
    self
      .write(move |tx| {
        let eid = encode_uuid(event_id);
        if !exists(tx, "SELECT 1 FROM events WHERE event_id = ?1", params![eid])? {
          return Err(CoreError::EventNotFound(event_id).into());
        }
        let reg = EventRegistration { user_id, event_id, registered_at: now() };
        tx.execute(
          "INSERT INTO user_events (user_id, event_id, registered_at) VALUES (?1, ?2, ?3)",
          params![encode_uuid(user_id), eid, encode_dt(reg.registered_at)],
        )
        .map_err(|e| {
          if is_unique_violation(&e) {
            Error::from(CoreError::AlreadyRegistered(event_id))
          } else {
            e.into()
          }
        })?;
        Ok(reg)
      })
      .await
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn settings(&self, user_id: Uuid) -> Result<UserSettings> {
    self.write(move |tx| ensure_settings(tx, user_id, now())).await
  }

  async fn update_settings(&self, user_id: Uuid, update: SettingsUpdate) -> Result<UserSettings> {
    self
      .write(move |tx| {
        let at = now();
        let mut s = ensure_settings(tx, user_id, at)?;
        s.apply(update, at);
        tx.execute(
          "UPDATE user_settings
           SET theme = ?2, notifications_enabled = ?3, api_key = ?4, updated_at = ?5
           WHERE user_id = ?1",
          params![
            encode_uuid(user_id),
            s.theme.as_str(),
            s.notifications_enabled,
            s.api_key,
            encode_dt(s.updated_at),
          ],
        )?;
        Ok(s)
      })
      .await
  }
}
