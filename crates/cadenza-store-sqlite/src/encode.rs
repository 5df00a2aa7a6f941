//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision so
//! they sort lexically. UUIDs are stored as hyphenated lowercase strings.
//! Each `Raw*` struct mirrors one `*_COLUMNS` list. Structs that appear in
//! joined queries take the column offset they start at.

use cadenza_core::{
  account::Account,
  catalog::{Composer, Event, Piece},
  challenge::{Achievement, Challenge, UserChallenge},
  mission::{Mission, MissionCategory, MissionKind},
  practice::{PracticeSession, PracticeStreak},
  profile::{Profile, ProfileSummary},
  repertoire::{PieceStatus, UserPiece},
  settings::{Theme, UserSettings},
  social::{ConnectionStatus, UserConnection},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

/// The store's clock, truncated to what a column can hold.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

fn unknown(column: &'static str, value: String) -> Error {
  Error::UnknownValue { column, value }
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_piece_status(s: PieceStatus) -> &'static str {
  match s {
    PieceStatus::Current => "current",
    PieceStatus::Wishlist => "wishlist",
    PieceStatus::Mastered => "mastered",
  }
}

pub fn decode_piece_status(s: String) -> Result<PieceStatus> {
  match s.as_str() {
    "current" => Ok(PieceStatus::Current),
    "wishlist" => Ok(PieceStatus::Wishlist),
    "mastered" => Ok(PieceStatus::Mastered),
    _ => Err(unknown("status", s)),
  }
}

pub fn encode_connection_status(s: ConnectionStatus) -> &'static str { s.as_str() }

pub fn decode_connection_status(s: String) -> Result<ConnectionStatus> {
  match s.as_str() {
    "pending" => Ok(ConnectionStatus::Pending),
    "accepted" => Ok(ConnectionStatus::Accepted),
    "rejected" => Ok(ConnectionStatus::Rejected),
    _ => Err(unknown("connection status", s)),
  }
}

pub fn encode_category(c: MissionCategory) -> &'static str {
  match c {
    MissionCategory::Daily => "daily",
    MissionCategory::Weekly => "weekly",
    MissionCategory::Monthly => "monthly",
  }
}

fn decode_category(s: String) -> Result<MissionCategory> {
  match s.as_str() {
    "daily" => Ok(MissionCategory::Daily),
    "weekly" => Ok(MissionCategory::Weekly),
    "monthly" => Ok(MissionCategory::Monthly),
    _ => Err(unknown("category", s)),
  }
}

pub fn encode_kind(k: MissionKind) -> &'static str {
  match k {
    MissionKind::Practice => "practice",
    MissionKind::Technique => "technique",
    MissionKind::Repertoire => "repertoire",
    MissionKind::Performance => "performance",
  }
}

fn decode_kind(s: String) -> Result<MissionKind> {
  match s.as_str() {
    "practice" => Ok(MissionKind::Practice),
    "technique" => Ok(MissionKind::Technique),
    "repertoire" => Ok(MissionKind::Repertoire),
    "performance" => Ok(MissionKind::Performance),
    _ => Err(unknown("kind", s)),
  }
}

fn decode_theme(s: String) -> Result<Theme> {
  s.parse().map_err(|_| unknown("theme", s))
}

// ─── Accounts & profiles ─────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str = "user_id, email, password_hash, created_at";

pub struct RawAccount {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str = "user_id, full_name, bio, instrument, experience_level, \
   avatar_url, xp, level, profile_color, profile_icon, profile_banner, profile_accessories, \
   discord_username, telegram_username, instagram_username, youtube_channel, online_status, \
   last_seen, created_at, updated_at";

pub struct RawProfile {
  pub user_id:             String,
  pub full_name:           String,
  pub bio:                 String,
  pub instrument:          Option<String>,
  pub experience_level:    String,
  pub avatar_url:          Option<String>,
  pub xp:                  u32,
  pub level:               u32,
  pub profile_color:       String,
  pub profile_icon:        String,
  pub profile_banner:      Option<String>,
  pub profile_accessories: Option<String>,
  pub discord_username:    Option<String>,
  pub telegram_username:   Option<String>,
  pub instagram_username:  Option<String>,
  pub youtube_channel:     Option<String>,
  pub online_status:       Option<String>,
  pub last_seen:           Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:             row.get(0)?,
      full_name:           row.get(1)?,
      bio:                 row.get(2)?,
      instrument:          row.get(3)?,
      experience_level:    row.get(4)?,
      avatar_url:          row.get(5)?,
      xp:                  row.get(6)?,
      level:               row.get(7)?,
      profile_color:       row.get(8)?,
      profile_icon:        row.get(9)?,
      profile_banner:      row.get(10)?,
      profile_accessories: row.get(11)?,
      discord_username:    row.get(12)?,
      telegram_username:   row.get(13)?,
      instagram_username:  row.get(14)?,
      youtube_channel:     row.get(15)?,
      online_status:       row.get(16)?,
      last_seen:           row.get(17)?,
      created_at:          row.get(18)?,
      updated_at:          row.get(19)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    let profile_accessories = self
      .profile_accessories
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(Profile {
      user_id: decode_uuid(&self.user_id)?,
      full_name: self.full_name,
      bio: self.bio,
      instrument: self.instrument,
      experience_level: self.experience_level,
      avatar_url: self.avatar_url,
      xp: self.xp,
      level: self.level,
      profile_color: self.profile_color,
      profile_icon: self.profile_icon,
      profile_banner: self.profile_banner,
      profile_accessories,
      discord_username: self.discord_username,
      telegram_username: self.telegram_username,
      instagram_username: self.instagram_username,
      youtube_channel: self.youtube_channel,
      online_status: self.online_status,
      last_seen: decode_opt_dt(self.last_seen)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Columns for [`RawSummary`], prefixed with the profile table alias `p`.
pub const SUMMARY_COLUMNS: &str = "p.user_id, p.full_name, p.avatar_url, p.instrument, \
   p.experience_level, p.level, p.xp, p.profile_color, p.profile_icon";

pub struct RawSummary {
  pub user_id:          String,
  pub full_name:        String,
  pub avatar_url:       Option<String>,
  pub instrument:       Option<String>,
  pub experience_level: String,
  pub level:            u32,
  pub xp:               u32,
  pub profile_color:    String,
  pub profile_icon:     String,
}

impl RawSummary {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:          row.get(at)?,
      full_name:        row.get(at + 1)?,
      avatar_url:       row.get(at + 2)?,
      instrument:       row.get(at + 3)?,
      experience_level: row.get(at + 4)?,
      level:            row.get(at + 5)?,
      xp:               row.get(at + 6)?,
      profile_color:    row.get(at + 7)?,
      profile_icon:     row.get(at + 8)?,
    })
  }

  pub fn into_summary(self) -> Result<ProfileSummary> {
    Ok(ProfileSummary {
      user_id:          decode_uuid(&self.user_id)?,
      full_name:        self.full_name,
      avatar_url:       self.avatar_url,
      instrument:       self.instrument,
      experience_level: self.experience_level,
      level:            self.level,
      xp:               self.xp,
      profile_color:    self.profile_color,
      profile_icon:     self.profile_icon,
    })
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub const COMPOSER_COLUMNS: &str =
  "composer_id, name, bio, birth_year, death_year, nationality, period, image_url, created_at";

pub struct RawComposer {
  pub composer_id: String,
  pub name:        String,
  pub bio:         Option<String>,
  pub birth_year:  Option<i32>,
  pub death_year:  Option<i32>,
  pub nationality: Option<String>,
  pub period:      Option<String>,
  pub image_url:   Option<String>,
  pub created_at:  String,
}

impl RawComposer {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      composer_id: row.get(0)?,
      name:        row.get(1)?,
      bio:         row.get(2)?,
      birth_year:  row.get(3)?,
      death_year:  row.get(4)?,
      nationality: row.get(5)?,
      period:      row.get(6)?,
      image_url:   row.get(7)?,
      created_at:  row.get(8)?,
    })
  }

  pub fn into_composer(self) -> Result<Composer> {
    Ok(Composer {
      composer_id: decode_uuid(&self.composer_id)?,
      name:        self.name,
      bio:         self.bio,
      birth_year:  self.birth_year,
      death_year:  self.death_year,
      nationality: self.nationality,
      period:      self.period,
      image_url:   self.image_url,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Piece columns, prefixed with the piece table alias `pc`.
pub const PIECE_COLUMNS: &str = "pc.piece_id, pc.title, pc.composer, pc.composer_id, \
   pc.instrument, pc.period, pc.genre, pc.difficulty, pc.average_duration, pc.description, \
   pc.created_at, pc.updated_at";

pub struct RawPiece {
  pub piece_id:         String,
  pub title:            String,
  pub composer:         String,
  pub composer_id:      Option<String>,
  pub instrument:       String,
  pub period:           Option<String>,
  pub genre:            Option<String>,
  pub difficulty:       Option<u8>,
  pub average_duration: Option<u32>,
  pub description:      Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawPiece {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      piece_id:         row.get(at)?,
      title:            row.get(at + 1)?,
      composer:         row.get(at + 2)?,
      composer_id:      row.get(at + 3)?,
      instrument:       row.get(at + 4)?,
      period:           row.get(at + 5)?,
      genre:            row.get(at + 6)?,
      difficulty:       row.get(at + 7)?,
      average_duration: row.get(at + 8)?,
      description:      row.get(at + 9)?,
      created_at:       row.get(at + 10)?,
      updated_at:       row.get(at + 11)?,
    })
  }

  pub fn into_piece(self) -> Result<Piece> {
    Ok(Piece {
      piece_id:         decode_uuid(&self.piece_id)?,
      title:            self.title,
      composer:         self.composer,
      composer_id:      decode_opt_uuid(self.composer_id)?,
      instrument:       self.instrument,
      period:           self.period,
      genre:            self.genre,
      difficulty:       self.difficulty,
      average_duration: self.average_duration,
      description:      self.description,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub const EVENT_COLUMNS: &str =
  "event_id, title, description, event_date, location, url, created_by, created_at";

pub struct RawEvent {
  pub event_id:    String,
  pub title:       String,
  pub description: Option<String>,
  pub event_date:  String,
  pub location:    Option<String>,
  pub url:         Option<String>,
  pub created_by:  Option<String>,
  pub created_at:  String,
}

impl RawEvent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      event_date:  row.get(3)?,
      location:    row.get(4)?,
      url:         row.get(5)?,
      created_by:  row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:    decode_uuid(&self.event_id)?,
      title:       self.title,
      description: self.description,
      event_date:  decode_dt(&self.event_date)?,
      location:    self.location,
      url:         self.url,
      created_by:  decode_opt_uuid(self.created_by)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Repertoire ──────────────────────────────────────────────────────────────

/// Repertoire columns, prefixed with the table alias `up`.
pub const USER_PIECE_COLUMNS: &str = "up.user_piece_id, up.user_id, up.piece_id, up.status, \
   up.progress, up.notes, up.started_at, up.mastered_at, up.updated_at";

pub struct RawUserPiece {
  pub user_piece_id: String,
  pub user_id:       String,
  pub piece_id:      String,
  pub status:        String,
  pub progress:      u8,
  pub notes:         Option<String>,
  pub started_at:    String,
  pub mastered_at:   Option<String>,
  pub updated_at:    String,
}

impl RawUserPiece {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_piece_id: row.get(at)?,
      user_id:       row.get(at + 1)?,
      piece_id:      row.get(at + 2)?,
      status:        row.get(at + 3)?,
      progress:      row.get(at + 4)?,
      notes:         row.get(at + 5)?,
      started_at:    row.get(at + 6)?,
      mastered_at:   row.get(at + 7)?,
      updated_at:    row.get(at + 8)?,
    })
  }

  pub fn into_user_piece(self) -> Result<UserPiece> {
    Ok(UserPiece {
      user_piece_id: decode_uuid(&self.user_piece_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      piece_id:      decode_uuid(&self.piece_id)?,
      status:        decode_piece_status(self.status)?,
      progress:      self.progress,
      notes:         self.notes,
      started_at:    decode_dt(&self.started_at)?,
      mastered_at:   decode_opt_dt(self.mastered_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Missions ────────────────────────────────────────────────────────────────

/// Mission columns, prefixed with the table alias `m`.
pub const MISSION_COLUMNS: &str =
  "m.mission_id, m.title, m.description, m.category, m.kind, m.xp_reward, m.deadline";

pub struct RawMission {
  pub mission_id:  String,
  pub title:       String,
  pub description: String,
  pub category:    String,
  pub kind:        String,
  pub xp_reward:   u32,
  pub deadline:    String,
}

impl RawMission {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      mission_id:  row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      category:    row.get(3)?,
      kind:        row.get(4)?,
      xp_reward:   row.get(5)?,
      deadline:    row.get(6)?,
    })
  }

  pub fn into_mission(self) -> Result<Mission> {
    Ok(Mission {
      mission_id:  self.mission_id,
      title:       self.title,
      description: self.description,
      category:    decode_category(self.category)?,
      kind:        decode_kind(self.kind)?,
      xp_reward:   self.xp_reward,
      deadline:    self.deadline,
    })
  }
}

// ─── Challenges ──────────────────────────────────────────────────────────────

/// Challenge columns, prefixed with the table alias `c`.
pub const CHALLENGE_COLUMNS: &str = "c.challenge_id, c.title, c.description, c.goal, \
   c.goal_type, c.duration, c.start_date, c.end_date, c.achievement_id";

pub struct RawChallenge {
  pub challenge_id:   String,
  pub title:          String,
  pub description:    Option<String>,
  pub goal:           u32,
  pub goal_type:      String,
  pub duration:       Option<String>,
  pub start_date:     Option<String>,
  pub end_date:       Option<String>,
  pub achievement_id: Option<String>,
}

impl RawChallenge {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      challenge_id:   row.get(0)?,
      title:          row.get(1)?,
      description:    row.get(2)?,
      goal:           row.get(3)?,
      goal_type:      row.get(4)?,
      duration:       row.get(5)?,
      start_date:     row.get(6)?,
      end_date:       row.get(7)?,
      achievement_id: row.get(8)?,
    })
  }

  pub fn into_challenge(self) -> Result<Challenge> {
    Ok(Challenge {
      challenge_id:   decode_uuid(&self.challenge_id)?,
      title:          self.title,
      description:    self.description,
      goal:           self.goal,
      goal_type:      self.goal_type,
      duration:       self.duration,
      start_date:     decode_opt_dt(self.start_date)?,
      end_date:       decode_opt_dt(self.end_date)?,
      achievement_id: decode_opt_uuid(self.achievement_id)?,
    })
  }
}

/// Participation columns, prefixed with the table alias `uc`.
pub const USER_CHALLENGE_COLUMNS: &str = "uc.user_challenge_id, uc.user_id, uc.challenge_id, \
   uc.progress, uc.completed, uc.completed_at, uc.joined_at";

pub struct RawUserChallenge {
  pub user_challenge_id: String,
  pub user_id:           String,
  pub challenge_id:      String,
  pub progress:          u32,
  pub completed:         bool,
  pub completed_at:      Option<String>,
  pub joined_at:         String,
}

impl RawUserChallenge {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_challenge_id: row.get(at)?,
      user_id:           row.get(at + 1)?,
      challenge_id:      row.get(at + 2)?,
      progress:          row.get(at + 3)?,
      completed:         row.get(at + 4)?,
      completed_at:      row.get(at + 5)?,
      joined_at:         row.get(at + 6)?,
    })
  }

  /// Reads the columns at `at`, yielding `None` when a LEFT JOIN found no row.
  pub fn from_optional_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    let id: Option<String> = row.get(at)?;
    match id {
      Some(_) => Self::from_row(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_user_challenge(self) -> Result<UserChallenge> {
    Ok(UserChallenge {
      user_challenge_id: decode_uuid(&self.user_challenge_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      challenge_id:      decode_uuid(&self.challenge_id)?,
      progress:          self.progress,
      completed:         self.completed,
      completed_at:      decode_opt_dt(self.completed_at)?,
      joined_at:         decode_dt(&self.joined_at)?,
    })
  }
}

/// Achievement columns, prefixed with the table alias `a`.
pub const ACHIEVEMENT_COLUMNS: &str =
  "a.achievement_id, a.name, a.description, a.category, a.icon, a.points";

pub struct RawAchievement {
  pub achievement_id: String,
  pub name:           String,
  pub description:    Option<String>,
  pub category:       Option<String>,
  pub icon:           Option<String>,
  pub points:         u32,
}

impl RawAchievement {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      achievement_id: row.get(0)?,
      name:           row.get(1)?,
      description:    row.get(2)?,
      category:       row.get(3)?,
      icon:           row.get(4)?,
      points:         row.get(5)?,
    })
  }

  pub fn into_achievement(self) -> Result<Achievement> {
    Ok(Achievement {
      achievement_id: decode_uuid(&self.achievement_id)?,
      name:           self.name,
      description:    self.description,
      category:       self.category,
      icon:           self.icon,
      points:         self.points,
    })
  }
}

// ─── Social ──────────────────────────────────────────────────────────────────

/// Connection columns, prefixed with the table alias `cn`.
pub const CONNECTION_COLUMNS: &str = "cn.connection_id, cn.user_id, cn.connected_user_id, \
   cn.status, cn.created_at, cn.updated_at";

pub struct RawConnection {
  pub connection_id:     String,
  pub user_id:           String,
  pub connected_user_id: String,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawConnection {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      connection_id:     row.get(0)?,
      user_id:           row.get(1)?,
      connected_user_id: row.get(2)?,
      status:            row.get(3)?,
      created_at:        row.get(4)?,
      updated_at:        row.get(5)?,
    })
  }

  pub fn into_connection(self) -> Result<UserConnection> {
    Ok(UserConnection {
      connection_id:     decode_uuid(&self.connection_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      connected_user_id: decode_uuid(&self.connected_user_id)?,
      status:            decode_connection_status(self.status)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Practice ────────────────────────────────────────────────────────────────

pub const SESSION_COLUMNS: &str =
  "session_id, user_id, piece_id, duration, rating, notes, created_at";

pub struct RawSession {
  pub session_id: String,
  pub user_id:    String,
  pub piece_id:   Option<String>,
  pub duration:   u32,
  pub rating:     Option<u8>,
  pub notes:      Option<String>,
  pub created_at: String,
}

impl RawSession {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id: row.get(0)?,
      user_id:    row.get(1)?,
      piece_id:   row.get(2)?,
      duration:   row.get(3)?,
      rating:     row.get(4)?,
      notes:      row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_session(self) -> Result<PracticeSession> {
    Ok(PracticeSession {
      session_id: decode_uuid(&self.session_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      piece_id:   decode_opt_uuid(self.piece_id)?,
      duration:   self.duration,
      rating:     self.rating,
      notes:      self.notes,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const STREAK_COLUMNS: &str =
  "user_id, current_streak, longest_streak, last_practice_date, updated_at";

pub struct RawStreak {
  pub user_id:            String,
  pub current_streak:     u32,
  pub longest_streak:     u32,
  pub last_practice_date: Option<String>,
  pub updated_at:         String,
}

impl RawStreak {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:            row.get(0)?,
      current_streak:     row.get(1)?,
      longest_streak:     row.get(2)?,
      last_practice_date: row.get(3)?,
      updated_at:         row.get(4)?,
    })
  }

  pub fn into_streak(self) -> Result<PracticeStreak> {
    Ok(PracticeStreak {
      user_id:            decode_uuid(&self.user_id)?,
      current_streak:     self.current_streak,
      longest_streak:     self.longest_streak,
      last_practice_date: self.last_practice_date.as_deref().map(decode_date).transpose()?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub const SETTINGS_COLUMNS: &str =
  "user_id, theme, notifications_enabled, api_key, created_at, updated_at";

pub struct RawSettings {
  pub user_id:               String,
  pub theme:                 String,
  pub notifications_enabled: bool,
  pub api_key:               Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawSettings {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:               row.get(0)?,
      theme:                 row.get(1)?,
      notifications_enabled: row.get(2)?,
      api_key:               row.get(3)?,
      created_at:            row.get(4)?,
      updated_at:            row.get(5)?,
    })
  }

  pub fn into_settings(self) -> Result<UserSettings> {
    Ok(UserSettings {
      user_id:               decode_uuid(&self.user_id)?,
      theme:                 decode_theme(self.theme)?,
      notifications_enabled: self.notifications_enabled,
      api_key:               self.api_key,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = now();
    let b = a + chrono::Duration::milliseconds(1500);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(a)).unwrap(), a);
  }

  #[test]
  fn unknown_status_is_reported() {
    let err = decode_piece_status("forgotten".into()).unwrap_err();
    assert!(matches!(err, Error::UnknownValue { column: "status", .. }));
  }
}
