//! Profiles and the leaderboard built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::{LevelProgress, LevelState};

/// Colors a new profile may be assigned.
pub const PROFILE_COLORS: &[&str] =
  &["indigo", "purple", "blue", "green", "amber", "red", "pink"];

/// Icons a new profile may be assigned.
pub const PROFILE_ICONS: &[&str] = &["music", "star", "trophy"];

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:             Uuid,
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
  pub profile_accessories: Option<serde_json::Value>,
  pub discord_username:    Option<String>,
  pub telegram_username:   Option<String>,
  pub instagram_username:  Option<String>,
  pub youtube_channel:     Option<String>,
  pub online_status:       Option<String>,
  pub last_seen:           Option<DateTime<Utc>>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl Profile {
  pub fn level_state(&self) -> LevelState {
    LevelState { xp: self.xp, level: self.level }
  }

  pub fn progress(&self) -> LevelProgress { self.level_state().into() }

  /// Build the default profile for a freshly signed-up user.
  ///
  /// `pick` is any source of randomness; it selects color and icon.
  pub fn new_default(
    user_id: Uuid,
    email: &str,
    full_name: Option<String>,
    pick: u32,
    now: DateTime<Utc>,
  ) -> Self {
    let color = PROFILE_COLORS[pick as usize % PROFILE_COLORS.len()];
    let icon  = PROFILE_ICONS[(pick / 7) as usize % PROFILE_ICONS.len()];
    Self {
      user_id,
      full_name: full_name.unwrap_or_default(),
      bio: String::new(),
      instrument: None,
      experience_level: "beginner".to_owned(),
      avatar_url: Some(format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={email}"
      )),
      xp: LevelState::INITIAL.xp,
      level: LevelState::INITIAL.level,
      profile_color: color.to_owned(),
      profile_icon: icon.to_owned(),
      profile_banner: None,
      profile_accessories: None,
      discord_username: None,
      telegram_username: None,
      instagram_username: None,
      youtube_channel: None,
      online_status: None,
      last_seen: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Apply every field set in `update`. Level and XP are not editable here.
  pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
    let ProfileUpdate {
      full_name,
      bio,
      instrument,
      experience_level,
      avatar_url,
      profile_color,
      profile_icon,
      profile_banner,
      profile_accessories,
      discord_username,
      telegram_username,
      instagram_username,
      youtube_channel,
    } = update;

    if let Some(v) = full_name {

      self.full_name = v;

    }
    if let Some(v) = bio {
      self.bio = v;
    }
    if let Some(v) = instrument {
      self.instrument = Some(v);
    }
    if let Some(v) = experience_level {
      self.experience_level = v;
    }
    if let Some(v) = avatar_url {
      self.avatar_url = Some(v);
    }
    if let Some(v) = profile_color {
      self.profile_color = v;
    }
    if let Some(v) = profile_icon {
      self.profile_icon = v;
    }
    if let Some(v) = profile_banner {
      self.profile_banner = Some(v);
    }
    if let Some(v) = profile_accessories {
      self.profile_accessories = Some(v);
    }
    if let Some(v) = discord_username {
      self.discord_username = Some(v);
    }
    if let Some(v) = telegram_username {
      self.telegram_username = Some(v);
    }
    if let Some(v) = instagram_username {
      self.instagram_username = Some(v);
    }
    if let Some(v) = youtube_channel {
      self.youtube_channel = Some(v);
    }
    self.updated_at = now;
  }

  pub fn summary(&self) -> ProfileSummary {
    ProfileSummary {
      user_id:          self.user_id,
      full_name:        self.full_name.clone(),
      avatar_url:       self.avatar_url.clone(),
      instrument:       self.instrument.clone(),
      experience_level: self.experience_level.clone(),
      level:            self.level,
      xp:               self.xp,
      profile_color:    self.profile_color.clone(),
      profile_icon:     self.profile_icon.clone(),
    }
  }
}

/// Partial profile edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub full_name:           Option<String>,
  pub bio:                 Option<String>,
  pub instrument:          Option<String>,
  pub experience_level:    Option<String>,
  pub avatar_url:          Option<String>,
  pub profile_color:       Option<String>,
  pub profile_icon:        Option<String>,
  pub profile_banner:      Option<String>,
  pub profile_accessories: Option<serde_json::Value>,
  pub discord_username:    Option<String>,
  pub telegram_username:   Option<String>,
  pub instagram_username:  Option<String>,
  pub youtube_channel:     Option<String>,
}

/// The public slice of a profile shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
  pub user_id:          Uuid,
  pub full_name:        String,
  pub avatar_url:       Option<String>,
  pub instrument:       Option<String>,
  pub experience_level: String,
  pub level:            u32,
  pub xp:               u32,
  pub profile_color:    String,
  pub profile_icon:     String,
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

/// Maximum number of ranked rows fetched for the leaderboard.
pub const LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardSort {
  #[default]
  Level,
  Xp,
}

impl LeaderboardSort {
  pub fn key(self, p: &ProfileSummary) -> u32 {
    match self {
      Self::Level => p.level,
      Self::Xp => p.xp,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  /// 1-based position in the unfiltered ordering.
  pub rank:            usize,
  #[serde(flatten)]
  pub profile:         ProfileSummary,
  pub is_current_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
  pub sort:              LeaderboardSort,
  pub entries:           Vec<LeaderboardEntry>,
  pub current_user_rank: Option<usize>,
}

/// Assign ranks to rows already ordered by the store.
pub fn rank(rows: Vec<ProfileSummary>, current: Uuid) -> Vec<LeaderboardEntry> {
  rows
    .into_iter()
    .enumerate()
    .map(|(i, profile)| LeaderboardEntry {
      rank: i + 1,
      is_current_user: profile.user_id == current,
      profile,
    })
    .collect()
}

/// In-memory name and instrument filters, applied after ranking so ranks
/// keep their global meaning.
pub fn filter_entries(
  entries: Vec<LeaderboardEntry>,
  search: Option<&str>,
  instrument: Option<&str>,
) -> Vec<LeaderboardEntry> {
  let search = search.map(str::to_lowercase).filter(|s| !s.is_empty());
  let instrument = instrument
    .map(str::to_lowercase)
    .filter(|i| !i.is_empty() && i != "all");

  entries
    .into_iter()
    .filter(|e| {
      search
        .as_deref()
        .is_none_or(|s| e.profile.full_name.to_lowercase().contains(s))
    })
    .filter(|e| {
      instrument.as_deref().is_none_or(|i| {
        e.profile.instrument.as_deref().map(str::to_lowercase).as_deref() == Some(i)
      })
    })
    .collect()
}
