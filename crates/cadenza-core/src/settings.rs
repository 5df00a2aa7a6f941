//! Per-user preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
      Self::System => "system",
    }
  }
}

impl std::str::FromStr for Theme {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "light" => Ok(Self::Light),
      "dark" => Ok(Self::Dark),
      "system" => Ok(Self::System),
      other => Err(crate::Error::Invalid(format!("unknown theme {other:?}"))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
  pub user_id:               Uuid,
  pub theme:                 Theme,
  pub notifications_enabled: bool,
  /// Personal key for the tutor's upstream model.
  pub api_key:               Option<String>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

impl UserSettings {
  pub fn defaults(user_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      theme: Theme::default(),
      notifications_enabled: true,
      api_key: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// An empty string clears the key.
  pub fn apply(&mut self, update: SettingsUpdate, now: DateTime<Utc>) {
    if let Some(t) = update.theme {
      self.theme = t;
    }
    if let Some(n) = update.notifications_enabled {
      self.notifications_enabled = n;
    }
    if let Some(k) = update.api_key {
      self.api_key = Some(k).filter(|k| !k.trim().is_empty());
    }
    self.updated_at = now;
  }

  pub fn view(&self) -> SettingsView {
    SettingsView {
      theme:                 self.theme,
      notifications_enabled: self.notifications_enabled,
      has_api_key:           self.api_key.is_some(),
      updated_at:            self.updated_at,
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
  pub theme:                 Option<Theme>,
  pub notifications_enabled: Option<bool>,
  pub api_key:               Option<String>,
}

/// What clients see; the key itself never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
  pub theme:                 Theme,
  pub notifications_enabled: bool,
  pub has_api_key:           bool,
  pub updated_at:            DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn view_hides_key() {
    let mut s = UserSettings::defaults(Uuid::new_v4(), Utc::now());
    s.apply(SettingsUpdate { api_key: Some("sk-123".into()), ..Default::default() }, Utc::now());
    let json = serde_json::to_value(s.view()).unwrap();
    assert_eq!(json["has_api_key"], true);
    assert!(json.get("api_key").is_none());
  }

  #[test]
  fn blank_key_clears() {
    let mut s = UserSettings::defaults(Uuid::new_v4(), Utc::now());
    s.apply(SettingsUpdate { api_key: Some("sk".into()), ..Default::default() }, Utc::now());
    s.apply(SettingsUpdate { api_key: Some("  ".into()), ..Default::default() }, Utc::now());
    assert!(s.api_key.is_none());
    assert_eq!(s.theme, Theme::System);
    assert!(s.notifications_enabled);
  }

  #[test]
  fn partial_update_changes_only_given_fields() {
    let mut s = UserSettings::defaults(Uuid::new_v4(), Utc::now());
    s.apply(SettingsUpdate { api_key: Some("sk".into()), ..Default::default() }, Utc::now());
    let update = SettingsUpdate {
      theme: Some(Theme::Dark),
      notifications_enabled: Some(false),
      api_key: None,
    };
    s.apply(update, Utc::now());
    assert_eq!(s.theme, Theme::Dark);
    assert!(!s.notifications_enabled);
    assert_eq!(s.api_key.as_deref(), Some("sk"));
  }
}
