//! Subcommands and their dispatch onto the REST API.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  client::{ApiClient, decode},
  render,
};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create an account (no credentials needed).
  Signup {
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    name:     Option<String>,
  },
  /// Show the signed-in account and profile.
  Me,
  /// Show or edit your profile.
  Profile {
    #[command(subcommand)]
    action: Option<ProfileAction>,
  },
  /// Level, XP and XP needed for the next level.
  Progress,
  Leaderboard {
    /// `level` or `xp`.
    #[arg(long, default_value = "level")]
    sort:       String,
    #[arg(long)]
    search:     Option<String>,
    #[arg(long)]
    instrument: Option<String>,
  },
  /// Find other musicians by name.
  Users { query: String },

  /// Browse the piece catalog.
  Pieces {
    #[arg(long)]
    search:     Option<String>,
    #[arg(long)]
    instrument: Option<String>,
    /// `beginner`, `intermediate` or `advanced`.
    #[arg(long)]
    difficulty: Option<String>,
  },
  Piece { id: Uuid },
  Composers {
    #[arg(long)]
    search: Option<String>,
  },
  Composer { id: Uuid },
  /// Quick search across pieces and composers.
  Search { query: String },

  /// Your repertoire, or changes to it.
  Repertoire {
    #[command(subcommand)]
    action: Option<RepertoireAction>,
  },

  Missions {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    kind:     Option<String>,
    #[command(subcommand)]
    action:   Option<MissionAction>,
  },

  Challenges {
    #[command(subcommand)]
    action: Option<ChallengeAction>,
  },
  Achievements,

  /// Accepted connections, or the handshake.
  Connections {
    #[command(subcommand)]
    action: Option<ConnectionAction>,
  },

  /// Recent practice sessions, or log a new one.
  Practice {
    #[command(subcommand)]
    action: Option<PracticeAction>,
  },
  Streak,

  Events {
    #[command(subcommand)]
    action: Option<EventAction>,
  },

  Settings {
    #[command(subcommand)]
    action: Option<SettingsAction>,
  },

  /// Ask the AI teacher a general question.
  Ask { message: String },
  /// Ask about one piece from the catalog.
  AskPiece {
    piece:   Uuid,
    message: String,
  },
  /// Structured practice tips for a catalog piece.
  Tips { piece: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
  Show { id: Uuid },
  Set(ProfileFields),
}

#[derive(Args, Debug)]
pub struct ProfileFields {
  #[arg(long)]
  name:             Option<String>,
  #[arg(long)]
  bio:              Option<String>,
  #[arg(long)]
  instrument:       Option<String>,
  #[arg(long)]
  experience_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RepertoireAction {
  /// `current`, `wishlist` or `mastered`.
  Set { piece: Uuid, status: String },
  Progress {
    piece:    Uuid,
    progress: i64,
    #[arg(long)]
    notes:    Option<String>,
  },
  Remove { piece: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum MissionAction {
  Progress { id: String, progress: i64 },
  Claim { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ChallengeAction {
  Join { id: Uuid },
  Progress {
    id:    Uuid,
    #[arg(default_value_t = 1)]
    delta: u32,
  },
}

#[derive(Subcommand, Debug)]
pub enum ConnectionAction {
  Request { user: Uuid },
  /// Pending incoming and outgoing requests.
  Pending,
  Accept { id: Uuid },
  Reject { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum PracticeAction {
  Log {
    /// Minutes.
    #[arg(long)]
    duration: u32,
    #[arg(long)]
    rating:   Option<u8>,
    #[arg(long)]
    piece:    Option<Uuid>,
    #[arg(long)]
    notes:    Option<String>,
  },
}

#[derive(Subcommand, Debug)]
pub enum EventAction {
  Register { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
  Set {
    /// `light`, `dark` or `system`.
    #[arg(long)]
    theme:         Option<String>,
    #[arg(long)]
    notifications: Option<bool>,
    /// Your own key for the AI teacher.
    #[arg(long)]
    api_key:       Option<String>,
  },
}

/// Pair optional query values with their names, dropping the unset ones.
fn query<const N: usize>(
  pairs: [(&'static str, Option<String>); N],
) -> Vec<(&'static str, String)> {
  pairs.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect()
}

/// Run one command and return the text to print.
pub async fn run(client: &ApiClient, command: Command) -> Result<String> {
  match command {
    Command::Signup { email, password, name } => {
      let body = json!({ "email": email, "password": password, "full_name": name });
      json_out(client.post("/auth/signup", &body).await?)
    }
    Command::Me => json_out(client.get("/auth/me", &[]).await?),
    Command::Profile { action: None } => json_out(client.get("/api/profile", &[]).await?),
    Command::Profile { action: Some(ProfileAction::Show { id }) } => {
      json_out(client.get(&format!("/api/profiles/{id}"), &[]).await?)
    }
    Command::Profile { action: Some(ProfileAction::Set(f)) } => {
      let body = json!({
        "full_name": f.name,
        "bio": f.bio,
        "instrument": f.instrument,
        "experience_level": f.experience_level,
      });
      json_out(client.patch("/api/profile", &body).await?)
    }
    Command::Progress => json_out(client.get("/api/progress", &[]).await?),
    Command::Leaderboard { sort, search, instrument } => {
      let q = query([("sort", Some(sort)), ("search", search), ("instrument", instrument)]);
      let board = decode(client.get("/api/leaderboard", &q).await?)?;
      Ok(render::leaderboard(&board))
    }
    Command::Users { query: q } => {
      json_out(client.get("/api/users/search", &[("q", q)]).await?)
    }

    Command::Pieces { search, instrument, difficulty } => {
      let q = query([("search", search), ("instrument", instrument), ("difficulty", difficulty)]);
      json_out(client.get("/api/pieces", &q).await?)
    }
    Command::Piece { id } => json_out(client.get(&format!("/api/pieces/{id}"), &[]).await?),
    Command::Composers { search } => {
      let q = query([("search", search)]);
      json_out(client.get("/api/composers", &q).await?)
    }
    Command::Composer { id } => {
      json_out(client.get(&format!("/api/composers/{id}"), &[]).await?)
    }
    Command::Search { query: q } => json_out(client.get("/api/search", &[("q", q)]).await?),

    Command::Repertoire { action: None } => {
      let rep = decode(client.get("/api/repertoire", &[]).await?)?;
      Ok(render::repertoire(&rep))
    }
    Command::Repertoire { action: Some(action) } => match action {
      RepertoireAction::Set { piece, status } => {
        let path = format!("/api/repertoire/{piece}");
        json_out(client.put(&path, &json!({ "status": status })).await?)
      }
      RepertoireAction::Progress { piece, progress, notes } => {
        let path = format!("/api/repertoire/{piece}");
        json_out(client.patch(&path, &json!({ "progress": progress, "notes": notes })).await?)
      }
      RepertoireAction::Remove { piece } => {
        client.delete(&format!("/api/repertoire/{piece}")).await?;
        Ok(format!("removed {piece}\n"))
      }
    },

    Command::Missions { category, kind, action: None } => {
      let q = query([("category", category), ("kind", kind)]);
      let views: Vec<_> = decode(client.get("/api/missions", &q).await?)?;
      Ok(render::missions(&views))
    }
    Command::Missions { action: Some(action), .. } => match action {
      MissionAction::Progress { id, progress } => {
        let path = format!("/api/missions/{id}/progress");
        json_out(client.put(&path, &json!({ "progress": progress })).await?)
      }
      MissionAction::Claim { id } => {
        let outcome = decode(client.post(&format!("/api/missions/{id}/claim"), &json!({})).await?)?;
        Ok(render::claim(&outcome))
      }
    },

    Command::Challenges { action: None } => json_out(client.get("/api/challenges", &[]).await?),
    Command::Challenges { action: Some(action) } => match action {
      ChallengeAction::Join { id } => {
        json_out(client.post(&format!("/api/challenges/{id}/join"), &json!({})).await?)
      }
      ChallengeAction::Progress { id, delta } => {
        let path = format!("/api/challenges/{id}/progress");
        json_out(client.post(&path, &json!({ "delta": delta })).await?)
      }
    },
    Command::Achievements => json_out(client.get("/api/achievements", &[]).await?),

    Command::Connections { action: None } => {
      json_out(client.get("/api/connections", &[]).await?)
    }
    Command::Connections { action: Some(action) } => match action {
      ConnectionAction::Request { user } => {
        json_out(client.post("/api/connections", &json!({ "user_id": user })).await?)
      }
      ConnectionAction::Pending => json_out(client.get("/api/connections/requests", &[]).await?),
      ConnectionAction::Accept { id } => {
        let path = format!("/api/connections/{id}/respond");
        json_out(client.post(&path, &json!({ "accept": true })).await?)
      }
      ConnectionAction::Reject { id } => {
        let path = format!("/api/connections/{id}/respond");
        json_out(client.post(&path, &json!({ "accept": false })).await?)
      }
    },

    Command::Practice { action: None } => json_out(client.get("/api/practice", &[]).await?),
    Command::Practice { action: Some(PracticeAction::Log { duration, rating, piece, notes }) } => {
      let body = json!({ "duration": duration, "rating": rating, "piece_id": piece, "notes": notes });
      json_out(client.post("/api/practice", &body).await?)
    }
    Command::Streak => {
      let streak = decode(client.get("/api/practice/streak", &[]).await?)?;
      Ok(render::streak(&streak))
    }

    Command::Events { action: None } => json_out(client.get("/api/events", &[]).await?),
    Command::Events { action: Some(EventAction::Register { id }) } => {
      json_out(client.post(&format!("/api/events/{id}/register"), &json!({})).await?)
    }

    Command::Settings { action: None } => json_out(client.get("/api/settings", &[]).await?),
    Command::Settings { action: Some(SettingsAction::Set { theme, notifications, api_key }) } => {
      let body = json!({
        "theme": theme,
        "notifications_enabled": notifications,
        "api_key": api_key,
      });
      json_out(client.patch("/api/settings", &body).await?)
    }

    Command::Ask { message } => {
      let reply = client.post("/functions/ai-teacher", &json!({ "message": message })).await?;
      Ok(reply_text(&reply))
    }
    Command::AskPiece { piece, message } => {
      let body = json!({ "message": message, "piece_id": piece });
      let reply = client.post("/functions/piece-ai-assistant", &body).await?;
      Ok(reply_text(&reply))
    }
    Command::Tips { piece } => {
      json_out(client.post("/functions/practice-tips-ai", &json!({ "piece_id": piece })).await?)
    }
  }
}

fn json_out(value: Value) -> Result<String> { Ok(render::json(&value)) }

fn reply_text(reply: &Value) -> String {
  let text = reply["response"].as_str().unwrap_or_default();
  let source = reply["source"].as_str().unwrap_or("unknown");
  format!("{text}\n\n({source})\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_drops_unset_pairs() {
    let q = query([("search", Some("bach".into())), ("instrument", None), ("sort", None)]);
    assert_eq!(q, vec![("search", "bach".to_owned())]);
  }

  #[test]
  fn reply_text_names_its_source() {
    let reply = json!({ "response": "Slow practice.", "source": "template" });
    assert_eq!(reply_text(&reply), "Slow practice.\n\n(template)\n");
  }
}
