//! AI teacher for Cadenza.
//!
//! Each question goes to an OpenAI-compatible model when an API key is
//! available. Without a key, or when the model call fails, the tutor answers
//! from canned templates instead, so every well-formed request gets a reply.

mod error;
mod templates;
mod tips;
mod tutor;
mod upstream;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::{Error, Result};
pub use tips::{PracticeTips, extract_tips};
pub use tutor::Tutor;
pub use upstream::{ChatClient, UpstreamConfig};

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherRequest {
  pub message:    String,
  #[serde(default)]
  pub user_email: Option<String>,
}

/// A question about one piece, with whatever catalog context is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceQuestion {
  pub message:     String,
  /// Lets the API fill the remaining fields from the catalog.
  pub piece_id:    Option<Uuid>,
  pub piece_title: Option<String>,
  pub composer:    Option<String>,
  pub period:      Option<String>,
  pub instrument:  Option<String>,
  pub difficulty:  Option<u8>,
  pub user_email:  Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TipsRequest {
  pub piece_id:    Option<Uuid>,
  pub piece_title: String,
  pub composer:    Option<String>,
  pub period:      Option<String>,
  pub instrument:  Option<String>,
  pub difficulty:  Option<u8>,
  pub genre:       Option<String>,
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
  /// The upstream model answered.
  Model,
  /// No key was available.
  Template,
  /// The model was tried and failed.
  Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
  pub response: String,
  pub source:   ReplySource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipsReply {
  #[serde(flatten)]
  pub tips:   PracticeTips,
  pub source: ReplySource,
}
