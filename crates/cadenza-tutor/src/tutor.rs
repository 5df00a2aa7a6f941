use rand_core::{OsRng, RngCore as _};

use crate::{
  Error, PieceQuestion, Reply, ReplySource, Result, TeacherRequest, TipsReply, TipsRequest,
  templates::{piece_reply, teacher_reply},
  tips::{PracticeTips, TIPS_SYSTEM_PROMPT, extract_tips, tips_prompt},
  upstream::{ChatClient, UpstreamConfig},
};

const TEACHER_SYSTEM_PROMPT: &str = "You are a patient, encouraging classical music teacher. \
  Give specific, practical advice about practice technique, repertoire and interpretation. \
  Keep answers under 200 words.";

const PIECE_SYSTEM_PROMPT: &str = "You are a classical music teacher answering a student's \
  question about one specific piece. Use the piece details you are given. Keep answers under \
  200 words.";

/// The AI teacher. Cheap to share behind an `Arc`.
pub struct Tutor {
  client:      ChatClient,
  default_key: Option<String>,
}

impl Tutor {
  pub fn new(config: &UpstreamConfig) -> Result<Self> {
    Ok(Self {
      client:      ChatClient::new(config)?,
      default_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
    })
  }

  /// The caller's key wins over the configured one.
  fn key<'a>(&'a self, user_key: Option<&'a str>) -> Option<&'a str> {
    user_key.filter(|k| !k.trim().is_empty()).or(self.default_key.as_deref())
  }

  /// General practice advice.
  pub async fn ask_teacher(&self, req: &TeacherRequest, user_key: Option<&str>) -> Result<Reply> {
    if req.message.trim().is_empty() {
      return Err(Error::EmptyMessage);
    }
    let Some(key) = self.key(user_key) else {
      return Ok(Reply { response: teacher_reply(req, pick()), source: ReplySource::Template });
    };

    match self.client.complete(key, TEACHER_SYSTEM_PROMPT, &req.message).await {
      Ok(response) => Ok(Reply { response, source: ReplySource::Model }),
      Err(e) => {
        tracing::warn!(error = %e, "teacher model call failed, using templates");
        Ok(Reply { response: teacher_reply(req, pick()), source: ReplySource::Fallback })
      }
    }
  }

  /// A question about one piece.
  pub async fn ask_about_piece(&self, q: &PieceQuestion, user_key: Option<&str>) -> Result<Reply> {
    if q.message.trim().is_empty() {
      return Err(Error::EmptyMessage);
    }
    let Some(key) = self.key(user_key) else {
      return Ok(Reply { response: piece_reply(q, pick()), source: ReplySource::Template });
    };

    match self.client.complete(key, PIECE_SYSTEM_PROMPT, &piece_prompt(q)).await {
      Ok(response) => Ok(Reply { response, source: ReplySource::Model }),
      Err(e) => {
        tracing::warn!(error = %e, "piece assistant model call failed, using templates");
        Ok(Reply { response: piece_reply(q, pick()), source: ReplySource::Fallback })
      }
    }
  }

  /// Structured tips for learning a piece.
  pub async fn practice_tips(&self, req: &TipsRequest, user_key: Option<&str>) -> Result<TipsReply> {
    if req.piece_title.trim().is_empty() {
      return Err(Error::MissingTitle);
    }
    let defaults = || PracticeTips::defaults(req.instrument.as_deref(), req.period.as_deref());
    let Some(key) = self.key(user_key) else {
      return Ok(TipsReply { tips: defaults(), source: ReplySource::Template });
    };

    let text = match self.client.complete(key, TIPS_SYSTEM_PROMPT, &tips_prompt(req)).await {
      Ok(text) => text,
      Err(e) => {
        tracing::warn!(error = %e, "practice tips model call failed");
        return Ok(TipsReply { tips: PracticeTips::fallback(), source: ReplySource::Fallback });
      }
    };

    match extract_tips(&text) {
      Ok(tips) => Ok(TipsReply { tips, source: ReplySource::Model }),
      Err(e) => {
        tracing::warn!(error = %e, "could not parse practice tips from model reply");
        Ok(TipsReply { tips: defaults(), source: ReplySource::Fallback })
      }
    }
  }
}

fn pick() -> u32 { OsRng.next_u32() }

fn piece_prompt(q: &PieceQuestion) -> String {
  let mut prompt = String::from("Piece details:\n");
  let fields = [
    ("Title", q.piece_title.as_deref()),
    ("Composer", q.composer.as_deref()),
    ("Period", q.period.as_deref()),
    ("Instrument", q.instrument.as_deref()),
  ];
  for (label, value) in fields {
    if let Some(v) = value {
      prompt.push_str(&format!("- {label}: {v}\n"));
    }
  }
  if let Some(d) = q.difficulty {
    prompt.push_str(&format!("- Difficulty: {d}/10\n"));
  }
  prompt.push_str("\nQuestion: ");
  prompt.push_str(&q.message);
  prompt
}
