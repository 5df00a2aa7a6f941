//! Error types for `cadenza-tutor`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("message is required")]
  EmptyMessage,

  #[error("piece title is required")]
  MissingTitle,

  #[error("http client build failed: {0}")]
  ClientBuild(String),

  #[error("upstream request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("upstream returned status {status}")]
  Status { status: u16, body: String },

  #[error("upstream response parse failed: {0}")]
  Parse(String),
}

impl Error {
  /// True for errors caused by the caller's input rather than the upstream.
  pub fn is_invalid_input(&self) -> bool {
    matches!(self, Self::EmptyMessage | Self::MissingTitle)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
