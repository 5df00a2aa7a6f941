//! Error types for `cadenza-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::social::ConnectionStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("piece not found: {0}")]
  PieceNotFound(Uuid),

  #[error("composer not found: {0}")]
  ComposerNotFound(Uuid),

  #[error("mission not found: {0:?}")]
  MissionNotFound(String),

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("connection not found: {0}")]
  ConnectionNotFound(Uuid),

  #[error("piece {0} is not in the repertoire")]
  NotInRepertoire(Uuid),

  #[error("mission {0:?} has already been claimed")]
  AlreadyClaimed(String),

  #[error("mission {mission_id:?} is only {progress}% complete")]
  MissionIncomplete { mission_id: String, progress: u8 },

  #[error("already joined challenge {0}")]
  AlreadyJoined(Uuid),

  #[error("not a participant of challenge {0}")]
  NotJoined(Uuid),

  #[error("already registered for event {0}")]
  AlreadyRegistered(Uuid),

  #[error("cannot connect a user with themselves")]
  SelfConnection,

  #[error("connection already {status}")]
  ConnectionExists { status: ConnectionStatus },

  #[error("only the receiving user may respond to connection {0}")]
  NotConnectionReceiver(Uuid),

  #[error("connection {id} is already {status}")]
  ConnectionAlreadyResolved { id: Uuid, status: ConnectionStatus },

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("progress must be between 0 and 100, got {0}")]
  ProgressOutOfRange(i64),

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Broad classification used by transport layers to pick a status code.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ProfileNotFound(_)
      | Self::PieceNotFound(_)
      | Self::ComposerNotFound(_)
      | Self::MissionNotFound(_)
      | Self::ChallengeNotFound(_)
      | Self::EventNotFound(_)
      | Self::ConnectionNotFound(_)
      | Self::NotInRepertoire(_) => ErrorKind::NotFound,

      Self::AlreadyClaimed(_)
      | Self::AlreadyJoined(_)
      | Self::AlreadyRegistered(_)
      | Self::ConnectionExists { .. }
      | Self::ConnectionAlreadyResolved { .. }
      | Self::EmailTaken(_) => ErrorKind::Conflict,

      Self::NotConnectionReceiver(_) => ErrorKind::Forbidden,

      Self::MissionIncomplete { .. }
      | Self::NotJoined(_)
      | Self::SelfConnection
      | Self::ProgressOutOfRange(_)
      | Self::Invalid(_) => ErrorKind::Invalid,

      Self::Serialization(_) => ErrorKind::Internal,
    }
  }
}

/// Coarse error category, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Forbidden,
  Invalid,
  Internal,
}

/// Implemented by backend error types so callers can recover the domain
/// failure (if any) without knowing the concrete backend.
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
