//! Error types for `rigclaim-core`.

use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more fields are missing or malformed. Always recoverable.
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),

  /// An upload was attempted with no file selected.
  #[error("Please select a file to upload")]
  MissingFile,

  #[error("evidence not found: {0}")]
  NotFound(String),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("the intake form has already been submitted")]
  AlreadySubmitted,

  #[error("submit is only available on the final step (currently on step {0})")]
  NotFinalStep(u8),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether this is a user-input problem (as opposed to an infrastructure
  /// or state problem).
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_) | Self::MissingFile)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
