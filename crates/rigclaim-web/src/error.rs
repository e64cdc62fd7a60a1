//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rigclaim_core::validate::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// Per-field messages; rendered alongside the summary.
  #[error("{0}")]
  Validation(ValidationErrors),

  #[error("{0}")]
  Conflict(String),

  #[error("upload exceeds {0} bytes")]
  PayloadTooLarge(usize),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rigclaim_core::Error> for ApiError {
  fn from(e: rigclaim_core::Error) -> Self {
    use rigclaim_core::Error as Core;
    match e {
      Core::Validation(errors) => Self::Validation(errors),
      Core::MissingFile => Self::BadRequest(e.to_string()),
      Core::NotFound(id) => Self::NotFound(format!("evidence {id} not found")),
      Core::AlreadySubmitted | Core::NotFinalStep(_) => {
        Self::Conflict(e.to_string())
      }
      Core::StorageUnavailable(_) | Core::Serialization(_) => {
        Self::Store(Box::new(e))
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = match &self {
      ApiError::Validation(errors) => {
        json!({ "error": self.to_string(), "errors": errors })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
