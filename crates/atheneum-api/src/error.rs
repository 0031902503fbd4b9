//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every handler converts its failures here — the single top-level
//! boundary per user interaction. Nothing is retried and nothing
//! escapes as a panic.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// Caller/programming defect: unknown table, unknown column, bad
  /// reference shape.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// User input failed a validation rule (missing required field).
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error from the generic store parameter.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

impl From<atheneum_core::Error> for ApiError {
  fn from(err: atheneum_core::Error) -> Self {
    match err {
      atheneum_core::Error::MissingRequired(_) => {
        Self::Validation(err.to_string())
      }
      _ => Self::BadRequest(err.to_string()),
    }
  }
}

impl From<atheneum_csv::Error> for ApiError {
  fn from(err: atheneum_csv::Error) -> Self {
    match err {
      atheneum_csv::Error::Core(core) => core.into(),
      atheneum_csv::Error::Csv(e) => Self::BadRequest(format!("csv error: {e}")),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
