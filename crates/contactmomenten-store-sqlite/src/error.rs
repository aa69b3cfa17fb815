//! Error type for `contactmomenten-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row cannot be turned back into a domain value.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

impl Error {
  fn sqlite(&self) -> Option<&rusqlite::Error> {
    match self {
      Self::Sqlite(e) => Some(e),
      Self::Database(tokio_rusqlite::Error::Rusqlite(e)) => Some(e),
      _ => None,
    }
  }

  /// Whether SQLite refused the transaction because of a concurrent writer.
  pub fn is_busy(&self) -> bool {
    matches!(
      self.sqlite().and_then(rusqlite::Error::sqlite_error_code),
      Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
  }
}

impl From<Error> for contactmomenten_core::Error {
  fn from(e: Error) -> Self {
    if e.is_busy() {
      tracing::warn!(error = %e, "transaction conflict");
      Self::Conflict(e.to_string())
    } else {
      Self::Store(Box::new(e))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
