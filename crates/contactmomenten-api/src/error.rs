//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as a problem document:
//!
//! ```json
//! {
//!   "code": "invalid",
//!   "title": "Invalid input.",
//!   "status": 400,
//!   "detail": "invalid medewerker: invalid-medewerker",
//!   "invalidParams": [
//!     { "name": "nonFieldErrors", "code": "invalid-medewerker", "reason": "..." }
//!   ]
//! }
//! ```

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use contactmomenten_core::{
  Error as CoreError,
  error::{FIELD_MEDEWERKER, FIELD_PREVIOUS, ValidationKind},
};
use serde::Serialize;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  /// The request body or query string could not be parsed.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The path does not name a contact moment.
  #[error("not found: {0}")]
  NotFound(String),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

// An id that is not a UUID cannot name any record.
impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::NotFound(rejection.body_text())
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub code:           &'static str,
  pub title:          &'static str,
  pub status:         u16,
  pub detail:         String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub invalid_params: Vec<InvalidParam>,
}

#[derive(Debug, Serialize)]
pub struct InvalidParam {
  pub name:   String,
  pub code:   &'static str,
  pub reason: &'static str,
}

/// Map a logical field name to the name clients sent it under.
fn wire_field(field: &str) -> String {
  match field {
    FIELD_MEDEWERKER => "nonFieldErrors".to_owned(),
    FIELD_PREVIOUS => "vorigContactmoment".to_owned(),
    other => match other.strip_prefix("medewerker_identification.") {
      Some(sub) => {
        let sub = match sub {
          "identification" => "identificatie",
          "surname" => "achternaam",
          "initials" => "voorletters",
          "surname_prefix" => "voorvoegselAchternaam",
          sub => sub,
        };
        format!("medewerkerIdentificatie.{sub}")
      }
      None => other.to_owned(),
    },
  }
}

fn reason(kind: ValidationKind) -> &'static str {
  match kind {
    ValidationKind::InvalidMedewerker => {
      "Exactly one of medewerker and medewerkerIdentificatie must be given."
    }
    ValidationKind::DoesNotExist => {
      "The referenced contactmoment does not exist."
    }
    ValidationKind::SelfReference => {
      "A contactmoment cannot refer to itself."
    }
    ValidationKind::Required => "This field is required.",
  }
}

impl ApiError {
  fn problem(&self) -> Problem {
    let detail = self.to_string();
    match self {
      ApiError::Core(CoreError::Validation { field, kind }) => Problem {
        code: "invalid",
        title: "Invalid input.",
        status: StatusCode::BAD_REQUEST.as_u16(),
        detail,
        invalid_params: vec![InvalidParam {
          name:   wire_field(field),
          code:   kind.code(),
          reason: reason(*kind),
        }],
      },
      ApiError::Core(CoreError::NotFound(_)) | ApiError::NotFound(_) => Problem {
        code: "not_found",
        title: "Not found.",
        status: StatusCode::NOT_FOUND.as_u16(),
        detail,
        invalid_params: Vec::new(),
      },
      ApiError::Core(CoreError::Conflict(_)) => Problem {
        code: "conflict",
        title: "Conflicting concurrent request.",
        status: StatusCode::CONFLICT.as_u16(),
        detail,
        invalid_params: Vec::new(),
      },
      ApiError::Core(CoreError::Store(_)) => Problem {
        code: "error",
        title: "A server error occurred.",
        status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        detail,
        invalid_params: Vec::new(),
      },
      ApiError::BadRequest(_) => Problem {
        code: "parse_error",
        title: "Malformed request.",
        status: StatusCode::BAD_REQUEST.as_u16(),
        detail,
        invalid_params: Vec::new(),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    if let ApiError::Core(CoreError::Store(e)) = &self {
      tracing::error!(error = %e, "store failure");
    }
    let problem = self.problem();
    let status = StatusCode::from_u16(problem.status)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(problem)).into_response()
  }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
