//! Error types for `contactmomenten-core`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Logical name of the field a medewerker rule violation is reported on.
/// Exclusivity is a property of the record, not of either single field.
pub const FIELD_MEDEWERKER: &str = "medewerker";

/// Logical name of the `previous` link field.
pub const FIELD_PREVIOUS: &str = "previous";

/// The reason a payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
  /// Neither or both of the medewerker representations are present.
  InvalidMedewerker,
  /// A referenced contact moment cannot be resolved to a local record.
  DoesNotExist,
  /// A record was linked to itself.
  SelfReference,
  /// A required sub-field of an embedded identification is missing.
  Required,
}

impl ValidationKind {
  /// Stable machine-readable code reported to API clients.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidMedewerker => "invalid-medewerker",
      Self::DoesNotExist => "does-not-exist",
      Self::SelfReference => "self-reference",
      Self::Required => "required",
    }
  }
}

impl fmt::Display for ValidationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid {field}: {kind}")]
  Validation {
    field: String,
    kind:  ValidationKind,
  },

  #[error("contact moment not found: {0}")]
  NotFound(Uuid),

  /// The store refused to serialise this transaction against a concurrent
  /// one. Ordinary relink races are not reported this way.
  #[error("transaction conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: impl Into<String>, kind: ValidationKind) -> Self {
    Self::Validation { field: field.into(), kind }
  }

  /// The validation kind, if this is a validation failure.
  pub fn validation_kind(&self) -> Option<ValidationKind> {
    match self {
      Self::Validation { kind, .. } => Some(*kind),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
