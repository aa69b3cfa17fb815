//! The staff member ("medewerker") handling a contact moment.
//!
//! A medewerker is identified either by an opaque external reference or by an
//! embedded identification record, never both and never neither. The sum
//! type [`Medewerker`] makes any other state unrepresentable; the two-field
//! shape used on the wire is converted at the boundary by
//! [`validate_and_normalize`] and [`apply_patch`].

use crate::{
  Error, Result,
  error::{FIELD_MEDEWERKER, ValidationKind},
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// A non-empty external reference to a medewerker, usually a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedewerkerReference(String);

impl MedewerkerReference {
  /// Returns `None` for an empty (or all-whitespace) reference.
  pub fn new(value: impl Into<String>) -> Option<Self> {
    let value = value.into();
    if value.trim().is_empty() { None } else { Some(Self(value)) }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<MedewerkerReference> for String {
  fn from(r: MedewerkerReference) -> Self { r.0 }
}

/// Identification data owned by exactly one contact moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedewerkerIdentificatie {
  pub identification: String,
  pub surname:        String,
  pub initials:       String,
  pub surname_prefix: Option<String>,
}

/// The exclusive choice between the two medewerker representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Medewerker {
  Reference(MedewerkerReference),
  Identification(MedewerkerIdentificatie),
}

impl Medewerker {
  /// The reference as exposed on the wire: empty for an embedded identity.
  pub fn reference_str(&self) -> &str {
    match self {
      Self::Reference(r) => r.as_str(),
      Self::Identification(_) => "",
    }
  }

  pub fn identification(&self) -> Option<&MedewerkerIdentificatie> {
    match self {
      Self::Reference(_) => None,
      Self::Identification(i) => Some(i),
    }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// An embedded identification as supplied by a client; completeness is
/// checked by the rule engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentificationInput {
  pub identification: Option<String>,
  pub surname:        Option<String>,
  pub initials:       Option<String>,
  pub surname_prefix: Option<String>,
}

impl IdentificationInput {
  fn into_record(self) -> Result<MedewerkerIdentificatie> {
    fn required(value: Option<String>, name: &str) -> Result<String> {
      match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::validation(
          format!("medewerker_identification.{name}"),
          ValidationKind::Required,
        )),
      }
    }

    Ok(MedewerkerIdentificatie {
      identification: required(self.identification, "identification")?,
      surname:        required(self.surname, "surname")?,
      initials:       required(self.initials, "initials")?,
      surname_prefix: self.surname_prefix.filter(|p| !p.is_empty()),
    })
  }
}

impl From<MedewerkerIdentificatie> for IdentificationInput {
  fn from(m: MedewerkerIdentificatie) -> Self {
    Self {
      identification: Some(m.identification),
      surname:        Some(m.surname),
      initials:       Some(m.initials),
      surname_prefix: m.surname_prefix,
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn invalid() -> Error {
  Error::validation(FIELD_MEDEWERKER, ValidationKind::InvalidMedewerker)
}

/// Validate the medewerker fields of a create request.
///
/// Exactly one of a non-empty `reference` or an `identification` must be
/// supplied; an empty reference counts as absent.
pub fn validate_and_normalize(
  reference: Option<String>,
  identification: Option<IdentificationInput>,
) -> Result<Medewerker> {
  let reference = reference.and_then(MedewerkerReference::new);
  match (reference, identification) {
    (Some(r), None) => Ok(Medewerker::Reference(r)),
    (None, Some(i)) => Ok(Medewerker::Identification(i.into_record()?)),
    _ => Err(invalid()),
  }
}

/// Compute the medewerker of a record after a partial update.
///
/// Fields absent from the request keep their stored value, except that a
/// non-empty reference with no identification in the request discards the
/// stored identification. The merged result must still hold exactly one
/// representation.
pub fn apply_patch(
  current: &Medewerker,
  reference: Option<String>,
  identification: Option<Option<IdentificationInput>>,
) -> Result<Medewerker> {
  if reference.is_none() && identification.is_none() {
    return Ok(current.clone());
  }

  let reference = match reference {
    Some(r) => MedewerkerReference::new(r),
    None => match current {
      Medewerker::Reference(r) => Some(r.clone()),
      Medewerker::Identification(_) => None,
    },
  };

  let identification = match identification {
    Some(i) => i,
    None if reference.is_some() => None,
    None => current.identification().cloned().map(IdentificationInput::from),
  };

  match (reference, identification) {
    (Some(r), None) => Ok(Medewerker::Reference(r)),
    (None, Some(i)) => Ok(Medewerker::Identification(i.into_record()?)),
    _ => Err(invalid()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn buurman() -> IdentificationInput {
    IdentificationInput {
      identification: Some("12345".into()),
      surname:        Some("Buurman".into()),
      initials:       Some("B B".into()),
      surname_prefix: None,
    }
  }

  fn kind(err: Error) -> Option<ValidationKind> { err.validation_kind() }

  #[test]
  fn create_with_reference_only() {
    let m = validate_and_normalize(
      Some("http://example.com/medewerker/1".into()),
      None,
    )
    .unwrap();
    assert_eq!(m.reference_str(), "http://example.com/medewerker/1");
    assert!(m.identification().is_none());
  }

  #[test]
  fn create_with_identification_only() {
    let m = validate_and_normalize(Some(String::new()), Some(buurman())).unwrap();
    let ident = m.identification().unwrap();
    assert_eq!(ident.surname, "Buurman");
    assert_eq!(m.reference_str(), "");
  }

  #[test]
  fn create_with_both_is_rejected() {
    let err = validate_and_normalize(
      Some("http://example.com/medewerker/1".into()),
      Some(buurman()),
    )
    .unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));
  }

  #[test]
  fn create_with_neither_is_rejected() {
    let err = validate_and_normalize(None, None).unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));

    let err = validate_and_normalize(Some("  ".into()), None).unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));
  }

  #[test]
  fn incomplete_identification_names_missing_field() {
    let mut input = buurman();
    input.initials = None;
    let err = validate_and_normalize(None, Some(input)).unwrap_err();
    assert!(matches!(
      err,
      Error::Validation { ref field, kind: ValidationKind::Required }
        if field == "medewerker_identification.initials"
    ));
  }

  #[test]
  fn patch_without_medewerker_fields_keeps_current() {
    let current = validate_and_normalize(None, Some(buurman())).unwrap();
    assert_eq!(apply_patch(&current, None, None).unwrap(), current);
  }

  #[test]
  fn patch_switches_reference_to_identification() {
    let current =
      validate_and_normalize(Some("http://example.com/m/1".into()), None)
        .unwrap();
    let next =
      apply_patch(&current, Some(String::new()), Some(Some(buurman()))).unwrap();
    assert_eq!(next.identification().unwrap().identification, "12345");
  }

  #[test]
  fn patch_identification_without_clearing_reference_is_rejected() {
    let current =
      validate_and_normalize(Some("http://example.com/m/1".into()), None)
        .unwrap();
    let err = apply_patch(&current, None, Some(Some(buurman()))).unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));
  }

  #[test]
  fn patch_reference_discards_identification() {
    let current = validate_and_normalize(None, Some(buurman())).unwrap();
    let next =
      apply_patch(&current, Some("http://example.com/m/2".into()), None)
        .unwrap();
    assert_eq!(next.reference_str(), "http://example.com/m/2");
    assert!(next.identification().is_none());
  }

  #[test]
  fn patch_clearing_the_only_representation_is_rejected() {
    let current =
      validate_and_normalize(Some("http://example.com/m/1".into()), None)
        .unwrap();
    let err = apply_patch(&current, Some(String::new()), None).unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));

    let current = validate_and_normalize(None, Some(buurman())).unwrap();
    let err = apply_patch(&current, None, Some(None)).unwrap_err();
    assert_eq!(kind(err), Some(ValidationKind::InvalidMedewerker));
  }

  #[test]
  fn patch_replaces_identification_in_place() {
    let current = validate_and_normalize(None, Some(buurman())).unwrap();
    let mut other = buurman();
    other.surname = Some("Pietje".into());
    other.surname_prefix = Some("van".into());
    let next = apply_patch(&current, None, Some(Some(other))).unwrap();
    let ident = next.identification().unwrap();
    assert_eq!(ident.surname, "Pietje");
    assert_eq!(ident.surname_prefix.as_deref(), Some("van"));
  }
}
