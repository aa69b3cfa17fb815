//! Contact moments: recorded interactions between a government body and a
//! klant.
//!
//! A contact moment may continue an earlier one. The `previous` side of that
//! pair is asserted by clients; the `next` side is mirrored by
//! [`crate::link`] and never accepted from a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medewerker::{IdentificationInput, Medewerker};

// ─── Initiator ───────────────────────────────────────────────────────────────

/// Which party started the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initiator {
  /// The government body.
  Gemeente,
  /// The subject.
  Klant,
}

impl Initiator {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gemeente => "gemeente",
      Self::Klant => "klant",
    }
  }
}

// ─── Links ───────────────────────────────────────────────────────────────────

/// The two chain pointers of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
  pub previous: Option<Uuid>,
  pub next:     Option<Uuid>,
}

// ─── ContactMoment ───────────────────────────────────────────────────────────

/// A persisted contact moment.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMoment {
  /// Assigned at creation; never reused.
  pub id:                 Uuid,
  pub source_org:         String,
  /// Opaque reference to the klant; empty when unknown.
  pub client_reference:   String,
  pub interaction_time:   DateTime<Utc>,
  pub channel:            String,
  pub text:               String,
  pub preferred_channel:  String,
  pub preferred_language: String,
  pub initiator:          Initiator,
  pub medewerker:         Medewerker,
  /// Related-topic references, in client order.
  pub subject_links:      Vec<String>,
  pub previous:           Option<Uuid>,
  pub next:               Option<Uuid>,
}

impl ContactMoment {
  pub fn links(&self) -> Links {
    Links { previous: self.previous, next: self.next }
  }
}

// ─── NewContactMoment ────────────────────────────────────────────────────────

/// Input to [`crate::service::ContactMomentService::create`].
#[derive(Debug, Clone)]
pub struct NewContactMoment {
  pub source_org:                String,
  pub client_reference:          String,
  pub channel:                   String,
  pub text:                      String,
  /// Defaults to the creation instant.
  pub interaction_time:          Option<DateTime<Utc>>,
  pub preferred_channel:         String,
  pub preferred_language:        String,
  pub initiator:                 Initiator,
  pub medewerker_reference:      Option<String>,
  pub medewerker_identification: Option<IdentificationInput>,
  pub subject_links:             Vec<String>,
  /// Reference (URL, path or identifier) to the preceding contact moment.
  pub previous:                  Option<String>,
}

impl NewContactMoment {
  /// Convenience constructor with all optional fields left empty. At least
  /// one medewerker representation must still be set before creation.
  pub fn new(
    source_org: impl Into<String>,
    channel: impl Into<String>,
    text: impl Into<String>,
    initiator: Initiator,
  ) -> Self {
    Self {
      source_org: source_org.into(),
      client_reference: String::new(),
      channel: channel.into(),
      text: text.into(),
      interaction_time: None,
      preferred_channel: String::new(),
      preferred_language: String::new(),
      initiator,
      medewerker_reference: None,
      medewerker_identification: None,
      subject_links: Vec::new(),
      previous: None,
    }
  }
}

// ─── ContactMomentPatch ──────────────────────────────────────────────────────

/// Input to [`crate::service::ContactMomentService::update`]. `None` means
/// "not present in the request" and leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactMomentPatch {
  pub source_org:                Option<String>,
  pub client_reference:          Option<String>,
  pub channel:                   Option<String>,
  pub text:                      Option<String>,
  pub interaction_time:          Option<DateTime<Utc>>,
  pub preferred_channel:         Option<String>,
  pub preferred_language:        Option<String>,
  pub initiator:                 Option<Initiator>,
  pub medewerker_reference:      Option<String>,
  /// `Some(None)` explicitly removes the embedded identification.
  pub medewerker_identification: Option<Option<IdentificationInput>>,
  pub subject_links:             Option<Vec<String>>,
  /// `Some(None)` unlinks the record from its predecessor.
  pub previous:                  Option<Option<String>>,
}

impl ContactMomentPatch {
  /// Write the scalar attributes present in the patch onto `record`.
  /// Medewerker and link fields are handled by their own engines.
  pub(crate) fn apply_attributes(&self, record: &mut ContactMoment) {
    if let Some(v) = &self.source_org {
      record.source_org = v.clone();
    }
    if let Some(v) = &self.client_reference {
      record.client_reference = v.clone();
    }
    if let Some(v) = &self.channel {
      record.channel = v.clone();
    }
    if let Some(v) = &self.text {
      record.text = v.clone();
    }
    if let Some(v) = self.interaction_time {
      record.interaction_time = v;
    }
    if let Some(v) = &self.preferred_channel {
      record.preferred_channel = v.clone();
    }
    if let Some(v) = &self.preferred_language {
      record.preferred_language = v.clone();
    }
    if let Some(v) = self.initiator {
      record.initiator = v;
    }
    if let Some(v) = &self.subject_links {
      record.subject_links = v.clone();
    }
  }
}

impl From<NewContactMoment> for ContactMomentPatch {
  /// A full replacement: every field counts as present. Missing medewerker
  /// representations count as empty, a missing `previous` as unlinked.
  fn from(n: NewContactMoment) -> Self {
    Self {
      source_org:                Some(n.source_org),
      client_reference:          Some(n.client_reference),
      channel:                   Some(n.channel),
      text:                      Some(n.text),
      interaction_time:          n.interaction_time,
      preferred_channel:         Some(n.preferred_channel),
      preferred_language:        Some(n.preferred_language),
      initiator:                 Some(n.initiator),
      medewerker_reference:      Some(n.medewerker_reference.unwrap_or_default()),
      medewerker_identification: Some(n.medewerker_identification),
      subject_links:             Some(n.subject_links),
      previous:                  Some(n.previous),
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Store-level filter for [`crate::store::ContactMomentStore::list`]. Link
/// filters are already resolved to record handles.
#[derive(Debug, Clone, Default)]
pub struct ContactMomentQuery {
  pub source_org:           Option<String>,
  pub client_reference:     Option<String>,
  pub channel:              Option<String>,
  pub preferred_channel:    Option<String>,
  pub preferred_language:   Option<String>,
  pub initiator:            Option<Initiator>,
  pub medewerker_reference: Option<String>,
  pub interaction_after:    Option<DateTime<Utc>>,
  pub interaction_before:   Option<DateTime<Utc>>,
  pub previous:             Option<Uuid>,
  pub next:                 Option<Uuid>,
}

impl ContactMomentQuery {
  /// Whether `record` passes every filter that is set. Backends that cannot
  /// push a filter down may use this directly.
  pub fn matches(&self, record: &ContactMoment) -> bool {
    fn eq(filter: &Option<String>, value: &str) -> bool {
      filter.as_deref().is_none_or(|f| f == value)
    }

    eq(&self.source_org, &record.source_org)
      && eq(&self.client_reference, &record.client_reference)
      && eq(&self.channel, &record.channel)
      && eq(&self.preferred_channel, &record.preferred_channel)
      && eq(&self.preferred_language, &record.preferred_language)
      && self.initiator.is_none_or(|i| i == record.initiator)
      && eq(&self.medewerker_reference, record.medewerker.reference_str())
      && self.interaction_after.is_none_or(|t| record.interaction_time >= t)
      && self.interaction_before.is_none_or(|t| record.interaction_time <= t)
      && self.previous.is_none_or(|p| record.previous == Some(p))
      && self.next.is_none_or(|n| record.next == Some(n))
  }
}

/// Client-facing filter for [`crate::service::ContactMomentService::list`].
/// Link filters carry references that still need resolving.
#[derive(Debug, Clone, Default)]
pub struct ContactMomentFilter {
  pub query:    ContactMomentQuery,
  pub previous: Option<String>,
  pub next:     Option<String>,
}
