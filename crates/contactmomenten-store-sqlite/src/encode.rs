//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings (UTC, microseconds), UUIDs hyphenated
//! lowercase strings, and subject links a compact JSON array.

use chrono::{DateTime, SecondsFormat, Utc};
use contactmomenten_core::{
  contactmoment::{ContactMoment, Initiator},
  medewerker::{Medewerker, MedewerkerIdentificatie, MedewerkerReference},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Fixed-width so that range filters can compare the stored text directly.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Initiator ────────────────────────────────────────────────────────────────

pub fn encode_initiator(i: Initiator) -> &'static str { i.as_str() }

pub fn decode_initiator(s: &str) -> Result<Initiator> {
  match s {
    "gemeente" => Ok(Initiator::Gemeente),
    "klant" => Ok(Initiator::Klant),
    other => Err(Error::Corrupt(format!("unknown initiator: {other:?}"))),
  }
}

// ─── Subject links ───────────────────────────────────────────────────────────

pub fn encode_links(links: &[String]) -> Result<String> {
  Ok(serde_json::to_string(links)?)
}

pub fn decode_links(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContactMoment::from_row`]; the identification
/// columns come from a `LEFT JOIN medewerker_identificaties m`.
pub const SELECT_CONTACTMOMENT: &str = "
  SELECT
    c.id, c.bronorganisatie, c.klant, c.interactiedatum, c.kanaal, c.tekst,
    c.voorkeurskanaal, c.voorkeurstaal, c.initiatiefnemer, c.medewerker,
    c.onderwerp_links, c.previous_id, c.next_id,
    m.identificatie, m.achternaam, m.voorletters, m.voorvoegsel_achternaam
  FROM contactmomenten c
  LEFT JOIN medewerker_identificaties m ON m.contactmoment_id = c.id";

/// Raw strings read directly from a `contactmomenten` row joined with its
/// identification.
pub struct RawContactMoment {
  pub id:                 String,
  pub source_org:         String,
  pub client_reference:   String,
  pub interaction_time:   String,
  pub channel:            String,
  pub text:               String,
  pub preferred_channel:  String,
  pub preferred_language: String,
  pub initiator:          String,
  pub medewerker:         String,
  pub subject_links:      String,
  pub previous:           Option<String>,
  pub next:               Option<String>,
  // medewerker_identificaties join
  pub identification:     Option<String>,
  pub surname:            Option<String>,
  pub initials:           Option<String>,
  pub surname_prefix:     Option<String>,
}

impl RawContactMoment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      source_org:         row.get(1)?,
      client_reference:   row.get(2)?,
      interaction_time:   row.get(3)?,
      channel:            row.get(4)?,
      text:               row.get(5)?,
      preferred_channel:  row.get(6)?,
      preferred_language: row.get(7)?,
      initiator:          row.get(8)?,
      medewerker:         row.get(9)?,
      subject_links:      row.get(10)?,
      previous:           row.get(11)?,
      next:               row.get(12)?,
      identification:     row.get(13)?,
      surname:            row.get(14)?,
      initials:           row.get(15)?,
      surname_prefix:     row.get(16)?,
    })
  }

  pub fn into_contactmoment(self) -> Result<ContactMoment> {
    let medewerker = match (
      MedewerkerReference::new(self.medewerker),
      self.identification,
      self.surname,
      self.initials,
    ) {
      (Some(reference), None, _, _) => Medewerker::Reference(reference),
      (None, Some(identification), Some(surname), Some(initials)) => {
        Medewerker::Identification(MedewerkerIdentificatie {
          identification,
          surname,
          initials,
          surname_prefix: self.surname_prefix,
        })
      }
      _ => {
        return Err(Error::Corrupt(format!(
          "contact moment {} has no single medewerker",
          self.id
        )));
      }
    };

    Ok(ContactMoment {
      id: decode_uuid(&self.id)?,
      source_org: self.source_org,
      client_reference: self.client_reference,
      interaction_time: decode_dt(&self.interaction_time)?,
      channel: self.channel,
      text: self.text,
      preferred_channel: self.preferred_channel,
      preferred_language: self.preferred_language,
      initiator: decode_initiator(&self.initiator)?,
      medewerker,
      subject_links: decode_links(&self.subject_links)?,
      previous: self.previous.as_deref().map(decode_uuid).transpose()?,
      next: self.next.as_deref().map(decode_uuid).transpose()?,
    })
  }
}
