//! [`SqliteRecords`]: [`RecordTx`] over an open SQLite transaction.

use contactmomenten_core::{
  Error as CoreError, Result as CoreResult,
  contactmoment::{ContactMoment, Links},
  medewerker::Medewerker,
  records::RecordTx,
};
use rusqlite::{OptionalExtension as _, Transaction};
use uuid::Uuid;

use crate::{
  Error,
  encode::{
    RawContactMoment, SELECT_CONTACTMOMENT, decode_uuid, encode_dt,
    encode_initiator, encode_links, encode_uuid,
  },
};

fn db(e: rusqlite::Error) -> CoreError { Error::from(e).into() }

pub struct SqliteRecords<'a> {
  tx: &'a Transaction<'a>,
}

impl<'a> SqliteRecords<'a> {
  pub fn new(tx: &'a Transaction<'a>) -> Self { Self { tx } }

  fn write_identification(
    &self,
    id: &str,
    medewerker: &Medewerker,
  ) -> CoreResult<()> {
    self
      .tx
      .execute(
        "DELETE FROM medewerker_identificaties WHERE contactmoment_id = ?1",
        rusqlite::params![id],
      )
      .map_err(db)?;

    if let Some(m) = medewerker.identification() {
      self
        .tx
        .execute(
          "INSERT INTO medewerker_identificaties (
             contactmoment_id, identificatie, achternaam, voorletters,
             voorvoegsel_achternaam
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            id,
            m.identification,
            m.surname,
            m.initials,
            m.surname_prefix,
          ],
        )
        .map_err(db)?;
    }
    Ok(())
  }

  fn write_link(&self, column: Link, id: Uuid, value: Option<Uuid>) -> CoreResult<()> {
    let sql = match column {
      Link::Previous => "UPDATE contactmomenten SET previous_id = ?2 WHERE id = ?1",
      Link::Next => "UPDATE contactmomenten SET next_id = ?2 WHERE id = ?1",
    };
    let changed = self
      .tx
      .execute(sql, rusqlite::params![encode_uuid(id), value.map(encode_uuid)])
      .map_err(db)?;
    if changed == 0 {
      return Err(CoreError::NotFound(id));
    }
    Ok(())
  }
}

enum Link {
  Previous,
  Next,
}

impl RecordTx for SqliteRecords<'_> {
  fn load(&self, id: Uuid) -> CoreResult<Option<ContactMoment>> {
    let raw = self
      .tx
      .query_row(
        &format!("{SELECT_CONTACTMOMENT} WHERE c.id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawContactMoment::from_row,
      )
      .optional()
      .map_err(db)?;

    Ok(raw.map(RawContactMoment::into_contactmoment).transpose()?)
  }

  fn links(&self, id: Uuid) -> CoreResult<Option<Links>> {
    let raw: Option<(Option<String>, Option<String>)> = self
      .tx
      .query_row(
        "SELECT previous_id, next_id FROM contactmomenten WHERE id = ?1",
        rusqlite::params![encode_uuid(id)],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(db)?;

    let Some((previous, next)) = raw else {
      return Ok(None);
    };
    Ok(Some(Links {
      previous: previous.as_deref().map(decode_uuid).transpose()?,
      next:     next.as_deref().map(decode_uuid).transpose()?,
    }))
  }

  fn insert(&mut self, record: &ContactMoment) -> CoreResult<()> {
    let id = encode_uuid(record.id);
    let links = encode_links(&record.subject_links)?;

    self
      .tx
      .execute(
        "INSERT INTO contactmomenten (
           id, bronorganisatie, klant, interactiedatum, kanaal, tekst,
           voorkeurskanaal, voorkeurstaal, initiatiefnemer, medewerker,
           onderwerp_links
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
          id,
          record.source_org,
          record.client_reference,
          encode_dt(record.interaction_time),
          record.channel,
          record.text,
          record.preferred_channel,
          record.preferred_language,
          encode_initiator(record.initiator),
          record.medewerker.reference_str(),
          links,
        ],
      )
      .map_err(db)?;

    self.write_identification(&id, &record.medewerker)
  }

  fn save(&mut self, record: &ContactMoment) -> CoreResult<()> {
    let id = encode_uuid(record.id);
    let links = encode_links(&record.subject_links)?;

    let changed = self
      .tx
      .execute(
        "UPDATE contactmomenten SET
           bronorganisatie = ?2, klant = ?3, interactiedatum = ?4,
           kanaal = ?5, tekst = ?6, voorkeurskanaal = ?7, voorkeurstaal = ?8,
           initiatiefnemer = ?9, medewerker = ?10, onderwerp_links = ?11
         WHERE id = ?1",
        rusqlite::params![
          id,
          record.source_org,
          record.client_reference,
          encode_dt(record.interaction_time),
          record.channel,
          record.text,
          record.preferred_channel,
          record.preferred_language,
          encode_initiator(record.initiator),
          record.medewerker.reference_str(),
          links,
        ],
      )
      .map_err(db)?;
    if changed == 0 {
      return Err(CoreError::NotFound(record.id));
    }

    self.write_identification(&id, &record.medewerker)
  }

  fn write_previous(&mut self, id: Uuid, previous: Option<Uuid>) -> CoreResult<()> {
    self.write_link(Link::Previous, id, previous)
  }

  fn write_next(&mut self, id: Uuid, next: Option<Uuid>) -> CoreResult<()> {
    self.write_link(Link::Next, id, next)
  }

  fn remove(&mut self, id: Uuid) -> CoreResult<()> {
    let changed = self
      .tx
      .execute(
        "DELETE FROM contactmomenten WHERE id = ?1",
        rusqlite::params![encode_uuid(id)],
      )
      .map_err(db)?;
    if changed == 0 {
      return Err(CoreError::NotFound(id));
    }
    Ok(())
  }
}
