//! [`SqliteStore`]: the SQLite implementation of [`ContactMomentStore`].

use std::path::Path;

use contactmomenten_core::{
  Result as CoreResult,
  contactmoment::{ContactMoment, ContactMomentQuery},
  records::RecordTx,
  store::ContactMomentStore,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawContactMoment, SELECT_CONTACTMOMENT, encode_dt, encode_initiator,
    encode_uuid,
  },
  records::SqliteRecords,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact-moment store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// share one connection thread, so transactions never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── ContactMomentStore impl ─────────────────────────────────────────────────

impl ContactMomentStore for SqliteStore {
  async fn transact<F, R>(&self, op: F) -> CoreResult<R>
  where
    F: FnOnce(&mut dyn RecordTx) -> CoreResult<R> + Send + 'static,
    R: Send + 'static,
  {
    // A rejected operation rolls back by dropping `tx`.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = op(&mut SqliteRecords::new(&tx));
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await
      .map_err(Error::from)?;
    outcome
  }

  async fn get(&self, id: Uuid) -> CoreResult<Option<ContactMoment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContactMoment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT_CONTACTMOMENT} WHERE c.id = ?1"),
              rusqlite::params![id_str],
              RawContactMoment::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;

    Ok(raw.map(RawContactMoment::into_contactmoment).transpose()?)
  }

  async fn list(&self, query: &ContactMomentQuery) -> CoreResult<Vec<ContactMoment>> {
    let source_org         = query.source_org.clone();
    let client_reference   = query.client_reference.clone();
    let channel            = query.channel.clone();
    let preferred_channel  = query.preferred_channel.clone();
    let preferred_language = query.preferred_language.clone();
    let initiator          = query.initiator.map(encode_initiator);
    let medewerker         = query.medewerker_reference.clone();
    let after              = query.interaction_after.map(encode_dt);
    let before             = query.interaction_before.map(encode_dt);
    let previous           = query.previous.map(encode_uuid);
    let next               = query.next.map(encode_uuid);

    let raws: Vec<RawContactMoment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT_CONTACTMOMENT}
           WHERE (?1  IS NULL OR c.bronorganisatie = ?1)
             AND (?2  IS NULL OR c.klant           = ?2)
             AND (?3  IS NULL OR c.kanaal          = ?3)
             AND (?4  IS NULL OR c.voorkeurskanaal = ?4)
             AND (?5  IS NULL OR c.voorkeurstaal   = ?5)
             AND (?6  IS NULL OR c.initiatiefnemer = ?6)
             AND (?7  IS NULL OR c.medewerker      = ?7)
             AND (?8  IS NULL OR c.interactiedatum >= ?8)
             AND (?9  IS NULL OR c.interactiedatum <= ?9)
             AND (?10 IS NULL OR c.previous_id     = ?10)
             AND (?11 IS NULL OR c.next_id         = ?11)
           ORDER BY c.rowid"
        ))?;

        let rows = stmt
          .query_map(
            rusqlite::params![
              source_org,
              client_reference,
              channel,
              preferred_channel,
              preferred_language,
              initiator,
              medewerker,
              after,
              before,
              previous,
              next,
            ],
            RawContactMoment::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await
      .map_err(Error::from)?;

    Ok(
      raws
        .into_iter()
        .map(RawContactMoment::into_contactmoment)
        .collect::<Result<_>>()?,
    )
  }
}
