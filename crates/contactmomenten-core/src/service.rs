//! [`ContactMomentService`]: the single entry point for reading and writing
//! contact moments.
//!
//! Each mutation composes the medewerker rules and the link maintainer inside
//! one [`ContactMomentStore::transact`] call, so a rejected request changes
//! nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  contactmoment::{
    ContactMoment, ContactMomentFilter, ContactMomentPatch, NewContactMoment,
  },
  error::{FIELD_PREVIOUS, ValidationKind},
  link, medewerker,
  records::RecordTx,
  reference::{Locator, ReferenceResolver, Resolution},
  store::ContactMomentStore,
};

// ─── Transaction bodies ──────────────────────────────────────────────────────

/// Validate `input` and build the record it describes, without links.
pub(crate) fn build_record(
  input: NewContactMoment,
  now: DateTime<Utc>,
) -> Result<ContactMoment> {
  let medewerker = medewerker::validate_and_normalize(
    input.medewerker_reference,
    input.medewerker_identification,
  )?;

  Ok(ContactMoment {
    id: Uuid::new_v4(),
    source_org: input.source_org,
    client_reference: input.client_reference,
    interaction_time: input.interaction_time.unwrap_or(now),
    channel: input.channel,
    text: input.text,
    preferred_channel: input.preferred_channel,
    preferred_language: input.preferred_language,
    initiator: input.initiator,
    medewerker,
    subject_links: input.subject_links,
    previous: None,
    next: None,
  })
}

/// Resolve a `previous` reference to a local, existing record.
fn resolve_previous(
  records: &dyn RecordTx,
  resolver: &ReferenceResolver,
  reference: &str,
) -> Result<Uuid> {
  match resolver.resolve(records, reference)? {
    Resolution::Found(id) => Ok(id),
    Resolution::NotFound | Resolution::Malformed => {
      tracing::debug!(reference, "previous reference does not resolve");
      Err(Error::validation(FIELD_PREVIOUS, ValidationKind::DoesNotExist))
    }
  }
}

fn create_in(
  records: &mut dyn RecordTx,
  resolver: &ReferenceResolver,
  input: NewContactMoment,
  now: DateTime<Utc>,
) -> Result<ContactMoment> {
  let previous = input.previous.clone();
  let record = build_record(input, now)?;
  records.insert(&record)?;

  if let Some(reference) = previous.as_deref() {
    let target = resolve_previous(records, resolver, reference)?;
    link::set_previous(records, record.id, Some(target))?;
  }

  records.load(record.id)?.ok_or(Error::NotFound(record.id))
}

fn update_in(
  records: &mut dyn RecordTx,
  resolver: &ReferenceResolver,
  id: Uuid,
  patch: ContactMomentPatch,
) -> Result<ContactMoment> {
  let mut record = records.load(id)?.ok_or(Error::NotFound(id))?;

  record.medewerker = medewerker::apply_patch(
    &record.medewerker,
    patch.medewerker_reference.clone(),
    patch.medewerker_identification.clone(),
  )?;
  patch.apply_attributes(&mut record);
  records.save(&record)?;

  if let Some(previous) = patch.previous.as_ref() {
    let target = match previous.as_deref() {
      Some(reference) => Some(resolve_previous(records, resolver, reference)?),
      None => None,
    };
    link::set_previous(records, id, target)?;
  }

  records.load(id)?.ok_or(Error::NotFound(id))
}

fn delete_in(records: &mut dyn RecordTx, id: Uuid) -> Result<()> {
  link::detach(records, id)?;
  records.remove(id)
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Facade over a [`ContactMomentStore`].
///
/// Cloning is cheap; the store is reference-counted.
pub struct ContactMomentService<S> {
  store:    Arc<S>,
  resolver: ReferenceResolver,
}

impl<S> Clone for ContactMomentService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), resolver: self.resolver.clone() }
  }
}

impl<S: ContactMomentStore> ContactMomentService<S> {
  pub fn new(store: Arc<S>, resolver: ReferenceResolver) -> Self {
    Self { store, resolver }
  }

  pub fn resolver(&self) -> &ReferenceResolver { &self.resolver }

  pub fn store(&self) -> &S { &self.store }

  /// Create a record. The medewerker rules run before anything is written;
  /// `previous` is linked once the new row exists.
  pub async fn create(&self, input: NewContactMoment) -> Result<ContactMoment> {
    let resolver = self.resolver.clone();
    let now = Utc::now();
    let record = self
      .store
      .transact(move |records| create_in(records, &resolver, input, now))
      .await?;
    tracing::info!(id = %record.id, previous = ?record.previous, "contact moment created");
    Ok(record)
  }

  /// Apply a partial update. Fields absent from `patch` are untouched;
  /// `previous` is relinked only when present.
  pub async fn update(
    &self,
    id: Uuid,
    patch: ContactMomentPatch,
  ) -> Result<ContactMoment> {
    let resolver = self.resolver.clone();
    let record = self
      .store
      .transact(move |records| update_in(records, &resolver, id, patch))
      .await?;
    tracing::info!(%id, previous = ?record.previous, "contact moment updated");
    Ok(record)
  }

  /// Replace every client-writable field of a record.
  pub async fn replace(
    &self,
    id: Uuid,
    input: NewContactMoment,
  ) -> Result<ContactMoment> {
    self.update(id, ContactMomentPatch::from(input)).await
  }

  /// Delete a record, unlinking its neighbours and its owned identification.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .store
      .transact(move |records| delete_in(records, id))
      .await?;
    tracing::info!(%id, "contact moment deleted");
    Ok(())
  }

  pub async fn get(&self, id: Uuid) -> Result<ContactMoment> {
    self.store.get(id).await?.ok_or(Error::NotFound(id))
  }

  /// Records matching `filter`, in insertion order. A link filter whose
  /// reference does not name a local record matches nothing.
  pub async fn list(&self, filter: ContactMomentFilter) -> Result<Vec<ContactMoment>> {
    let mut query = filter.query;

    for (reference, slot) in [
      (filter.previous.as_deref(), &mut query.previous),
      (filter.next.as_deref(), &mut query.next),
    ] {
      let Some(reference) = reference else { continue };
      match self.resolver.locate(reference) {
        Locator::Local(id) => *slot = Some(id),
        Locator::Foreign | Locator::Malformed => {
          tracing::debug!(reference, "link filter does not resolve locally");
          return Ok(Vec::new());
        }
      }
    }

    self.store.list(&query).await
  }
}
