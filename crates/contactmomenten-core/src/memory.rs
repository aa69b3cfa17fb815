//! [`MemoryStore`]: an in-process [`ContactMomentStore`] for tests and
//! embedding.
//!
//! A transaction runs against a private copy of the table that replaces the
//! shared one only when the closure succeeds, so failed operations leave no
//! trace. Transactions are serialised by a mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::{
  Error, Result,
  contactmoment::{ContactMoment, ContactMomentQuery, Links},
  records::RecordTx,
  store::ContactMomentStore,
};

// ─── MemoryRecords ───────────────────────────────────────────────────────────

/// A table of contact moments kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecords {
  rows: Vec<ContactMoment>,
}

impl MemoryRecords {
  fn position(&self, id: Uuid) -> Option<usize> {
    self.rows.iter().position(|r| r.id == id)
  }

  fn row_mut(&mut self, id: Uuid) -> Result<&mut ContactMoment> {
    self
      .rows
      .iter_mut()
      .find(|r| r.id == id)
      .ok_or(Error::NotFound(id))
  }
}

impl RecordTx for MemoryRecords {
  fn load(&self, id: Uuid) -> Result<Option<ContactMoment>> {
    Ok(self.rows.iter().find(|r| r.id == id).cloned())
  }

  fn links(&self, id: Uuid) -> Result<Option<Links>> {
    Ok(self.rows.iter().find(|r| r.id == id).map(ContactMoment::links))
  }

  fn insert(&mut self, record: &ContactMoment) -> Result<()> {
    if self.position(record.id).is_some() {
      return Err(Error::Conflict(format!("duplicate id {}", record.id)));
    }
    let mut row = record.clone();
    row.previous = None;
    row.next = None;
    self.rows.push(row);
    Ok(())
  }

  fn save(&mut self, record: &ContactMoment) -> Result<()> {
    let row = self.row_mut(record.id)?;
    let links = row.links();
    *row = record.clone();
    row.previous = links.previous;
    row.next = links.next;
    Ok(())
  }

  fn write_previous(&mut self, id: Uuid, previous: Option<Uuid>) -> Result<()> {
    self.row_mut(id)?.previous = previous;
    Ok(())
  }

  fn write_next(&mut self, id: Uuid, next: Option<Uuid>) -> Result<()> {
    self.row_mut(id)?.next = next;
    Ok(())
  }

  fn remove(&mut self, id: Uuid) -> Result<()> {
    let index = self.position(id).ok_or(Error::NotFound(id))?;
    self.rows.remove(index);
    Ok(())
  }
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
  records: Mutex<MemoryRecords>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, MemoryRecords> {
    self.records.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl ContactMomentStore for MemoryStore {
  async fn transact<F, R>(&self, op: F) -> Result<R>
  where
    F: FnOnce(&mut dyn RecordTx) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let mut shared = self.lock();
    let mut working = shared.clone();
    let outcome = op(&mut working)?;
    *shared = working;
    Ok(outcome)
  }

  async fn get(&self, id: Uuid) -> Result<Option<ContactMoment>> {
    self.lock().load(id)
  }

  async fn list(&self, query: &ContactMomentQuery) -> Result<Vec<ContactMoment>> {
    Ok(
      self
        .lock()
        .rows
        .iter()
        .filter(|r| query.matches(r))
        .cloned()
        .collect(),
    )
  }
}
