//! [`RecordTx`]: the synchronous view of the record store inside one open
//! transaction.
//!
//! Every mutation of the facade runs as a closure over a `RecordTx`; the
//! backend commits only if the closure returns `Ok`. Link columns are written
//! exclusively through [`RecordTx::write_previous`] and
//! [`RecordTx::write_next`], which only [`crate::link`] calls.

use uuid::Uuid;

use crate::{
  Result,
  contactmoment::{ContactMoment, Links},
};

pub trait RecordTx {
  /// Load a full record, including its owned identification.
  fn load(&self, id: Uuid) -> Result<Option<ContactMoment>>;

  /// The chain pointers of a record; `None` if the record does not exist.
  fn links(&self, id: Uuid) -> Result<Option<Links>>;

  fn exists(&self, id: Uuid) -> Result<bool> { Ok(self.links(id)?.is_some()) }

  /// Persist a new record. Its link fields must both be `None`.
  fn insert(&mut self, record: &ContactMoment) -> Result<()>;

  /// Overwrite the attributes and medewerker of an existing record. A stored
  /// identification not present in `record.medewerker` is deleted. Link
  /// fields of `record` are ignored.
  fn save(&mut self, record: &ContactMoment) -> Result<()>;

  fn write_previous(&mut self, id: Uuid, previous: Option<Uuid>) -> Result<()>;

  fn write_next(&mut self, id: Uuid, next: Option<Uuid>) -> Result<()>;

  /// Delete a record and its owned identification. The caller detaches the
  /// record from its neighbours first.
  fn remove(&mut self, id: Uuid) -> Result<()>;
}
