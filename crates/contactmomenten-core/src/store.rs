//! The `ContactMomentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `contactmomenten-store-sqlite`, or [`crate::memory::MemoryStore`] in
//! tests). Higher layers depend on [`crate::service::ContactMomentService`],
//! which drives a store through this abstraction.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  contactmoment::{ContactMoment, ContactMomentQuery},
  records::RecordTx,
};

/// Abstraction over a contact-moment store backend.
///
/// Writes go through [`ContactMomentStore::transact`]: the closure sees the
/// store as a [`RecordTx`] and its effects are committed atomically if and
/// only if it returns `Ok`. Concurrent transactions are serialised by the
/// backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContactMomentStore: Send + Sync {
  /// Run `op` inside one serialisable transaction.
  fn transact<F, R>(&self, op: F) -> impl Future<Output = Result<R>> + Send + '_
  where
    F: FnOnce(&mut dyn RecordTx) -> Result<R> + Send + 'static,
    R: Send + 'static;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactMoment>>> + Send + '_;

  /// All records matching `query`, in insertion order.
  fn list<'a>(
    &'a self,
    query: &'a ContactMomentQuery,
  ) -> impl Future<Output = Result<Vec<ContactMoment>>> + Send + 'a;
}
