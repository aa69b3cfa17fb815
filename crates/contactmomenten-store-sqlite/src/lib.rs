//! SQLite backend for the contact-moment store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write is one `BEGIN IMMEDIATE`
//! transaction.

mod encode;
mod records;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
