//! Core types and trait definitions for the contact-moment service.
//!
//! This crate has no HTTP or database dependencies. It owns the rules that
//! keep records consistent: the mutual `previous`/`next` chain ([`link`]),
//! the exclusive medewerker representation ([`medewerker`]) and reference
//! resolution ([`reference`]).
//! [`service::ContactMomentService`] composes them over any
//! [`store::ContactMomentStore`].

// Store impls use native `async fn`; the trait declares the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod contactmoment;
pub mod error;
pub mod link;
pub mod medewerker;
pub mod memory;
pub mod records;
pub mod reference;
pub mod service;
pub mod store;

pub use error::{Error, Result};
