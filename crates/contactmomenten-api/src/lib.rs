//! JSON REST API for contact moments.
//!
//! Exposes an axum [`Router`] backed by a
//! [`ContactMomentService`](contactmomenten_core::service::ContactMomentService)
//! over any [`ContactMomentStore`]. Transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", contactmomenten_api::api_router(service.clone()))
//! ```

pub mod contactmomenten;
pub mod error;

use std::sync::Arc;

use axum::{Router, routing::get};
use contactmomenten_core::{
  service::ContactMomentService, store::ContactMomentStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<ContactMomentService<S>>) -> Router<()>
where
  S: ContactMomentStore + 'static,
{
  Router::new()
    .route(
      "/contactmomenten",
      get(contactmomenten::list::<S>).post(contactmomenten::create::<S>),
    )
    .route(
      "/contactmomenten/{id}",
      get(contactmomenten::get_one::<S>)
        .put(contactmomenten::replace::<S>)
        .patch(contactmomenten::update::<S>)
        .delete(contactmomenten::delete_one::<S>),
    )
    .with_state(service)
}
