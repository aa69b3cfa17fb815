//! The identity resolver: maps client-supplied references to record handles.
//!
//! A reference is an absolute URL, an absolute path, or a bare UUID. Only
//! references under this deployment's base URL resolve to a local handle;
//! well-formed contact-moment URLs of another deployment are reported as
//! [`Resolution::NotFound`].

use url::Url;
use uuid::Uuid;

use crate::{Result, records::RecordTx};

/// The path segment under which contact moments are exposed.
pub const COLLECTION: &str = "contactmomenten";

/// Outcome of [`ReferenceResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Found(Uuid),
  NotFound,
  /// Not shaped like a contact-moment reference at all.
  Malformed,
}

/// Outcome of [`ReferenceResolver::locate`]: resolution without a store
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
  Local(Uuid),
  /// A contact-moment reference belonging to a different deployment.
  Foreign,
  Malformed,
}

#[derive(Debug, Clone)]
pub struct ReferenceResolver {
  base: Url,
}

impl ReferenceResolver {
  /// `base` is the public root of the API, e.g.
  /// `http://localhost:8000/api/v1/`. A missing trailing slash is added.
  pub fn new(mut base: Url) -> Self {
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Self { base }
  }

  pub fn base(&self) -> &Url { &self.base }

  /// The canonical URL of the record `id`.
  pub fn url_for(&self, id: Uuid) -> String {
    format!("{}{COLLECTION}/{id}", self.base)
  }

  /// Classify `reference` without consulting the store.
  pub fn locate(&self, reference: &str) -> Locator {
    let reference = reference.trim();
    if reference.is_empty() {
      return Locator::Malformed;
    }

    if let Ok(id) = Uuid::parse_str(reference) {
      return Locator::Local(id);
    }

    if reference.starts_with('/') {
      return match self.base.join(reference) {
        Ok(url) => self.locate_url(&url),
        Err(_) => Locator::Malformed,
      };
    }

    match Url::parse(reference) {
      Ok(url) => self.locate_url(&url),
      Err(_) => Locator::Malformed,
    }
  }

  fn locate_url(&self, url: &Url) -> Locator {
    let Some(id) = record_id(url.path()) else {
      return Locator::Malformed;
    };

    let same_origin = url.origin() == self.base.origin();
    let expected = format!("{}{COLLECTION}/", self.base.path());
    if same_origin && url.path().starts_with(&expected) {
      Locator::Local(id)
    } else {
      Locator::Foreign
    }
  }

  /// Resolve `reference` to an existing local record.
  pub fn resolve(
    &self,
    records: &dyn RecordTx,
    reference: &str,
  ) -> Result<Resolution> {
    Ok(match self.locate(reference) {
      Locator::Local(id) if records.exists(id)? => Resolution::Found(id),
      Locator::Local(_) | Locator::Foreign => Resolution::NotFound,
      Locator::Malformed => Resolution::Malformed,
    })
  }
}

/// Extract the UUID from a path ending in `contactmomenten/<uuid>`.
fn record_id(path: &str) -> Option<Uuid> {
  let mut segments = path.trim_end_matches('/').rsplit('/');
  let id = segments.next()?;
  let collection = segments.next()?;
  if collection != COLLECTION {
    return None;
  }
  Uuid::parse_str(id).ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolver() -> ReferenceResolver {
    ReferenceResolver::new(Url::parse("http://testserver.com/api/v1").unwrap())
  }

  #[test]
  fn url_for_is_under_base() {
    let id = Uuid::new_v4();
    assert_eq!(
      resolver().url_for(id),
      format!("http://testserver.com/api/v1/contactmomenten/{id}")
    );
  }

  #[test]
  fn locates_own_urls_paths_and_ids() {
    let r = resolver();
    let id = Uuid::new_v4();
    assert_eq!(r.locate(&r.url_for(id)), Locator::Local(id));
    assert_eq!(
      r.locate(&format!("/api/v1/contactmomenten/{id}")),
      Locator::Local(id)
    );
    assert_eq!(r.locate(&id.to_string()), Locator::Local(id));
    assert_eq!(r.locate(&format!("{}/", r.url_for(id))), Locator::Local(id));
  }

  #[test]
  fn other_deployment_is_foreign() {
    let r = resolver();
    let id = Uuid::new_v4();
    assert_eq!(
      r.locate(&format!("https://elders.nl/api/v1/contactmomenten/{id}")),
      Locator::Foreign
    );
    assert_eq!(
      r.locate(&format!("http://testserver.com/other/contactmomenten/{id}")),
      Locator::Foreign
    );
  }

  #[test]
  fn wrong_shape_is_malformed() {
    let r = resolver();
    let id = Uuid::new_v4();
    assert_eq!(r.locate(""), Locator::Malformed);
    assert_eq!(r.locate("not a reference"), Locator::Malformed);
    assert_eq!(
      r.locate(&format!("http://testserver.com/api/v1/klanten/{id}")),
      Locator::Malformed
    );
    assert_eq!(
      r.locate("http://testserver.com/api/v1/contactmomenten/12345"),
      Locator::Malformed
    );
  }
}
