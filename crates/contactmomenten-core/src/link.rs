//! The link maintainer: keeps `previous` and `next` mutual.
//!
//! For any two records A and B, `A.previous == B` holds exactly when
//! `B.next == A`, and each record has at most one of each. Both functions
//! here run inside the caller's transaction and write through [`RecordTx`],
//! so a failure anywhere leaves no partial relink behind.

use uuid::Uuid;

use crate::{
  Error, Result,
  error::{FIELD_PREVIOUS, ValidationKind},
  records::RecordTx,
};

/// Point `id`'s `previous` at `target` (or unlink it) and mirror the change
/// onto the `next` side.
///
/// A target that already has a different successor loses it: that
/// successor's `previous` is cleared and the target's `next` is taken over by
/// `id`. Setting the current value again is a no-op.
pub fn set_previous(
  records: &mut dyn RecordTx,
  id: Uuid,
  target: Option<Uuid>,
) -> Result<()> {
  if target == Some(id) {
    return Err(Error::validation(FIELD_PREVIOUS, ValidationKind::SelfReference));
  }

  let links = records.links(id)?.ok_or(Error::NotFound(id))?;

  let target_links = match target {
    Some(t) => Some(records.links(t)?.ok_or_else(|| {
      Error::validation(FIELD_PREVIOUS, ValidationKind::DoesNotExist)
    })?),
    None => None,
  };

  if links.previous == target {
    return Ok(());
  }

  if let Some(old) = links.previous {
    tracing::debug!(record = %id, previous = %old, "unlinking old predecessor");
    records.write_next(old, None)?;
  }

  if let (Some(t), Some(tl)) = (target, target_links)
    && let Some(claimant) = tl.next.filter(|c| *c != id)
  {
    tracing::debug!(
      target = %t,
      %claimant,
      record = %id,
      "predecessor already continued; previous claimant loses its link"
    );
    records.write_previous(claimant, None)?;
  }

  records.write_previous(id, target)?;
  if let Some(t) = target {
    records.write_next(t, Some(id))?;
  }
  Ok(())
}

/// Cut `id` out of the chain before it is deleted. The neighbours are not
/// spliced together; the chain simply ends on either side.
pub fn detach(records: &mut dyn RecordTx, id: Uuid) -> Result<()> {
  let links = records.links(id)?.ok_or(Error::NotFound(id))?;

  if let Some(previous) = links.previous {
    records.write_next(previous, None)?;
  }
  if let Some(next) = links.next {
    records.write_previous(next, None)?;
  }
  if links.previous.is_some() || links.next.is_some() {
    records.write_previous(id, None)?;
    records.write_next(id, None)?;
  }
  Ok(())
}
