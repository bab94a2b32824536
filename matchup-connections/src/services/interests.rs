use uuid::Uuid;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::{Disposition, Interest, NewInterest};
use crate::services::matches::{create_match_if_absent, MatchCreation, PairOrder};
use crate::store::{InterestStore, MatchStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct InterestOutcome {
    pub interest: Interest,
    /// The write moved the record into Like (new Like, or Dislike to Like).
    pub became_like: bool,
    /// Whether the row was written at all. Repeating the same signal is a no-op.
    pub changed: bool,
}

/// Creates, updates in place, or leaves alone the `(actor, target)` signal.
pub fn record_interest<S>(
    store: &S,
    actor_id: Uuid,
    target_id: Uuid,
    disposition: Disposition,
) -> ConnectionResult<InterestOutcome>
where
    S: InterestStore + ?Sized,
{
    if actor_id == target_id {
        return Err(ConnectionError::SelfInterest);
    }

    let existing = match store.find_interest(actor_id, target_id)? {
        Some(existing) => existing,
        None => {
            let new = NewInterest { actor_id, target_id, disposition };
            match store.insert_interest(&new) {
                Ok(interest) => {
                    return Ok(InterestOutcome {
                        became_like: disposition == Disposition::Like,
                        changed: true,
                        interest,
                    });
                }
                // A concurrent request inserted the same ordered pair first.
                Err(StoreError::UniqueViolation) => store
                    .find_interest(actor_id, target_id)?
                    .ok_or(ConnectionError::Store(StoreError::UniqueViolation))?,
                Err(e) => return Err(e.into()),
            }
        }
    };

    if existing.disposition == disposition {
        return Ok(InterestOutcome { interest: existing, became_like: false, changed: false });
    }

    let updated = store.update_disposition(existing.id, disposition)?;

    Ok(InterestOutcome {
        became_like: disposition == Disposition::Like,
        changed: true,
        interest: updated,
    })
}

/// Creates the pair's match when `actor` has just liked `target` and the
/// mirror Like exists. `None` when there is no mirror Like.
pub fn detect_reciprocity<S>(
    store: &S,
    order: PairOrder,
    actor_id: Uuid,
    target_id: Uuid,
) -> ConnectionResult<Option<MatchCreation>>
where
    S: InterestStore + MatchStore + ?Sized,
{
    let mirrored = store
        .find_interest(target_id, actor_id)?
        .is_some_and(|mirror| mirror.disposition == Disposition::Like);

    if !mirrored {
        return Ok(None);
    }

    create_match_if_absent(store, order, actor_id, target_id).map(Some)
}

/// Records a signal and, when it became a Like, runs reciprocity detection.
pub fn record_and_detect<S>(
    store: &S,
    order: PairOrder,
    actor_id: Uuid,
    target_id: Uuid,
    disposition: Disposition,
) -> ConnectionResult<(InterestOutcome, Option<MatchCreation>)>
where
    S: InterestStore + MatchStore + ?Sized,
{
    let outcome = record_interest(store, actor_id, target_id, disposition)?;

    let creation = if outcome.became_like {
        detect_reciprocity(store, order, actor_id, target_id)?
    } else {
        None
    };

    Ok((outcome, creation))
}
