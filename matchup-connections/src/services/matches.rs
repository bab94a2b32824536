use std::cmp::Ordering;

use uuid::Uuid;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::Match;
use crate::store::{MatchStore, StoreError};

/// Total order used to canonicalize match pairs.
#[derive(Clone, Copy)]
pub struct PairOrder(fn(&Uuid, &Uuid) -> Ordering);

impl PairOrder {
    pub fn new(cmp: fn(&Uuid, &Uuid) -> Ordering) -> Self {
        Self(cmp)
    }

    /// Returns `(low, high)`. Symmetric: `canonicalize(a, b) == canonicalize(b, a)`.
    pub fn canonicalize(&self, a: Uuid, b: Uuid) -> (Uuid, Uuid) {
        match (self.0)(&a, &b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        }
    }
}

impl Default for PairOrder {
    fn default() -> Self {
        Self(Uuid::cmp)
    }
}

impl std::fmt::Debug for PairOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PairOrder")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchCreation {
    Created(Match),
    Existing(Match),
}

impl MatchCreation {
    pub fn created(&self) -> bool {
        matches!(self, MatchCreation::Created(_))
    }

    pub fn into_match(self) -> Match {
        match self {
            MatchCreation::Created(m) | MatchCreation::Existing(m) => m,
        }
    }
}

/// Returns the pair's match, inserting it if absent. Losing an insert race
/// yields the winner's row.
pub fn create_match_if_absent<S>(
    store: &S,
    order: PairOrder,
    a: Uuid,
    b: Uuid,
) -> ConnectionResult<MatchCreation>
where
    S: MatchStore + ?Sized,
{
    if a == b {
        return Err(ConnectionError::SelfInterest);
    }

    let (low, high) = order.canonicalize(a, b);

    if let Some(existing) = store.find_match(low, high)? {
        return Ok(MatchCreation::Existing(existing));
    }

    match store.insert_match(low, high) {
        Ok(created) => {
            metrics::counter!("matchup_matches_created_total").increment(1);
            tracing::info!(match_id = %created.id, %low, %high, "Match created");
            Ok(MatchCreation::Created(created))
        }
        Err(StoreError::UniqueViolation) => {
            tracing::debug!(%low, %high, "Match insert lost race, re-reading winner");
            store
                .find_match(low, high)?
                .map(MatchCreation::Existing)
                .ok_or(ConnectionError::MatchVanished { low, high })
        }
        Err(e) => Err(e.into()),
    }
}

/// True when the pair has a match that is still active.
pub fn is_active_match<S>(store: &S, order: PairOrder, a: Uuid, b: Uuid) -> ConnectionResult<bool>
where
    S: MatchStore + ?Sized,
{
    let (low, high) = order.canonicalize(a, b);
    Ok(store.find_match(low, high)?.is_some_and(|m| m.is_active))
}

/// The partner of `user_id` in `m`, or `NotMatchMember`.
pub fn other_member(m: &Match, user_id: Uuid) -> ConnectionResult<Uuid> {
    m.other_member(user_id).ok_or(ConnectionError::NotMatchMember)
}

/// Deactivates a match on behalf of one of its members. Returns the match and
/// whether this call changed it.
pub fn deactivate_match<S>(store: &S, user_id: Uuid, match_id: Uuid) -> ConnectionResult<(Match, bool)>
where
    S: MatchStore + ?Sized,
{
    let m = store
        .match_by_id(match_id)?
        .ok_or(ConnectionError::NotFound("match"))?;

    if !m.has_member(user_id) {
        return Err(ConnectionError::NotMatchMember);
    }

    if !m.is_active {
        return Ok((m, false));
    }

    let updated = store.set_match_active(match_id, false)?;
    tracing::info!(%match_id, deactivated_by = %user_id, "Match deactivated");

    Ok((updated, true))
}
