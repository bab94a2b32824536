//! Storage ports for the connections core.
//!
//! Every operation is a single synchronous read or write. The only
//! cross-request guarantee the core relies on is that `insert_interest` and
//! `insert_match` report [`StoreError::UniqueViolation`] when the ordered
//! interest pair or the canonical match pair already exists.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use uuid::Uuid;

use crate::models::{Disposition, Interest, Match, NewInterest, Profile};
use crate::services::discovery::DiscoveryPlan;
use crate::services::preferences::PreferenceFilter;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("database error: {0}")]
    Database(diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::UniqueViolation,
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read side of the profile directory.
pub trait ProfileDirectory: Send + Sync {
    fn profile_by_id(&self, profile_id: Uuid) -> StoreResult<Option<Profile>>;

    fn profile_for_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;

    /// Profiles owned by `user_ids`, newest profile first.
    fn profiles_for_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    /// Profiles admitted by every stage of `plan`, newest profile first.
    fn discoverable_profiles(&self, plan: &DiscoveryPlan) -> StoreResult<Vec<Profile>>;
}

pub trait PreferenceRepository: Send + Sync {
    fn preference_for(&self, user_id: Uuid) -> StoreResult<Option<PreferenceFilter>>;

    /// Inserts or replaces the user's preferences.
    fn save_preference(&self, user_id: Uuid, filter: &PreferenceFilter) -> StoreResult<()>;
}

pub trait InterestStore: Send + Sync {
    fn find_interest(&self, actor_id: Uuid, target_id: Uuid) -> StoreResult<Option<Interest>>;

    /// Fails with [`StoreError::UniqueViolation`] if `(actor, target)` already has a record.
    fn insert_interest(&self, new: &NewInterest) -> StoreResult<Interest>;

    fn update_disposition(&self, interest_id: Uuid, disposition: Disposition) -> StoreResult<Interest>;

    /// Target ids of `actor`'s signals with `disposition`, most recently changed first.
    fn interest_targets(&self, actor_id: Uuid, disposition: Disposition) -> StoreResult<Vec<Uuid>>;
}

pub trait MatchStore: Send + Sync {
    /// `low` and `high` must already be canonicalized.
    fn find_match(&self, low: Uuid, high: Uuid) -> StoreResult<Option<Match>>;

    fn match_by_id(&self, match_id: Uuid) -> StoreResult<Option<Match>>;

    /// Fails with [`StoreError::UniqueViolation`] if the pair already has a match.
    fn insert_match(&self, low: Uuid, high: Uuid) -> StoreResult<Match>;

    /// Active matches containing `user_id`, newest first.
    fn active_matches_for(&self, user_id: Uuid) -> StoreResult<Vec<Match>>;

    fn set_match_active(&self, match_id: Uuid, active: bool) -> StoreResult<Match>;
}

/// Everything the connections service needs from storage.
pub trait ConnectionStore: ProfileDirectory + PreferenceRepository + InterestStore + MatchStore {
    /// Cheap liveness probe used by the health endpoint.
    fn ping(&self) -> StoreResult<()>;
}
