pub mod discovery;
pub mod interests;
pub mod matches;
pub mod preferences;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::{Disposition, Interest, Match, Profile};
use crate::store::{ConnectionStore, InterestStore, MatchStore, PreferenceRepository, ProfileDirectory};
use discovery::{DiscoveryQuery, FeedOrder};
use matches::{MatchCreation, PairOrder};
use preferences::PreferenceFilter;

/// Result of recording a like or pass through the facade.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub interest: Interest,
    /// An active match exists for the pair after the write.
    pub is_match: bool,
    /// Set only when this call inserted the match.
    pub created_match: Option<Match>,
    pub changed: bool,
}

impl RecordOutcome {
    pub fn match_created(&self) -> bool {
        self.created_match.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    #[serde(rename = "match")]
    pub matched: Match,
    pub profile: Profile,
}

/// Entry point for every connections operation. Cheap to clone.
#[derive(Clone)]
pub struct ConnectionsService {
    store: Arc<dyn ConnectionStore>,
    order: PairOrder,
}

impl ConnectionsService {
    pub fn new(store: Arc<dyn ConnectionStore>) -> Self {
        Self { store, order: PairOrder::default() }
    }

    pub fn with_pair_order(mut self, order: PairOrder) -> Self {
        self.order = order;
        self
    }

    pub fn ping(&self) -> ConnectionResult<()> {
        Ok(self.store.ping()?)
    }

    pub fn profile_for_user(&self, user_id: Uuid) -> ConnectionResult<Profile> {
        self.store
            .profile_for_user(user_id)?
            .ok_or(ConnectionError::NotFound("profile"))
    }

    /// Records `actor`'s like/pass on the profile and runs reciprocity
    /// detection when the record became a Like.
    pub fn record_interest(
        &self,
        actor_id: Uuid,
        target_profile_id: Uuid,
        disposition: Disposition,
    ) -> ConnectionResult<RecordOutcome> {
        let target = self
            .store
            .profile_by_id(target_profile_id)?
            .ok_or(ConnectionError::NotFound("profile"))?;

        if target.user_id == actor_id {
            return Err(ConnectionError::SelfInterest);
        }

        let (outcome, creation) =
            interests::record_and_detect(&*self.store, self.order, actor_id, target.user_id, disposition)?;

        if outcome.changed {
            metrics::counter!("matchup_interests_recorded_total", "disposition" => disposition.as_str())
                .increment(1);
        }

        let is_match = matches::is_active_match(&*self.store, self.order, actor_id, target.user_id)?;
        let created_match = match creation {
            Some(MatchCreation::Created(m)) => Some(m),
            _ => None,
        };

        tracing::info!(
            actor_id = %actor_id,
            target_id = %target.user_id,
            disposition = %disposition,
            changed = outcome.changed,
            is_match,
            "Interest recorded"
        );

        Ok(RecordOutcome {
            interest: outcome.interest,
            is_match,
            created_match,
            changed: outcome.changed,
        })
    }

    pub fn find_interest(&self, actor_id: Uuid, target_id: Uuid) -> ConnectionResult<Option<Interest>> {
        Ok(self.store.find_interest(actor_id, target_id)?)
    }

    pub fn interests_from(&self, actor_id: Uuid, disposition: Disposition) -> ConnectionResult<Vec<Uuid>> {
        Ok(self.store.interest_targets(actor_id, disposition)?)
    }

    /// Candidate profiles for `user_id`, filtered by their stored preferences.
    pub fn discover_feed(&self, user_id: Uuid, order: FeedOrder) -> ConnectionResult<Vec<Profile>> {
        DiscoveryQuery::new(user_id, order).run(&*self.store)
    }

    /// Active matches with the partner's profile, newest match first.
    pub fn list_matches(&self, user_id: Uuid) -> ConnectionResult<Vec<MatchSummary>> {
        let active = self.store.active_matches_for(user_id)?;
        let partners: Vec<Uuid> = active.iter().filter_map(|m| m.other_member(user_id)).collect();

        let mut by_user: HashMap<Uuid, Profile> = self
            .store
            .profiles_for_users(&partners)?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let mut summaries = Vec::with_capacity(active.len());
        for m in active {
            let partner = matches::other_member(&m, user_id)?;
            match by_user.remove(&partner) {
                Some(profile) => summaries.push(MatchSummary { matched: m, profile }),
                None => {
                    tracing::warn!(match_id = %m.id, partner = %partner, "Skipping match, partner has no profile");
                }
            }
        }

        Ok(summaries)
    }

    /// Profiles `user_id` has liked, newest profile first.
    pub fn liked_profiles(&self, user_id: Uuid) -> ConnectionResult<Vec<Profile>> {
        let targets = self.store.interest_targets(user_id, Disposition::Like)?;
        Ok(self.store.profiles_for_users(&targets)?)
    }

    pub fn preferences(&self, user_id: Uuid) -> ConnectionResult<Option<PreferenceFilter>> {
        Ok(self.store.preference_for(user_id)?)
    }

    pub fn save_preferences(&self, user_id: Uuid, filter: PreferenceFilter) -> ConnectionResult<PreferenceFilter> {
        self.store.save_preference(user_id, &filter)?;
        tracing::info!(user_id = %user_id, genders = %filter.gender_codes(), "Preferences saved");
        Ok(filter)
    }

    /// Returns the match and whether this call deactivated it.
    pub fn deactivate_match(&self, user_id: Uuid, match_id: Uuid) -> ConnectionResult<(Match, bool)> {
        matches::deactivate_match(&*self.store, user_id, match_id)
    }
}
