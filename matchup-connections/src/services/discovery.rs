use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::{Disposition, Gender, Profile};
use crate::services::preferences::PreferenceFilter;
use crate::store::{InterestStore, PreferenceRepository, ProfileDirectory};

// --- Feed order ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrder {
    #[default]
    Newest,
    Random,
}

impl std::str::FromStr for FeedOrder {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(FeedOrder::Newest),
            "random" => Ok(FeedOrder::Random),
            other => Err(ConnectionError::Validation(format!(
                "unknown order '{other}', expected 'newest' or 'random'"
            ))),
        }
    }
}

// --- Stages ---

/// One named step of the discovery pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    ExcludeSelf(Uuid),
    ExcludeLiked(HashSet<Uuid>),
    ExcludeDisliked(HashSet<Uuid>),
    AgeBand { min: i32, max: i32 },
    GenderSet(BTreeSet<Gender>),
}

impl FilterStage {
    pub fn name(&self) -> &'static str {
        match self {
            FilterStage::ExcludeSelf(_) => "exclude_self",
            FilterStage::ExcludeLiked(_) => "exclude_liked",
            FilterStage::ExcludeDisliked(_) => "exclude_disliked",
            FilterStage::AgeBand { .. } => "age_band",
            FilterStage::GenderSet(_) => "gender_set",
        }
    }

    pub fn admits(&self, profile: &Profile) -> bool {
        match self {
            FilterStage::ExcludeSelf(user_id) => profile.user_id != *user_id,
            FilterStage::ExcludeLiked(ids) | FilterStage::ExcludeDisliked(ids) => {
                !ids.contains(&profile.user_id)
            }
            FilterStage::AgeBand { min, max } => (*min..=*max).contains(&profile.age),
            FilterStage::GenderSet(genders) => genders.contains(&profile.gender),
        }
    }
}

/// The ordered stages a directory must apply for one viewer.
///
/// Interest targets are user ids, so exclusion stages match on
/// `Profile::user_id`.
#[derive(Debug, Clone)]
pub struct DiscoveryPlan {
    pub viewer: Uuid,
    pub stages: Vec<FilterStage>,
}

impl DiscoveryPlan {
    pub fn build(
        viewer: Uuid,
        liked: impl IntoIterator<Item = Uuid>,
        disliked: impl IntoIterator<Item = Uuid>,
        preferences: Option<&PreferenceFilter>,
    ) -> Self {
        let mut stages = vec![
            FilterStage::ExcludeSelf(viewer),
            FilterStage::ExcludeLiked(liked.into_iter().collect()),
            FilterStage::ExcludeDisliked(disliked.into_iter().collect()),
        ];

        if let Some(prefs) = preferences {
            let band = prefs.age_band();
            stages.push(FilterStage::AgeBand { min: *band.start(), max: *band.end() });
            stages.push(FilterStage::GenderSet(prefs.accepted_genders().clone()));
        }

        Self { viewer, stages }
    }

    pub fn admits(&self, profile: &Profile) -> bool {
        self.stages.iter().all(|stage| stage.admits(profile))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(FilterStage::name).collect()
    }
}

// --- Query ---

/// A re-runnable discovery query. Every `run` rebuilds the plan from the
/// current interest and preference state.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryQuery {
    pub viewer: Uuid,
    pub order: FeedOrder,
}

impl DiscoveryQuery {
    pub fn new(viewer: Uuid, order: FeedOrder) -> Self {
        Self { viewer, order }
    }

    pub fn plan<S>(&self, store: &S) -> ConnectionResult<DiscoveryPlan>
    where
        S: InterestStore + PreferenceRepository + ?Sized,
    {
        let liked = store.interest_targets(self.viewer, Disposition::Like)?;
        let disliked = store.interest_targets(self.viewer, Disposition::Dislike)?;
        let preferences = store.preference_for(self.viewer)?;

        Ok(DiscoveryPlan::build(self.viewer, liked, disliked, preferences.as_ref()))
    }

    pub fn run<S>(&self, store: &S) -> ConnectionResult<Vec<Profile>>
    where
        S: ProfileDirectory + InterestStore + PreferenceRepository + ?Sized,
    {
        let plan = self.plan(store)?;
        let mut profiles = store.discoverable_profiles(&plan)?;

        if self.order == FeedOrder::Random {
            profiles.shuffle(&mut rand::thread_rng());
        }

        tracing::debug!(
            viewer = %self.viewer,
            order = ?self.order,
            stages = ?plan.stage_names(),
            candidates = profiles.len(),
            "Discovery feed computed"
        );

        Ok(profiles)
    }
}
