use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::Gender;

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 99;

fn default_min_age() -> i32 { MIN_AGE }
fn default_max_age() -> i32 { MAX_AGE }

/// Unvalidated preference input, as submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreferenceDraft {
    #[serde(default = "default_min_age")]
    #[validate(range(min = 18, max = 99, message = "min_age must be between 18 and 99"))]
    pub min_age: i32,
    #[serde(default = "default_max_age")]
    #[validate(range(min = 18, max = 99, message = "max_age must be between 18 and 99"))]
    pub max_age: i32,
    #[validate(length(min = 1, message = "select at least one gender preference"))]
    pub preferred_genders: Vec<Gender>,
    #[serde(default)]
    #[validate(range(min = 0, message = "max_distance cannot be negative"))]
    pub max_distance: Option<i32>,
}

/// A user's validated acceptance criteria for the discovery feed.
///
/// Construction guarantees `18 <= min_age < max_age <= 99` and a non-empty
/// gender set. `max_distance` is carried for clients but no filter reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceFilter {
    min_age: i32,
    max_age: i32,
    #[serde(rename = "preferred_genders")]
    genders: BTreeSet<Gender>,
    max_distance: Option<i32>,
}

impl TryFrom<PreferenceDraft> for PreferenceFilter {
    type Error = ConnectionError;

    fn try_from(draft: PreferenceDraft) -> ConnectionResult<Self> {
        draft
            .validate()
            .map_err(|e| ConnectionError::Validation(e.to_string()))?;

        if draft.min_age >= draft.max_age {
            return Err(ConnectionError::Validation(
                "minimum age must be less than maximum age".into(),
            ));
        }

        Ok(Self {
            min_age: draft.min_age,
            max_age: draft.max_age,
            genders: draft.preferred_genders.into_iter().collect(),
            max_distance: draft.max_distance,
        })
    }
}

impl PreferenceFilter {
    pub fn new(
        min_age: i32,
        max_age: i32,
        genders: impl IntoIterator<Item = Gender>,
        max_distance: Option<i32>,
    ) -> ConnectionResult<Self> {
        PreferenceDraft {
            min_age,
            max_age,
            preferred_genders: genders.into_iter().collect(),
            max_distance,
        }
        .try_into()
    }

    /// Rebuilds a filter from its stored form (`"M,F,O"` gender codes).
    pub fn from_stored(
        min_age: i32,
        max_age: i32,
        gender_codes: &str,
        max_distance: Option<i32>,
    ) -> ConnectionResult<Self> {
        let genders = gender_codes
            .split(',')
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                Gender::from_code(c)
                    .ok_or_else(|| ConnectionError::Validation(format!("unknown gender code: {c}")))
            })
            .collect::<ConnectionResult<Vec<_>>>()?;

        Self::new(min_age, max_age, genders, max_distance)
    }

    pub fn min_age(&self) -> i32 {
        self.min_age
    }

    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    pub fn age_band(&self) -> RangeInclusive<i32> {
        self.min_age..=self.max_age
    }

    pub fn accepted_genders(&self) -> &BTreeSet<Gender> {
        &self.genders
    }

    pub fn max_distance(&self) -> Option<i32> {
        self.max_distance
    }

    /// Storage form of the gender set, e.g. `"M,F"`.
    pub fn gender_codes(&self) -> String {
        self.genders
            .iter()
            .map(|g| g.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}
