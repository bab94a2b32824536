use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ConnectionStore, InterestStore, MatchStore, PreferenceRepository, ProfileDirectory, StoreError,
    StoreResult,
};
use crate::models::{Disposition, Gender, Interest, Match, NewInterest, Profile};
use crate::services::discovery::DiscoveryPlan;
use crate::services::preferences::PreferenceFilter;

/// Process-local store with the same unique keys as the Postgres schema.
///
/// Every trait method takes the lock once, so a find followed by an insert
/// can interleave with other threads exactly like two SQL statements would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    profiles: Vec<Profile>,
    preferences: HashMap<Uuid, PreferenceFilter>,
    interests: HashMap<(Uuid, Uuid), Stamped<Interest>>,
    matches: HashMap<(Uuid, Uuid), Stamped<Match>>,
    clock: u64,
}

/// Insertion/update sequence used to break timestamp ties.
#[derive(Debug)]
struct Stamped<T> {
    value: T,
    seq: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Adds a profile to the directory. The directory is read-only for the
    /// connections core; this exists for seeding.
    pub fn add_profile(
        &self,
        user_id: Uuid,
        display_name: Option<String>,
        age: i32,
        gender: Gender,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            display_name,
            age,
            gender,
            created_at,
        };

        self.lock()?.profiles.push(profile.clone());
        Ok(profile)
    }
}

fn newest_first(mut profiles: Vec<Profile>) -> Vec<Profile> {
    // Reverse insertion order first so the stable sort puts later rows first on ties.
    profiles.reverse();
    profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    profiles
}

impl ProfileDirectory for MemoryStore {
    fn profile_by_id(&self, profile_id: Uuid) -> StoreResult<Option<Profile>> {
        let inner = self.lock()?;
        Ok(inner.profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    fn profile_for_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let inner = self.lock()?;
        Ok(inner.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    fn profiles_for_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let inner = self.lock()?;
        let found = inner
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect();
        Ok(newest_first(found))
    }

    fn discoverable_profiles(&self, plan: &DiscoveryPlan) -> StoreResult<Vec<Profile>> {
        let inner = self.lock()?;
        let found = inner
            .profiles
            .iter()
            .filter(|p| plan.admits(p))
            .cloned()
            .collect();
        Ok(newest_first(found))
    }
}

impl PreferenceRepository for MemoryStore {
    fn preference_for(&self, user_id: Uuid) -> StoreResult<Option<PreferenceFilter>> {
        let inner = self.lock()?;
        Ok(inner.preferences.get(&user_id).cloned())
    }

    fn save_preference(&self, user_id: Uuid, filter: &PreferenceFilter) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.preferences.insert(user_id, filter.clone());
        Ok(())
    }
}

impl InterestStore for MemoryStore {
    fn find_interest(&self, actor_id: Uuid, target_id: Uuid) -> StoreResult<Option<Interest>> {
        let inner = self.lock()?;
        Ok(inner.interests.get(&(actor_id, target_id)).map(|s| s.value.clone()))
    }

    fn insert_interest(&self, new: &NewInterest) -> StoreResult<Interest> {
        let mut inner = self.lock()?;
        let key = (new.actor_id, new.target_id);
        if inner.interests.contains_key(&key) {
            return Err(StoreError::UniqueViolation);
        }

        let now = Utc::now();
        let interest = Interest {
            id: Uuid::new_v4(),
            actor_id: new.actor_id,
            target_id: new.target_id,
            disposition: new.disposition,
            created_at: now,
            updated_at: now,
        };
        let seq = inner.tick();
        inner.interests.insert(key, Stamped { value: interest.clone(), seq });

        Ok(interest)
    }

    fn update_disposition(&self, interest_id: Uuid, disposition: Disposition) -> StoreResult<Interest> {
        let mut inner = self.lock()?;
        let seq = inner.tick();
        let entry = inner
            .interests
            .values_mut()
            .find(|s| s.value.id == interest_id)
            .ok_or(StoreError::Database(diesel::result::Error::NotFound))?;

        entry.value.disposition = disposition;
        entry.value.updated_at = Utc::now();
        entry.seq = seq;

        Ok(entry.value.clone())
    }

    fn interest_targets(&self, actor_id: Uuid, disposition: Disposition) -> StoreResult<Vec<Uuid>> {
        let inner = self.lock()?;
        let mut rows: Vec<&Stamped<Interest>> = inner
            .interests
            .values()
            .filter(|s| s.value.actor_id == actor_id && s.value.disposition == disposition)
            .collect();
        rows.sort_by(|a, b| {
            b.value
                .updated_at
                .cmp(&a.value.updated_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(rows.into_iter().map(|s| s.value.target_id).collect())
    }
}

impl MatchStore for MemoryStore {
    fn find_match(&self, low: Uuid, high: Uuid) -> StoreResult<Option<Match>> {
        let inner = self.lock()?;
        Ok(inner.matches.get(&(low, high)).map(|s| s.value.clone()))
    }

    fn match_by_id(&self, match_id: Uuid) -> StoreResult<Option<Match>> {
        let inner = self.lock()?;
        Ok(inner
            .matches
            .values()
            .find(|s| s.value.id == match_id)
            .map(|s| s.value.clone()))
    }

    fn insert_match(&self, low: Uuid, high: Uuid) -> StoreResult<Match> {
        let mut inner = self.lock()?;
        if inner.matches.contains_key(&(low, high)) {
            return Err(StoreError::UniqueViolation);
        }

        let created = Match {
            id: Uuid::new_v4(),
            member_low: low,
            member_high: high,
            created_at: Utc::now(),
            is_active: true,
        };
        let seq = inner.tick();
        inner.matches.insert((low, high), Stamped { value: created.clone(), seq });

        Ok(created)
    }

    fn active_matches_for(&self, user_id: Uuid) -> StoreResult<Vec<Match>> {
        let inner = self.lock()?;
        let mut rows: Vec<&Stamped<Match>> = inner
            .matches
            .values()
            .filter(|s| s.value.is_active && s.value.has_member(user_id))
            .collect();
        rows.sort_by(|a, b| {
            b.value
                .created_at
                .cmp(&a.value.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(rows.into_iter().map(|s| s.value.clone()).collect())
    }

    fn set_match_active(&self, match_id: Uuid, active: bool) -> StoreResult<Match> {
        let mut inner = self.lock()?;
        let entry = inner
            .matches
            .values_mut()
            .find(|s| s.value.id == match_id)
            .ok_or(StoreError::Database(diesel::result::Error::NotFound))?;

        entry.value.is_active = active;
        Ok(entry.value.clone())
    }
}

impl ConnectionStore for MemoryStore {
    fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(actor: Uuid, target: Uuid) -> NewInterest {
        NewInterest { actor_id: actor, target_id: target, disposition: Disposition::Like }
    }

    #[test]
    fn duplicate_interest_is_a_unique_violation() {
        let store = MemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.insert_interest(&like(a, b)).unwrap();
        assert!(matches!(store.insert_interest(&like(a, b)), Err(StoreError::UniqueViolation)));

        // The reverse direction is a different key.
        store.insert_interest(&like(b, a)).unwrap();
    }

    #[test]
    fn duplicate_match_is_a_unique_violation() {
        let store = MemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.insert_match(a, b).unwrap();
        assert!(matches!(store.insert_match(a, b), Err(StoreError::UniqueViolation)));
    }

    #[test]
    fn interest_targets_follow_latest_change() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store.insert_interest(&like(actor, t1)).unwrap();
        store.insert_interest(&like(actor, t2)).unwrap();
        assert_eq!(store.interest_targets(actor, Disposition::Like).unwrap(), vec![t2, t1]);

        store.update_disposition(first.id, Disposition::Dislike).unwrap();
        store.update_disposition(first.id, Disposition::Like).unwrap();
        assert_eq!(store.interest_targets(actor, Disposition::Like).unwrap(), vec![t1, t2]);
        assert!(store.interest_targets(actor, Disposition::Dislike).unwrap().is_empty());
    }

    #[test]
    fn inactive_matches_are_hidden_from_listing() {
        let store = MemoryStore::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let ab = store.insert_match(a, b).unwrap();
        let ac = store.insert_match(a, c).unwrap();

        let listed: Vec<_> = store.active_matches_for(a).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(listed, vec![ac.id, ab.id]);

        store.set_match_active(ab.id, false).unwrap();
        let listed: Vec<_> = store.active_matches_for(a).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(listed, vec![ac.id]);
        assert!(store.active_matches_for(b).unwrap().is_empty());
    }

    #[test]
    fn profile_lookup_by_user_and_id() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let profile = store.add_profile(user, Some("Ana".into()), 29, Gender::Female, Utc::now()).unwrap();

        assert_eq!(store.profile_for_user(user).unwrap(), Some(profile.clone()));
        assert_eq!(store.profile_by_id(profile.id).unwrap(), Some(profile));
        assert!(store.profile_for_user(Uuid::new_v4()).unwrap().is_none());
        assert!(store.ping().is_ok());
    }

    #[test]
    fn poisoned_lock_fails_every_call_including_seeding() {
        let store = MemoryStore::new();
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.inner.lock().unwrap();
                panic!("poison the store");
            })
            .join()
        });

        assert!(matches!(
            store.add_profile(Uuid::new_v4(), None, 30, Gender::Male, Utc::now()),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(store.profile_for_user(Uuid::new_v4()), Err(StoreError::Poisoned)));
        assert!(matches!(store.ping(), Err(StoreError::Poisoned)));
    }
}
