use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use matchup_shared::clients::db::DbPool;

use super::{
    ConnectionStore, InterestStore, MatchStore, PreferenceRepository, ProfileDirectory, StoreError,
    StoreResult,
};
use crate::models::{Disposition, Gender, Interest, Match, NewInterest, Profile};
use crate::schema::{interests, matches, preferences, profiles};
use crate::services::discovery::{DiscoveryPlan, FilterStage};
use crate::services::preferences::PreferenceFilter;

/// Diesel-backed store over the shared r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }
}

// --- Rows ---

#[derive(Debug, Queryable)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    display_name: Option<String>,
    age: i32,
    gender: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> StoreResult<Self> {
        let gender = Gender::from_code(&row.gender)
            .ok_or_else(|| StoreError::Corrupt(format!("profile {} has gender '{}'", row.id, row.gender)))?;

        Ok(Profile {
            id: row.id,
            user_id: row.user_id,
            display_name: row.display_name,
            age: row.age,
            gender,
            created_at: row.created_at,
        })
    }
}

fn into_profiles(rows: Vec<ProfileRow>) -> StoreResult<Vec<Profile>> {
    rows.into_iter().map(Profile::try_from).collect()
}

#[derive(Debug, Queryable)]
struct PreferenceRow {
    #[allow(dead_code)]
    user_id: Uuid,
    min_age: i32,
    max_age: i32,
    preferred_genders: String,
    max_distance: Option<i32>,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = preferences)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
struct PreferenceChanges {
    user_id: Uuid,
    min_age: i32,
    max_age: i32,
    preferred_genders: String,
    max_distance: Option<i32>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Queryable)]
struct InterestRow {
    id: Uuid,
    actor_id: Uuid,
    target_id: Uuid,
    disposition: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterestRow> for Interest {
    type Error = StoreError;

    fn try_from(row: InterestRow) -> StoreResult<Self> {
        let disposition = row
            .disposition
            .parse::<Disposition>()
            .map_err(|e| StoreError::Corrupt(format!("interest {}: {e}", row.id)))?;

        Ok(Interest {
            id: row.id,
            actor_id: row.actor_id,
            target_id: row.target_id,
            disposition,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = interests)]
struct NewInterestRow<'a> {
    id: Uuid,
    actor_id: Uuid,
    target_id: Uuid,
    disposition: &'a str,
}

#[derive(Debug, Queryable)]
struct MatchRow {
    id: Uuid,
    member_low: Uuid,
    member_high: Uuid,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            id: row.id,
            member_low: row.member_low,
            member_high: row.member_high,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
struct NewMatchRow {
    id: Uuid,
    member_low: Uuid,
    member_high: Uuid,
}

// --- Profile directory ---

impl ProfileDirectory for PgStore {
    fn profile_by_id(&self, profile_id: Uuid) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        profiles::table
            .find(profile_id)
            .first::<ProfileRow>(&mut conn)
            .optional()?
            .map(Profile::try_from)
            .transpose()
    }

    fn profile_for_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        profiles::table
            .filter(profiles::user_id.eq(user_id))
            .first::<ProfileRow>(&mut conn)
            .optional()?
            .map(Profile::try_from)
            .transpose()
    }

    fn profiles_for_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let rows = profiles::table
            .filter(profiles::user_id.eq_any(user_ids.to_vec()))
            .order((profiles::created_at.desc(), profiles::id.desc()))
            .load::<ProfileRow>(&mut conn)?;

        into_profiles(rows)
    }

    fn discoverable_profiles(&self, plan: &DiscoveryPlan) -> StoreResult<Vec<Profile>> {
        let mut conn = self.conn()?;
        let rows = discovery_query(plan).load::<ProfileRow>(&mut conn)?;

        into_profiles(rows)
    }
}

/// Pushes every stage of `plan` into one `WHERE`, newest first. Empty
/// exclusion sets add no clause.
fn discovery_query(plan: &DiscoveryPlan) -> profiles::BoxedQuery<'static, Pg> {
    let mut query: profiles::BoxedQuery<'static, Pg> = profiles::table.into_boxed();

    for stage in &plan.stages {
        query = match stage {
            FilterStage::ExcludeSelf(user_id) => query.filter(profiles::user_id.ne(*user_id)),
            FilterStage::ExcludeLiked(ids) | FilterStage::ExcludeDisliked(ids) if ids.is_empty() => query,
            FilterStage::ExcludeLiked(ids) | FilterStage::ExcludeDisliked(ids) => {
                query.filter(profiles::user_id.ne_all(ids.iter().copied().collect::<Vec<_>>()))
            }
            FilterStage::AgeBand { min, max } => query.filter(profiles::age.between(*min, *max)),
            FilterStage::GenderSet(genders) => query.filter(
                profiles::gender.eq_any(genders.iter().map(|g| g.code()).collect::<Vec<_>>()),
            ),
        };
    }

    query.order((profiles::created_at.desc(), profiles::id.desc()))
}

// --- Preferences ---

impl PreferenceRepository for PgStore {
    fn preference_for(&self, user_id: Uuid) -> StoreResult<Option<PreferenceFilter>> {
        let mut conn = self.conn()?;
        let row = preferences::table
            .find(user_id)
            .first::<PreferenceRow>(&mut conn)
            .optional()?;

        row.map(|r| {
            PreferenceFilter::from_stored(r.min_age, r.max_age, &r.preferred_genders, r.max_distance)
                .map_err(|e| StoreError::Corrupt(format!("preferences for {user_id}: {e}")))
        })
        .transpose()
    }

    fn save_preference(&self, user_id: Uuid, filter: &PreferenceFilter) -> StoreResult<()> {
        let changes = PreferenceChanges {
            user_id,
            min_age: filter.min_age(),
            max_age: filter.max_age(),
            preferred_genders: filter.gender_codes(),
            max_distance: filter.max_distance(),
            updated_at: Utc::now(),
        };

        let mut conn = self.conn()?;
        diesel::insert_into(preferences::table)
            .values(&changes)
            .on_conflict(preferences::user_id)
            .do_update()
            .set(&changes)
            .execute(&mut conn)?;

        Ok(())
    }
}

// --- Interests ---

impl InterestStore for PgStore {
    fn find_interest(&self, actor_id: Uuid, target_id: Uuid) -> StoreResult<Option<Interest>> {
        let mut conn = self.conn()?;
        interests::table
            .filter(interests::actor_id.eq(actor_id))
            .filter(interests::target_id.eq(target_id))
            .first::<InterestRow>(&mut conn)
            .optional()?
            .map(Interest::try_from)
            .transpose()
    }

    fn insert_interest(&self, new: &NewInterest) -> StoreResult<Interest> {
        let row = NewInterestRow {
            id: Uuid::now_v7(),
            actor_id: new.actor_id,
            target_id: new.target_id,
            disposition: new.disposition.as_str(),
        };

        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(interests::table)
            .values(&row)
            .get_result::<InterestRow>(&mut conn)?;

        Interest::try_from(inserted)
    }

    fn update_disposition(&self, interest_id: Uuid, disposition: Disposition) -> StoreResult<Interest> {
        let mut conn = self.conn()?;
        let updated = diesel::update(interests::table.find(interest_id))
            .set((
                interests::disposition.eq(disposition.as_str()),
                interests::updated_at.eq(Utc::now()),
            ))
            .get_result::<InterestRow>(&mut conn)?;

        Interest::try_from(updated)
    }

    fn interest_targets(&self, actor_id: Uuid, disposition: Disposition) -> StoreResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        let targets = interests::table
            .filter(interests::actor_id.eq(actor_id))
            .filter(interests::disposition.eq(disposition.as_str()))
            .order((interests::updated_at.desc(), interests::id.desc()))
            .select(interests::target_id)
            .load::<Uuid>(&mut conn)?;

        Ok(targets)
    }
}

// --- Matches ---

impl MatchStore for PgStore {
    fn find_match(&self, low: Uuid, high: Uuid) -> StoreResult<Option<Match>> {
        let mut conn = self.conn()?;
        let row = matches::table
            .filter(matches::member_low.eq(low))
            .filter(matches::member_high.eq(high))
            .first::<MatchRow>(&mut conn)
            .optional()?;

        Ok(row.map(Match::from))
    }

    fn match_by_id(&self, match_id: Uuid) -> StoreResult<Option<Match>> {
        let mut conn = self.conn()?;
        let row = matches::table
            .find(match_id)
            .first::<MatchRow>(&mut conn)
            .optional()?;

        Ok(row.map(Match::from))
    }

    fn insert_match(&self, low: Uuid, high: Uuid) -> StoreResult<Match> {
        let row = NewMatchRow {
            id: Uuid::now_v7(),
            member_low: low,
            member_high: high,
        };

        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(matches::table)
            .values(&row)
            .get_result::<MatchRow>(&mut conn)?;

        Ok(inserted.into())
    }

    fn active_matches_for(&self, user_id: Uuid) -> StoreResult<Vec<Match>> {
        let mut conn = self.conn()?;
        let rows = matches::table
            .filter(matches::is_active.eq(true))
            .filter(matches::member_low.eq(user_id).or(matches::member_high.eq(user_id)))
            .order((matches::created_at.desc(), matches::id.desc()))
            .load::<MatchRow>(&mut conn)?;

        Ok(rows.into_iter().map(Match::from).collect())
    }

    fn set_match_active(&self, match_id: Uuid, active: bool) -> StoreResult<Match> {
        let mut conn = self.conn()?;
        let updated = diesel::update(matches::table.find(match_id))
            .set(matches::is_active.eq(active))
            .get_result::<MatchRow>(&mut conn)?;

        Ok(updated.into())
    }
}

impl ConnectionStore for PgStore {
    fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn sql(plan: &DiscoveryPlan) -> String {
        debug_query::<Pg, _>(&discovery_query(plan)).to_string()
    }

    #[test]
    fn every_stage_reaches_the_where_clause() {
        let viewer = Uuid::new_v4();
        let (liked, disliked) = (Uuid::new_v4(), Uuid::new_v4());
        let prefs = PreferenceFilter::new(25, 35, [Gender::Female, Gender::Other], None).unwrap();

        let sql = sql(&DiscoveryPlan::build(viewer, [liked], [disliked], Some(&prefs)));

        assert!(sql.contains(r#""profiles"."user_id" != $"#), "{sql}");
        assert_eq!(sql.matches("ALL(").count(), 2, "{sql}");
        assert!(sql.contains(r#""profiles"."age" BETWEEN"#), "{sql}");
        assert!(sql.contains(r#""profiles"."gender" = ANY("#), "{sql}");
        assert!(sql.contains(&liked.to_string()) && sql.contains(&disliked.to_string()), "{sql}");
        assert!(sql.contains(r#"ORDER BY "profiles"."created_at" DESC"#), "{sql}");
    }

    #[test]
    fn empty_exclusion_sets_emit_no_all_clause() {
        let sql = sql(&DiscoveryPlan::build(Uuid::new_v4(), [], [], None));

        assert!(!sql.contains("ALL("), "{sql}");
        assert!(!sql.contains("BETWEEN"), "{sql}");
        assert!(sql.contains(r#""profiles"."user_id" != $"#), "{sql}");
    }

    #[test]
    fn only_non_empty_exclusion_set_is_pushed_down() {
        let sql = sql(&DiscoveryPlan::build(Uuid::new_v4(), [Uuid::new_v4()], [], None));

        assert_eq!(sql.matches("ALL(").count(), 1, "{sql}");
    }
}
