use chrono::{Datelike, NaiveDate};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Double;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use redate_shared::clients::redis::RedisClient;

use crate::geo::{self, BoundingBox};
use crate::models::{User, UserPreference};
use crate::schema::{swipes, users};

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
pub const DEFAULT_MIN_AGE: i32 = 18;
pub const DEFAULT_MAX_AGE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedFilters {
    pub max_distance_km: f64,
    pub min_age: i32,
    pub max_age: i32,
}

/// Stored preferences override request parameters; request parameters
/// override the built-in defaults.
pub fn effective_filters(
    prefs: Option<&UserPreference>,
    distance: Option<f64>,
    min_age: Option<i32>,
    max_age: Option<i32>,
) -> FeedFilters {
    FeedFilters {
        max_distance_km: prefs
            .map(|p| p.max_distance_km as f64)
            .unwrap_or_else(|| distance.unwrap_or(DEFAULT_MAX_DISTANCE_KM)),
        min_age: prefs
            .map(|p| p.min_age)
            .unwrap_or_else(|| min_age.unwrap_or(DEFAULT_MIN_AGE)),
        max_age: prefs
            .map(|p| p.max_age)
            .unwrap_or_else(|| max_age.unwrap_or(DEFAULT_MAX_AGE)),
    }
}

fn years_before(date: NaiveDate, years: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - years, date.month(), date.day())
        // Feb 29 on a non-leap target year clamps to Feb 28.
        .or_else(|| NaiveDate::from_ymd_opt(date.year() - years, date.month(), 28))
        .unwrap_or(date)
}

/// Inclusive birth-date window for an age range: the oldest admissible
/// candidate was born `max_age` years ago, the youngest `min_age` years ago.
pub fn birth_date_window(today: NaiveDate, min_age: i32, max_age: i32) -> (NaiveDate, NaiveDate) {
    (years_before(today, max_age), years_before(today, min_age))
}

/// Completed years of age on `today`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Candidate query: eligible, inside the bounding box, never judged by the
/// viewer. Random order per page; pagination is deliberately unstable, which
/// is acceptable for a discovery feed.
pub fn candidates(
    conn: &mut PgConnection,
    viewer_id: Uuid,
    bbox: &BoundingBox,
    birth_window: (NaiveDate, NaiveDate),
    limit: i64,
    offset: i64,
) -> QueryResult<Vec<User>> {
    let judged = swipes::table
        .filter(swipes::swiper_id.eq(viewer_id))
        .select(swipes::swiped_id);

    users::table
        .filter(users::deleted_at.is_null())
        .filter(users::id.ne(viewer_id))
        .filter(users::verified.eq(true))
        .filter(users::location_lat.between(bbox.min_lat, bbox.max_lat))
        .filter(users::location_lng.between(bbox.min_lng, bbox.max_lng))
        .filter(users::birth_date.between(birth_window.0, birth_window.1))
        .filter(users::id.ne_all(judged))
        .order(sql::<Double>("RANDOM()"))
        .limit(limit)
        .offset(offset)
        .load::<User>(conn)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub looking_for: Option<String>,
    pub bio: Option<String>,
    pub photos: serde_json::Value,
    pub tier: String,
    pub distance_km: i32,
}

/// Exact post-filter over the coarse box: compute the true great-circle
/// distance, drop anything past the radius, annotate age and rounded km.
pub fn annotate(
    viewer_lat: f64,
    viewer_lng: f64,
    candidates: Vec<User>,
    max_distance_km: f64,
    today: NaiveDate,
) -> Vec<CandidateProfile> {
    candidates
        .into_iter()
        .filter_map(|user| {
            let (lat, lng) = match (user.location_lat, user.location_lng) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => return None,
            };
            let distance = geo::haversine_km(viewer_lat, viewer_lng, lat, lng);
            if distance > max_distance_km {
                return None;
            }
            Some(CandidateProfile {
                id: user.id,
                name: user.name,
                age: user.birth_date.map(|b| age_on(b, today)),
                gender: user.gender,
                looking_for: user.looking_for,
                bio: user.bio,
                photos: user.photos,
                tier: user.tier,
                distance_km: distance.round() as i32,
            })
        })
        .collect()
}

pub fn cache_key(user_id: Uuid) -> String {
    format!("user:{user_id}:feed")
}

/// Best-effort: a failed delete only costs freshness, never the request.
pub async fn invalidate_feed(redis: &RedisClient, user_id: Uuid) {
    if let Err(e) = redis.del(&cache_key(user_id)).await {
        tracing::warn!(error = %e, user_id = %user_id, "feed cache invalidation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn prefs(max_distance_km: i32, min_age: i32, max_age: i32) -> UserPreference {
        UserPreference {
            user_id: Uuid::new_v4(),
            max_distance_km,
            min_age,
            max_age,
            looking_for_gender: None,
            updated_at: Utc::now(),
        }
    }

    fn user_at(lat: f64, lng: f64, birth_date: Option<NaiveDate>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "candidate@example.com".into(),
            phone: None,
            name: Some("Candidate".into()),
            birth_date,
            gender: Some("woman".into()),
            looking_for: Some("men".into()),
            bio: None,
            photos: serde_json::json!([]),
            verified: true,
            tier: "free".into(),
            premium_until: None,
            location_lat: Some(lat),
            location_lng: Some(lng),
            location_last_seen: Some(Utc::now()),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn preferences_override_request_params() {
        let p = prefs(100, 25, 35);
        let filters = effective_filters(Some(&p), Some(10.0), Some(18), Some(99));
        assert_eq!(filters.max_distance_km, 100.0);
        assert_eq!(filters.min_age, 25);
        assert_eq!(filters.max_age, 35);
    }

    #[test]
    fn request_params_override_defaults() {
        let filters = effective_filters(None, Some(30.0), Some(21), Some(40));
        assert_eq!(filters.max_distance_km, 30.0);
        assert_eq!(filters.min_age, 21);
        assert_eq!(filters.max_age, 40);
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let filters = effective_filters(None, None, None, None);
        assert_eq!(filters.max_distance_km, DEFAULT_MAX_DISTANCE_KM);
        assert_eq!(filters.min_age, DEFAULT_MIN_AGE);
        assert_eq!(filters.max_age, DEFAULT_MAX_AGE);
    }

    #[test]
    fn birth_window_bounds_the_age_range() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (earliest, latest) = birth_date_window(today, 18, 30);
        assert_eq!(earliest, NaiveDate::from_ymd_opt(1994, 6, 15).unwrap());
        assert_eq!(latest, NaiveDate::from_ymd_opt(2006, 6, 15).unwrap());
        assert_eq!(age_on(latest, today), 18);
        assert_eq!(age_on(earliest, today), 30);
    }

    #[test]
    fn age_counts_completed_years_only() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 16).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        assert_eq!(age_on(birth, day_before), 23);
        assert_eq!(age_on(birth, birthday), 24);
    }

    #[test]
    fn leap_day_birth_clamps_to_feb_28() {
        let today = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        let clamped = years_before(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), 1);
        assert_eq!(clamped, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert_eq!(today, clamped);
    }

    #[test]
    fn annotate_drops_candidates_beyond_the_radius() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        // Viewer in Paris; one candidate nearby, one in London.
        let near = user_at(48.86, 2.36, NaiveDate::from_ymd_opt(1996, 1, 1));
        let far = user_at(51.5074, -0.1278, NaiveDate::from_ymd_opt(1996, 1, 1));
        let near_id = near.id;

        let out = annotate(48.8566, 2.3522, vec![near, far], 50.0, today);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, near_id);
        assert_eq!(out[0].age, Some(28));
        assert!(out[0].distance_km <= 50);
    }

    #[test]
    fn annotate_is_zero_km_for_same_location() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let twin = user_at(48.8566, 2.3522, None);
        let out = annotate(48.8566, 2.3522, vec![twin], 50.0, today);
        assert_eq!(out[0].distance_km, 0);
        assert_eq!(out[0].age, None);
    }

    #[test]
    fn feed_cache_key_shape() {
        let id = Uuid::nil();
        assert_eq!(
            cache_key(id),
            "user:00000000-0000-0000-0000-000000000000:feed"
        );
    }
}
