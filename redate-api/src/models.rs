use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{matches, reports, swipes, undo_events, user_preferences, users};

// --- Subscription tier ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Plus,
    Gold,
    Platinum,
}

impl Tier {
    /// Parse a tier column value. Unknown values fall back to the most
    /// restrictive tier rather than failing the request.
    pub fn from_db(value: &str) -> Tier {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(tier = %value, "unknown tier value, treating as free");
            Tier::Free
        })
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Plus => write!(f, "plus"),
            Tier::Gold => write!(f, "gold"),
            Tier::Platinum => write!(f, "platinum"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "plus" => Ok(Tier::Plus),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

// --- Swipe action ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Dislike,
    #[serde(rename = "superlike")]
    SuperLike,
}

impl SwipeAction {
    /// Only positive decisions participate in mutual-match resolution.
    pub fn is_positive(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::SuperLike)
    }
}

impl std::fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeAction::Like => write!(f, "like"),
            SwipeAction::Dislike => write!(f, "dislike"),
            SwipeAction::SuperLike => write!(f, "superlike"),
        }
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(SwipeAction::Like),
            "dislike" => Ok(SwipeAction::Dislike),
            "superlike" => Ok(SwipeAction::SuperLike),
            _ => Err(format!("unknown swipe action: {s}")),
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub looking_for: Option<String>,
    pub bio: Option<String>,
    pub photos: serde_json::Value,
    pub verified: bool,
    pub tier: String,
    pub premium_until: Option<DateTime<Utc>>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_last_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn tier(&self) -> Tier {
        Tier::from_db(&self.tier)
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct CompleteProfile {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub looking_for: String,
    pub bio: Option<String>,
    pub photos: serde_json::Value,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = users)]
pub struct UpdateUserProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub looking_for: Option<String>,
    pub gender: Option<String>,
}

// --- UserPreference ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_preferences)]
#[diesel(primary_key(user_id))]
pub struct UserPreference {
    pub user_id: Uuid,
    pub max_distance_km: i32,
    pub min_age: i32,
    pub max_age: i32,
    pub looking_for_gender: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = user_preferences)]
pub struct UpsertPreferences {
    pub user_id: Uuid,
    pub max_distance_km: i32,
    pub min_age: i32,
    pub max_age: i32,
    pub looking_for_gender: Option<String>,
}

// --- Swipe ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub swiped_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub swiper_id: Uuid,
    pub swiped_id: Uuid,
    pub action: String,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub is_unmatched: bool,
    pub unmatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// The member that is not `user_id`.
    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user_a_id == user_id {
            self.user_b_id
        } else {
            self.user_a_id
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
}

// --- UndoEvent ---

// Undo usage is only ever counted, never read back row by row, so there is
// no queryable counterpart.
#[derive(Debug, Insertable)]
#[diesel(table_name = undo_events)]
pub struct NewUndoEvent {
    pub user_id: Uuid,
}

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub match_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub match_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_roundtrip() {
        for tier in [Tier::Free, Tier::Plus, Tier::Gold, Tier::Platinum] {
            assert_eq!(tier.to_string().parse::<Tier>(), Ok(tier));
        }
    }

    #[test]
    fn unknown_tier_falls_back_to_free() {
        assert_eq!(Tier::from_db("vip"), Tier::Free);
    }

    #[test]
    fn action_roundtrip() {
        for action in [SwipeAction::Like, SwipeAction::Dislike, SwipeAction::SuperLike] {
            assert_eq!(action.to_string().parse::<SwipeAction>(), Ok(action));
        }
    }

    #[test]
    fn only_likes_and_superlikes_are_positive() {
        assert!(SwipeAction::Like.is_positive());
        assert!(SwipeAction::SuperLike.is_positive());
        assert!(!SwipeAction::Dislike.is_positive());
    }

    #[test]
    fn partner_of_returns_the_other_member() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let m = Match {
            id: Uuid::new_v4(),
            user_a_id: a.min(b),
            user_b_id: a.max(b),
            is_unmatched: false,
            unmatched_at: None,
            created_at: Utc::now(),
        };
        assert_eq!(m.partner_of(a), b);
        assert_eq!(m.partner_of(b), a);
        assert!(m.involves(a) && m.involves(b));
        assert!(!m.involves(Uuid::new_v4()));
    }
}
