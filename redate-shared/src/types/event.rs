use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ Event envelope wrapping all domain events.
///
/// Routing key format: `redate.{entity}.{action}`
/// Example: `redate.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Match events
    pub const MATCH_CREATED: &str = "redate.match.created";
    pub const MATCH_UNMATCHED: &str = "redate.match.unmatched";

    // Swipe events
    pub const SWIPE_UNDONE: &str = "redate.swipe.undone";

    // Moderation events
    pub const MATCH_REPORTED: &str = "redate.match.reported";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// Consumed by the push relay: `recipient_id` + rendered template text.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
        pub recipient_id: Uuid,
        pub template: String,
        pub title: String,
        pub body: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchUnmatched {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
        pub actor_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeUndone {
        pub actor_id: Uuid,
        pub target_id: Uuid,
        pub match_removed: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchReported {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub reported_id: Uuid,
        pub match_id: Uuid,
        pub reason: String,
    }
}
