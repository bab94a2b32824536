use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A payload that can be published on the events exchange.
///
/// Routing keys follow `matchup.{domain}.{entity}.{action}`.
pub trait DomainEvent: Serialize {
    const ROUTING_KEY: &'static str;
}

/// Envelope wrapping every published payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    /// User whose request produced the event.
    pub actor_id: Option<Uuid>,
    pub data: T,
}

impl<T: DomainEvent> Event<T> {
    pub fn new(source: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: T::ROUTING_KEY.to_owned(),
            occurred_at: Utc::now(),
            actor_id: None,
            data,
        }
    }

    pub fn by(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }
}

pub mod routing_keys {
    pub const CONNECTIONS_INTEREST_RECORDED: &str = "matchup.connections.interest.recorded";
    pub const CONNECTIONS_MATCH_CREATED: &str = "matchup.connections.match.created";
    pub const CONNECTIONS_MATCH_DEACTIVATED: &str = "matchup.connections.match.deactivated";
}

pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use super::{routing_keys, DomainEvent};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InterestRecorded {
        pub actor_id: Uuid,
        pub target_id: Uuid,
        /// `like` or `dislike`
        pub disposition: String,
    }

    impl DomainEvent for InterestRecorded {
        const ROUTING_KEY: &'static str = routing_keys::CONNECTIONS_INTEREST_RECORDED;
    }

    /// Published only by the request whose insert created the match.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub member_low: Uuid,
        pub member_high: Uuid,
    }

    impl DomainEvent for MatchCreated {
        const ROUTING_KEY: &'static str = routing_keys::CONNECTIONS_MATCH_CREATED;
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchDeactivated {
        pub match_id: Uuid,
        pub deactivated_by: Uuid,
    }

    impl DomainEvent for MatchDeactivated {
        const ROUTING_KEY: &'static str = routing_keys::CONNECTIONS_MATCH_DEACTIVATED;
    }
}
