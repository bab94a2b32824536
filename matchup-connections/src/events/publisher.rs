use uuid::Uuid;

use matchup_shared::clients::rabbitmq::RabbitMQClient;
use matchup_shared::types::event::{payloads, DomainEvent, Event};

use crate::models::{Interest, Match};

const SOURCE: &str = "matchup-connections";

/// Best-effort publish. A missing broker is a no-op and failures are only logged.
async fn publish<T: DomainEvent>(rabbitmq: Option<&RabbitMQClient>, actor_id: Uuid, data: T) {
    let Some(rabbitmq) = rabbitmq else { return };

    let event = Event::new(SOURCE, data).by(actor_id);
    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, event_type = T::ROUTING_KEY, event_id = %event.id, "failed to publish event");
    }
}

pub async fn publish_interest_recorded(rabbitmq: Option<&RabbitMQClient>, interest: &Interest) {
    let data = payloads::InterestRecorded {
        actor_id: interest.actor_id,
        target_id: interest.target_id,
        disposition: interest.disposition.to_string(),
    };
    publish(rabbitmq, interest.actor_id, data).await;
}

pub async fn publish_match_created(rabbitmq: Option<&RabbitMQClient>, created: &Match, actor_id: Uuid) {
    let data = payloads::MatchCreated {
        match_id: created.id,
        member_low: created.member_low,
        member_high: created.member_high,
    };
    publish(rabbitmq, actor_id, data).await;
}

pub async fn publish_match_deactivated(rabbitmq: Option<&RabbitMQClient>, match_id: Uuid, deactivated_by: Uuid) {
    let data = payloads::MatchDeactivated { match_id, deactivated_by };
    publish(rabbitmq, deactivated_by, data).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Disposition;
    use chrono::Utc;

    #[tokio::test]
    async fn publishing_without_broker_is_a_no_op() {
        let now = Utc::now();
        let interest = Interest {
            id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            disposition: Disposition::Like,
            created_at: now,
            updated_at: now,
        };

        publish_interest_recorded(None, &interest).await;
        publish_match_deactivated(None, Uuid::new_v4(), interest.actor_id).await;
    }
}
