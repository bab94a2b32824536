use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde::Serialize;

use crate::types::event::{DomainEvent, Event};

pub const EXCHANGE_NAME: &str = "matchup.events";

const PERSISTENT: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("broker rejected event {0}")]
    Nacked(uuid::Uuid),
}

/// Publisher for the durable `matchup.events` topic exchange. Channels run in
/// confirm mode, so `publish` resolves once the broker has taken the message.
#[derive(Clone)]
pub struct RabbitMQClient {
    channel: Channel,
}

impl RabbitMQClient {
    pub async fn connect(url: &str) -> Result<Self, lapin::Error> {
        let conn = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = conn.create_channel().await?;

        channel
            .exchange_declare(
                EXCHANGE_NAME,
                ExchangeKind::Topic,
                ExchangeDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await?;
        channel.confirm_select(ConfirmSelectOptions::default()).await?;

        tracing::info!(exchange = EXCHANGE_NAME, "connected to RabbitMQ");
        Ok(Self { channel })
    }

    /// Publishes `event` with its `event_type` as the routing key.
    pub async fn publish<T: DomainEvent>(&self, event: &Event<T>) -> Result<(), PublishError> {
        let payload = encode(event)?;

        let confirmation = self
            .channel
            .basic_publish(
                EXCHANGE_NAME,
                &event.event_type,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_message_id(event.id.to_string().into())
                    .with_delivery_mode(PERSISTENT),
            )
            .await?
            .await?;

        if confirmation.is_nack() {
            return Err(PublishError::Nacked(event.id));
        }

        tracing::debug!(routing_key = %event.event_type, event_id = %event.id, "event published");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.status().connected()
    }
}

fn encode<T: Serialize>(event: &Event<T>) -> Result<Vec<u8>, PublishError> {
    Ok(serde_json::to_vec(event)?)
}
