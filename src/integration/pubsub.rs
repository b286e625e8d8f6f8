use std::env;

use async_trait::async_trait;
use bytes::Bytes;
use log::warn;

use async_nats::jetstream;
use async_nats::jetstream::consumer::PullConsumer;
use async_nats::jetstream::consumer::pull;
use async_nats::jetstream::stream;

use crate::relay;
use crate::relay::publisher::MessagePublisher;

use super::Result;

/// All channels share one durable topic.
pub const TOPIC: &str = "messages";
/// Durable subscription name the store consumes through.
pub const SUBSCRIPTION: &str = "store";

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        warn!("NATS env is not configured, falling back to localhost");
        Self {
            host: String::from("127.0.0.1"),
            port: 4222,
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = env::var("NATS_HOST")?;
        let port = env::var("NATS_PORT")
            .unwrap_or_else(|_| "4222".to_string())
            .parse()?;
        Ok(Self { host, port })
    }
}

pub async fn init(config: &Config) -> Result<jetstream::Context> {
    let client = async_nats::connect(format!("{}:{}", config.host, config.port)).await?;
    Ok(jetstream::new(client))
}

/// Creates the durable topic if the broker does not know it yet.
pub async fn ensure_topic(js: &jetstream::Context) -> Result<stream::Stream> {
    let topic = js
        .get_or_create_stream(stream::Config {
            name: TOPIC.to_string(),
            subjects: vec![TOPIC.to_string()],
            ..stream::Config::default()
        })
        .await?;

    Ok(topic)
}

/// Durable pull subscription for the store process. Redelivery of
/// unacknowledged messages is the broker's job.
pub async fn subscription(js: &jetstream::Context) -> Result<PullConsumer> {
    let topic = ensure_topic(js).await?;

    let consumer = topic
        .get_or_create_consumer(
            SUBSCRIPTION,
            pull::Config {
                durable_name: Some(SUBSCRIPTION.to_string()),
                ..pull::Config::default()
            },
        )
        .await?;

    Ok(consumer)
}

#[async_trait]
impl MessagePublisher for jetstream::Context {
    async fn submit(&self, payload: Bytes) -> relay::Result<()> {
        // The broker ack is left to resolve on its own; only submission
        // failures reach the relay.
        let _ack = self.publish(TOPIC, payload).await?;
        Ok(())
    }
}
