use async_nats::jetstream::AckKind;
use async_nats::jetstream::consumer::PullConsumer;
use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::message::Message;

use super::repository::{MessageRepository, collection_name};
use super::{Error, Result};

/// Persists queued messages. Each delivery is handled independently:
/// decode the wire payload, insert into the collection derived from the
/// channel name. A failed delivery is NAKed so the broker redelivers it
/// (at-least-once); there is no retry bookkeeping and no dead-letter
/// path here.
pub struct StoreHandler {
    repository: MessageRepository,
}

impl StoreHandler {
    pub fn new(repository: MessageRepository) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, payload: &[u8]) -> Result<()> {
        let message: Message = serde_json::from_slice(payload)?;

        debug!(
            "storing message from {} into {}",
            message.nick,
            collection_name(&message.channel)
        );
        self.repository.insert(&message).await
    }

    pub async fn run(&self, consumer: PullConsumer, cancel: CancellationToken) -> Result<()> {
        let mut deliveries = consumer.messages().await?;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("termination requested, leaving the subscription");
                    break;
                }
                delivery = deliveries.next() => match delivery {
                    None => break,
                    // Transient stream conditions (missed heartbeats and
                    // the like); the subscription itself keeps going.
                    Some(Err(e)) => warn!("message stream error: {e}"),
                    Some(Ok(delivery)) => match self.handle(&delivery.payload).await {
                        Ok(()) => delivery.ack().await.map_err(Error::Ack)?,
                        Err(e) => {
                            error!("failed to store message, leaving it for redelivery: {e}");
                            delivery
                                .ack_with(AckKind::Nak(None))
                                .await
                                .map_err(Error::Ack)?;
                        }
                    },
                }
            }
        }

        Ok(())
    }
}
