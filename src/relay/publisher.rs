use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use tokio::sync::mpsc;

use crate::message::Message;

use super::Result;

/// Submission side of the queue. The production implementation is the
/// JetStream context in `integration::pubsub`; submission failure is
/// fatal for the whole ingestion process.
#[async_trait]
pub trait MessagePublisher {
    async fn submit(&self, payload: Bytes) -> Result<()>;
}

/// The single relay worker. Pulls messages from the hand-off channel one
/// at a time, serializes each to its wire form and submits it to the
/// queue. Returns only once the hand-off is closed and fully drained, so
/// joining this task completes the graceful drain.
pub async fn run<P: MessagePublisher>(
    publisher: P,
    mut handoff: mpsc::Receiver<Message>,
) -> Result<()> {
    while let Some(message) = handoff.recv().await {
        let payload = serde_json::to_vec(&message)?;
        publisher.submit(payload.into()).await?;
        debug!("published message from {} in {}", message.nick, message.channel);
    }

    info!("hand-off closed, relay drained");
    Ok(())
}
