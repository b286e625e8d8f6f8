use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::message::Message;

use super::{Error, Result};

/// Closed set of events the chat-protocol collaborator emits. The
/// listener consumes these through one dispatch loop instead of
/// registering per-event callbacks on the connection.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    Connected,
    Message {
        nick: String,
        text: String,
        channel: String,
        received_at: DateTime<Utc>,
    },
    Disconnected,
}

/// Seam to the chat protocol. `integration::chat` provides the IRC-backed
/// implementation; tests script their own.
#[async_trait]
pub trait ChatConnection {
    fn join(&mut self, channel: &str) -> Result<()>;

    /// Request a graceful disconnect. The event stream keeps delivering
    /// until the server closes the connection.
    fn quit(&mut self) -> Result<()>;

    /// Next protocol event, or `None` once the connection is gone.
    async fn next_event(&mut self) -> Option<ChatEvent>;
}

/// Ingestion loop: joins the configured channels once connected and turns
/// every inbound chat line into a [`Message`] pushed through the hand-off
/// channel. Holds the sending half for its whole run, so the hand-off
/// closes exactly when this loop returns.
pub struct Listener {
    channels: Vec<String>,
    join_delay: Duration,
}

impl Listener {
    pub fn new(channels: Vec<String>) -> Self {
        Self {
            channels,
            join_delay: Duration::from_secs(1),
        }
    }

    /// Override the pause between channel joins (flood-limit pacing).
    pub fn with_join_delay(mut self, join_delay: Duration) -> Self {
        self.join_delay = join_delay;
        self
    }

    pub async fn run<C: ChatConnection>(
        &self,
        chat: &mut C,
        handoff: mpsc::Sender<Message>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut quitting = false;

        loop {
            if !quitting && cancel.is_cancelled() {
                info!("disconnect requested, quitting chat server");
                chat.quit()?;
                quitting = true;
            }

            let event = if quitting {
                // Quit is already on the wire; drain until the server
                // closes the connection.
                chat.next_event().await
            } else {
                tokio::select! {
                    // Cancellation takes priority over the event stream.
                    biased;

                    _ = cancel.cancelled() => continue,
                    event = chat.next_event() => event,
                }
            };

            match event {
                Some(ChatEvent::Connected) => {
                    for channel in &self.channels {
                        info!("joining {channel}");
                        chat.join(channel)?;
                        tokio::time::sleep(self.join_delay).await;
                    }
                }
                Some(ChatEvent::Message { nick, text, channel, received_at }) => {
                    debug!("{channel} <{nick}> {text}");
                    let message = Message::new(nick, text, channel, received_at);
                    handoff
                        .send(message)
                        .await
                        .map_err(|_| Error::HandoffClosed)?;
                }
                Some(ChatEvent::Disconnected) | None => {
                    info!("chat connection closed");
                    break;
                }
            }
        }

        Ok(())
    }
}
