use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{integration, message};

pub mod listener;
pub mod publisher;

use listener::{ChatConnection, Listener};
use publisher::MessagePublisher;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("no channels specified")]
    NoChannels,
    #[error("channel {0} should start with '#'")]
    InvalidChannel(String),
    #[error("hand-off point closed before the listener finished")]
    HandoffClosed,

    _Integration(#[from] integration::Error),
    _ParseJson(#[from] serde_json::Error),
    _Publish(#[from] async_nats::jetstream::context::PublishError),
    _Io(#[from] std::io::Error),
    _Join(#[from] tokio::task::JoinError),
}

/// Wires the listener to the single relay worker and runs both to
/// completion. The worker cancels the token when it stops for any
/// reason, so a fatal serialization or publish failure also tears the
/// chat connection down instead of leaving an idle process behind. On
/// graceful shutdown the hand-off closes when the listener returns and
/// joining the worker completes the drain.
pub async fn run<C, P>(
    listener: Listener,
    chat: &mut C,
    publisher: P,
    cancel: CancellationToken,
) -> Result<()>
where
    C: ChatConnection,
    P: MessagePublisher + Send + 'static,
{
    // Capacity 1 is the closest tokio offers to an unbuffered channel;
    // it keeps the listener lock-stepped with the relay worker.
    let (tx, rx) = mpsc::channel(1);

    let worker = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let result = self::publisher::run(publisher, rx).await;
            cancel.cancel();
            result
        }
    });

    let listener_result = listener.run(chat, tx, cancel).await;
    worker.await??;

    listener_result
}

/// Startup validation for the configured channel set. Runs before any
/// connection is attempted; a violation is fatal for the process.
pub fn validate_channels(channels: &[String]) -> Result<()> {
    if channels.is_empty() {
        return Err(Error::NoChannels);
    }

    for channel in channels {
        if !channel.starts_with(message::CHANNEL_MARKER) {
            return Err(Error::InvalidChannel(channel.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    use super::listener::{ChatConnection, ChatEvent, Listener};
    use super::publisher::MessagePublisher;
    use super::{Error, validate_channels};

    /// Chat connection on a quiet channel: once the scripted events run
    /// out it stays connected until a quit is requested.
    struct IdleChat {
        events: VecDeque<ChatEvent>,
        quit_requested: bool,
    }

    #[async_trait]
    impl ChatConnection for IdleChat {
        fn join(&mut self, _channel: &str) -> super::Result<()> {
            Ok(())
        }

        fn quit(&mut self) -> super::Result<()> {
            self.quit_requested = true;
            Ok(())
        }

        async fn next_event(&mut self) -> Option<ChatEvent> {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            if self.quit_requested {
                return None;
            }
            std::future::pending().await
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl MessagePublisher for FailingPublisher {
        async fn submit(&self, _payload: Bytes) -> super::Result<()> {
            Err(io::Error::other("broker unavailable").into())
        }
    }

    #[tokio::test]
    async fn publish_failure_tears_down_the_whole_pipeline() {
        let mut chat = IdleChat {
            events: VecDeque::from(vec![
                ChatEvent::Connected,
                ChatEvent::Message {
                    nick: "alice".into(),
                    text: "hello".into(),
                    channel: "#test".into(),
                    received_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                },
            ]),
            quit_requested: false,
        };
        let listener =
            Listener::new(vec!["#test".into()]).with_join_delay(Duration::ZERO);

        let result = timeout(
            Duration::from_secs(1),
            super::run(listener, &mut chat, FailingPublisher, CancellationToken::new()),
        )
        .await
        .expect("pipeline should end promptly after a publish failure");

        assert!(result.is_err(), "the publish error must surface");
        assert!(chat.quit_requested, "the chat connection must be torn down");
    }

    #[test]
    fn accepts_marked_channels() {
        let channels = vec!["#rust".to_string(), "#my-room".to_string()];
        assert!(validate_channels(&channels).is_ok());
    }

    #[test]
    fn rejects_unmarked_channel() {
        let channels = vec!["#rust".to_string(), "general".to_string()];
        assert!(matches!(
            validate_channels(&channels),
            Err(Error::InvalidChannel(name)) if name == "general"
        ));
    }

    #[test]
    fn rejects_empty_set() {
        assert!(matches!(validate_channels(&[]), Err(Error::NoChannels)));
    }
}
