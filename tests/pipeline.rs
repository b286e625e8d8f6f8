use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use ircsink::message::Message;
use ircsink::relay::listener::{ChatConnection, ChatEvent, Listener};
use ircsink::relay::publisher::MessagePublisher;
use ircsink::relay::{self, Result};
use ircsink::store::repository::collection_name;

struct ScriptedChat {
    events: VecDeque<ChatEvent>,
}

#[async_trait]
impl ChatConnection for ScriptedChat {
    fn join(&mut self, _channel: &str) -> Result<()> {
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events.pop_front()
    }
}

#[derive(Clone, Default)]
struct CollectingPublisher {
    submitted: Arc<Mutex<Vec<Bytes>>>,
}

#[async_trait]
impl MessagePublisher for CollectingPublisher {
    async fn submit(&self, payload: Bytes) -> Result<()> {
        self.submitted.lock().await.push(payload);
        Ok(())
    }
}

/// Inbound chat event, through the listener and the relay worker, down
/// to the payload the store would persist.
#[tokio::test]
async fn event_flows_from_chat_to_storable_record() {
    let received_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut chat = ScriptedChat {
        events: VecDeque::from(vec![
            ChatEvent::Connected,
            ChatEvent::Message {
                nick: "alice".into(),
                text: "hello".into(),
                channel: "#test".into(),
                received_at,
            },
            ChatEvent::Disconnected,
        ]),
    };

    let publisher = CollectingPublisher::default();
    let listener = Listener::new(vec!["#test".into()]).with_join_delay(Duration::ZERO);

    relay::run(
        listener,
        &mut chat,
        publisher.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let submitted = publisher.submitted.lock().await;
    assert_eq!(submitted.len(), 1);

    // Exact wire form, field for field.
    assert_eq!(
        submitted[0].as_ref(),
        br##"{"nick":"alice","message":"hello","channel":"#test","timestamp":"2024-01-01T00:00:00Z"}"##
    );

    // The store's view of the same payload.
    let record: Message = serde_json::from_slice(&submitted[0]).unwrap();
    assert_eq!(record.nick, "alice");
    assert_eq!(record.message, "hello");
    assert_eq!(record.channel, "#test");
    assert_eq!(record.timestamp, received_at);
    assert_eq!(collection_name(&record.channel), "test");
}

/// Channels that sanitize to the same key land in the same collection.
#[tokio::test]
async fn colliding_channels_share_one_collection() {
    let received_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut chat = ScriptedChat {
        events: VecDeque::from(vec![
            ChatEvent::Connected,
            ChatEvent::Message {
                nick: "alice".into(),
                text: "from a-b".into(),
                channel: "#a-b".into(),
                received_at,
            },
            ChatEvent::Message {
                nick: "bob".into(),
                text: "from a_b".into(),
                channel: "#a_b".into(),
                received_at,
            },
            ChatEvent::Disconnected,
        ]),
    };

    let publisher = CollectingPublisher::default();
    let listener =
        Listener::new(vec!["#a-b".into(), "#a_b".into()]).with_join_delay(Duration::ZERO);

    relay::run(
        listener,
        &mut chat,
        publisher.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let submitted = publisher.submitted.lock().await;
    let destinations: Vec<String> = submitted
        .iter()
        .map(|payload| {
            let record: Message = serde_json::from_slice(payload).unwrap();
            collection_name(&record.channel)
        })
        .collect();

    assert_eq!(destinations, vec!["a_b", "a_b"]);
}
