use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leading character every raw IRC channel name carries.
pub const CHANNEL_MARKER: char = '#';

/// One chat event as it travels through the pipeline: produced by the
/// listener, published to the queue, persisted by the store. The
/// `channel` field keeps its raw form (marker included) end to end;
/// collection names are derived from it at the storage boundary only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub nick: String,
    pub message: String,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        nick: impl Into<String>,
        message: impl Into<String>,
        channel: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            nick: nick.into(),
            message: message.into(),
            channel: channel.into(),
            timestamp,
        }
    }
}
