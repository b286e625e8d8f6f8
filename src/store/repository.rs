use mongodb::Database;

use crate::message::{CHANNEL_MARKER, Message};

use super::Result;

/// Storage-collection key for a chat channel: strip every leading
/// channel marker, then turn hyphens into underscores. Nothing else is
/// normalized, so distinct channels may map to the same collection.
pub fn collection_name(channel: &str) -> String {
    channel.trim_start_matches(CHANNEL_MARKER).replace('-', "_")
}

/// Writes messages into one collection per sanitized channel name.
pub struct MessageRepository {
    db: Database,
}

impl MessageRepository {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    pub async fn insert(&self, message: &Message) -> Result<()> {
        self.db
            .collection::<Message>(&collection_name(&message.channel))
            .insert_one(message)
            .await?;

        Ok(())
    }
}
