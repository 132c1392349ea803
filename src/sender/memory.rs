//! In-memory sender keeping every delivered message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::message::{Channel, Message};

use super::{accepts, MessageSender, SendError, SendResult};

/// A message accepted by the [`InMemorySender`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub id: Uuid,
    pub message: Message,
    pub sent_at: DateTime<Utc>,
}

/// Stores messages instead of delivering them.
///
/// Restricted to some channels with [`for_channels`](Self::for_channels),
/// otherwise accepts everything.
#[derive(Default)]
pub struct InMemorySender {
    channels: Vec<Channel>,
    sent: RwLock<Vec<SentMessage>>,
}

impl InMemorySender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
            sent: RwLock::new(Vec::new()),
        }
    }

    /// Messages sent so far, oldest first
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn clear(&self) {
        self.sent.write().await.clear();
    }
}

#[async_trait]
impl MessageSender for InMemorySender {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn supports(&self, message: &Message) -> bool {
        accepts(&self.channels, message)
    }

    async fn send(&self, message: Message) -> SendResult<()> {
        if message.recipient_count() == 0 {
            return Err(SendError::NoRecipient {
                channel: message.channel(),
            });
        }

        let sent = SentMessage {
            id: Uuid::new_v4(),
            message,
            sent_at: Utc::now(),
        };

        let mut store = self.sent.write().await;
        tracing::debug!(
            id = %sent.id,
            channel = %sent.message.channel(),
            stored = store.len() + 1,
            "Message stored"
        );
        store.push(sent);
        Ok(())
    }
}
