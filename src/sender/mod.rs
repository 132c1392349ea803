//! Transport boundary.
//!
//! Actual delivery (SMTP, SMS gateways) is delegated to [`MessageSender`]
//! implementations. The crate ships an in-memory sender for tests and a
//! logging sender for demos.

mod logging;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{Channel, Message};

pub use logging::LoggingSender;
pub use memory::{InMemorySender, SentMessage};

/// Sender-specific error type
#[derive(Debug, Error)]
pub enum SendError {
    /// No registered sender handles the message
    #[error("No sender available for {channel} message")]
    NoSender { channel: Channel },

    /// The message has no recipient
    #[error("{channel} message has no recipient")]
    NoRecipient { channel: Channel },

    /// The transport refused the message
    #[error("Sender {sender} failed: {message}")]
    Transport {
        sender: &'static str,
        message: String,
    },
}

/// Result type for sender operations
pub type SendResult<T> = Result<T, SendError>;

/// Delivers messages over one or more channels
#[async_trait]
pub trait MessageSender: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this sender can deliver the message
    fn supports(&self, message: &Message) -> bool;

    async fn send(&self, message: Message) -> SendResult<()>;
}

fn accepts(channels: &[Channel], message: &Message) -> bool {
    channels.is_empty() || channels.contains(&message.channel())
}
