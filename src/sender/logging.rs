use async_trait::async_trait;

use crate::message::{Channel, Message};

use super::{accepts, MessageSender, SendResult};

/// Logs messages instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LoggingSender {
    channels: Vec<Channel>,
}

impl LoggingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
        }
    }
}

#[async_trait]
impl MessageSender for LoggingSender {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn supports(&self, message: &Message) -> bool {
        accepts(&self.channels, message)
    }

    async fn send(&self, message: Message) -> SendResult<()> {
        match &message {
            Message::Email(email) => tracing::info!(
                channel = %message.channel(),
                from = ?email.from.as_ref().map(ToString::to_string),
                to = ?email.to.iter().map(ToString::to_string).collect::<Vec<_>>(),
                subject = ?email.subject,
                attachments = email.attachments.len(),
                body = ?email.content.as_str(),
                "Email sent"
            ),
            Message::Sms(sms) => tracing::info!(
                channel = %message.channel(),
                from = ?sms.from.as_ref().map(ToString::to_string),
                to = ?sms.to.iter().map(ToString::to_string).collect::<Vec<_>>(),
                body = ?sms.content.as_str(),
                "SMS sent"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Email, Sms};

    #[test]
    fn test_supports_configured_channels() {
        let sender = LoggingSender::for_channels([Channel::Sms]);
        assert!(sender.supports(&Sms::new("hi").into()));
        assert!(!sender.supports(&Email::new("hi").into()));
        assert!(LoggingSender::new().supports(&Email::new("hi").into()));
    }

    #[test]
    fn test_send_always_succeeds() {
        let sender = LoggingSender::new();
        let result = tokio_test::block_on(sender.send(Sms::new("hi").into()));
        assert!(result.is_ok());
    }
}
