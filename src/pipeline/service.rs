use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;
use crate::sender::{MessageSender, SendError};

use super::MessagePipeline;

/// Prepares messages and delivers them through the first sender supporting
/// their channel
pub struct MessagingService {
    pipeline: MessagePipeline,
    senders: Vec<Arc<dyn MessageSender>>,
}

impl MessagingService {
    pub(crate) fn new(pipeline: MessagePipeline, senders: Vec<Arc<dyn MessageSender>>) -> Self {
        Self { pipeline, senders }
    }

    pub fn pipeline(&self) -> &MessagePipeline {
        &self.pipeline
    }

    /// Run the pipeline without sending. Attachments produced by inlining are
    /// moved onto the email.
    pub fn prepare(&self, message: impl Into<Message>) -> Result<Message> {
        let message = self.pipeline.prepare(message.into())?;
        Ok(collect_attachments(message))
    }

    pub async fn send(&self, message: impl Into<Message>) -> Result<()> {
        let message = self.prepare(message)?;
        let channel = message.channel();

        let sender = self
            .senders
            .iter()
            .find(|sender| sender.supports(&message))
            .ok_or(SendError::NoSender { channel })?;

        tracing::debug!(
            channel = %channel,
            sender = sender.name(),
            recipients = message.recipient_count(),
            "Sending message"
        );
        sender.send(message).await?;
        Ok(())
    }
}

fn collect_attachments(message: Message) -> Message {
    match message {
        Message::Email(mut email) => {
            let (content, attachments) = email.content.take_attachments();
            email.content = content;
            email.attachments.extend(attachments);
            Message::Email(email)
        }
        Message::Sms(mut sms) => {
            let (content, attachments) = sms.content.take_attachments();
            if !attachments.is_empty() {
                tracing::warn!(dropped = attachments.len(), "SMS cannot carry attachments");
            }
            sms.content = content;
            Message::Sms(sms)
        }
    }
}
