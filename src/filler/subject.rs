use std::sync::Arc;

use crate::message::Message;
use crate::subject::{default_subject_provider, SubjectProvider};

use super::{FillResult, MessageFiller};

/// Sets the email subject from the content.
///
/// A subject already set on the email is kept, but a `Subject:` line found in
/// the content is still removed from the body. SMS have no subject and are left
/// alone.
pub struct SubjectFiller {
    provider: Arc<dyn SubjectProvider>,
}

impl Default for SubjectFiller {
    fn default() -> Self {
        Self::new(Arc::new(default_subject_provider()))
    }
}

impl SubjectFiller {
    pub fn new(provider: Arc<dyn SubjectProvider>) -> Self {
        Self { provider }
    }
}

impl MessageFiller for SubjectFiller {
    fn fill(&self, message: &mut Message) -> FillResult<()> {
        let Message::Email(email) = message else {
            return Ok(());
        };
        let Some(found) = self.provider.extract(&email.content) else {
            return Ok(());
        };

        if email.subject.is_none() {
            tracing::debug!(subject = %found.subject, "Subject extracted from content");
            email.subject = Some(found.subject);
        } else {
            tracing::debug!(subject = %found.subject, "Subject already set, extracted subject ignored");
        }
        if let Some(content) = found.content {
            email.content = content;
        }
        Ok(())
    }
}
