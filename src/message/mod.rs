//! Message envelopes: email and SMS.
//!
//! The message is owned by the caller. Pipeline stages receive it mutably and
//! only ever touch its subject, sender, recipients and content.

mod address;
mod attachment;
mod content;

pub use address::{AddressError, EmailAddress, PhoneNumber};
pub use attachment::{Attachment, Disposition};
pub use content::{
    Content, ContentWithAttachments, MultiContent, StringContent, TemplateContent,
};

use std::fmt;

/// Delivery channel of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// Kind of email recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: Option<EmailAddress>,
    pub subject: Option<String>,
    pub content: Content,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub attachments: Vec<Attachment>,
}

impl Email {
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            from: None,
            subject: None,
            content: content.into(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn from_address(mut self, from: EmailAddress) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: EmailAddress) -> Self {
        self.to.push(to);
        self
    }

    pub fn cc(mut self, cc: EmailAddress) -> Self {
        self.cc.push(cc);
        self
    }

    pub fn bcc(mut self, bcc: EmailAddress) -> Self {
        self.bcc.push(bcc);
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn recipients_mut(&mut self, kind: RecipientType) -> &mut Vec<EmailAddress> {
        match kind {
            RecipientType::To => &mut self.to,
            RecipientType::Cc => &mut self.cc,
            RecipientType::Bcc => &mut self.bcc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sms {
    pub from: Option<PhoneNumber>,
    pub content: Content,
    pub to: Vec<PhoneNumber>,
}

impl Sms {
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            from: None,
            content: content.into(),
            to: Vec::new(),
        }
    }

    pub fn from_number(mut self, from: PhoneNumber) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: PhoneNumber) -> Self {
        self.to.push(to);
        self
    }
}

/// A message to deliver
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Email(Email),
    Sms(Sms),
}

impl Message {
    pub fn channel(&self) -> Channel {
        match self {
            Message::Email(_) => Channel::Email,
            Message::Sms(_) => Channel::Sms,
        }
    }

    pub fn content(&self) -> &Content {
        match self {
            Message::Email(email) => &email.content,
            Message::Sms(sms) => &sms.content,
        }
    }

    /// Swap the content for a new one, returning the previous content
    pub fn replace_content(&mut self, content: Content) -> Content {
        match self {
            Message::Email(email) => std::mem::replace(&mut email.content, content),
            Message::Sms(sms) => std::mem::replace(&mut sms.content, content),
        }
    }

    pub fn recipient_count(&self) -> usize {
        match self {
            Message::Email(email) => email.to.len() + email.cc.len() + email.bcc.len(),
            Message::Sms(sms) => sms.to.len(),
        }
    }

    pub fn as_email(&self) -> Option<&Email> {
        match self {
            Message::Email(email) => Some(email),
            Message::Sms(_) => None,
        }
    }

    pub fn as_sms(&self) -> Option<&Sms> {
        match self {
            Message::Sms(sms) => Some(sms),
            Message::Email(_) => None,
        }
    }
}

impl From<Email> for Message {
    fn from(email: Email) -> Self {
        Message::Email(email)
    }
}

impl From<Sms> for Message {
    fn from(sms: Sms) -> Self {
        Message::Sms(sms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_content() {
        let mut message = Message::from(Sms::new("old"));
        let previous = message.replace_content(Content::text("new"));
        assert_eq!(previous, Content::text("old"));
        assert_eq!(message.content().as_str(), Some("new"));
        assert_eq!(message.channel(), Channel::Sms);
    }

    #[test]
    fn test_recipient_count() {
        let email = Email::new("body")
            .to(EmailAddress::parse("a@example.com").unwrap())
            .cc(EmailAddress::parse("b@example.com").unwrap())
            .bcc(EmailAddress::parse("c@example.com").unwrap());
        assert_eq!(Message::from(email).recipient_count(), 3);
    }
}
