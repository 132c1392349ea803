use crate::config::Properties;
use crate::message::{AddressError, EmailAddress, Message, PhoneNumber, RecipientType};

use super::{FillError, FillResult, MessageFiller};

const EMAIL_RECIPIENTS: &[(RecipientType, &str)] = &[
    (RecipientType::To, "email.to"),
    (RecipientType::Cc, "email.cc"),
    (RecipientType::Bcc, "email.bcc"),
];

/// Adds recipients read from `<prefix>.email.to|cc|bcc` and `<prefix>.sms.to`.
///
/// Values are lists or comma separated strings. Recipients already on the
/// message are not added twice; missing keys are ignored.
#[derive(Debug, Clone)]
pub struct PropertiesFiller {
    properties: Properties,
    prefix: String,
}

impl PropertiesFiller {
    pub fn new(properties: Properties, prefix: impl Into<String>) -> Self {
        Self {
            properties,
            prefix: prefix.into(),
        }
    }

    fn values(&self, key: &str) -> (String, Vec<String>) {
        let key = format!("{}.{}", self.prefix, key);
        let values = self.properties.get_list(&key).unwrap_or_default();
        (key, values)
    }
}

impl MessageFiller for PropertiesFiller {
    fn fill(&self, message: &mut Message) -> FillResult<()> {
        match message {
            Message::Email(email) => {
                for (kind, suffix) in EMAIL_RECIPIENTS {
                    let (key, values) = self.values(suffix);
                    for value in values {
                        let address = parse(&key, &value, EmailAddress::parse)?;
                        let recipients = email.recipients_mut(*kind);
                        if !recipients.contains(&address) {
                            tracing::debug!(key = %key, recipient = %address, "Recipient added from properties");
                            recipients.push(address);
                        }
                    }
                }
            }
            Message::Sms(sms) => {
                let (key, values) = self.values("sms.to");
                for value in values {
                    let number = parse(&key, &value, PhoneNumber::parse)?;
                    if !sms.to.contains(&number) {
                        tracing::debug!(key = %key, recipient = %number, "Recipient added from properties");
                        sms.to.push(number);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Sets the sender from `<prefix>.email.from` or `<prefix>.sms.from` when the
/// message has none.
#[derive(Debug, Clone)]
pub struct MessageAwareFiller {
    properties: Properties,
    prefix: String,
}

impl MessageAwareFiller {
    pub fn new(properties: Properties, prefix: impl Into<String>) -> Self {
        Self {
            properties,
            prefix: prefix.into(),
        }
    }

    fn value(&self, key: &str) -> Option<(String, String)> {
        let key = format!("{}.{}", self.prefix, key);
        let value = self.properties.get(&key)?;
        let value = value.trim();
        (!value.is_empty()).then(|| (key, value.to_string()))
    }
}

impl MessageFiller for MessageAwareFiller {
    fn fill(&self, message: &mut Message) -> FillResult<()> {
        match message {
            Message::Email(email) if email.from.is_none() => {
                if let Some((key, value)) = self.value("email.from") {
                    email.from = Some(parse(&key, &value, EmailAddress::parse)?);
                }
            }
            Message::Sms(sms) if sms.from.is_none() => {
                if let Some((key, value)) = self.value("sms.from") {
                    sms.from = Some(parse(&key, &value, PhoneNumber::parse)?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse<T, F>(key: &str, value: &str, parser: F) -> FillResult<T>
where
    F: FnOnce(&str) -> Result<T, AddressError>,
{
    parser(value).map_err(|source| FillError::InvalidProperty {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Email, Sms};

    fn properties() -> Properties {
        Properties::from_pairs([
            ("messaging.sms.to", "+1111,+2222"),
            ("messaging.sms.from", "+3333"),
            ("messaging.email.to", "a@example.com, b@example.com"),
            ("messaging.email.bcc", "audit@example.com"),
            ("messaging.email.from", "Ara <noreply@example.com>"),
        ])
        .unwrap()
    }

    #[test]
    fn test_sms_recipients_in_order() {
        let mut message = Message::from(Sms::new("hello"));
        PropertiesFiller::new(properties(), "messaging")
            .fill(&mut message)
            .unwrap();

        let to: Vec<_> = message.as_sms().unwrap().to.iter().map(|n| n.as_str().to_string()).collect();
        assert_eq!(to, vec!["+1111", "+2222"]);
    }

    #[test]
    fn test_existing_recipients_not_duplicated() {
        let mut message = Message::from(Sms::new("hello").to(PhoneNumber::parse("+2222").unwrap()));
        let filler = PropertiesFiller::new(properties(), "messaging");
        filler.fill(&mut message).unwrap();
        filler.fill(&mut message).unwrap();

        let to: Vec<_> = message.as_sms().unwrap().to.iter().map(|n| n.as_str().to_string()).collect();
        assert_eq!(to, vec!["+2222", "+1111"]);
    }

    #[test]
    fn test_email_recipients() {
        let mut message = Message::from(Email::new("hello"));
        PropertiesFiller::new(properties(), "messaging")
            .fill(&mut message)
            .unwrap();

        let email = message.as_email().unwrap();
        assert_eq!(email.to.len(), 2);
        assert!(email.cc.is_empty());
        assert_eq!(email.bcc[0].address, "audit@example.com");
    }

    #[test]
    fn test_invalid_recipient() {
        let properties = Properties::from_pairs([("messaging.email.to", "not-an-address")]).unwrap();
        let err = PropertiesFiller::new(properties, "messaging")
            .fill(&mut Message::from(Email::new("hello")))
            .unwrap_err();
        match err {
            FillError::InvalidProperty { key, value, .. } => {
                assert_eq!(key, "messaging.email.to");
                assert_eq!(value, "not-an-address");
            }
        }
    }

    #[test]
    fn test_other_prefix_ignored() {
        let mut message = Message::from(Sms::new("hello"));
        PropertiesFiller::new(properties(), "other")
            .fill(&mut message)
            .unwrap();
        assert!(message.as_sms().unwrap().to.is_empty());
    }

    #[test]
    fn test_from_filled_when_unset() {
        let filler = MessageAwareFiller::new(properties(), "messaging");

        let mut email = Message::from(Email::new("hello"));
        filler.fill(&mut email).unwrap();
        let from = email.as_email().unwrap().from.clone().unwrap();
        assert_eq!(from.address, "noreply@example.com");
        assert_eq!(from.personal.as_deref(), Some("Ara"));

        let explicit = PhoneNumber::parse("+9999").unwrap();
        let mut sms = Message::from(Sms::new("hello").from_number(explicit.clone()));
        filler.fill(&mut sms).unwrap();
        assert_eq!(sms.as_sms().unwrap().from, Some(explicit));
    }
}
