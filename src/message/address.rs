//! Recipient address types

use std::fmt;
use std::str::FromStr;

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid email address '{raw}': {reason}")]
    InvalidEmail { raw: String, reason: String },

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// Characters forcing a display name to be quoted
const NAME_SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Email address with an optional display name (`Jane Doe <jane@example.com>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal: Option<String>,
}

impl EmailAddress {
    /// Parses an RFC 5322 mailbox, with or without a display name
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let raw = raw.trim();
        let mailbox: Mailbox = raw.parse().map_err(|e: lettre::address::AddressError| {
            AddressError::InvalidEmail {
                raw: raw.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(mailbox.into())
    }
}

impl From<Mailbox> for EmailAddress {
    fn from(mailbox: Mailbox) -> Self {
        Self {
            address: mailbox.email.to_string(),
            personal: mailbox.name.filter(|name| !name.trim().is_empty()),
        }
    }
}

impl FromStr for EmailAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.personal {
            Some(personal) if personal.contains(NAME_SPECIALS) => {
                let escaped = personal.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\" <{}>", escaped, self.address)
            }
            Some(personal) => write!(f, "{} <{}>", personal, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Phone number as written by the caller (`+33 6 12 34 56 78`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let raw = raw.trim();
        let allowed = raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
        let has_digit = raw.chars().any(|c| c.is_ascii_digit());
        if !allowed || !has_digit {
            return Err(AddressError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_email() {
        let address = EmailAddress::parse(" jane@example.com ").unwrap();
        assert_eq!(address.address, "jane@example.com");
        assert_eq!(address.personal, None);
    }

    #[test]
    fn test_email_with_personal() {
        let address = EmailAddress::parse("\"Jane Doe\" <jane@example.com>").unwrap();
        assert_eq!(address.address, "jane@example.com");
        assert_eq!(address.personal.as_deref(), Some("Jane Doe"));
        assert_eq!(address.to_string(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn test_quoted_personal_with_specials() {
        let address = EmailAddress::parse("\"Doe, Jane <Sales>\" <jane@example.com>").unwrap();
        assert_eq!(address.address, "jane@example.com");
        assert_eq!(address.personal.as_deref(), Some("Doe, Jane <Sales>"));
        assert_eq!(address.to_string(), "\"Doe, Jane <Sales>\" <jane@example.com>");
        assert_eq!(EmailAddress::parse(&address.to_string()).unwrap(), address);
    }

    #[test]
    fn test_unquoted_personal() {
        let address = EmailAddress::parse("Shop <shop@example.com>").unwrap();
        assert_eq!(address.address, "shop@example.com");
        assert_eq!(address.personal.as_deref(), Some("Shop"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(EmailAddress::parse("jane.example.com").is_err());
        assert!(EmailAddress::parse("@example.com").is_err());
        assert!(EmailAddress::parse("jane doe@example.com").is_err());
        assert!(EmailAddress::parse("Jane <jane@example.com").is_err());

        let err = EmailAddress::parse("jane.example.com").unwrap_err();
        assert!(matches!(err, AddressError::InvalidEmail { ref raw, .. } if raw == "jane.example.com"));
    }

    #[test]
    fn test_phone_number() {
        assert_eq!(PhoneNumber::parse("+1111").unwrap().as_str(), "+1111");
        assert!(PhoneNumber::parse("+33 (0)6 12-34.56").is_ok());
        assert!(PhoneNumber::parse("call me").is_err());
        assert!(PhoneNumber::parse("+").is_err());
    }
}
