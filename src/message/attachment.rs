use serde::{Deserialize, Serialize};

/// How an attachment is presented by mail clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    #[default]
    Attachment,
    /// Referenced from the HTML body through its Content-ID
    Inline,
}

/// File attached to an email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(with = "serde_bytes_base64")]
    pub content: Vec<u8>,
    pub mimetype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default)]
    pub disposition: Disposition,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: Vec<u8>, mimetype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content,
            mimetype: mimetype.into(),
            content_id: None,
            disposition: Disposition::Attachment,
        }
    }

    /// Inline attachment referenced as `cid:<content_id>`
    pub fn inline(
        name: impl Into<String>,
        content: Vec<u8>,
        mimetype: impl Into<String>,
        content_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content,
            mimetype: mimetype.into(),
            content_id: Some(content_id.into()),
            disposition: Disposition::Inline,
        }
    }
}

mod serde_bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_content_is_base64() {
        let attachment = Attachment::new("a.txt", b"hi".to_vec(), "text/plain");
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["content"], "aGk=");
        assert_eq!(json["disposition"], "attachment");
        assert!(json.get("content_id").is_none());
    }
}
