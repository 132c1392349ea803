//! Key/value view over the loaded configuration

use config::{Config, ConfigError, Value, ValueKind};

/// Read-only view over a [`Config`] used by the builders and fillers.
///
/// Keys are dotted paths (`messaging.email.to`). Missing keys are reported as
/// `None`, never as errors.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    config: Config,
}

impl Properties {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build properties from literal key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(key.as_ref(), value)?;
        }
        Ok(Self::new(builder.build()?))
    }

    /// String value of a key. Numbers and booleans are converted.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.config.get_string(key) {
            Ok(value) => Some(value),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "Property is not a string");
                None
            }
        }
    }

    /// Values of a key holding either a list or a comma separated string.
    ///
    /// Tokens are trimmed and empty tokens dropped.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        let value = match self.config.get::<Value>(key) {
            Ok(value) => value,
            Err(ConfigError::NotFound(_)) => return None,
            Err(e) => {
                tracing::debug!(key, error = %e, "Property cannot be read");
                return None;
            }
        };

        let raw: Vec<String> = match value.kind {
            ValueKind::Array(items) => items
                .into_iter()
                .filter_map(|item| item.into_string().ok())
                .collect(),
            ValueKind::Nil => return None,
            ValueKind::Table(_) => {
                tracing::debug!(key, "Property is a table, not a list");
                return None;
            }
            kind => Value::new(None, kind)
                .into_string()
                .ok()
                .map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        };

        Some(
            raw.iter()
                .map(|token| token.trim())
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.config.get::<Value>(key).is_ok()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl From<Config> for Properties {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let properties = Properties::default();
        assert_eq!(properties.get("messaging.email.to"), None);
        assert_eq!(properties.get_list("messaging.email.to"), None);
        assert!(!properties.contains("messaging.email.to"));
    }

    #[test]
    fn test_comma_separated_list() {
        let properties =
            Properties::from_pairs([("messaging.sms.to", " +1111 ,, +2222 ")]).unwrap();
        assert_eq!(
            properties.get_list("messaging.sms.to"),
            Some(vec!["+1111".to_string(), "+2222".to_string()])
        );
    }

    #[test]
    fn test_array_list() {
        let config = Config::builder()
            .set_override("messaging.email.cc", vec!["a@example.com", "b@example.com"])
            .unwrap()
            .build()
            .unwrap();
        let properties = Properties::new(config);
        assert_eq!(
            properties.get_list("messaging.email.cc"),
            Some(vec!["a@example.com".to_string(), "b@example.com".to_string()])
        );
    }

    #[test]
    fn test_number_converted_to_string() {
        let properties = Properties::from_pairs([("retries", 3)]).unwrap();
        assert_eq!(properties.get("retries"), Some("3".to_string()));
    }
}
