use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::Properties;

/// Typed settings plus the raw properties they were loaded from.
///
/// Everything lives under the `messaging` root, so the same keys can be set in
/// `config/default.toml` (`[messaging.template] prefix = "templates/"`) or in
/// the environment (`MESSAGING__TEMPLATE__PREFIX=templates/`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub messaging: MessagingSettings,
    #[serde(skip)]
    properties: Properties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingSettings {
    /// Root key of the recipient and sender properties
    /// (`<prefix>.email.to`, `<prefix>.sms.from`, ...)
    #[serde(default = "default_properties_prefix")]
    pub properties_prefix: String,
    #[serde(default)]
    pub template: TemplateSettings,
    #[serde(default)]
    pub resources: ResourceSettings,
    #[serde(default)]
    pub css: CssSettings,
    #[serde(default)]
    pub images: ImageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Parent path prepended to classpath/file template references
    pub prefix: Option<String>,
    /// Extension appended to classpath/file template references
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSettings {
    /// Directories searched by the `classpath:` resolver, in order
    #[serde(default = "default_classpath_roots")]
    pub classpath_roots: Vec<PathBuf>,
    /// Base directory for relative `file:` references
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CssSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    /// Inline images as `cid:` attachments
    #[serde(default = "default_true")]
    pub attach: bool,
    /// Inline images as base64 data URIs
    #[serde(default = "default_true")]
    pub base64: bool,
    /// Mimetype used when neither content nor extension identify an image
    pub default_mimetype: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_properties_prefix() -> String {
    "messaging".to_string()
}

fn default_classpath_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("messaging.properties_prefix", "messaging")?
            .set_default("messaging.template.enabled", true)?
            .set_default("messaging.css.enabled", true)?
            .set_default("messaging.images.attach", true)?
            .set_default("messaging.images.base64", true)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // MESSAGING__TEMPLATE__PREFIX, MESSAGING__EMAIL__TO, etc.
            // Values stay strings so phone numbers keep their leading `+`.
            .add_source(
                Environment::with_prefix("MESSAGING")
                    .separator("__")
                    .keep_prefix(true),
            );

        Self::from_config(builder.build()?)
    }

    /// Deserialize settings from an already built configuration
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut settings: Settings = config.clone().try_deserialize()?;
        settings.properties = Properties::new(config);
        Ok(settings)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            messaging: MessagingSettings::default(),
            properties: Properties::default(),
        }
    }
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            properties_prefix: default_properties_prefix(),
            template: TemplateSettings::default(),
            resources: ResourceSettings::default(),
            css: CssSettings::default(),
            images: ImageSettings::default(),
        }
    }
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: None,
            suffix: None,
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            classpath_roots: default_classpath_roots(),
            base_dir: None,
        }
    }
}

impl Default for CssSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            attach: true,
            base64: true,
            default_mimetype: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.messaging.properties_prefix, "messaging");
        assert!(settings.messaging.template.enabled);
        assert!(settings.messaging.images.attach);
        assert!(settings.messaging.images.base64);
        assert_eq!(
            settings.messaging.resources.classpath_roots,
            vec![PathBuf::from(".")]
        );
    }

    #[test]
    fn test_from_config_keeps_properties() {
        let config = Config::builder()
            .set_override("messaging.template.prefix", "mail/")
            .unwrap()
            .set_override("messaging.images.base64", false)
            .unwrap()
            .set_override("messaging.sms.to", "+1111")
            .unwrap()
            .build()
            .unwrap();

        let settings = Settings::from_config(config).unwrap();
        assert_eq!(settings.messaging.template.prefix.as_deref(), Some("mail/"));
        assert!(!settings.messaging.images.base64);
        assert!(settings.messaging.images.attach);
        assert_eq!(
            settings.properties().get("messaging.sms.to"),
            Some("+1111".to_string())
        );
    }
}
