//! Template parser construction

use std::sync::Arc;

use crate::config::Properties;
use crate::resource::{ResourceResolver, ResourceResolverBuilder};

use super::auto_detect::DetectedParser;
use super::{
    AutoDetectTemplateParser, ContentMarkerEngineDetector, FixedEngineDetector, JinjaEngine,
    SubstitutionEngine, TemplateEngine, TemplateEngineDetector, TemplateError, TemplateParser,
    TemplateResult,
};

/// Property holding the parent path prepended to template references
pub const DEFAULT_PARENT_PATH_KEY: &str = "messaging.template.prefix";

/// Property holding the extension appended to template references
pub const DEFAULT_EXTENSION_KEY: &str = "messaging.template.suffix";

struct Registration {
    engine: Box<dyn TemplateEngine>,
    detector: Box<dyn TemplateEngineDetector>,
}

/// Registers template engines and builds the [`TemplateParser`].
///
/// - no engine registered: [`build`](Self::build) fails
/// - one engine: its parser is returned as is, detection never runs
/// - several engines: an [`AutoDetectTemplateParser`] asking detectors in
///   registration order
pub struct TemplateParserBuilder {
    registrations: Vec<Registration>,
    resolvers: Option<ResourceResolverBuilder>,
    parent_path: Option<String>,
    extension: Option<String>,
    parent_path_key: String,
    extension_key: String,
    properties: Option<Properties>,
}

impl Default for TemplateParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateParserBuilder {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            resolvers: None,
            parent_path: None,
            extension: None,
            parent_path_key: DEFAULT_PARENT_PATH_KEY.to_string(),
            extension_key: DEFAULT_EXTENSION_KEY.to_string(),
            properties: None,
        }
    }

    /// Default resolvers, Jinja for templates containing `{%`/`{#`, and
    /// `{{variable}}` substitution for everything else.
    pub fn use_defaults(self, properties: Properties) -> Self {
        self.properties(properties)
            .resolvers(ResourceResolverBuilder::new().use_defaults())
            .register(JinjaEngine, ContentMarkerEngineDetector::new(["{%", "{#"]))
            .register_engine(SubstitutionEngine)
    }

    /// Register an engine guarded by a detector. Registration order is the
    /// detection order.
    pub fn register<E, D>(mut self, engine: E, detector: D) -> Self
    where
        E: TemplateEngine + 'static,
        D: TemplateEngineDetector + 'static,
    {
        self.registrations.push(Registration {
            engine: Box::new(engine),
            detector: Box::new(detector),
        });
        self
    }

    /// Register an engine that accepts every template
    pub fn register_engine<E>(self, engine: E) -> Self
    where
        E: TemplateEngine + 'static,
    {
        self.register(engine, FixedEngineDetector)
    }

    pub fn resolvers(mut self, resolvers: ResourceResolverBuilder) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    pub fn parent_path(mut self, parent_path: impl Into<String>) -> Self {
        self.parent_path = Some(parent_path.into());
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Property key read for the parent path when none is set explicitly
    pub fn parent_path_key(mut self, key: impl Into<String>) -> Self {
        self.parent_path_key = key.into();
        self
    }

    /// Property key read for the extension when none is set explicitly
    pub fn extension_key(mut self, key: impl Into<String>) -> Self {
        self.extension_key = key.into();
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn engine_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn build(self) -> TemplateResult<Arc<dyn TemplateParser>> {
        if self.registrations.is_empty() {
            return Err(TemplateError::Configuration(
                "No template engine registered. Either disable templates or register an engine"
                    .to_string(),
            ));
        }

        let parent_path = self.resolve(
            "parent path",
            self.parent_path.as_deref(),
            &self.parent_path_key,
            DEFAULT_PARENT_PATH_KEY,
        );
        let extension = self.resolve(
            "extension",
            self.extension.as_deref(),
            &self.extension_key,
            DEFAULT_EXTENSION_KEY,
        );

        let resolvers = self
            .resolvers
            .unwrap_or_else(|| ResourceResolverBuilder::new().use_defaults());
        let resolver: Arc<dyn ResourceResolver> = Arc::new(
            resolvers
                .parent_path(parent_path.clone())
                .extension(extension.clone())
                .build(),
        );

        if self.registrations.len() == 1 {
            let registration = &self.registrations[0];
            tracing::info!(
                engine = registration.engine.name(),
                parent_path = %parent_path,
                extension = %extension,
                "Using single template engine"
            );
            return registration.engine.parser(resolver);
        }

        let mut parsers = Vec::with_capacity(self.registrations.len());
        for registration in self.registrations {
            let parser = registration.engine.parser(resolver.clone())?;
            parsers.push(DetectedParser {
                engine: registration.engine.name(),
                detector: registration.detector,
                parser,
            });
        }

        let auto = AutoDetectTemplateParser::new(resolver, parsers);
        tracing::info!(
            engines = ?auto.engines(),
            parent_path = %parent_path,
            extension = %extension,
            "Using template engine auto detection"
        );
        Ok(Arc::new(auto))
    }

    /// Explicit value, then the custom property key, then the default key,
    /// then empty.
    fn resolve(&self, which: &str, explicit: Option<&str>, key: &str, default_key: &str) -> String {
        if let Some(value) = explicit {
            tracing::debug!(which, value, "Using provided value");
            return value.to_string();
        }

        let Some(properties) = &self.properties else {
            tracing::debug!(which, "No properties provided, using empty value");
            return String::new();
        };

        let value = properties
            .get(key)
            .or_else(|| properties.get(default_key))
            .unwrap_or_default();
        tracing::debug!(which, key, value = %value, "Using value from properties");
        value
    }
}
