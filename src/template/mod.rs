//! Template parsing with engine auto-detection.
//!
//! This module provides:
//! - [`TemplateParser`]: renders a template reference with a [`TemplateContext`]
//! - [`TemplateEngine`]: builds a parser for one engine on top of the resolver chain
//! - Detectors deciding which engine handles a given template
//! - [`AutoDetectTemplateParser`]: asks detectors in registration order, the
//!   first one accepting the template selects the engine
//! - [`TemplateParserBuilder`]: registers engines and builds the parser
//!
//! Two engines ship with the crate: [`SubstitutionEngine`] for `{{variable}}`
//! placeholders and [`JinjaEngine`] backed by minijinja.
//!
//! # Example
//!
//! ```ignore
//! let parser = TemplateParserBuilder::new()
//!     .register(JinjaEngine, ContentMarkerEngineDetector::new(["{%", "{#"]))
//!     .register_engine(SubstitutionEngine)
//!     .resolvers(ResourceResolverBuilder::new().use_defaults())
//!     .parent_path("/templates/")
//!     .build()?;
//!
//! let content = parser.parse("classpath:welcome.html", &TemplateContext::new().insert("name", "Ada"))?;
//! ```

mod auto_detect;
mod builder;
mod context;
mod detector;
mod jinja;
mod substitution;

use std::sync::Arc;

use thiserror::Error;

use crate::message::Content;
use crate::resource::{ResourceError, ResourceResolver};

pub use auto_detect::AutoDetectTemplateParser;
pub use builder::{TemplateParserBuilder, DEFAULT_EXTENSION_KEY, DEFAULT_PARENT_PATH_KEY};
pub use context::TemplateContext;
pub use detector::{
    ContentMarkerEngineDetector, ExtensionEngineDetector, FixedEngineDetector,
    TemplateEngineDetector,
};
pub use jinja::{JinjaEngine, JinjaParser};
pub use substitution::{substitute_variables, SubstitutionEngine, SubstitutionParser};

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template support cannot be built (no engine registered)
    #[error("Template configuration error: {0}")]
    Configuration(String),

    /// A detector failed while inspecting the template
    #[error("Engine detection failed for template {reference}: {source}")]
    EngineDetection {
        reference: String,
        #[source]
        source: ResourceError,
    },

    /// No registered detector accepted the template
    #[error("No template engine available for template: {reference}")]
    NoEngineAvailable { reference: String },

    #[error("Failed to load template {reference}: {source}")]
    Resource {
        reference: String,
        #[source]
        source: ResourceError,
    },

    #[error("Failed to render template {reference} with {engine}: {message}")]
    Render {
        reference: String,
        engine: &'static str,
        message: String,
    },

    #[error("Invalid template context: {0}")]
    InvalidContext(String),
}

impl TemplateError {
    /// Whether the template itself could not be found
    pub fn is_not_found(&self) -> bool {
        match self {
            TemplateError::EngineDetection { source, .. } | TemplateError::Resource { source, .. } => {
                source.is_not_found()
            }
            _ => false,
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Renders a template reference into content.
pub trait TemplateParser: Send + Sync {
    fn parse(&self, reference: &str, ctx: &TemplateContext) -> TemplateResult<Content>;
}

/// A template engine able to build a parser reading templates through the
/// given resolver chain.
pub trait TemplateEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn parser(&self, resolver: Arc<dyn ResourceResolver>) -> TemplateResult<Arc<dyn TemplateParser>>;
}
