//! Template engine detectors

use crate::resource::{ResourceReference, ResourceResolver};

use super::{TemplateContext, TemplateError, TemplateResult};

/// Decides whether an engine can render a template.
///
/// Returning `Ok(false)` means "not mine". An error is reserved for inspection
/// failures (the template could not be read).
pub trait TemplateEngineDetector: Send + Sync {
    fn can_parse(
        &self,
        reference: &ResourceReference,
        ctx: &TemplateContext,
        resolver: &dyn ResourceResolver,
    ) -> TemplateResult<bool>;
}

/// Always accepts. Used for single-engine setups, as a catch-all last
/// registration, or to force an engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedEngineDetector;

impl TemplateEngineDetector for FixedEngineDetector {
    fn can_parse(
        &self,
        _reference: &ResourceReference,
        _ctx: &TemplateContext,
        _resolver: &dyn ResourceResolver,
    ) -> TemplateResult<bool> {
        Ok(true)
    }
}

/// Accepts templates whose path ends with one of the extensions
/// (`.j2`, `.jinja`).
#[derive(Debug, Clone)]
pub struct ExtensionEngineDetector {
    extensions: Vec<String>,
}

impl ExtensionEngineDetector {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl TemplateEngineDetector for ExtensionEngineDetector {
    fn can_parse(
        &self,
        reference: &ResourceReference,
        _ctx: &TemplateContext,
        _resolver: &dyn ResourceResolver,
    ) -> TemplateResult<bool> {
        let path = reference.path();
        Ok(self.extensions.iter().any(|ext| path.ends_with(ext.as_str())))
    }
}

/// Loads the template and accepts it when it contains one of the markers.
///
/// Detection goes through the resolver chain, so it performs I/O.
#[derive(Debug, Clone)]
pub struct ContentMarkerEngineDetector {
    markers: Vec<String>,
}

impl ContentMarkerEngineDetector {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }
}

impl TemplateEngineDetector for ContentMarkerEngineDetector {
    fn can_parse(
        &self,
        reference: &ResourceReference,
        _ctx: &TemplateContext,
        resolver: &dyn ResourceResolver,
    ) -> TemplateResult<bool> {
        let detection_error = |source| TemplateError::EngineDetection {
            reference: reference.to_string(),
            source,
        };

        let resource = resolver.resolve(reference).map_err(detection_error)?;
        let text = resource.as_str().map_err(detection_error)?;

        Ok(self.markers.iter().any(|marker| text.contains(marker.as_str())))
    }
}
