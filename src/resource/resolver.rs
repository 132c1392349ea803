//! Resolver trait and resource types

use std::path::PathBuf;

use thiserror::Error;

use super::ResourceReference;

/// Errors raised while resolving a resource reference.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No resolver in the chain accepts the reference
    #[error("No resolver available for resource: {reference}")]
    NoResolver { reference: String },

    /// The resolver accepted the reference but the resource does not exist
    #[error("Resource not found: {reference}")]
    NotFound { reference: String },

    /// Reading the underlying file failed
    #[error("Failed to read resource {reference} ({}): {source}", path.display())]
    Io {
        reference: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource is not valid UTF-8 text
    #[error("Resource is not valid UTF-8: {reference}")]
    InvalidUtf8 { reference: String },
}

impl ResourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }
}

/// A loaded resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    reference: ResourceReference,
    bytes: Vec<u8>,
}

impl Resource {
    pub fn new(reference: ResourceReference, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reference,
            bytes: bytes.into(),
        }
    }

    pub fn reference(&self) -> &ResourceReference {
        &self.reference
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The content as text
    pub fn as_str(&self) -> Result<&str, ResourceError> {
        std::str::from_utf8(&self.bytes).map_err(|_| ResourceError::InvalidUtf8 {
            reference: self.reference.to_string(),
        })
    }

    /// File name of the resource path (last path segment)
    pub fn file_name(&self) -> &str {
        let path = self.reference.path();
        path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
    }
}

/// Which family of storage a resolver reads from.
///
/// Template engine adapters use this to pick how they load includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    ClassPath,
    File,
    String,
    Chain,
    Custom,
}

/// Resolves a [`ResourceReference`] to raw bytes.
///
/// Resolvers never modify the reference they receive.
pub trait ResourceResolver: Send + Sync {
    /// Whether this resolver is able to handle the reference
    fn supports(&self, reference: &ResourceReference) -> bool;

    /// Load the resource
    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError>;

    fn kind(&self) -> ResolverKind;

    /// The wrapped resolver, for resolvers that decorate another one
    fn delegate(&self) -> Option<&dyn ResourceResolver> {
        None
    }
}

/// Unwrap decorating resolvers until reaching the one doing the actual work.
pub fn actual_resolver(resolver: &dyn ResourceResolver) -> &dyn ResourceResolver {
    let mut current = resolver;
    while let Some(inner) = current.delegate() {
        current = inner;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_text() {
        let resource = Resource::new(ResourceReference::parse("string:hello"), "hello");
        assert_eq!(resource.as_str().unwrap(), "hello");
    }

    #[test]
    fn test_resource_invalid_utf8() {
        let resource = Resource::new(ResourceReference::parse("logo.png"), vec![0xff, 0xfe]);
        assert!(matches!(
            resource.as_str(),
            Err(ResourceError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_file_name() {
        let resource = Resource::new(ResourceReference::parse("classpath:/images/logo.png"), "x");
        assert_eq!(resource.file_name(), "logo.png");
    }
}
