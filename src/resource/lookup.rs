//! Resolver chain and relative path decoration

use std::fmt;
use std::sync::Arc;

use super::{Resource, ResourceError, ResourceReference, ResourceResolver, ResolverKind};

/// Chain of resolvers keyed by lookup prefix.
///
/// Insertion order is the match priority. A reference whose lookup has a
/// registration is handed to that resolver only; a reference without a lookup,
/// or with a lookup nobody registered, goes to the default resolver with its
/// full text as the path.
#[derive(Clone, Default)]
pub struct LookupMappingResolver {
    mappings: Vec<(String, Arc<dyn ResourceResolver>)>,
    default: Option<Arc<dyn ResourceResolver>>,
}

impl LookupMappingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver for a lookup. A second registration of the same
    /// lookup keeps the first one.
    pub fn register(&mut self, lookup: impl Into<String>, resolver: Arc<dyn ResourceResolver>) {
        let lookup = lookup.into();
        if self.mappings.iter().any(|(l, _)| *l == lookup) {
            tracing::debug!(lookup = %lookup, "Lookup already registered, keeping first resolver");
            return;
        }
        self.mappings.push((lookup, resolver));
    }

    pub fn set_default(&mut self, resolver: Arc<dyn ResourceResolver>) {
        self.default = Some(resolver);
    }

    pub fn lookups(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|(lookup, _)| lookup.as_str())
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    fn find(&self, lookup: &str) -> Option<&Arc<dyn ResourceResolver>> {
        self.mappings
            .iter()
            .find(|(l, _)| l == lookup)
            .map(|(_, resolver)| resolver)
    }
}

impl fmt::Debug for LookupMappingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupMappingResolver")
            .field("lookups", &self.lookups().collect::<Vec<_>>())
            .field("has_default", &self.has_default())
            .finish()
    }
}

impl ResourceResolver for LookupMappingResolver {
    fn supports(&self, reference: &ResourceReference) -> bool {
        let explicit = reference
            .lookup()
            .map(|lookup| self.find(lookup).is_some())
            .unwrap_or(false);
        explicit || self.default.is_some()
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError> {
        if let Some(resolver) = reference.lookup().and_then(|lookup| self.find(lookup)) {
            return resolver.resolve(reference);
        }

        match &self.default {
            Some(resolver) => {
                let unprefixed = ResourceReference::unprefixed(reference.as_str());
                resolver.resolve(&unprefixed)
            }
            None => Err(ResourceError::NoResolver {
                reference: reference.to_string(),
            }),
        }
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::Chain
    }
}

/// Prepends a parent path and appends an extension before delegating, so that
/// callers can reference `welcome` instead of `/templates/welcome.html`.
pub struct RelativeResolver {
    inner: Arc<dyn ResourceResolver>,
    parent_path: String,
    extension: String,
}

impl RelativeResolver {
    pub fn new(
        inner: Arc<dyn ResourceResolver>,
        parent_path: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            parent_path: parent_path.into(),
            extension: extension.into(),
        }
    }

    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn relative_path(&self, path: &str) -> String {
        let joined = if self.parent_path.ends_with('/') && path.starts_with('/') {
            format!("{}{}", self.parent_path, &path[1..])
        } else {
            format!("{}{}", self.parent_path, path)
        };
        format!("{}{}", joined, self.extension)
    }
}

impl ResourceResolver for RelativeResolver {
    fn supports(&self, reference: &ResourceReference) -> bool {
        self.inner.supports(reference)
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError> {
        let relative = reference.with_path(self.relative_path(reference.path()));
        tracing::trace!(reference = %reference, resolved = %relative, "Resolving relative resource");
        self.inner.resolve(&relative)
    }

    fn kind(&self) -> ResolverKind {
        self.inner.kind()
    }

    fn delegate(&self) -> Option<&dyn ResourceResolver> {
        Some(self.inner.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{actual_resolver, ClassPathResolver, StringResolver};

    fn chain() -> LookupMappingResolver {
        let classpath = Arc::new(
            ClassPathResolver::new()
                .with_lookups(["classpath"])
                .with_embedded("welcome.html", "<html>classpath</html>"),
        );
        let mut chain = LookupMappingResolver::new();
        chain.register("classpath", classpath.clone());
        chain.register("string", Arc::new(StringResolver::new().with_lookups(["string"])));
        chain.set_default(classpath);
        chain
    }

    #[test]
    fn test_explicit_lookup() {
        let resource = chain()
            .resolve(&ResourceReference::parse("string:inline body"))
            .unwrap();
        assert_eq!(resource.as_str().unwrap(), "inline body");
    }

    #[test]
    fn test_default_resolver_without_prefix() {
        let resource = chain()
            .resolve(&ResourceReference::parse("welcome.html"))
            .unwrap();
        assert_eq!(resource.as_str().unwrap(), "<html>classpath</html>");
    }

    #[test]
    fn test_unknown_prefix_without_default_fails() {
        let mut chain = LookupMappingResolver::new();
        chain.register("string", Arc::new(StringResolver::new().with_lookups(["string"])));

        let err = chain
            .resolve(&ResourceReference::parse("http:example.com/a.png"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::NoResolver { .. }));
        assert!(!chain.supports(&ResourceReference::parse("http:example.com/a.png")));
    }

    #[test]
    fn test_unprefixed_without_default_fails() {
        let chain = LookupMappingResolver::new();
        let err = chain
            .resolve(&ResourceReference::parse("welcome.html"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::NoResolver { .. }));
    }

    #[test]
    fn test_first_registration_wins() {
        let mut chain = LookupMappingResolver::new();
        chain.register("s", Arc::new(StringResolver::new().with_lookups(["s"])));
        chain.register("s", Arc::new(ClassPathResolver::new().with_lookups(["s"])));

        let resource = chain.resolve(&ResourceReference::parse("s:abc")).unwrap();
        assert_eq!(resource.as_str().unwrap(), "abc");
    }

    #[test]
    fn test_relative_resolver() {
        let classpath = Arc::new(
            ClassPathResolver::new()
                .with_lookups(["classpath"])
                .with_embedded("templates/welcome.html", "hello"),
        );
        let relative = RelativeResolver::new(classpath, "/templates/", ".html");

        let resource = relative
            .resolve(&ResourceReference::parse("classpath:/welcome"))
            .unwrap();
        assert_eq!(resource.as_str().unwrap(), "hello");
        assert_eq!(resource.reference().as_str(), "classpath:/templates/welcome.html");
        assert_eq!(actual_resolver(&relative).kind(), ResolverKind::ClassPath);
    }
}
