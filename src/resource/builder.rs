use std::path::PathBuf;
use std::sync::Arc;

use super::{
    ClassPathResolver, FileResolver, LookupMappingResolver, RelativeResolver, ResourceResolver,
    StringResolver,
};

struct Registration {
    lookups: Vec<String>,
    resolver: Arc<dyn ResourceResolver>,
    /// Whether parent path and extension apply to this resolver
    relative: bool,
}

/// Assembles a [`LookupMappingResolver`].
///
/// Registration order is kept; it is the order lookups are matched in.
#[derive(Default)]
pub struct ResourceResolverBuilder {
    registrations: Vec<Registration>,
    default_lookup: Option<String>,
    parent_path: String,
    extension: String,
}

impl ResourceResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `classpath:` (default), `file:` and `string:`/`s:` resolution.
    pub fn use_defaults(self) -> Self {
        self.classpath(["classpath"], [PathBuf::from(".")])
            .file(["file"], None)
            .string(["string", "s"])
            .default_lookup("classpath")
    }

    pub fn classpath<L, R>(self, lookups: L, roots: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator<Item = PathBuf>,
    {
        let lookups: Vec<String> = lookups.into_iter().map(Into::into).collect();
        let resolver = roots.into_iter().fold(
            ClassPathResolver::new().with_lookups(lookups.clone()),
            |resolver, root| resolver.with_root(root),
        );
        self.classpath_resolver(lookups, resolver)
    }

    /// Register a preconfigured classpath resolver (embedded entries, roots)
    pub fn classpath_resolver<L>(mut self, lookups: L, resolver: ClassPathResolver) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let lookups: Vec<String> = lookups.into_iter().map(Into::into).collect();
        let resolver = resolver.with_lookups(lookups.clone());
        self.registrations.push(Registration {
            lookups,
            resolver: Arc::new(resolver),
            relative: true,
        });
        self
    }

    pub fn file<L>(mut self, lookups: L, base_dir: Option<PathBuf>) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let lookups: Vec<String> = lookups.into_iter().map(Into::into).collect();
        let mut resolver = FileResolver::new().with_lookups(lookups.clone());
        if let Some(base_dir) = base_dir {
            resolver = resolver.with_base_dir(base_dir);
        }
        self.registrations.push(Registration {
            lookups,
            resolver: Arc::new(resolver),
            relative: true,
        });
        self
    }

    pub fn string<L>(mut self, lookups: L) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let lookups: Vec<String> = lookups.into_iter().map(Into::into).collect();
        self.registrations.push(Registration {
            resolver: Arc::new(StringResolver::new().with_lookups(lookups.clone())),
            lookups,
            relative: false,
        });
        self
    }

    /// Register a custom resolver. Parent path and extension are not applied.
    pub fn resolver(mut self, lookup: impl Into<String>, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.registrations.push(Registration {
            lookups: vec![lookup.into()],
            resolver,
            relative: false,
        });
        self
    }

    /// Lookup whose resolver handles references without a recognized prefix
    pub fn default_lookup(mut self, lookup: impl Into<String>) -> Self {
        self.default_lookup = Some(lookup.into());
        self
    }

    pub fn parent_path(mut self, parent_path: impl Into<String>) -> Self {
        self.parent_path = parent_path.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn build(&self) -> LookupMappingResolver {
        let mut chain = LookupMappingResolver::new();
        let decorate = !self.parent_path.is_empty() || !self.extension.is_empty();

        for registration in &self.registrations {
            let resolver: Arc<dyn ResourceResolver> = if decorate && registration.relative {
                Arc::new(RelativeResolver::new(
                    registration.resolver.clone(),
                    self.parent_path.clone(),
                    self.extension.clone(),
                ))
            } else {
                registration.resolver.clone()
            };

            for lookup in &registration.lookups {
                chain.register(lookup.clone(), resolver.clone());
            }

            let is_default = self
                .default_lookup
                .as_ref()
                .map(|default| registration.lookups.contains(default))
                .unwrap_or(false);
            if is_default && !chain.has_default() {
                chain.set_default(resolver);
            }
        }

        tracing::debug!(
            resolver = ?chain,
            parent_path = %self.parent_path,
            extension = %self.extension,
            "Built resource resolver chain"
        );
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceError, ResourceReference};

    #[test]
    fn test_defaults_register_lookups_in_order() {
        let chain = ResourceResolverBuilder::new().use_defaults().build();
        let lookups: Vec<_> = chain.lookups().collect();
        assert_eq!(lookups, vec!["classpath", "file", "string", "s"]);
        assert!(chain.has_default());
    }

    #[test]
    fn test_parent_path_not_applied_to_strings() {
        let chain = ResourceResolverBuilder::new()
            .string(["string"])
            .parent_path("/templates/")
            .extension(".html")
            .build();
        let resource = chain
            .resolve(&ResourceReference::parse("string:raw"))
            .unwrap();
        assert_eq!(resource.as_str().unwrap(), "raw");
    }

    #[test]
    fn test_parent_path_and_extension_applied() {
        let classpath = ClassPathResolver::new().with_embedded("mail/welcome.txt", "Hi");
        let chain = ResourceResolverBuilder::new()
            .classpath_resolver(["classpath"], classpath)
            .default_lookup("classpath")
            .parent_path("mail/")
            .extension(".txt")
            .build();

        let resource = chain.resolve(&ResourceReference::parse("welcome")).unwrap();
        assert_eq!(resource.as_str().unwrap(), "Hi");
    }

    #[test]
    fn test_no_default_configured() {
        let chain = ResourceResolverBuilder::new().string(["string"]).build();
        let err = chain
            .resolve(&ResourceReference::parse("unknown:thing"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::NoResolver { .. }));
    }
}
