use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceError, ResourceReference, ResourceResolver, ResolverKind};

/// Resolves resources bundled with the application.
///
/// Embedded entries (usually filled with `include_bytes!`) are consulted first,
/// then each root directory in registration order. A leading `/` in the
/// reference path is ignored, so `classpath:/templates/a.html` and
/// `classpath:templates/a.html` designate the same resource.
#[derive(Debug, Clone, Default)]
pub struct ClassPathResolver {
    lookups: Vec<String>,
    roots: Vec<PathBuf>,
    embedded: HashMap<String, Vec<u8>>,
}

impl ClassPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookups this resolver answers to (`classpath` by default)
    pub fn with_lookups<I, S>(mut self, lookups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookups = lookups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_embedded(mut self, name: impl AsRef<str>, content: impl Into<Vec<u8>>) -> Self {
        self.embedded
            .insert(normalize(name.as_ref()).to_string(), content.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn read_from_roots(
        &self,
        reference: &ResourceReference,
        relative: &str,
    ) -> Result<Option<Vec<u8>>, ResourceError> {
        for root in &self.roots {
            let candidate = root.join(Path::new(relative));
            if !candidate.is_file() {
                continue;
            }
            return std::fs::read(&candidate)
                .map(Some)
                .map_err(|source| ResourceError::Io {
                    reference: reference.to_string(),
                    path: candidate,
                    source,
                });
        }
        Ok(None)
    }
}

impl ResourceResolver for ClassPathResolver {
    fn supports(&self, reference: &ResourceReference) -> bool {
        match reference.lookup() {
            Some(lookup) => self.lookups.iter().any(|l| l == lookup),
            None => true,
        }
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError> {
        let relative = normalize(reference.path());

        if let Some(content) = self.embedded.get(relative) {
            return Ok(Resource::new(reference.clone(), content.clone()));
        }

        match self.read_from_roots(reference, relative)? {
            Some(bytes) => {
                tracing::trace!(reference = %reference, "Loaded classpath resource");
                Ok(Resource::new(reference.clone(), bytes))
            }
            None => Err(ResourceError::NotFound {
                reference: reference.to_string(),
            }),
        }
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::ClassPath
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}
