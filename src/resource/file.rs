use std::path::PathBuf;

use super::{Resource, ResourceError, ResourceReference, ResourceResolver, ResolverKind};

/// Resolves resources from the filesystem.
///
/// Relative paths are joined to the base directory when one is configured,
/// otherwise they are relative to the working directory.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    lookups: Vec<String>,
    base_dir: Option<PathBuf>,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookups<I, S>(mut self, lookups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookups = lookups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn path_for(&self, reference: &ResourceReference) -> PathBuf {
        let path = PathBuf::from(reference.path());
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl ResourceResolver for FileResolver {
    fn supports(&self, reference: &ResourceReference) -> bool {
        match reference.lookup() {
            Some(lookup) => self.lookups.iter().any(|l| l == lookup),
            None => true,
        }
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError> {
        let path = self.path_for(reference);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Resource::new(reference.clone(), bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ResourceError::NotFound {
                reference: reference.to_string(),
            }),
            Err(source) => Err(ResourceError::Io {
                reference: reference.to_string(),
                path,
                source,
            }),
        }
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("welcome.txt"), "Welcome").unwrap();

        let resolver = FileResolver::new().with_base_dir(dir.path());
        let resource = resolver
            .resolve(&ResourceReference::parse("file:welcome.txt"))
            .unwrap();
        assert_eq!(resource.as_str().unwrap(), "Welcome");
    }

    #[test]
    fn test_resolve_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absolute.txt");
        std::fs::write(&path, "abs").unwrap();

        let resolver = FileResolver::new().with_base_dir("/nonexistent");
        let reference = ResourceReference::unprefixed(path.to_string_lossy().to_string());
        assert_eq!(resolver.resolve(&reference).unwrap().as_str().unwrap(), "abs");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FileResolver::new().with_base_dir(dir.path());
        let err = resolver
            .resolve(&ResourceReference::parse("file:nope.txt"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
