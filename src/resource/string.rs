use super::{Resource, ResourceError, ResourceReference, ResourceResolver, ResolverKind};

/// The reference path is the content itself: `string:Hello {{name}}`.
#[derive(Debug, Clone, Default)]
pub struct StringResolver {
    lookups: Vec<String>,
}

impl StringResolver {
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
}

impl ResourceResolver for StringResolver {
    fn supports(&self, reference: &ResourceReference) -> bool {
        match reference.lookup() {
            Some(lookup) => self.lookups.iter().any(|l| l == lookup),
            None => true,
        }
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Resource, ResourceError> {
        Ok(Resource::new(
            reference.clone(),
            reference.path().as_bytes().to_vec(),
        ))
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_content() {
        let resolver = StringResolver::new().with_lookups(["string", "s"]);
        let reference = ResourceReference::parse("s:Hello {{name}}");
        assert!(resolver.supports(&reference));
        assert_eq!(
            resolver.resolve(&reference).unwrap().as_str().unwrap(),
            "Hello {{name}}"
        );
    }
}
