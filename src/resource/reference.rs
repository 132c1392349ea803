use std::fmt;

/// A reference to a resource, optionally prefixed by a lookup (`classpath:`,
/// `file:`, `string:`).
///
/// The lookup is the text before the first `:`. Whether it actually selects a
/// resolver is decided by the chain, so `C:/mail/welcome.html` simply has a
/// lookup nobody registered and falls back to the default resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceReference {
    original: String,
    lookup: Option<String>,
    path: String,
}

impl ResourceReference {
    pub fn parse(reference: impl Into<String>) -> Self {
        let original = reference.into();
        match original.split_once(':') {
            Some((lookup, path)) if is_lookup_token(lookup) => Self {
                lookup: Some(lookup.to_string()),
                path: path.to_string(),
                original,
            },
            _ => Self {
                lookup: None,
                path: original.clone(),
                original,
            },
        }
    }

    /// Build a reference that carries no lookup, whatever its text contains.
    pub fn unprefixed(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            original: path.clone(),
            lookup: None,
            path,
        }
    }

    /// The reference exactly as the caller wrote it
    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn lookup(&self) -> Option<&str> {
        self.lookup.as_deref()
    }

    /// The reference without its lookup prefix
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same lookup, different path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        let path = path.into();
        let original = match &self.lookup {
            Some(lookup) => format!("{}:{}", lookup, path),
            None => path.clone(),
        };
        Self {
            original,
            lookup: self.lookup.clone(),
            path,
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for ResourceReference {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for ResourceReference {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}

fn is_lookup_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
