//! Template data context

use serde::Serialize;

use super::{TemplateError, TemplateResult};

/// Variables available while rendering a template.
///
/// The pipeline only reads the context; the caller keeps ownership of the data
/// it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    variables: serde_json::Map<String, serde_json::Value>,
    locale: Option<String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from any serializable value that serializes to an object
    pub fn from_serialize<T: Serialize>(data: &T) -> TemplateResult<Self> {
        let value = serde_json::to_value(data)
            .map_err(|e| TemplateError::InvalidContext(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> TemplateResult<Self> {
        match value {
            serde_json::Value::Object(variables) => Ok(Self {
                variables,
                locale: None,
            }),
            serde_json::Value::Null => Ok(Self::new()),
            _ => Err(TemplateError::InvalidContext(
                "Variables must be an object".to_string(),
            )),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn insert(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn variables(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.variables
    }

    /// Look up a variable by dotted path (`order.id`)
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        let mut segments = path.split('.');
        let mut current = self.variables.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Variables as a JSON object, with `locale` added when set and not
    /// already defined by the caller
    pub fn to_value(&self) -> serde_json::Value {
        let mut variables = self.variables.clone();
        if let Some(locale) = &self.locale {
            variables
                .entry("locale".to_string())
                .or_insert_with(|| serde_json::Value::String(locale.clone()));
        }
        serde_json::Value::Object(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Order {
        id: String,
        total: u32,
    }

    #[test]
    fn test_from_serialize() {
        let ctx = TemplateContext::from_serialize(&Order {
            id: "ORD-1".into(),
            total: 42,
        })
        .unwrap();
        assert_eq!(ctx.lookup("id"), Some(&json!("ORD-1")));
        assert_eq!(ctx.lookup("total"), Some(&json!(42)));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = TemplateContext::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidContext(_)));
    }

    #[test]
    fn test_dotted_lookup() {
        let ctx = TemplateContext::from_value(json!({
            "order": { "id": "ORD-1", "items": ["a", "b"] }
        }))
        .unwrap();
        assert_eq!(ctx.lookup("order.id"), Some(&json!("ORD-1")));
        assert_eq!(ctx.lookup("order.items.1"), Some(&json!("b")));
        assert_eq!(ctx.lookup("order.missing"), None);
    }

    #[test]
    fn test_locale_exposed_in_value() {
        let ctx = TemplateContext::new().insert("name", "foo").with_locale("fr");
        assert_eq!(ctx.locale(), Some("fr"));
        assert_eq!(ctx.to_value(), json!({ "name": "foo", "locale": "fr" }));
    }
}
