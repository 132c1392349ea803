//! Variable substitution engine for templates

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::message::Content;
use crate::resource::{ResourceReference, ResourceResolver};

use super::{TemplateContext, TemplateEngine, TemplateError, TemplateParser, TemplateResult};

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}")
            .expect("placeholder pattern is valid");
}

/// Engine replacing `{{variable}}` and `{{ order.id }}` placeholders.
///
/// Placeholders without a matching variable are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionEngine;

impl TemplateEngine for SubstitutionEngine {
    fn name(&self) -> &'static str {
        "substitution"
    }

    fn parser(&self, resolver: Arc<dyn ResourceResolver>) -> TemplateResult<Arc<dyn TemplateParser>> {
        Ok(Arc::new(SubstitutionParser::new(resolver)))
    }
}

pub struct SubstitutionParser {
    resolver: Arc<dyn ResourceResolver>,
}

impl SubstitutionParser {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self { resolver }
    }
}

impl TemplateParser for SubstitutionParser {
    fn parse(&self, reference: &str, ctx: &TemplateContext) -> TemplateResult<Content> {
        let reference = ResourceReference::parse(reference);
        let resource_error = |source| TemplateError::Resource {
            reference: reference.to_string(),
            source,
        };

        let resource = self.resolver.resolve(&reference).map_err(resource_error)?;
        let template = resource.as_str().map_err(resource_error)?;

        Ok(Content::text(substitute_variables(template, ctx)))
    }
}

/// Substitute {{variable}} placeholders in a string
pub fn substitute_variables(template: &str, ctx: &TemplateContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let path = &caps[1];
            match lookup(ctx, path) {
                Some(value) => render_value(&value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn lookup(ctx: &TemplateContext, path: &str) -> Option<serde_json::Value> {
    match ctx.lookup(path) {
        Some(value) => Some(value.clone()),
        None if path == "locale" => ctx.locale().map(|l| serde_json::Value::String(l.into())),
        None => None,
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "".to_string(),
        // For arrays and objects, use JSON representation
        _ => value.to_string(),
    }
}
