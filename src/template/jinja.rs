//! MiniJinja template engine.
//!
//! Templates, includes and layouts are all loaded through the resolver chain,
//! so `{% include "classpath:partials/footer.html" %}` works like any other
//! reference. Nothing is cached between renders: every call reads its
//! templates again, so edited or deleted files are seen immediately.

use std::sync::Arc;

use minijinja::{Environment, ErrorKind};

use crate::message::Content;
use crate::resource::{actual_resolver, ResourceReference, ResourceResolver};

use super::{TemplateContext, TemplateEngine, TemplateError, TemplateParser, TemplateResult};

const ENGINE_NAME: &str = "jinja";

/// Jinja2-compatible engine (loops, conditionals, filters, includes)
#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaEngine;

impl TemplateEngine for JinjaEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn parser(&self, resolver: Arc<dyn ResourceResolver>) -> TemplateResult<Arc<dyn TemplateParser>> {
        Ok(Arc::new(JinjaParser::new(resolver)))
    }
}

pub struct JinjaParser {
    resolver: Arc<dyn ResourceResolver>,
}

impl JinjaParser {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        tracing::debug!(
            resolver_kind = ?actual_resolver(resolver.as_ref()).kind(),
            "Adapting resolver chain as jinja loader"
        );
        Self { resolver }
    }

    /// Environment scoped to a single render, so loaded includes and layouts
    /// are dropped with it
    fn environment(&self) -> Environment<'static> {
        let resolver = self.resolver.clone();
        let mut env = Environment::new();
        env.set_loader(move |name| load_template(resolver.as_ref(), name));
        env
    }
}

fn load_template(
    resolver: &dyn ResourceResolver,
    name: &str,
) -> Result<Option<String>, minijinja::Error> {
    let reference = ResourceReference::parse(name);
    match resolver.resolve(&reference) {
        Ok(resource) => resource
            .as_str()
            .map(|text| Some(text.to_string()))
            .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())),
    }
}

impl TemplateParser for JinjaParser {
    fn parse(&self, reference: &str, ctx: &TemplateContext) -> TemplateResult<Content> {
        let render_error = |e: minijinja::Error| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::Resource {
                    reference: reference.to_string(),
                    source: crate::resource::ResourceError::NotFound {
                        reference: reference.to_string(),
                    },
                }
            } else {
                TemplateError::Render {
                    reference: reference.to_string(),
                    engine: ENGINE_NAME,
                    message: e.to_string(),
                }
            }
        };

        let resource_error = |source| TemplateError::Resource {
            reference: reference.to_string(),
            source,
        };
        let resource = self
            .resolver
            .resolve(&ResourceReference::parse(reference))
            .map_err(resource_error)?;
        let source = resource.as_str().map_err(resource_error)?;

        let rendered = self
            .environment()
            .render_named_str(reference, source, ctx.to_value())
            .map_err(render_error)?;
        Ok(Content::text(rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ClassPathResolver, ResourceResolverBuilder};
    use serde_json::json;

    fn parser() -> JinjaParser {
        let classpath = ClassPathResolver::new()
            .with_embedded("layout.html", "<html>{% block body %}{% endblock %}</html>")
            .with_embedded(
                "page.html",
                "{% extends \"layout.html\" %}{% block body %}{{ name }}{% endblock %}",
            )
            .with_embedded("loop.txt", "{% for i in items %}{{ i }};{% endfor %}")
            .with_embedded("broken.txt", "{% if %}");
        let chain = ResourceResolverBuilder::new()
            .classpath_resolver(["classpath"], classpath)
            .string(["string"])
            .default_lookup("classpath")
            .build();
        JinjaParser::new(Arc::new(chain))
    }

    #[test]
    fn test_render_loop() {
        let ctx = TemplateContext::from_value(json!({ "items": [1, 2, 3] })).unwrap();
        let content = parser().parse("classpath:loop.txt", &ctx).unwrap();
        assert_eq!(content, Content::text("1;2;3;"));
    }

    #[test]
    fn test_layout_loaded_through_resolver() {
        let ctx = TemplateContext::new().insert("name", "foo");
        let content = parser().parse("page.html", &ctx).unwrap();
        assert_eq!(content, Content::text("<html>foo</html>"));
    }

    #[test]
    fn test_locale_available() {
        let ctx = TemplateContext::new().with_locale("en");
        let content = parser().parse("string:{{ locale }}", &ctx).unwrap();
        assert_eq!(content, Content::text("en"));
    }

    #[test]
    fn test_missing_template() {
        let err = parser()
            .parse("classpath:missing.html", &TemplateContext::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Resource { .. }));
    }

    #[test]
    fn test_file_changes_seen_on_next_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "v1 {{ name }}").unwrap();
        std::fs::write(dir.path().join("part.txt"), "p1").unwrap();

        let chain = ResourceResolverBuilder::new()
            .file(["file"], Some(dir.path().to_path_buf()))
            .string(["string"])
            .build();
        let parser = JinjaParser::new(Arc::new(chain));
        let ctx = TemplateContext::new().insert("name", "x");

        assert_eq!(parser.parse("file:t.txt", &ctx).unwrap(), Content::text("v1 x"));

        std::fs::write(&path, "v2 {{ name }} {% include \"file:part.txt\" %}").unwrap();
        assert_eq!(parser.parse("file:t.txt", &ctx).unwrap(), Content::text("v2 x p1"));

        std::fs::write(dir.path().join("part.txt"), "p2").unwrap();
        assert_eq!(parser.parse("file:t.txt", &ctx).unwrap(), Content::text("v2 x p2"));

        std::fs::remove_file(&path).unwrap();
        let err = parser.parse("file:t.txt", &ctx).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_inline_templates_rendered_each_time() {
        let parser = parser();
        let ctx = TemplateContext::new().insert("name", "foo");
        assert_eq!(parser.parse("string:a {{ name }}", &ctx).unwrap(), Content::text("a foo"));
        assert_eq!(parser.parse("string:b {{ name }}", &ctx).unwrap(), Content::text("b foo"));
    }

    #[test]
    fn test_missing_include() {
        let ctx = TemplateContext::new();
        let err = parser()
            .parse("string:{% include \"classpath:nope.html\" %}", &ctx)
            .unwrap_err();
        assert!(matches!(err, TemplateError::Resource { .. }));
    }

    #[test]
    fn test_syntax_error_names_reference() {
        let err = parser()
            .parse("classpath:broken.txt", &TemplateContext::new())
            .unwrap_err();
        match err {
            TemplateError::Render { reference, engine, .. } => {
                assert_eq!(reference, "classpath:broken.txt");
                assert_eq!(engine, "jinja");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
