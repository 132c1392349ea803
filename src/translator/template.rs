use std::sync::Arc;

use crate::message::{Content, MultiContent};
use crate::template::TemplateParser;

use super::{ContentTranslator, TranslationError, TranslationResult};

/// Renders [`Content::Template`] parts through the template parser.
///
/// In multi-part content, variants whose template does not exist are dropped
/// (a `welcome` email may only ship `welcome.html`). At least one variant must
/// render.
pub struct TemplateContentTranslator {
    parser: Arc<dyn TemplateParser>,
}

impl TemplateContentTranslator {
    pub fn new(parser: Arc<dyn TemplateParser>) -> Self {
        Self { parser }
    }

    fn translate_multi(&self, multi: MultiContent) -> TranslationResult<Content> {
        let mut parts = Vec::new();
        let mut first_missing = None;

        for part in multi.into_parts() {
            match self.translate(part) {
                Ok(content) => parts.push(content),
                Err(TranslationError::Template(e)) if e.is_not_found() => {
                    tracing::debug!(error = %e, "Skipping missing template variant");
                    first_missing.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        match first_missing {
            Some(e) if parts.is_empty() => Err(e.into()),
            _ => Ok(Content::Multi(MultiContent::new(parts))),
        }
    }
}

impl ContentTranslator for TemplateContentTranslator {
    fn translate(&self, content: Content) -> TranslationResult<Content> {
        match content {
            Content::Template(template) => {
                tracing::debug!(reference = %template.reference(), "Rendering template content");
                Ok(self.parser.parse(template.reference(), template.context())?)
            }
            Content::Multi(multi) => self.translate_multi(multi),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ClassPathResolver, ResourceResolverBuilder};
    use crate::template::{SubstitutionEngine, TemplateContext, TemplateError, TemplateParserBuilder};

    fn translator() -> TemplateContentTranslator {
        let classpath = ClassPathResolver::new()
            .with_embedded("mail/welcome.txt", "Hello {{name}}")
            .with_embedded("mail/welcome.html", "<html>Hello {{name}}</html>")
            .with_embedded("mail/html-only.html", "<html>{{name}}</html>");
        let parser = TemplateParserBuilder::new()
            .register_engine(SubstitutionEngine)
            .resolvers(
                ResourceResolverBuilder::new()
                    .classpath_resolver(["classpath"], classpath)
                    .default_lookup("classpath"),
            )
            .build()
            .unwrap();
        TemplateContentTranslator::new(parser)
    }

    fn ctx() -> TemplateContext {
        TemplateContext::new().insert("name", "foo")
    }

    #[test]
    fn test_plain_content_untouched() {
        let content = translator().translate(Content::text("raw")).unwrap();
        assert_eq!(content, Content::text("raw"));
    }

    #[test]
    fn test_multi_template_renders_both_variants() {
        let content = translator()
            .translate(Content::multi_template("mail/welcome", ctx()))
            .unwrap();
        assert_eq!(
            content,
            Content::multi(vec![
                Content::text("Hello foo"),
                Content::text("<html>Hello foo</html>"),
            ])
        );
    }

    #[test]
    fn test_missing_variant_dropped() {
        let content = translator()
            .translate(Content::multi_template("mail/html-only", ctx()))
            .unwrap();
        assert_eq!(content, Content::multi(vec![Content::text("<html>foo</html>")]));
    }

    #[test]
    fn test_all_variants_missing() {
        let err = translator()
            .translate(Content::multi_template("mail/missing", ctx()))
            .unwrap_err();
        assert!(matches!(
            err,
            TranslationError::Template(TemplateError::Resource { .. })
        ));
    }
}
