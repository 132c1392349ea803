//! CSS inlining.
//!
//! Supports simple selectors only: `tag`, `.class`, `#id`, compounds such as
//! `p.note#intro`, comma separated lists and `*`. Rules using combinators,
//! attribute selectors or pseudo classes are ignored, as are at-rules.

use std::sync::Arc;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, ToCss,
};
use lazy_static::lazy_static;
use regex::Regex;

use crate::message::{Content, StringContent};
use crate::resource::{ResourceReference, ResourceResolver};

use super::html::{self, HtmlTag};
use super::{map_strings, ContentTranslator, TranslationError, TranslationResult};
use super::INLINE_MODE_ATTRIBUTE;

lazy_static! {
    static ref SIMPLE_SELECTOR: Regex =
        Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9-]*)?((?:[.#][A-Za-z0-9_-]+)*)$")
            .expect("selector pattern is valid");
}

/// Elements never receiving inline styles
const NON_VISUAL: &[&str] = &["html", "head", "title", "meta", "link", "style", "script", "base"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let caps = SIMPLE_SELECTOR.captures(raw)?;

        let tag = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|t| *t != "*")
            .map(str::to_ascii_lowercase);

        let mut ids = Vec::new();
        let mut classes = Vec::new();
        let qualifiers = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let mut rest = qualifiers;
        while let Some(kind) = rest.chars().next() {
            let body = &rest[1..];
            let len = body.find(|c: char| c == '.' || c == '#').unwrap_or(body.len());
            let name = body[..len].to_string();
            if kind == '#' {
                ids.push(name);
            } else {
                classes.push(name);
            }
            rest = &body[len..];
        }

        Some(Self { tag, ids, classes })
    }

    fn specificity(&self) -> (usize, usize, usize) {
        (self.ids.len(), self.classes.len(), usize::from(self.tag.is_some()))
    }

    fn matches(&self, tag: &HtmlTag) -> bool {
        if let Some(name) = &self.tag {
            if !tag.is(name) {
                return false;
            }
        }
        if !self.ids.iter().all(|id| tag.attr("id") == Some(id.as_str())) {
            return false;
        }
        self.classes
            .iter()
            .all(|class| tag.classes().any(|c| c == class))
    }
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    order: usize,
    declarations: Vec<(String, String)>,
}

/// Applies stylesheets to the `style` attribute of matching elements.
///
/// Rules apply by specificity then source order. Declarations already present
/// in a `style` attribute win over any rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssInliner;

impl CssInliner {
    pub fn inline(&self, html: &str, css: &str) -> String {
        let rules = parse_rules(css);
        if rules.is_empty() {
            return html.to_string();
        }

        let result: Result<String, std::convert::Infallible> = html::rewrite_tags(html, |mut tag| {
            if NON_VISUAL.iter().any(|name| tag.is(name)) {
                return Ok(None);
            }

            let mut matching: Vec<&Rule> = rules.iter().filter(|r| r.selector.matches(&tag)).collect();
            if matching.is_empty() {
                return Ok(None);
            }
            matching.sort_by_key(|r| (r.selector.specificity(), r.order));

            let mut style = Vec::new();
            for rule in matching {
                for (property, value) in &rule.declarations {
                    set_declaration(&mut style, property, value);
                }
            }
            if let Some(existing) = tag.attr("style") {
                for (property, value) in parse_declarations(existing) {
                    set_declaration(&mut style, &property, &value);
                }
            }

            tag.set_attr("style", render_declarations(&style));
            Ok(Some(tag.render()))
        });

        match result {
            Ok(inlined) => inlined,
            Err(never) => match never {},
        }
    }
}

/// Inlines the `<link rel="stylesheet">` and `<style>` sheets of HTML content.
///
/// Linked stylesheets are loaded through the resolver chain. Consumed tags are
/// removed from the document; tags marked `data-inline-mode="skip"` stay and are
/// not applied.
pub struct CssInliningTranslator {
    resolver: Arc<dyn ResourceResolver>,
    inliner: CssInliner,
}

impl CssInliningTranslator {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            resolver,
            inliner: CssInliner,
        }
    }

    fn inline_html(&self, html: &str) -> TranslationResult<String> {
        let mut sheets = Vec::new();
        let mut consumed = Vec::new();

        for element in html::stylesheet_elements(html) {
            if element.tag.attr(INLINE_MODE_ATTRIBUTE) == Some("skip") {
                tracing::debug!(tag = element.tag.name(), "Stylesheet explicitly skipped");
                continue;
            }

            match element.body {
                Some(body) => sheets.push(body),
                None => {
                    let is_stylesheet = element
                        .tag
                        .attr("rel")
                        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")));
                    let Some(href) = element.tag.attr("href").filter(|_| is_stylesheet) else {
                        continue;
                    };
                    sheets.push(self.load(href)?);
                }
            }
            consumed.push((element.start, element.end));
        }

        if consumed.is_empty() {
            return Ok(html.to_string());
        }

        let stripped = html::remove_ranges(html, &consumed);
        Ok(self.inliner.inline(&stripped, &sheets.join("\n")))
    }

    fn load(&self, href: &str) -> TranslationResult<String> {
        let reference = ResourceReference::parse(href);
        let error = |source| TranslationError::Resource {
            kind: "stylesheet",
            reference: href.to_string(),
            source,
        };
        let resource = self.resolver.resolve(&reference).map_err(error)?;
        let css = resource.as_str().map_err(error)?.to_string();
        tracing::debug!(reference = %reference, "Loaded stylesheet");
        Ok(css)
    }
}

impl ContentTranslator for CssInliningTranslator {
    #[tracing::instrument(name = "translator.css", skip_all)]
    fn translate(&self, content: Content) -> TranslationResult<Content> {
        map_strings(content, &mut |text: StringContent| {
            if !text.is_html() {
                return Ok(Content::String(text));
            }
            Ok(Content::text(self.inline_html(text.as_str())?))
        })
    }
}

/// Qualified rules of a stylesheet with a supported selector, in source order.
/// At-rules are skipped whole.
fn parse_rules(css: &str) -> Vec<Rule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut collector = RuleCollector::default();

    for result in StyleSheetParser::new(&mut parser, &mut collector) {
        if let Err((error, rule)) = result {
            tracing::trace!(rule = rule.trim(), error = ?error.kind, "Ignoring stylesheet rule");
        }
    }

    collector.rules
}

/// Declarations of a rule body or a `style` attribute
fn parse_declarations(block: &str) -> Vec<(String, String)> {
    let mut input = ParserInput::new(block);
    let mut parser = Parser::new(&mut input);
    collect_declarations(&mut parser)
}

fn collect_declarations(input: &mut Parser<'_, '_>) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut parser = RawDeclarationParser;
    for (property, value) in RuleBodyParser::new(input, &mut parser).flatten() {
        set_declaration(&mut declarations, &property, &value);
    }
    declarations
}

#[derive(Default)]
struct RuleCollector {
    rules: Vec<Rule>,
    order: usize,
}

impl<'i> QualifiedRuleParser<'i> for RuleCollector {
    /// Selector list as written, comments removed
    type Prelude = Vec<String>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        input.parse_comma_separated(|input| {
            let mut selector = String::new();
            while let Ok(token) = input.next_including_whitespace() {
                selector.push_str(&token.to_css_string());
            }
            Ok(selector.trim().to_string())
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let declarations = collect_declarations(input);
        if declarations.is_empty() {
            return Ok(());
        }

        for raw in &prelude {
            match Selector::parse(raw) {
                Some(selector) => self.rules.push(Rule {
                    selector,
                    order: self.order,
                    declarations: declarations.clone(),
                }),
                None => tracing::debug!(selector = %raw, "Unsupported selector ignored"),
            }
        }
        self.order += 1;
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for RuleCollector {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

/// Keeps each declaration value as its source text
struct RawDeclarationParser;

impl<'i> DeclarationParser<'i> for RawDeclarationParser {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok((name.as_ref().to_ascii_lowercase(), value.to_string()))
    }
}

impl<'i> AtRuleParser<'i> for RawDeclarationParser {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for RawDeclarationParser {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (String, String), ()> for RawDeclarationParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

fn set_declaration(style: &mut Vec<(String, String)>, property: &str, value: &str) {
    match style.iter_mut().find(|(p, _)| p == property) {
        Some((_, existing)) => *existing = value.to_string(),
        None => style.push((property.to_string(), value.to_string())),
    }
}

fn render_declarations(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{}: {}", property, value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ClassPathResolver, ResourceError, ResourceResolverBuilder};

    fn translator() -> CssInliningTranslator {
        let classpath = ClassPathResolver::new()
            .with_embedded("css/mail.css", "p { color: red; margin: 0 }\n.big { font-size: 20px }");
        let chain = ResourceResolverBuilder::new()
            .classpath_resolver(["classpath"], classpath)
            .default_lookup("classpath")
            .build();
        CssInliningTranslator::new(Arc::new(chain))
    }

    #[test]
    fn test_selector_parse() {
        let selector = Selector::parse("p.note#intro.big").unwrap();
        assert_eq!(selector.tag.as_deref(), Some("p"));
        assert_eq!(selector.ids, vec!["intro"]);
        assert_eq!(selector.classes, vec!["note", "big"]);
        assert_eq!(selector.specificity(), (1, 2, 1));
        assert!(Selector::parse("div > p").is_none());
        assert!(Selector::parse("a:hover").is_none());
    }

    #[test]
    fn test_specificity_then_order() {
        let css = "#intro { color: blue } p { color: red } .note { color: green } p { color: black }";
        let html = r#"<p id="intro" class="note">x</p><p>y</p>"#;
        assert_eq!(
            CssInliner.inline(html, css),
            r#"<p id="intro" class="note" style="color: blue">x</p><p style="color: black">y</p>"#
        );
    }

    #[test]
    fn test_inline_style_wins() {
        let html = r#"<p style="color: green">x</p>"#;
        assert_eq!(
            CssInliner.inline(html, "p { color: red; margin: 0 }"),
            r#"<p style="color: green; margin: 0">x</p>"#
        );
    }

    #[test]
    fn test_at_rules_ignored() {
        let css = "@import url(a.css);\n@media (max-width: 600px) { p { color: red } }\n/* c */ a { color: blue }";
        let html = "<p>x</p><a href=\"#\">y</a>";
        assert_eq!(
            CssInliner.inline(html, css),
            "<p>x</p><a href=\"#\" style=\"color: blue\">y</a>"
        );
    }

    #[test]
    fn test_declaration_with_parenthesis() {
        let declarations = parse_declarations("background: url(data:image/png;base64,AA); color: red");
        assert_eq!(
            declarations,
            vec![
                ("background".to_string(), "url(data:image/png;base64,AA)".to_string()),
                ("color".to_string(), "red".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_values_kept_whole() {
        let css = r#"p { font-family: "A;B", serif; color: red }"#;
        assert_eq!(
            parse_declarations("font-family: \"A;B\", serif; color: red"),
            vec![
                ("font-family".to_string(), "\"A;B\", serif".to_string()),
                ("color".to_string(), "red".to_string()),
            ]
        );
        assert_eq!(
            CssInliner.inline("<p>x</p>", css),
            r#"<p style="font-family: &quot;A;B&quot;, serif; color: red">x</p>"#
        );
    }

    #[test]
    fn test_brace_in_string_does_not_end_rule() {
        let css = r#"a::after { content: "}" } p { color: red }"#;
        assert_eq!(CssInliner.inline("<p>x</p>", css), r#"<p style="color: red">x</p>"#);
    }

    #[test]
    fn test_comments_between_selectors() {
        let css = "/* head */ em, /* mid */ strong { color: blue } p { margin: 0; }";
        let html = "<em>x</em><strong>y</strong><p>z</p>";
        assert_eq!(
            CssInliner.inline(html, css),
            r#"<em style="color: blue">x</em><strong style="color: blue">y</strong><p style="margin: 0">z</p>"#
        );
    }

    #[test]
    fn test_existing_style_with_quotes() {
        let html = r#"<p style="font-family: &quot;X;Y&quot;">x</p>"#;
        assert_eq!(
            CssInliner.inline(html, "p { font-family: serif; color: red }"),
            r#"<p style="font-family: &quot;X;Y&quot;; color: red">x</p>"#
        );
    }

    #[test]
    fn test_translate_linked_and_embedded_sheets() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"css/mail.css\"><style>.big { color: blue }</style></head><body><p class=\"big\">x</p></body></html>";
        let content = translator().translate(Content::text(html)).unwrap();
        assert_eq!(
            content.as_str(),
            Some("<html><head></head><body><p class=\"big\" style=\"color: blue; margin: 0; font-size: 20px\">x</p></body></html>")
        );
    }

    #[test]
    fn test_skipped_stylesheet_left_in_place() {
        let html = "<html><head><style data-inline-mode=\"skip\">p { color: red }</style></head><body><p>x</p></body></html>";
        let content = translator().translate(Content::text(html)).unwrap();
        assert_eq!(content.as_str(), Some(html));
    }

    #[test]
    fn test_missing_stylesheet_fails() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"css/missing.css\"></head></html>";
        let err = translator().translate(Content::text(html)).unwrap_err();
        match err {
            TranslationError::Resource { kind, reference, source } => {
                assert_eq!(kind, "stylesheet");
                assert_eq!(reference, "css/missing.css");
                assert!(matches!(source, ResourceError::NotFound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_untouched() {
        let content = translator().translate(Content::text("p { color: red }")).unwrap();
        assert_eq!(content, Content::text("p { color: red }"));
    }
}
