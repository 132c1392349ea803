//! Message content variants

use std::fmt;

use crate::template::TemplateContext;

use super::Attachment;

/// Body of a message.
///
/// Content is never modified in place: each pipeline stage consumes the
/// content and hands back a new value.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Rendered text or HTML
    String(StringContent),
    /// Ordered alternatives (text part, HTML part)
    Multi(MultiContent),
    /// Reference to a template, rendered by the template stage
    Template(TemplateContent),
    /// Content plus the attachments produced while inlining it
    WithAttachments(ContentWithAttachments),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::String(StringContent::new(text))
    }

    pub fn template(reference: impl Into<String>, context: TemplateContext) -> Self {
        Content::Template(TemplateContent::new(reference, context))
    }

    pub fn multi(parts: Vec<Content>) -> Self {
        Content::Multi(MultiContent::new(parts))
    }

    /// Text and HTML variants of the same template: `name.txt` then `name.html`.
    pub fn multi_template(name: impl AsRef<str>, context: TemplateContext) -> Self {
        let name = name.as_ref();
        Content::multi(vec![
            Content::template(format!("{}.txt", name), context.clone()),
            Content::template(format!("{}.html", name), context),
        ])
    }

    /// The template reference this content was created from, if any.
    ///
    /// For multi-part content the first template reference found is returned.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Content::Template(template) => Some(template.reference()),
            Content::Multi(multi) => multi.parts().iter().find_map(Content::reference),
            Content::WithAttachments(with) => with.content().reference(),
            Content::String(_) => None,
        }
    }

    /// Rendered string body, if this is rendered single-part content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::String(s) => Some(s.as_str()),
            Content::WithAttachments(with) => with.content().as_str(),
            _ => None,
        }
    }

    /// Detach the attachments gathered by inlining and return the bare content.
    pub fn take_attachments(self) -> (Content, Vec<Attachment>) {
        match self {
            Content::WithAttachments(with) => {
                let (inner, mut nested) = with.content.take_attachments();
                let mut attachments = with.attachments;
                attachments.append(&mut nested);
                (inner, attachments)
            }
            Content::Multi(multi) => {
                let mut attachments = Vec::new();
                let parts = multi
                    .parts
                    .into_iter()
                    .map(|part| {
                        let (part, mut found) = part.take_attachments();
                        attachments.append(&mut found);
                        part
                    })
                    .collect();
                (Content::multi(parts), attachments)
            }
            other => (other, Vec::new()),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::text(value)
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::text(value)
    }
}

/// Rendered body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringContent {
    content: String,
}

impl StringContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }

    /// Whether the body looks like an HTML document
    pub fn is_html(&self) -> bool {
        crate::translator::html::is_html(&self.content)
    }
}

impl fmt::Display for StringContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiContent {
    parts: Vec<Content>,
}

impl MultiContent {
    pub fn new(parts: Vec<Content>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[Content] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Content> {
        self.parts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateContent {
    reference: String,
    context: TemplateContext,
}

impl TemplateContent {
    pub fn new(reference: impl Into<String>, context: TemplateContext) -> Self {
        Self {
            reference: reference.into(),
            context,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentWithAttachments {
    content: Box<Content>,
    attachments: Vec<Attachment>,
}

impl ContentWithAttachments {
    pub fn new(content: Content, attachments: Vec<Attachment>) -> Self {
        Self {
            content: Box::new(content),
            attachments,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn into_parts(self) -> (Content, Vec<Attachment>) {
        (*self.content, self.attachments)
    }
}
