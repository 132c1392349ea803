//! Subject extraction from rendered content.
//!
//! - [`TextPrefixSubjectProvider`]: first line `Subject: ...` (the line is
//!   removed from the body)
//! - [`HtmlTitleSubjectProvider`]: `<title>` of an HTML document
//! - [`MultiContentSubjectProvider`]: first part of multi-part content that
//!   yields a subject
//! - [`FirstSupportingSubjectProvider`]: first provider that yields a subject

use std::sync::Arc;

use crate::message::{Content, ContentWithAttachments, MultiContent};
use crate::translator::html;

const SUBJECT_PREFIX: &str = "Subject:";

/// Subject found in a content
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSubject {
    pub subject: String,
    /// Replacement content when extraction consumed part of the body
    pub content: Option<Content>,
}

impl ExtractedSubject {
    fn new(subject: String) -> Self {
        Self {
            subject,
            content: None,
        }
    }
}

pub trait SubjectProvider: Send + Sync {
    /// `None` when the content carries no (non-empty) subject
    fn extract(&self, content: &Content) -> Option<ExtractedSubject>;
}

/// Uses the first line when it starts with `Subject:`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPrefixSubjectProvider;

impl SubjectProvider for TextPrefixSubjectProvider {
    fn extract(&self, content: &Content) -> Option<ExtractedSubject> {
        let Content::String(text) = content else {
            return None;
        };

        let text = text.as_str();
        let (first, rest) = match text.split_once('\n') {
            Some((first, rest)) => (first.trim_end_matches('\r'), rest),
            None => (text, ""),
        };
        let subject = first.strip_prefix(SUBJECT_PREFIX)?.trim();
        if subject.is_empty() {
            return None;
        }

        Some(ExtractedSubject {
            subject: subject.to_string(),
            content: Some(Content::text(rest)),
        })
    }
}

/// Uses the `<title>` of HTML content
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTitleSubjectProvider;

impl SubjectProvider for HtmlTitleSubjectProvider {
    fn extract(&self, content: &Content) -> Option<ExtractedSubject> {
        let Content::String(text) = content else {
            return None;
        };
        if !text.is_html() {
            return None;
        }
        html::title(text.as_str())
            .filter(|title| !title.is_empty())
            .map(ExtractedSubject::new)
    }
}

/// Asks providers in order, the first subject found wins
#[derive(Clone, Default)]
pub struct FirstSupportingSubjectProvider {
    providers: Vec<Arc<dyn SubjectProvider>>,
}

impl FirstSupportingSubjectProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl SubjectProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }
}

impl SubjectProvider for FirstSupportingSubjectProvider {
    fn extract(&self, content: &Content) -> Option<ExtractedSubject> {
        self.providers
            .iter()
            .find_map(|provider| provider.extract(content))
    }
}

/// Extends a provider to multi-part content and content carrying attachments.
///
/// Parts are inspected in order (nested multi-part content included); the
/// first part yielding a subject wins and only that part is replaced.
pub struct MultiContentSubjectProvider {
    delegate: Arc<dyn SubjectProvider>,
}

impl MultiContentSubjectProvider {
    pub fn new(delegate: impl SubjectProvider + 'static) -> Self {
        Self {
            delegate: Arc::new(delegate),
        }
    }
}

impl SubjectProvider for MultiContentSubjectProvider {
    fn extract(&self, content: &Content) -> Option<ExtractedSubject> {
        match content {
            Content::Multi(multi) => {
                let parts = multi.parts();
                parts.iter().enumerate().find_map(|(index, part)| {
                    let found = self.extract(part)?;
                    let content = found.content.map(|replacement| {
                        let mut parts = parts.to_vec();
                        parts[index] = replacement;
                        Content::Multi(MultiContent::new(parts))
                    });
                    Some(ExtractedSubject {
                        subject: found.subject,
                        content,
                    })
                })
            }
            Content::WithAttachments(with) => {
                let found = self.extract(with.content())?;
                let content = found.content.map(|replacement| {
                    Content::WithAttachments(ContentWithAttachments::new(
                        replacement,
                        with.attachments().to_vec(),
                    ))
                });
                Some(ExtractedSubject {
                    subject: found.subject,
                    content,
                })
            }
            other => self.delegate.extract(other),
        }
    }
}

/// `Subject:` prefix, then HTML title, through multi-part content
pub fn default_subject_provider() -> MultiContentSubjectProvider {
    MultiContentSubjectProvider::new(
        FirstSupportingSubjectProvider::new()
            .with(TextPrefixSubjectProvider)
            .with(HtmlTitleSubjectProvider),
    )
}
