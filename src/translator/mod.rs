//! Content translators.
//!
//! A translator consumes a [`Content`] and returns the transformed content.
//! The pipeline runs them in a fixed order:
//!
//! 1. [`TemplateContentTranslator`] renders template references
//! 2. [`CssInliningTranslator`] copies stylesheet rules into `style` attributes
//! 3. [`ImageInliningTranslator`] embeds `<img>` resources as attachments or
//!    data URIs
//!
//! Subject extraction runs between the template and CSS stages, see
//! [`crate::filler::SubjectFiller`].

mod css;
pub mod html;
mod image;
mod mimetype;
mod template;

use thiserror::Error;

use crate::message::{Content, ContentWithAttachments, MultiContent, StringContent};
use crate::resource::ResourceError;
use crate::template::TemplateError;

pub use css::{CssInliner, CssInliningTranslator};
pub use image::{
    AttachImageInliner, Base64ImageInliner, ImageInliner, ImageInliningTranslator, InlineMode,
    InlinedImage, INLINE_MODE_ATTRIBUTE,
};
pub use mimetype::{
    ExtensionMimeTypeProvider, FirstSupportingMimeTypeProvider, FixedMimeTypeProvider,
    MagicBytesMimeTypeProvider, MimeTypeProvider,
};
pub use template::TemplateContentTranslator;

/// Translator-specific error type
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A stylesheet or image referenced by the content could not be loaded
    #[error("Failed to load {kind} {reference}: {source}")]
    Resource {
        kind: &'static str,
        reference: String,
        #[source]
        source: ResourceError,
    },

    #[error("Unknown inline mode '{mode}' on image {src}")]
    InvalidInlineMode { src: String, mode: String },
}

/// Result type for translator operations
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Transforms message content
pub trait ContentTranslator: Send + Sync {
    fn translate(&self, content: Content) -> TranslationResult<Content>;
}

/// Apply `f` to every rendered string part, keeping the structure of multi-part
/// content and the attachments already gathered.
pub(crate) fn map_strings<F>(content: Content, f: &mut F) -> TranslationResult<Content>
where
    F: FnMut(StringContent) -> TranslationResult<Content>,
{
    match content {
        Content::String(text) => f(text),
        Content::Multi(multi) => {
            let parts = multi
                .into_parts()
                .into_iter()
                .map(|part| map_strings(part, f))
                .collect::<TranslationResult<Vec<_>>>()?;
            Ok(Content::Multi(MultiContent::new(parts)))
        }
        Content::WithAttachments(with) => {
            let (inner, mut attachments) = with.into_parts();
            match map_strings(inner, f)? {
                Content::WithAttachments(nested) => {
                    let (inner, mut added) = nested.into_parts();
                    attachments.append(&mut added);
                    Ok(Content::WithAttachments(ContentWithAttachments::new(
                        inner,
                        attachments,
                    )))
                }
                inner => Ok(Content::WithAttachments(ContentWithAttachments::new(
                    inner,
                    attachments,
                ))),
            }
        }
        // Unrendered templates are not touched
        template @ Content::Template(_) => Ok(template),
    }
}
