//! Image inlining.
//!
//! `<img>` sources are loaded through the resolver chain and embedded in the
//! email, either as an inline attachment referenced by `cid:` or as a base64
//! data URI. The mode is chosen per image:
//!
//! ```html
//! <img src="classpath:/images/logo.png" data-inline-mode="attach" />
//! <img src="images/banner.jpg" data-inline-mode="base64" />
//! <img src="https://cdn.example.com/tracking.gif" data-inline-mode="skip" />
//! ```
//!
//! Without the attribute, attachment is used when configured, then base64.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::message::{Attachment, Content, ContentWithAttachments, StringContent};
use crate::resource::{Resource, ResourceReference, ResourceResolver};

use super::html;
use super::{map_strings, ContentTranslator, MimeTypeProvider, TranslationError, TranslationResult};

/// Attribute selecting how an element is inlined
pub const INLINE_MODE_ATTRIBUTE: &str = "data-inline-mode";

/// Sources that are never loaded
const UNTOUCHED_SCHEMES: &[&str] = &["data:", "cid:", "http:", "https:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineMode {
    Attach,
    Base64,
    Skip,
}

impl InlineMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "attach" => Some(InlineMode::Attach),
            "base64" => Some(InlineMode::Base64),
            "skip" => Some(InlineMode::Skip),
            _ => None,
        }
    }
}

/// Result of inlining one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedImage {
    /// New value of the `src` attribute
    pub src: String,
    pub attachment: Option<Attachment>,
}

/// Embeds a loaded image
pub trait ImageInliner: Send + Sync {
    fn inline(&self, image: &Resource, mimetype: &str) -> InlinedImage;
}

/// Attaches the image and references it by Content-ID
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachImageInliner;

impl ImageInliner for AttachImageInliner {
    fn inline(&self, image: &Resource, mimetype: &str) -> InlinedImage {
        let content_id = Uuid::new_v4().to_string();
        InlinedImage {
            src: format!("cid:{}", content_id),
            attachment: Some(Attachment::inline(
                image.file_name(),
                image.bytes().to_vec(),
                mimetype,
                content_id,
            )),
        }
    }
}

/// Replaces the source by a base64 data URI
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64ImageInliner;

impl ImageInliner for Base64ImageInliner {
    fn inline(&self, image: &Resource, mimetype: &str) -> InlinedImage {
        InlinedImage {
            src: format!("data:{};base64,{}", mimetype, STANDARD.encode(image.bytes())),
            attachment: None,
        }
    }
}

/// Inlines `<img>` elements of HTML content.
///
/// Each inliner is optional; images whose mode has no inliner configured are
/// left as they are.
pub struct ImageInliningTranslator {
    resolver: Arc<dyn ResourceResolver>,
    mimetypes: Arc<dyn MimeTypeProvider>,
    attach: Option<Arc<dyn ImageInliner>>,
    base64: Option<Arc<dyn ImageInliner>>,
}

impl ImageInliningTranslator {
    pub fn new(resolver: Arc<dyn ResourceResolver>, mimetypes: Arc<dyn MimeTypeProvider>) -> Self {
        Self {
            resolver,
            mimetypes,
            attach: None,
            base64: None,
        }
    }

    pub fn with_attach(mut self, inliner: Arc<dyn ImageInliner>) -> Self {
        self.attach = Some(inliner);
        self
    }

    pub fn with_base64(mut self, inliner: Arc<dyn ImageInliner>) -> Self {
        self.base64 = Some(inliner);
        self
    }

    /// Modes that can actually be applied
    pub fn enabled_modes(&self) -> Vec<InlineMode> {
        let mut modes = Vec::new();
        if self.attach.is_some() {
            modes.push(InlineMode::Attach);
        }
        if self.base64.is_some() {
            modes.push(InlineMode::Base64);
        }
        modes
    }

    fn select(&self, mode: Option<InlineMode>) -> Option<&Arc<dyn ImageInliner>> {
        match mode {
            Some(InlineMode::Attach) => self.attach.as_ref(),
            Some(InlineMode::Base64) => self.base64.as_ref(),
            Some(InlineMode::Skip) => None,
            None => self.attach.as_ref().or(self.base64.as_ref()),
        }
    }

    fn inline_html(&self, text: StringContent) -> TranslationResult<Content> {
        let mut attachments = Vec::new();

        let inlined = html::rewrite_tags(text.as_str(), |mut tag| -> TranslationResult<_> {
            if !tag.is("img") {
                return Ok(None);
            }
            let Some(src) = tag.attr("src").map(str::to_string) else {
                return Ok(None);
            };

            let mode = match tag.attr(INLINE_MODE_ATTRIBUTE) {
                Some(raw) => Some(InlineMode::parse(raw).ok_or_else(|| {
                    TranslationError::InvalidInlineMode {
                        src: src.clone(),
                        mode: raw.to_string(),
                    }
                })?),
                None => None,
            };

            let Some(inliner) = self.select(mode) else {
                tracing::debug!(src = %src, mode = ?mode, "Image not inlined");
                return Ok(None);
            };
            if UNTOUCHED_SCHEMES.iter().any(|scheme| {
                src.get(..scheme.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
            }) {
                return Ok(None);
            }

            let image = self
                .resolver
                .resolve(&ResourceReference::parse(src.as_str()))
                .map_err(|source| TranslationError::Resource {
                    kind: "image",
                    reference: src.clone(),
                    source,
                })?;

            let Some(mimetype) = self.mimetypes.detect(image.bytes(), image.reference().path()) else {
                tracing::warn!(src = %src, "Unable to detect image mimetype, image not inlined");
                return Ok(None);
            };

            let result = inliner.inline(&image, &mimetype);
            tracing::debug!(src = %src, mimetype = %mimetype, attached = result.attachment.is_some(), "Image inlined");

            tag.set_attr("src", result.src);
            tag.remove_attr(INLINE_MODE_ATTRIBUTE);
            attachments.extend(result.attachment);
            Ok(Some(tag.render()))
        })?;

        if attachments.is_empty() {
            Ok(Content::text(inlined))
        } else {
            Ok(Content::WithAttachments(ContentWithAttachments::new(
                Content::text(inlined),
                attachments,
            )))
        }
    }
}

impl ContentTranslator for ImageInliningTranslator {
    #[tracing::instrument(name = "translator.images", skip_all)]
    fn translate(&self, content: Content) -> TranslationResult<Content> {
        map_strings(content, &mut |text: StringContent| {
            if !text.is_html() {
                return Ok(Content::String(text));
            }
            self.inline_html(text)
        })
    }
}
