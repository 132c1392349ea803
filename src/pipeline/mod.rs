//! Message preparation and delivery.
//!
//! [`MessagePipeline`] prepares a message in a fixed order:
//!
//! 1. template rendering
//! 2. subject extraction
//! 3. CSS inlining (emails only)
//! 4. image inlining (emails only)
//! 5. recipients and sender from properties
//!
//! Each optional stage is skipped when not configured. [`MessagingService`]
//! runs the pipeline then hands the message to the first sender supporting
//! its channel. Both are assembled by [`MessagingBuilder`].

mod builder;
mod service;

use std::sync::Arc;

use crate::error::{MessagingError, PipelineStage, Result, StageError};
use crate::filler::{EveryFiller, MessageFiller, SubjectFiller};
use crate::message::{Content, Message};
use crate::translator::ContentTranslator;

pub use builder::{ImageInliningBuilder, MessagingBuilder};
pub use service::MessagingService;

/// Reference reported for content that was not created from a template
pub const INLINE_REFERENCE: &str = "<inline>";

/// Ordered preparation stages. Immutable once built and shared between sends.
pub struct MessagePipeline {
    templates: Option<Arc<dyn ContentTranslator>>,
    subject: Option<SubjectFiller>,
    css: Option<Arc<dyn ContentTranslator>>,
    images: Option<Arc<dyn ContentTranslator>>,
    fillers: EveryFiller,
}

impl MessagePipeline {
    pub(crate) fn new(
        templates: Option<Arc<dyn ContentTranslator>>,
        subject: Option<SubjectFiller>,
        css: Option<Arc<dyn ContentTranslator>>,
        images: Option<Arc<dyn ContentTranslator>>,
        fillers: EveryFiller,
    ) -> Self {
        Self {
            templates,
            subject,
            css,
            images,
            fillers,
        }
    }

    /// Stages that will run, in order
    pub fn stages(&self) -> Vec<PipelineStage> {
        let mut stages = Vec::new();
        if self.templates.is_some() {
            stages.push(PipelineStage::Template);
        }
        if self.subject.is_some() {
            stages.push(PipelineStage::Subject);
        }
        if self.css.is_some() {
            stages.push(PipelineStage::Css);
        }
        if self.images.is_some() {
            stages.push(PipelineStage::Images);
        }
        if !self.fillers.is_empty() {
            stages.push(PipelineStage::Properties);
        }
        stages
    }

    #[tracing::instrument(name = "pipeline.prepare", skip_all, fields(channel = %message.channel()))]
    pub fn prepare(&self, mut message: Message) -> Result<Message> {
        let reference = message
            .content()
            .reference()
            .unwrap_or(INLINE_REFERENCE)
            .to_string();

        match &self.templates {
            Some(templates) => {
                translate(&mut message, templates.as_ref(), PipelineStage::Template, &reference)?
            }
            None if reference != INLINE_REFERENCE => {
                return Err(MessagingError::Configuration(format!(
                    "Template content {} received but template support is disabled",
                    reference
                )));
            }
            None => {}
        }

        if let Some(subject) = &self.subject {
            fill(&mut message, subject, PipelineStage::Subject, &reference)?;
        }

        if matches!(message, Message::Email(_)) {
            if let Some(css) = &self.css {
                translate(&mut message, css.as_ref(), PipelineStage::Css, &reference)?;
            }
            if let Some(images) = &self.images {
                translate(&mut message, images.as_ref(), PipelineStage::Images, &reference)?;
            }
        }

        fill(&mut message, &self.fillers, PipelineStage::Properties, &reference)?;

        tracing::debug!(
            reference = %reference,
            recipients = message.recipient_count(),
            "Message prepared"
        );
        Ok(message)
    }
}

fn translate(
    message: &mut Message,
    translator: &dyn ContentTranslator,
    stage: PipelineStage,
    reference: &str,
) -> Result<()> {
    let content = message.replace_content(Content::text(""));
    let translated = translator
        .translate(content)
        .map_err(|e| stage_error(stage, reference, e.into()))?;
    message.replace_content(translated);
    tracing::trace!(stage = %stage, reference = %reference, "Stage done");
    Ok(())
}

fn fill(
    message: &mut Message,
    filler: &dyn MessageFiller,
    stage: PipelineStage,
    reference: &str,
) -> Result<()> {
    filler
        .fill(message)
        .map_err(|e| stage_error(stage, reference, e.into()))?;
    tracing::trace!(stage = %stage, reference = %reference, "Stage done");
    Ok(())
}

fn stage_error(stage: PipelineStage, reference: &str, source: StageError) -> MessagingError {
    tracing::debug!(stage = %stage, reference = %reference, error = %source, "Stage failed");
    MessagingError::Stage {
        stage,
        reference: reference.to_string(),
        source,
    }
}
