use std::fmt;

use thiserror::Error;

use crate::filler::FillError;
use crate::sender::SendError;
use crate::template::TemplateError;
use crate::translator::TranslationError;

/// Step of the message pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Template,
    Subject,
    Css,
    Images,
    Properties,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Template => "template",
            PipelineStage::Subject => "subject",
            PipelineStage::Css => "css",
            PipelineStage::Images => "images",
            PipelineStage::Properties => "properties",
        };
        f.write_str(name)
    }
}

/// Failure of a single pipeline stage
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Fill(#[from] FillError),
}

#[derive(Error, Debug)]
pub enum MessagingError {
    /// The messaging setup is unusable (no template engine, no sender...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// A pipeline stage failed. `reference` is the template reference of the
    /// content, or `<inline>` for content built in code.
    #[error("Stage {stage} failed for {reference}: {source}")]
    Stage {
        stage: PipelineStage,
        reference: String,
        #[source]
        source: StageError,
    },

    #[error(transparent)]
    Send(#[from] SendError),
}

/// Template errors only surface here while building the messaging setup
impl From<TemplateError> for MessagingError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Configuration(message) => MessagingError::Configuration(message),
            other => MessagingError::Configuration(other.to_string()),
        }
    }
}

impl MessagingError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, MessagingError::Configuration(_))
    }

    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            MessagingError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Channel;

    #[test]
    fn test_template_configuration_mapped() {
        let err = MessagingError::from(TemplateError::Configuration("no engine".into()));
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Configuration error: no engine");
    }

    #[test]
    fn test_stage_display() {
        let err = MessagingError::Stage {
            stage: PipelineStage::Images,
            reference: "<inline>".into(),
            source: TranslationError::InvalidInlineMode {
                src: "a.png".into(),
                mode: "embed".into(),
            }
            .into(),
        };
        assert_eq!(err.stage(), Some(PipelineStage::Images));
        assert_eq!(
            err.to_string(),
            "Stage images failed for <inline>: Unknown inline mode 'embed' on image a.png"
        );
    }

    #[test]
    fn test_send_error_display() {
        let err = MessagingError::from(SendError::NoSender { channel: Channel::Sms });
        assert_eq!(err.to_string(), "No sender available for sms message");
    }
}
