//! Message fillers.
//!
//! Fillers complete a message before it is sent: subject from the content,
//! recipients and sender from configuration properties. Values set by the
//! caller are never overwritten.

mod properties;
mod subject;

use thiserror::Error;

use crate::message::{AddressError, Message};

pub use properties::{MessageAwareFiller, PropertiesFiller};
pub use subject::SubjectFiller;

/// Filler-specific error type
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Invalid value '{value}' for property {key}: {source}")]
    InvalidProperty {
        key: String,
        value: String,
        #[source]
        source: AddressError,
    },
}

/// Result type for filler operations
pub type FillResult<T> = Result<T, FillError>;

pub trait MessageFiller: Send + Sync {
    fn fill(&self, message: &mut Message) -> FillResult<()>;
}

/// Applies every filler in registration order, stopping at the first error
#[derive(Default)]
pub struct EveryFiller {
    fillers: Vec<Box<dyn MessageFiller>>,
}

impl EveryFiller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filler: impl MessageFiller + 'static) -> Self {
        self.fillers.push(Box::new(filler));
        self
    }

    pub fn len(&self) -> usize {
        self.fillers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fillers.is_empty()
    }
}

impl MessageFiller for EveryFiller {
    fn fill(&self, message: &mut Message) -> FillResult<()> {
        for filler in &self.fillers {
            filler.fill(message)?;
        }
        Ok(())
    }
}
