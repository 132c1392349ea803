// Supporting modules
pub mod config;
pub mod error;

// Resources and content model
pub mod message;
pub mod resource;

// Templates and content transformation
pub mod subject;
pub mod template;
pub mod translator;

// Message completion and delivery
pub mod filler;
pub mod pipeline;
pub mod sender;

pub use error::{MessagingError, Result};
pub use message::{Content, Email, Message, Sms};
pub use pipeline::{MessagingBuilder, MessagingService};
