use cloudevents_core::EventError;
use thiserror::Error;

/// Errors that can occur while receiving or emitting HTTP messages.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The message does not carry a usable CloudEvent.
    #[error("malformed HTTP message: {0}")]
    MalformedMessage(String),
    /// Body exceeds the configured limit.
    #[error("body size {size} exceeds maximum {max}")]
    BodyTooLarge {
        /// Actual body size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
    /// An attribute cannot be carried as an HTTP header without changing its value.
    #[error("attribute '{name}' cannot be sent as a header: {value:?}")]
    InvalidHeaderValue {
        /// Attribute or extension name.
        name: String,
        /// Rendered value.
        value: String,
    },
    /// Structured body could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
    /// Envelope construction, validation or payload serialization failed.
    #[error(transparent)]
    Event(#[from] EventError),
}
