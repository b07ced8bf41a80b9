use cloudevents_core::validation::media_type_essence;

use crate::headers::{Headers, CONTENT_TYPE};

/// Media type marking a structured-mode body.
pub const STRUCTURED_MEDIA_TYPE: &str = "application/cloudevents+json";

/// How an event is laid out in an HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// The whole envelope is one JSON document in the body.
    Structured,
    /// Attributes travel as `ce-` headers and the body is the raw payload.
    Binary,
}

impl ContentMode {
    /// Structured when `Content-Type` is `application/cloudevents+json` (any parameters), else binary.
    pub fn detect(headers: &Headers) -> Self {
        match headers.get(CONTENT_TYPE) {
            Some(content_type) if media_type_essence(content_type) == STRUCTURED_MEDIA_TYPE => {
                ContentMode::Structured
            }
            _ => ContentMode::Binary,
        }
    }
}
