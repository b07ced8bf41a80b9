//! Emitter implementation.

use cloudevents_core::{Attribute, CloudEvent, EventError};
use serde_json::Value;

use crate::errors::HttpError;
use crate::headers::{Headers, CE_PREFIX, CONTENT_TYPE};
use crate::mode::{ContentMode, STRUCTURED_MEDIA_TYPE};

/// Options for emitting messages.
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// Charset parameter appended to the structured content type (default: `utf-8`).
    pub charset: Option<String>,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            charset: Some("utf-8".to_string()),
        }
    }
}

/// Outbound headers and body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpMessage {
    /// Headers to send.
    pub headers: Headers,
    /// Body bytes.
    pub body: Vec<u8>,
}

/// Header values are read back trimmed, and control characters would split
/// or corrupt the header block.
fn is_header_safe(value: &str) -> bool {
    value.trim() == value && !value.chars().any(char::is_control)
}

/// Produces HTTP messages from envelopes in an explicitly chosen mode.
///
/// Both modes validate the event first; nothing is produced for an event that
/// fails `check()`.
///
/// - [`ContentMode::Structured`] - canonical JSON body, `application/cloudevents+json`
/// - [`ContentMode::Binary`] - `ce-` headers, `Content-Type` from `datacontenttype`,
///   payload as the raw body
#[derive(Debug, Clone, Default)]
pub struct HttpEmitter {
    options: EmitterOptions,
}

impl HttpEmitter {
    /// Creates an emitter with the given options.
    pub fn new(options: EmitterOptions) -> Self {
        Self { options }
    }

    /// Encodes `event` in `mode`.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Event`] when the event fails `check()`
    /// - [`HttpError::InvalidHeaderValue`] in binary mode for a value with
    ///   leading/trailing whitespace or control characters
    /// - [`HttpError::Canonicalization`] when the structured body cannot be rendered
    pub fn emit(&self, event: &CloudEvent, mode: ContentMode) -> Result<HttpMessage, HttpError> {
        let message = match mode {
            ContentMode::Structured => self.emit_structured(event)?,
            ContentMode::Binary => self.emit_binary(event)?,
        };
        tracing::debug!(
            ?mode,
            id = event.id().unwrap_or_default(),
            body_len = message.body.len(),
            "emitted cloud event"
        );
        Ok(message)
    }

    fn emit_structured(&self, event: &CloudEvent) -> Result<HttpMessage, HttpError> {
        let wire = Value::Object(event.format()?);
        let body = canonical_json::to_string(&wire)
            .map_err(|err| HttpError::Canonicalization(err.to_string()))?
            .into_bytes();

        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, self.structured_content_type());
        Ok(HttpMessage { headers, body })
    }

    fn emit_binary(&self, event: &CloudEvent) -> Result<HttpMessage, HttpError> {
        event.check()?;
        let payload = event.payload();

        let mut headers = Headers::new();
        for (name, value) in &payload.attributes {
            if name == Attribute::DataContentType.name() {
                continue;
            }
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            if !is_header_safe(&rendered) {
                return Err(HttpError::InvalidHeaderValue {
                    name: name.clone(),
                    value: rendered,
                });
            }
            headers.insert(format!("{CE_PREFIX}{name}"), rendered);
        }
        if let Some(content_type) = event.data_content_type() {
            headers.insert(CONTENT_TYPE, content_type);
        }

        let body = payload.data.to_bytes().map_err(EventError::from)?;
        Ok(HttpMessage { headers, body })
    }

    fn structured_content_type(&self) -> String {
        match &self.options.charset {
            Some(charset) => format!("{STRUCTURED_MEDIA_TYPE}; charset={charset}"),
            None => STRUCTURED_MEDIA_TYPE.to_string(),
        }
    }
}
