//! Receiver implementation.

use cloudevents_core::validation::{is_json_media_type, media_type_essence};
use cloudevents_core::{Attribute, CloudEvent, Data, SpecVersion};
use serde_json::{Map, Value};

use crate::errors::HttpError;
use crate::headers::{Headers, CONTENT_TYPE};
use crate::mode::ContentMode;

/// Default maximum body size: 16 MiB.
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Options for receiving messages.
#[derive(Debug, Clone)]
pub struct ReceiverOptions {
    /// Reject bodies larger than this many bytes (default: 16 MiB; `None` for unlimited).
    pub max_body_size: Option<usize>,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            max_body_size: Some(MAX_BODY_SIZE),
        }
    }
}

/// Rebuilds envelopes from inbound HTTP headers and body.
///
/// The content mode is detected from `Content-Type`:
/// - `application/cloudevents+json` - the body is the whole envelope
/// - anything else - attributes come from `ce-` headers, the body is the payload
///
/// # Example
///
/// ```rust
/// use cloudevents_http::{Headers, HttpReceiver};
///
/// let headers: Headers = [
///     ("ce-id", "1"),
///     ("ce-source", "/s"),
///     ("ce-type", "t"),
///     ("ce-specversion", "1.0"),
///     ("Content-Type", "application/json"),
/// ]
/// .into_iter()
/// .collect();
///
/// let event = HttpReceiver::default().parse(&headers, br#"{"a":1}"#)?;
/// assert_eq!(event.id(), Some("1"));
/// assert_eq!(event.data_content_type(), Some("application/json"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpReceiver {
    options: ReceiverOptions,
}

impl HttpReceiver {
    /// Creates a receiver with the given options.
    pub fn new(options: ReceiverOptions) -> Self {
        Self { options }
    }

    /// Parses one message into an envelope.
    ///
    /// # Errors
    ///
    /// - [`HttpError::BodyTooLarge`] when the body exceeds the configured limit
    /// - [`HttpError::MalformedMessage`] when `specversion` is missing or unrecognized,
    ///   or a structured body is not a JSON object
    /// - [`HttpError::Event`] when envelope construction fails
    pub fn parse(&self, headers: &Headers, body: &[u8]) -> Result<CloudEvent, HttpError> {
        if let Some(max) = self.options.max_body_size {
            if body.len() > max {
                return Err(HttpError::BodyTooLarge {
                    size: body.len(),
                    max,
                });
            }
        }

        let mode = ContentMode::detect(headers);
        tracing::debug!(?mode, body_len = body.len(), "receiving cloud event");
        match mode {
            ContentMode::Structured => self.parse_structured(body),
            ContentMode::Binary => self.parse_binary(headers, body),
        }
    }

    fn parse_structured(&self, body: &[u8]) -> Result<CloudEvent, HttpError> {
        let value: Value = serde_json::from_slice(body).map_err(|err| {
            HttpError::MalformedMessage(format!("structured body is not valid JSON: {err}"))
        })?;
        let Value::Object(attributes) = value else {
            return Err(HttpError::MalformedMessage(
                "structured body is not a JSON object".to_string(),
            ));
        };

        let declared = attributes
            .get(Attribute::SpecVersion.name())
            .and_then(Value::as_str);
        spec_version(declared, "specversion")?;
        Ok(CloudEvent::new(attributes)?)
    }

    fn parse_binary(&self, headers: &Headers, body: &[u8]) -> Result<CloudEvent, HttpError> {
        let version = spec_version(headers.get("ce-specversion"), "ce-specversion")?;

        let mut attributes = Map::new();
        let mut extensions = Vec::new();
        for (name, value) in headers.ce_attributes() {
            let value = value.trim().to_string();
            match Attribute::from_name(name) {
                Some(attribute) if version.has_attribute(attribute) => {
                    attributes.insert(attribute.name().to_string(), Value::String(value));
                }
                _ => extensions.push((name.to_string(), value)),
            }
        }

        let content_type = headers.get(CONTENT_TYPE).map(str::trim);
        if let Some(content_type) = content_type {
            attributes.insert(
                Attribute::DataContentType.name().to_string(),
                Value::String(content_type.to_string()),
            );
        }

        // An encoded 0.3 payload travels as raw bytes in binary mode.
        let data = if attributes.contains_key(Attribute::DataContentEncoding.name()) {
            raw_data(body)
        } else {
            body_data(content_type, body)
        };
        let mut event = CloudEvent::from_parts(attributes, data)?;
        for (name, value) in extensions {
            event.add_extension(&name, value)?;
        }
        Ok(event)
    }
}

fn spec_version(declared: Option<&str>, field: &str) -> Result<SpecVersion, HttpError> {
    let declared =
        declared.ok_or_else(|| HttpError::MalformedMessage(format!("missing {field}")))?;
    declared
        .trim()
        .parse()
        .map_err(|_| HttpError::MalformedMessage(format!("unrecognized {field} '{declared}'")))
}

fn raw_data(body: &[u8]) -> Data {
    if body.is_empty() {
        Data::Empty
    } else {
        Data::Binary(body.to_vec())
    }
}

/// Tags a binary-mode body by its media type.
///
/// JSON media types parse into a structured value, `text/*` bodies that are
/// valid UTF-8 become text, and everything else stays raw bytes.
fn body_data(content_type: Option<&str>, body: &[u8]) -> Data {
    if body.is_empty() {
        return raw_data(body);
    }
    match content_type {
        Some(content_type) if is_json_media_type(content_type) => {
            match serde_json::from_slice::<Value>(body) {
                Ok(value) => Data::from_json(value),
                Err(_) => Data::Binary(body.to_vec()),
            }
        }
        Some(content_type) if media_type_essence(content_type).starts_with("text/") => {
            match std::str::from_utf8(body) {
                Ok(text) => Data::Text(text.to_string()),
                Err(_) => Data::Binary(body.to_vec()),
            }
        }
        _ => Data::Binary(body.to_vec()),
    }
}
