use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::attributes::Attribute;
use crate::data::Data;
use crate::errors::EventError;
use crate::formatter::Formatter;
use crate::spec::{Extensions, Payload, SpecStrategy, SpecVersion, Strategy};

/// A CloudEvents envelope bound to one spec version.
///
/// The version is chosen from `specversion` at construction (defaulting to
/// [`SpecVersion::LATEST`]) and never changes. All accessors delegate to the
/// bound [`Strategy`], so reading or writing an attribute from the other
/// version fails with [`EventError::VersionMismatch`].
///
/// An envelope is not synchronized; share it across threads only for reads.
///
/// # Example
///
/// ```rust
/// use cloudevents_core::{CloudEvent, EventError};
/// use serde_json::json;
///
/// let attributes = json!({"specversion": "0.3", "source": "/s", "type": "t"});
/// let event = CloudEvent::new(attributes.as_object().unwrap().clone())?;
///
/// assert!(!event.id().unwrap_or_default().is_empty());
/// assert!(matches!(event.get("dataSchema"), Err(EventError::VersionMismatch { .. })));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent {
    strategy: Strategy,
}

impl CloudEvent {
    /// Builds an envelope from a plain attribute mapping.
    ///
    /// `data` and `data_base64` keys become the payload; recognized attribute
    /// names are copied through the strategy setters; every other key is an
    /// extension.
    ///
    /// # Errors
    ///
    /// - [`EventError::UnsupportedSpecVersion`] for a `specversion` other than `1.0`/`0.3`
    /// - [`EventError::MissingRequiredAttribute`] when `type` or `source` is absent
    /// - [`EventError::VersionMismatch`] for an attribute of the other version
    /// - [`EventError::ExtensionNameCollision`] / [`EventError::InvalidAttributeValue`]
    pub fn new(mut attributes: Map<String, Value>) -> Result<Self, EventError> {
        let data = Formatter::take_data(&mut attributes)?;
        let mut event = Self::from_parts(attributes, data)?;
        event.decode_content_encoding()?;
        Ok(event)
    }

    /// Builds an envelope from an attribute mapping and an already-tagged payload.
    ///
    /// The payload is taken as given; `datacontentencoding` does not trigger
    /// base64 decoding on this path.
    pub fn from_parts(attributes: Map<String, Value>, data: Data) -> Result<Self, EventError> {
        let version = resolve_version(&attributes)?;
        for required in [Attribute::Type, Attribute::Source] {
            if lookup(&attributes, required.name()).is_none() {
                return Err(EventError::MissingRequiredAttribute(required.name()));
            }
        }

        let mut strategy = Strategy::new(version);
        if lookup(&attributes, Attribute::Id.name()).is_none() {
            strategy.set(Attribute::Id.name(), Some(Uuid::new_v4().to_string()))?;
        }

        for (name, value) in attributes {
            if value.is_null() {
                continue;
            }
            match Attribute::from_name(&name) {
                Some(Attribute::SpecVersion) => {}
                Some(_) => match value {
                    Value::String(text) => strategy.set(&name, Some(text))?,
                    other => {
                        return Err(EventError::invalid(
                            name,
                            other.to_string(),
                            "must be a string",
                        ))
                    }
                },
                None => strategy.add_extension(&name, value)?,
            }
        }

        strategy.set_data(data);
        tracing::trace!(
            specversion = %version,
            extensions = strategy.extensions().len(),
            "constructed cloud event"
        );
        Ok(Self { strategy })
    }

    /// 0.3 structured events may carry binary data as a base64 string flagged by `datacontentencoding`.
    fn decode_content_encoding(&mut self) -> Result<(), EventError> {
        if self.spec_version() != SpecVersion::V03 {
            return Ok(());
        }
        let encoded = self
            .get(Attribute::DataContentEncoding.name())?
            .is_some_and(|encoding| encoding.eq_ignore_ascii_case("base64"));
        let Data::Text(text) = self.data() else {
            return Ok(());
        };
        if !encoded {
            return Ok(());
        }
        let bytes = STANDARD
            .decode(text.as_bytes())
            .map_err(|_| EventError::invalid("data", text.clone(), "must be base64"))?;
        self.set_data(Data::Binary(bytes));
        Ok(())
    }

    /// Starts a typed builder.
    pub fn builder() -> CloudEventBuilder {
        CloudEventBuilder::default()
    }

    /// Version bound at construction.
    pub fn spec_version(&self) -> SpecVersion {
        self.strategy.version()
    }

    /// The bound strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Reads a context attribute by name.
    pub fn get(&self, name: &str) -> Result<Option<&str>, EventError> {
        self.strategy.get(name)
    }

    /// Writes a context attribute by name; `None` clears it.
    ///
    /// Clearing a required attribute is allowed here and reported by [`check`](Self::check).
    pub fn set<S: Into<String>>(&mut self, name: &str, value: Option<S>) -> Result<(), EventError> {
        self.strategy.set(name, value.map(Into::into))
    }

    /// `id`
    pub fn id(&self) -> Option<&str> {
        self.known(Attribute::Id)
    }

    /// `source`
    pub fn source(&self) -> Option<&str> {
        self.known(Attribute::Source)
    }

    /// `type`
    pub fn ty(&self) -> Option<&str> {
        self.known(Attribute::Type)
    }

    /// `time`, normalized to RFC 3339 UTC when it parsed.
    pub fn time(&self) -> Option<&str> {
        self.known(Attribute::Time)
    }

    /// `subject`
    pub fn subject(&self) -> Option<&str> {
        self.known(Attribute::Subject)
    }

    /// `datacontenttype`
    pub fn data_content_type(&self) -> Option<&str> {
        self.known(Attribute::DataContentType)
    }

    // Attributes shared by every version never mismatch.
    fn known(&self, attribute: Attribute) -> Option<&str> {
        self.strategy.get(attribute.name()).ok().flatten()
    }

    /// Current payload.
    pub fn data(&self) -> &Data {
        self.strategy.data()
    }

    /// Replaces the payload.
    pub fn set_data(&mut self, data: impl Into<Data>) {
        self.strategy.set_data(data.into());
    }

    /// Adds or overwrites an extension; the entry moves to the front of [`extensions`](Self::extensions).
    pub fn add_extension(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EventError> {
        self.strategy.add_extension(name, value.into())
    }

    /// Removes an extension.
    pub fn remove_extension(&mut self, name: &str) -> Option<Value> {
        self.strategy.remove_extension(name)
    }

    /// Extensions, most recently added first.
    pub fn extensions(&self) -> &Extensions {
        self.strategy.extensions()
    }

    /// Single extension value.
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.strategy.extensions().get(name)
    }

    /// Runs full validation.
    pub fn check(&self) -> Result<(), EventError> {
        self.strategy.check()
    }

    /// Flat mapping of every set attribute and the payload.
    pub fn payload(&self) -> Payload {
        self.strategy.payload()
    }

    /// Validates, then returns the structured wire mapping.
    pub fn format(&self) -> Result<Map<String, Value>, EventError> {
        self.check()?;
        Ok(Formatter::format(&self.payload()))
    }
}

/// Diagnostic JSON rendering; does not validate.
impl fmt::Display for CloudEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Formatter::to_json_string(&self.payload()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn lookup<'a>(attributes: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    attributes
        .iter()
        .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_null())
        .map(|(_, value)| value)
}

fn resolve_version(attributes: &Map<String, Value>) -> Result<SpecVersion, EventError> {
    match lookup(attributes, Attribute::SpecVersion.name()) {
        None => Ok(SpecVersion::LATEST),
        Some(Value::String(declared)) => declared.parse(),
        Some(other) => Err(EventError::UnsupportedSpecVersion(other.to_string())),
    }
}

/// Typed construction routed through [`CloudEvent::from_parts`].
#[derive(Debug, Clone, Default)]
pub struct CloudEventBuilder {
    attributes: Map<String, Value>,
    extensions: Vec<(String, Value)>,
    data: Data,
}

impl CloudEventBuilder {
    fn attribute(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.attributes
            .insert(attribute.name().to_string(), Value::String(value.into()));
        self
    }

    /// Sets `specversion`.
    pub fn spec_version(self, version: SpecVersion) -> Self {
        self.attribute(Attribute::SpecVersion, version.as_str())
    }

    /// Sets `id`.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attribute(Attribute::Id, id)
    }

    /// Sets `source`.
    pub fn source(self, source: impl Into<String>) -> Self {
        self.attribute(Attribute::Source, source)
    }

    /// Sets `type`.
    pub fn ty(self, ty: impl Into<String>) -> Self {
        self.attribute(Attribute::Type, ty)
    }

    /// Sets `time`.
    pub fn time(self, time: impl Into<String>) -> Self {
        self.attribute(Attribute::Time, time)
    }

    /// Sets `subject`.
    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.attribute(Attribute::Subject, subject)
    }

    /// Sets `datacontenttype`.
    pub fn data_content_type(self, media_type: impl Into<String>) -> Self {
        self.attribute(Attribute::DataContentType, media_type)
    }

    /// Sets `dataschema` (1.0).
    pub fn data_schema(self, uri: impl Into<String>) -> Self {
        self.attribute(Attribute::DataSchema, uri)
    }

    /// Sets `schemaurl` (0.3).
    pub fn schema_url(self, uri: impl Into<String>) -> Self {
        self.attribute(Attribute::SchemaUrl, uri)
    }

    /// Sets `datacontentencoding` (0.3).
    pub fn data_content_encoding(self, encoding: impl Into<String>) -> Self {
        self.attribute(Attribute::DataContentEncoding, encoding)
    }

    /// Adds an extension.
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.push((name.into(), value.into()));
        self
    }

    /// Sets the payload.
    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = data.into();
        self
    }

    /// Builds the envelope, applying every construction rule.
    pub fn build(self) -> Result<CloudEvent, EventError> {
        let mut event = CloudEvent::from_parts(self.attributes, self.data)?;
        for (name, value) in self.extensions {
            event.add_extension(&name, value)?;
        }
        Ok(event)
    }
}
