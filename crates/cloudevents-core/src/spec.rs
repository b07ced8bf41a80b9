//! Version-bound attribute strategies.
//!
//! Each supported spec version is a strategy that owns the attributes an
//! event may carry under that version. [`Strategy`] is the closed set of
//! strategies; an envelope holds exactly one for its lifetime.

use crate::attributes::{is_reserved, Attribute, REQUIRED};
use crate::data::Data;
use crate::errors::{EventError, ValidationIssue};
use crate::validation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Supported CloudEvents specification versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecVersion {
    /// CloudEvents 1.0.
    #[serde(rename = "1.0")]
    V1,
    /// CloudEvents 0.3.
    #[serde(rename = "0.3")]
    V03,
}

const V1_ATTRIBUTES: &[Attribute] = &[
    Attribute::Id,
    Attribute::Source,
    Attribute::Type,
    Attribute::SpecVersion,
    Attribute::Time,
    Attribute::Subject,
    Attribute::DataContentType,
    Attribute::DataSchema,
];

const V03_ATTRIBUTES: &[Attribute] = &[
    Attribute::Id,
    Attribute::Source,
    Attribute::Type,
    Attribute::SpecVersion,
    Attribute::Time,
    Attribute::Subject,
    Attribute::DataContentType,
    Attribute::SchemaUrl,
    Attribute::DataContentEncoding,
];

impl SpecVersion {
    /// Version used when none is declared.
    pub const LATEST: SpecVersion = SpecVersion::V1;

    /// The `specversion` wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V1 => "1.0",
            SpecVersion::V03 => "0.3",
        }
    }

    /// Context attributes defined by this version.
    pub fn attributes(self) -> &'static [Attribute] {
        match self {
            SpecVersion::V1 => V1_ATTRIBUTES,
            SpecVersion::V03 => V03_ATTRIBUTES,
        }
    }

    /// Whether `attribute` belongs to this version.
    pub fn has_attribute(self, attribute: Attribute) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl Default for SpecVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl FromStr for SpecVersion {
    type Err = EventError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "1.0" => Ok(SpecVersion::V1),
            "0.3" => Ok(SpecVersion::V03),
            other => Err(EventError::UnsupportedSpecVersion(other.to_string())),
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension attributes, most recently added first.
pub type Extensions = IndexMap<String, Value>;

/// Flat view of every set attribute plus the tagged payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Context attributes and extensions keyed by wire name; unset optionals are absent.
    pub attributes: Map<String, Value>,
    /// Event payload.
    pub data: Data,
}

/// Capabilities shared by every version strategy.
pub trait SpecStrategy {
    /// Version this strategy enforces.
    fn version(&self) -> SpecVersion;

    /// Attributes required by every version.
    fn required(&self) -> &'static [&'static str] {
        &REQUIRED
    }

    /// Optional fields of this version, `data` included.
    fn optional_fields(&self) -> &'static [&'static str];

    /// Reads a context attribute by (case-insensitive) name.
    fn get(&self, name: &str) -> Result<Option<&str>, EventError>;

    /// Writes or clears a context attribute by (case-insensitive) name.
    fn set(&mut self, name: &str, value: Option<String>) -> Result<(), EventError>;

    /// Current payload.
    fn data(&self) -> &Data;

    /// Replaces the payload; the tag is normalized with [`Data::normalized`].
    fn set_data(&mut self, data: Data);

    /// Extension attributes, newest first.
    fn extensions(&self) -> &Extensions;

    /// Stores an extension at the front of iteration order, replacing any prior value.
    fn add_extension(&mut self, name: &str, value: Value) -> Result<(), EventError>;

    /// Removes an extension, returning its value.
    fn remove_extension(&mut self, name: &str) -> Option<Value>;

    /// Verifies presence of required attributes and the shape of every set value.
    fn check(&self) -> Result<(), EventError>;

    /// Flat mapping of every set attribute, ready for formatting.
    fn payload(&self) -> Payload;
}

/// Attributes every version carries.
#[derive(Debug, Clone, PartialEq, Default)]
struct ContextAttributes {
    id: Option<String>,
    source: Option<String>,
    ty: Option<String>,
    time: Option<String>,
    subject: Option<String>,
    data_content_type: Option<String>,
    data: Data,
    extensions: Extensions,
}

impl ContextAttributes {
    fn slot(&self, attribute: Attribute) -> Option<&Option<String>> {
        match attribute {
            Attribute::Id => Some(&self.id),
            Attribute::Source => Some(&self.source),
            Attribute::Type => Some(&self.ty),
            Attribute::Time => Some(&self.time),
            Attribute::Subject => Some(&self.subject),
            Attribute::DataContentType => Some(&self.data_content_type),
            _ => None,
        }
    }

    fn slot_mut(&mut self, attribute: Attribute) -> Option<&mut Option<String>> {
        match attribute {
            Attribute::Id => Some(&mut self.id),
            Attribute::Source => Some(&mut self.source),
            Attribute::Type => Some(&mut self.ty),
            Attribute::Time => Some(&mut self.time),
            Attribute::Subject => Some(&mut self.subject),
            Attribute::DataContentType => Some(&mut self.data_content_type),
            _ => None,
        }
    }

    fn add_extension(&mut self, name: &str, value: Value) -> Result<(), EventError> {
        if is_reserved(name) {
            return Err(EventError::ExtensionNameCollision(name.to_string()));
        }
        if !validation::is_extension_name(name) {
            return Err(EventError::invalid(
                name,
                value.to_string(),
                "extension names must be lowercase letters and digits",
            ));
        }
        if matches!(value, Value::Null | Value::Array(_) | Value::Object(_)) {
            return Err(EventError::invalid(
                name,
                value.to_string(),
                "extension values must be strings, numbers or booleans",
            ));
        }
        self.extensions.shift_remove(name);
        self.extensions.shift_insert(0, name.to_string(), value);
        Ok(())
    }
}

/// Reason a set value is malformed, if it is.
fn shape_violation(attribute: Attribute, value: &str) -> Option<&'static str> {
    match attribute {
        Attribute::Source | Attribute::DataSchema | Attribute::SchemaUrl => {
            (!validation::is_uri_reference(value)).then_some("must be a URI reference")
        }
        Attribute::Time => validation::parse_timestamp(value)
            .is_none()
            .then_some("must be an ISO-8601 timestamp"),
        Attribute::DataContentType => {
            (!validation::is_media_type(value)).then_some("must be a media type")
        }
        Attribute::DataContentEncoding => {
            (!value.eq_ignore_ascii_case("base64")).then_some("must be 'base64'")
        }
        Attribute::Id | Attribute::Type | Attribute::Subject | Attribute::SpecVersion => {
            (!validation::is_non_empty(value)).then_some("must not be empty")
        }
    }
}

macro_rules! strategy {
    (
        $(#[$meta:meta])*
        $name:ident,
        $version:expr,
        optional: [$($optional:literal),* $(,)?],
        extra: { $($attribute:ident => $field:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            context: ContextAttributes,
            $($field: Option<String>,)*
        }

        impl $name {
            const OPTIONAL: &'static [&'static str] = &[$($optional),*];

            fn slot(&self, attribute: Attribute) -> Option<&Option<String>> {
                match attribute {
                    $(Attribute::$attribute => Some(&self.$field),)*
                    other => self.context.slot(other),
                }
            }

            fn slot_mut(&mut self, attribute: Attribute) -> Option<&mut Option<String>> {
                match attribute {
                    $(Attribute::$attribute => Some(&mut self.$field),)*
                    other => self.context.slot_mut(other),
                }
            }

            fn resolve(&self, name: &str) -> Result<Attribute, EventError> {
                Attribute::from_name(name)
                    .filter(|attribute| $version.has_attribute(*attribute))
                    .ok_or_else(|| EventError::VersionMismatch {
                        attribute: name.to_string(),
                        version: $version,
                    })
            }

            fn value_of(&self, attribute: Attribute) -> Option<&str> {
                match attribute {
                    Attribute::SpecVersion => Some($version.as_str()),
                    other => self.slot(other).and_then(|value| value.as_deref()),
                }
            }
        }

        impl SpecStrategy for $name {
            fn version(&self) -> SpecVersion {
                $version
            }

            fn optional_fields(&self) -> &'static [&'static str] {
                Self::OPTIONAL
            }

            fn get(&self, name: &str) -> Result<Option<&str>, EventError> {
                let attribute = self.resolve(name)?;
                Ok(self.value_of(attribute))
            }

            fn set(&mut self, name: &str, value: Option<String>) -> Result<(), EventError> {
                let attribute = self.resolve(name)?;
                if attribute == Attribute::SpecVersion {
                    return match value.as_deref() {
                        Some(declared) if declared == $version.as_str() => Ok(()),
                        other => Err(EventError::invalid(
                            attribute.name(),
                            other.unwrap_or_default(),
                            "is fixed at construction",
                        )),
                    };
                }
                let value = match (attribute, value) {
                    (Attribute::Time, Some(raw)) => {
                        Some(validation::normalize_timestamp(&raw).unwrap_or(raw))
                    }
                    (_, value) => value,
                };
                if let Some(slot) = self.slot_mut(attribute) {
                    *slot = value;
                }
                Ok(())
            }

            fn data(&self) -> &Data {
                &self.context.data
            }

            fn set_data(&mut self, data: Data) {
                self.context.data = data.normalized();
            }

            fn extensions(&self) -> &Extensions {
                &self.context.extensions
            }

            fn add_extension(&mut self, name: &str, value: Value) -> Result<(), EventError> {
                self.context.add_extension(name, value)
            }

            fn remove_extension(&mut self, name: &str) -> Option<Value> {
                self.context.extensions.shift_remove(name)
            }

            fn check(&self) -> Result<(), EventError> {
                let mut issues = Vec::new();
                for attribute in $version.attributes() {
                    match self.value_of(*attribute) {
                        None if attribute.is_required() => {
                            issues.push(ValidationIssue::Missing(attribute.name()));
                        }
                        None => {}
                        Some(value) => {
                            if let Some(reason) = shape_violation(*attribute, value) {
                                issues.push(ValidationIssue::Invalid {
                                    attribute: attribute.name().to_string(),
                                    value: value.to_string(),
                                    reason,
                                });
                            }
                        }
                    }
                }
                if let Some(encoding) = self.value_of(Attribute::DataContentEncoding) {
                    if !matches!(self.context.data, Data::Binary(_) | Data::Empty) {
                        issues.push(ValidationIssue::Invalid {
                            attribute: Attribute::DataContentEncoding.name().to_string(),
                            value: encoding.to_string(),
                            reason: "requires a binary payload",
                        });
                    }
                }
                if issues.is_empty() {
                    Ok(())
                } else {
                    Err(EventError::Validation(issues))
                }
            }

            fn payload(&self) -> Payload {
                let mut attributes = Map::new();
                for attribute in $version.attributes() {
                    if let Some(value) = self.value_of(*attribute) {
                        attributes.insert(attribute.name().to_string(), Value::from(value));
                    }
                }
                for (name, value) in &self.context.extensions {
                    attributes.insert(name.clone(), value.clone());
                }
                Payload {
                    attributes,
                    data: self.context.data.clone(),
                }
            }
        }
    };
}

strategy!(
    /// CloudEvents 1.0 rules: `dataschema`, no content encoding.
    V1Strategy,
    SpecVersion::V1,
    optional: ["time", "subject", "dataContentType", "dataSchema", "data"],
    extra: { DataSchema => data_schema }
);

strategy!(
    /// CloudEvents 0.3 rules: `schemaurl` and `datacontentencoding`.
    V03Strategy,
    SpecVersion::V03,
    optional: [
        "time",
        "subject",
        "dataContentType",
        "schemaURL",
        "dataContentEncoding",
        "data",
    ],
    extra: {
        SchemaUrl => schema_url,
        DataContentEncoding => data_content_encoding,
    }
);

/// The strategy bound to an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// 1.0 rules.
    V1(V1Strategy),
    /// 0.3 rules.
    V03(V03Strategy),
}

impl Strategy {
    /// Creates an empty strategy for `version`.
    pub fn new(version: SpecVersion) -> Self {
        match version {
            SpecVersion::V1 => Strategy::V1(V1Strategy::default()),
            SpecVersion::V03 => Strategy::V03(V03Strategy::default()),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Strategy::V1($inner) => $call,
            Strategy::V03($inner) => $call,
        }
    };
}

impl SpecStrategy for Strategy {
    fn version(&self) -> SpecVersion {
        dispatch!(self, inner => inner.version())
    }

    fn optional_fields(&self) -> &'static [&'static str] {
        dispatch!(self, inner => inner.optional_fields())
    }

    fn get(&self, name: &str) -> Result<Option<&str>, EventError> {
        dispatch!(self, inner => inner.get(name))
    }

    fn set(&mut self, name: &str, value: Option<String>) -> Result<(), EventError> {
        dispatch!(self, inner => inner.set(name, value))
    }

    fn data(&self) -> &Data {
        dispatch!(self, inner => inner.data())
    }

    fn set_data(&mut self, data: Data) {
        dispatch!(self, inner => inner.set_data(data))
    }

    fn extensions(&self) -> &Extensions {
        dispatch!(self, inner => inner.extensions())
    }

    fn add_extension(&mut self, name: &str, value: Value) -> Result<(), EventError> {
        dispatch!(self, inner => inner.add_extension(name, value))
    }

    fn remove_extension(&mut self, name: &str) -> Option<Value> {
        dispatch!(self, inner => inner.remove_extension(name))
    }

    fn check(&self) -> Result<(), EventError> {
        dispatch!(self, inner => inner.check())
    }

    fn payload(&self) -> Payload {
        dispatch!(self, inner => inner.payload())
    }
}
