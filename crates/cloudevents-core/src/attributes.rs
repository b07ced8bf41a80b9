use crate::formatter::{DATA, DATA_BASE64};
use std::fmt;

/// A fixed context attribute defined by one or both spec versions.
///
/// Event `data` is not a context attribute and has its own accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// `id`
    Id,
    /// `source`
    Source,
    /// `type`
    Type,
    /// `specversion`
    SpecVersion,
    /// `time`
    Time,
    /// `subject`
    Subject,
    /// `datacontenttype`
    DataContentType,
    /// `dataschema` (1.0 only).
    DataSchema,
    /// `schemaurl` (0.3 only).
    SchemaUrl,
    /// `datacontentencoding` (0.3 only).
    DataContentEncoding,
}

impl Attribute {
    /// Every context attribute known to any supported version.
    pub const ALL: [Attribute; 10] = [
        Attribute::Id,
        Attribute::Source,
        Attribute::Type,
        Attribute::SpecVersion,
        Attribute::Time,
        Attribute::Subject,
        Attribute::DataContentType,
        Attribute::DataSchema,
        Attribute::SchemaUrl,
        Attribute::DataContentEncoding,
    ];

    /// Wire name, as used for JSON keys and `ce-` headers.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Id => "id",
            Attribute::Source => "source",
            Attribute::Type => "type",
            Attribute::SpecVersion => "specversion",
            Attribute::Time => "time",
            Attribute::Subject => "subject",
            Attribute::DataContentType => "datacontenttype",
            Attribute::DataSchema => "dataschema",
            Attribute::SchemaUrl => "schemaurl",
            Attribute::DataContentEncoding => "datacontentencoding",
        }
    }

    /// Resolves a name case-insensitively, so `dataSchema` and `schemaURL` match.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.name().eq_ignore_ascii_case(name))
    }

    /// Whether the attribute must be present on every event.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Attribute::Id | Attribute::Source | Attribute::Type | Attribute::SpecVersion
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names that every version requires.
pub const REQUIRED: [&str; 4] = ["id", "source", "type", "specversion"];

/// Whether `name` may not be used as an extension name.
///
/// Every context attribute of every supported version is reserved, along with
/// the `data` / `data_base64` payload keys, so an extension can never be read
/// back as an attribute of either version.
pub fn is_reserved(name: &str) -> bool {
    Attribute::from_name(name).is_some()
        || name.eq_ignore_ascii_case(DATA)
        || name.eq_ignore_ascii_case(DATA_BASE64)
}
