use crate::spec::SpecVersion;
use std::fmt;
use thiserror::Error;

/// A single problem found by a full validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A required attribute is unset.
    Missing(&'static str),
    /// An attribute is set but has the wrong shape.
    Invalid {
        /// Attribute wire name.
        attribute: String,
        /// Offending value.
        value: String,
        /// What the value should look like.
        reason: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Missing(attribute) => write!(f, "{attribute} is missing"),
            ValidationIssue::Invalid {
                attribute,
                value,
                reason,
            } => write!(f, "{attribute} ('{value}') {reason}"),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by envelope construction, access and validation.
#[derive(Debug, Error)]
pub enum EventError {
    /// A required attribute was absent at construction.
    #[error("missing required attribute '{0}'")]
    MissingRequiredAttribute(&'static str),
    /// A value has the wrong type or shape.
    #[error("invalid value for '{attribute}' ('{value}'): {reason}")]
    InvalidAttributeValue {
        /// Attribute or extension name.
        attribute: String,
        /// Offending value.
        value: String,
        /// What the value should look like.
        reason: &'static str,
    },
    /// `check()` found one or more problems.
    #[error("event failed validation: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
    /// `specversion` is neither `1.0` nor `0.3`.
    #[error("unsupported specversion '{0}'")]
    UnsupportedSpecVersion(String),
    /// The attribute is not a context attribute of the bound version.
    #[error("'{attribute}' is not a context attribute of specversion {version}")]
    VersionMismatch {
        /// Requested name.
        attribute: String,
        /// Version bound to the envelope.
        version: SpecVersion,
    },
    /// An extension name equals a reserved attribute name.
    #[error("extension '{0}' collides with a reserved attribute name")]
    ExtensionNameCollision(String),
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventError {
    pub(crate) fn invalid(
        attribute: impl Into<String>,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        EventError::InvalidAttributeValue {
            attribute: attribute.into(),
            value: value.into(),
            reason,
        }
    }
}
