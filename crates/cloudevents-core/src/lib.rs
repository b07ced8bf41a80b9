//! Versioned CloudEvents envelope model.
//!
//! An event is held by a [`CloudEvent`] that binds exactly one spec strategy
//! ([`V1Strategy`] or [`V03Strategy`]) for its whole lifetime. The strategy
//! owns the attribute set, the version-specific field names and the
//! validation rules; the [`Formatter`] turns a validated [`Payload`] into the
//! flat JSON shape used by structured-mode transports.
//!
//! ```rust
//! use cloudevents_core::{CloudEvent, Data, SpecVersion};
//!
//! let event = CloudEvent::builder()
//!     .source("/sensors/7")
//!     .ty("com.example.reading")
//!     .data_content_type("text/plain")
//!     .data(Data::Binary(vec![0x48, 0x69]))
//!     .build()?;
//!
//! assert_eq!(event.spec_version(), SpecVersion::V1);
//! let wire = event.format()?;
//! assert_eq!(wire["data_base64"], "SGk=");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
#![deny(missing_docs)]

/// Context attribute names and version field sets.
pub mod attributes;
/// Tagged event payload.
pub mod data;
/// Error types for envelope operations.
pub mod errors;
/// The event envelope facade and its builder.
pub mod event;
/// JSON formatting of payload mappings.
pub mod formatter;
/// Version-bound attribute strategies.
pub mod spec;
/// Shape predicates for individual attributes.
pub mod validation;

pub use attributes::Attribute;
pub use data::Data;
pub use errors::{EventError, ValidationIssue};
pub use event::{CloudEvent, CloudEventBuilder};
pub use formatter::{Formatter, DATA, DATA_BASE64};
pub use spec::{Extensions, Payload, SpecStrategy, SpecVersion, Strategy, V03Strategy, V1Strategy};
