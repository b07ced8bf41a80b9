//! HTTP binding for CloudEvents envelopes.
//!
//! This crate provides:
//! - Content-mode detection for inbound messages
//! - [`HttpReceiver`] to rebuild a [`CloudEvent`] from headers and body
//! - [`HttpEmitter`] to produce headers and body in a requested mode
//!
//! It works on already-parsed header maps and body bytes; sockets, retries and
//! routing belong to the transport using it.
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudevents_core::CloudEvent;
//! use cloudevents_http::{ContentMode, HttpEmitter, HttpReceiver};
//!
//! let event = CloudEvent::builder()
//!     .source("/orders")
//!     .ty("com.example.order.created")
//!     .data_content_type("application/json")
//!     .data(serde_json::json!({"order": 42}))
//!     .build()?;
//!
//! let message = HttpEmitter::default().emit(&event, ContentMode::Binary)?;
//! assert_eq!(message.headers.get("ce-type"), Some("com.example.order.created"));
//!
//! let received = HttpReceiver::default().parse(&message.headers, &message.body)?;
//! assert_eq!(received, event);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Types
//!
//! - [`Headers`] - Case-insensitive header map
//! - [`ContentMode`] - Binary or structured encoding
//! - [`HttpMessage`] - Outbound headers and body

#![deny(missing_docs)]

/// Emitter implementation.
pub mod emitter;
/// Error types for HTTP binding operations.
pub mod errors;
/// Case-insensitive header map.
pub mod headers;
/// Content modes and detection.
pub mod mode;
/// Receiver implementation.
pub mod receiver;

pub use cloudevents_core::CloudEvent;
pub use emitter::{EmitterOptions, HttpEmitter, HttpMessage};
pub use errors::HttpError;
pub use headers::Headers;
pub use mode::{ContentMode, STRUCTURED_MEDIA_TYPE};
pub use receiver::{HttpReceiver, ReceiverOptions};
