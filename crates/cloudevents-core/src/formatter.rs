use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::data::Data;
use crate::errors::EventError;
use crate::spec::Payload;

/// JSON key carrying text and structured payloads.
pub const DATA: &str = "data";

/// JSON key carrying base64-encoded binary payloads.
pub const DATA_BASE64: &str = "data_base64";

/// Converts payload mappings to and from the structured JSON shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter;

impl Formatter {
    /// Builds the wire mapping: binary payloads go to `data_base64`, everything else to `data`.
    ///
    /// The payload is not validated here; [`CloudEvent::format`](crate::CloudEvent::format)
    /// runs `check()` first.
    pub fn format(payload: &Payload) -> Map<String, Value> {
        let mut wire = payload.attributes.clone();
        wire.remove(DATA);
        wire.remove(DATA_BASE64);
        match &payload.data {
            Data::Empty => {}
            Data::Binary(bytes) => {
                wire.insert(DATA_BASE64.to_string(), Value::String(STANDARD.encode(bytes)));
            }
            Data::Text(text) => {
                wire.insert(DATA.to_string(), Value::String(text.clone()));
            }
            Data::Structured(value) => {
                wire.insert(DATA.to_string(), value.clone());
            }
        }
        wire
    }

    /// Serializes the payload as-is, with no binary framing and no validation.
    pub fn to_json_string(payload: &Payload) -> Result<String, EventError> {
        let mut flat = payload.attributes.clone();
        if let Some(data) = payload.data.to_json() {
            flat.insert(DATA.to_string(), data);
        }
        Ok(serde_json::to_string(&flat)?)
    }

    /// Removes `data` / `data_base64` from a wire mapping and returns the tagged payload.
    pub fn take_data(wire: &mut Map<String, Value>) -> Result<Data, EventError> {
        let data = wire.remove(DATA);
        let encoded = wire.remove(DATA_BASE64);
        match (data, encoded) {
            (Some(data), Some(_)) if !data.is_null() => Err(EventError::invalid(
                DATA_BASE64,
                "present",
                "cannot be combined with 'data'",
            )),
            (_, Some(Value::String(encoded))) => STANDARD
                .decode(encoded.as_bytes())
                .map(Data::Binary)
                .map_err(|_| EventError::invalid(DATA_BASE64, encoded, "must be base64")),
            (_, Some(other)) => Err(EventError::invalid(
                DATA_BASE64,
                other.to_string(),
                "must be a base64 string",
            )),
            (Some(data), None) => Ok(Data::from_json(data)),
            (None, None) => Ok(Data::Empty),
        }
    }
}
