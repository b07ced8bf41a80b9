use serde_json::Value;

/// Event payload, tagged when it enters the envelope.
///
/// The tag decides the wire encoding: only [`Data::Binary`] is ever
/// base64-encoded, and only in structured mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Data {
    /// No payload.
    #[default]
    Empty,
    /// A text payload.
    Text(String),
    /// Any JSON value other than a string or `null`.
    ///
    /// A string or `null` placed here is re-tagged by [`Data::normalized`]
    /// when it enters an envelope.
    Structured(Value),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Data {
    /// Tags a JSON value: `null` is empty, strings are text, anything else is structured.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Data::Empty,
            Value::String(text) => Data::Text(text),
            other => Data::Structured(other),
        }
    }

    /// Re-tags structured strings as text and structured `null` as empty.
    pub fn normalized(self) -> Self {
        match self {
            Data::Structured(value) => Data::from_json(value),
            other => other,
        }
    }

    /// Returns `true` when no payload is set.
    pub fn is_empty(&self) -> bool {
        matches!(self, Data::Empty)
    }

    /// Returns `true` for byte-sequence payloads.
    pub fn is_binary(&self) -> bool {
        matches!(self, Data::Binary(_))
    }

    /// JSON view of the payload without any binary framing.
    ///
    /// Bytes become an array of numbers; this is a diagnostic rendering only.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Data::Empty => None,
            Data::Text(text) => Some(Value::String(text.clone())),
            Data::Structured(value) => Some(value.clone()),
            Data::Binary(bytes) => Some(Value::Array(
                bytes.iter().map(|byte| Value::from(*byte)).collect(),
            )),
        }
    }

    /// Bytes carried as an HTTP body in binary content mode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Data::Empty => Ok(Vec::new()),
            Data::Text(text) => Ok(text.as_bytes().to_vec()),
            Data::Structured(value) => serde_json::to_vec(value),
            Data::Binary(bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data::Binary(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Data::Binary(bytes.to_vec())
    }
}

impl From<String> for Data {
    fn from(text: String) -> Self {
        Data::Text(text)
    }
}

impl From<&str> for Data {
    fn from(text: &str) -> Self {
        Data::Text(text.to_string())
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::from_json(value)
    }
}
