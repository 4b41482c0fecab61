//! Event payload.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::is_json;

/// Payload carried by an envelope.
///
/// The envelope builder conforms the variant to the content type (see
/// [`Data::conform`]), so a payload reads back in the variant it was
/// stored in after any encode and decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Json(serde_json::Value),
    Text(String),
    Binary(Bytes),
}

impl Data {
    /// Serialize any value into a JSON payload.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Data::Json)
    }

    /// Deserialize the payload into `T`.
    ///
    /// Text and binary payloads are parsed as JSON documents.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Data::Json(value) => T::deserialize(value),
            Data::Text(text) => serde_json::from_str(text),
            Data::Binary(bytes) => serde_json::from_slice(bytes),
        }
    }

    /// Bring the variant in line with the content type it travels under.
    ///
    /// Under a JSON media type, text is parsed as a JSON document and kept
    /// as a JSON string when it is not one. Under any other media type (or
    /// none) a JSON string becomes text. Everything else is unchanged.
    pub fn conform(self, content_type: Option<&str>) -> Self {
        let json = content_type.is_some_and(is_json);
        match self {
            Data::Text(text) if json => match serde_json::from_str(&text) {
                Ok(value) => Data::Json(value),
                Err(_) => Data::Json(Value::String(text)),
            },
            Data::Json(Value::String(text)) if !json => Data::Text(text),
            data => data,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Data::Json(_) => false,
            Data::Text(text) => text.is_empty(),
            Data::Binary(bytes) => bytes.is_empty(),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Json(value)
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

impl From<Bytes> for Data {
    fn from(bytes: Bytes) -> Self {
        Data::Binary(bytes)
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data::Binary(Bytes::from(bytes))
    }
}
