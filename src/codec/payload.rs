//! Built-in payload codecs.

use bytes::Bytes;

use crate::codec::{CodecError, PayloadCodec};
use crate::event::Data;

/// `application/json`: payload is one JSON value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, data: &Data) -> Result<Bytes, CodecError> {
        match data {
            Data::Json(value) => Ok(Bytes::from(serde_json::to_vec(value)?)),
            // Text that is already a JSON document goes out as written.
            Data::Text(text) => match serde_json::from_str::<serde::de::IgnoredAny>(text) {
                Ok(_) => Ok(Bytes::copy_from_slice(text.as_bytes())),
                Err(_) => Ok(Bytes::from(serde_json::to_vec(text)?)),
            },
            Data::Binary(_) => Err(CodecError::UnsupportedData {
                codec: self.name(),
                kind: "binary",
            }),
        }
    }

    fn decode(&self, body: &[u8]) -> Result<Data, CodecError> {
        Ok(Data::Json(serde_json::from_slice(body)?))
    }
}

/// `text/plain`: payload is an opaque UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl PayloadCodec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn encode(&self, data: &Data) -> Result<Bytes, CodecError> {
        match data {
            Data::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Data::Json(value) => Ok(Bytes::from(value.to_string())),
            Data::Binary(_) => Err(CodecError::UnsupportedData {
                codec: self.name(),
                kind: "binary",
            }),
        }
    }

    fn decode(&self, body: &[u8]) -> Result<Data, CodecError> {
        Ok(Data::Text(String::from_utf8(body.to_vec())?))
    }
}

/// `application/octet-stream`: payload bytes are passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctetCodec;

impl PayloadCodec for OctetCodec {
    fn name(&self) -> &'static str {
        "octet"
    }

    fn encode(&self, data: &Data) -> Result<Bytes, CodecError> {
        match data {
            Data::Binary(bytes) => Ok(bytes.clone()),
            Data::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Data::Json(value) => Ok(Bytes::from(serde_json::to_vec(value)?)),
        }
    }

    fn decode(&self, body: &[u8]) -> Result<Data, CodecError> {
        Ok(Data::Binary(Bytes::copy_from_slice(body)))
    }
}
