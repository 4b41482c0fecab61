//! Structured codec: the whole envelope as one JSON document.
//!
//! Attributes and extension keys become top-level string fields. The
//! payload is written as `data` (JSON value or string) or, for binary
//! payloads, as base64 text in `data_base64`.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::codec::is_json;
use crate::error::{BindingError, BindingResult};
use crate::event::{AttributeName, Data, Envelope, ValidationError};
use crate::extensions::ExtensionRegistry;
use crate::mapping::{self, KeyValues};

const DATA: &str = "data";
const DATA_BASE64: &str = "data_base64";

/// Serializes envelopes to and from structured-mode JSON.
#[derive(Debug, Clone)]
pub struct StructuredCodec {
    extensions: Arc<ExtensionRegistry>,
}

impl StructuredCodec {
    pub fn new(extensions: Arc<ExtensionRegistry>) -> Self {
        Self { extensions }
    }

    pub fn encode(&self, envelope: &Envelope) -> BindingResult<Bytes> {
        let document = self.to_json(envelope)?;
        Ok(Bytes::from(serde_json::to_vec(&document)?))
    }

    /// Parse a complete body. An empty body is [`BindingError::MissingBody`].
    pub fn decode(&self, body: &[u8]) -> BindingResult<Envelope> {
        if body.is_empty() {
            return Err(BindingError::MissingBody);
        }
        let document: Value = serde_json::from_slice(body)?;
        self.from_json(document)
    }

    pub fn to_json(&self, envelope: &Envelope) -> BindingResult<Value> {
        let mut fields = Map::new();
        for (key, value) in mapping::attributes::marshal(envelope.attributes()) {
            fields.insert(key, Value::String(value));
        }
        for (key, value) in mapping::extensions::marshal(envelope.extensions(), &self.extensions)? {
            if fields.contains_key(&key) {
                return Err(BindingError::ExtensionCollision {
                    header: key.clone(),
                    key,
                });
            }
            fields.insert(key, Value::String(value));
        }

        match envelope.data() {
            Some(Data::Json(value)) => {
                fields.insert(DATA.to_string(), value.clone());
            }
            Some(Data::Text(text)) => {
                fields.insert(DATA.to_string(), Value::String(text.clone()));
            }
            Some(Data::Binary(bytes)) => {
                fields.insert(DATA_BASE64.to_string(), Value::String(STANDARD.encode(bytes)));
            }
            None => {}
        }
        Ok(Value::Object(fields))
    }

    pub fn from_json(&self, document: Value) -> BindingResult<Envelope> {
        let Value::Object(mut fields) = document else {
            return Err(BindingError::MalformedEvent("expected a JSON object".to_string()));
        };
        let data_base64 = fields.remove(DATA_BASE64);
        let data = fields.remove(DATA);

        let mut attribute_values = KeyValues::new();
        let mut extension_values = KeyValues::new();
        for (key, value) in fields {
            match AttributeName::from_key(&key) {
                Some(name) => {
                    let Value::String(text) = value else {
                        return Err(ValidationError::MalformedAttribute {
                            name: name.key(),
                            reason: "expected a string".to_string(),
                        }
                        .into());
                    };
                    attribute_values.insert(name.key().to_string(), text);
                }
                None => {
                    if let Some(text) = scalar_to_string(value) {
                        extension_values.insert(key.to_ascii_lowercase(), text);
                    }
                }
            }
        }

        let attributes = mapping::attributes::unmarshal(&attribute_values)?;
        let extensions = mapping::extensions::unmarshal(&extension_values, &self.extensions);
        let data = decode_data(data, data_base64, attributes.content_type())?;

        Ok(Envelope::builder()
            .attributes(attributes)
            .maybe_data(data)
            .extensions(extensions)
            .build()?)
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decode_data(
    data: Option<Value>,
    data_base64: Option<Value>,
    content_type: Option<&str>,
) -> BindingResult<Option<Data>> {
    if let Some(encoded) = data_base64 {
        let Value::String(encoded) = encoded else {
            return Err(BindingError::MalformedEvent("data_base64 must be a string".to_string()));
        };
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| BindingError::MalformedEvent(format!("data_base64: {}", e)))?;
        return Ok(Some(Data::Binary(Bytes::from(bytes))));
    }

    // `data: null` is a JSON null payload, not a missing one
    let data = data.map(|value| match value {
        Value::String(text) if !content_type.is_some_and(is_json) => Data::Text(text),
        value => Data::Json(value),
    });
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{DistributedTracing, Sampling};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn codec() -> StructuredCodec {
        StructuredCodec::new(Arc::new(ExtensionRegistry::standard().unwrap()))
    }

    #[test]
    fn test_encode_layout() {
        let event = Envelope::builder()
            .id("1234")
            .source("/test")
            .event_type("com.example.test")
            .json_data(&json!({"x": 1}))
            .unwrap()
            .extension(DistributedTracing::new("00-1-2-01").unwrap())
            .build()
            .unwrap();

        let doc = codec().to_json(&event).unwrap();
        assert_eq!(
            doc,
            json!({
                "id": "1234",
                "source": "/test",
                "type": "com.example.test",
                "specversion": "0.2",
                "contenttype": "application/json",
                "traceparent": "00-1-2-01",
                "data": {"x": 1}
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let event = Envelope::builder()
            .id("A234-1234-1234")
            .source("https://example.com/orders")
            .event_type("com.example.order.created")
            .time(Utc.with_ymd_and_hms(2019, 1, 2, 3, 4, 5).unwrap())
            .schema_url("https://example.com/order.json")
            .content_type("text/plain")
            .data("order 42")
            .extension(DistributedTracing::new("00-1-2-01").unwrap().with_tracestate("a=b"))
            .extension(Sampling::new(7).unwrap())
            .build()
            .unwrap();

        let codec = codec();
        let body = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&body).unwrap(), event);
    }

    #[test]
    fn test_binary_data_uses_base64() {
        let event = Envelope::builder()
            .id("1")
            .source("/bin")
            .event_type("blob")
            .content_type("application/octet-stream")
            .data(vec![0u8, 159, 146, 150])
            .build()
            .unwrap();

        let codec = codec();
        let doc = codec.to_json(&event).unwrap();
        assert_eq!(doc["data_base64"], "AJ+Slg==");
        assert!(doc.get("data").is_none());
        assert_eq!(codec.from_json(doc).unwrap(), event);
    }

    #[test]
    fn test_null_data_kept() {
        let event = Envelope::builder()
            .id("1")
            .source("/s")
            .event_type("t")
            .content_type("application/json")
            .data(Value::Null)
            .build()
            .unwrap();

        let codec = codec();
        let doc = codec.to_json(&event).unwrap();
        assert_eq!(doc["data"], Value::Null);
        assert!(doc.as_object().unwrap().contains_key("data"));
        assert_eq!(codec.from_json(doc).unwrap().data(), Some(&Data::Json(Value::Null)));

        let absent = json!({"id": "1", "source": "/s", "type": "t", "specversion": "0.2"});
        assert_eq!(codec.from_json(absent).unwrap().data(), None);
    }

    #[test]
    fn test_json_string_stays_json() {
        let event = Envelope::builder()
            .id("1")
            .source("/s")
            .event_type("t")
            .content_type("application/json")
            .data("hello")
            .build()
            .unwrap();
        assert_eq!(event.data(), Some(&Data::Json(json!("hello"))));

        let codec = codec();
        let body = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&body).unwrap(), event);
    }

    #[test]
    fn test_empty_body_is_missing_body() {
        assert!(matches!(codec().decode(b""), Err(BindingError::MissingBody)));
    }

    #[test]
    fn test_decode_rejects_non_object_and_bad_attributes() {
        let codec = codec();
        assert!(matches!(codec.decode(b"[1,2]"), Err(BindingError::MalformedEvent(_))));
        assert!(matches!(codec.decode(b"{oops"), Err(BindingError::Json(_))));

        let missing = json!({"id": "1", "type": "t", "specversion": "0.2"});
        assert!(matches!(
            codec.from_json(missing),
            Err(BindingError::AttributeValidation(ValidationError::MissingAttribute("source")))
        ));

        let numeric_id = json!({"id": 1, "source": "/s", "type": "t", "specversion": "0.2"});
        assert!(matches!(
            codec.from_json(numeric_id),
            Err(BindingError::AttributeValidation(ValidationError::MalformedAttribute { name: "id", .. }))
        ));
    }

    #[test]
    fn test_numeric_extension_and_unknown_fields() {
        let doc = json!({
            "id": "1",
            "source": "/s",
            "type": "t",
            "specversion": "0.2",
            "sampledrate": 5,
            "comexampleother": {"nested": true}
        });
        let event = codec().from_json(doc).unwrap();
        assert_eq!(event.extension::<Sampling>(), Some(&Sampling::new(5).unwrap()));
        assert_eq!(event.extensions().len(), 1);
    }
}
