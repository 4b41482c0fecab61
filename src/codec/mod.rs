//! Payload and structured-envelope codecs.
//!
//! # Data Flow
//! ```text
//! Binary mode:
//!     content type (declared or default)
//!     → CodecRegistry::resolve (media type essence)
//!     → PayloadCodec (Data ⇄ body bytes)
//!
//! Structured mode:
//!     Envelope ⇄ structured.rs ⇄ one JSON document
//! ```
//!
//! # Design Decisions
//! - Lookup ignores media type parameters and case
//! - Any `+json` media type falls back to the JSON codec
//! - Codecs see the complete body; nothing is streamed

pub mod payload;
pub mod structured;

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::error::{BindingError, BindingResult};
use crate::event::Data;

pub use payload::{JsonCodec, OctetCodec, TextCodec};
pub use structured::StructuredCodec;

pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Errors raised by a payload codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{codec} codec cannot encode {kind} data")]
    UnsupportedData {
        codec: &'static str,
        kind: &'static str,
    },
}

/// Converts between payload data and raw body bytes for one media type.
pub trait PayloadCodec: Send + Sync {
    fn name(&self) -> &'static str;
    fn encode(&self, data: &Data) -> Result<Bytes, CodecError>;
    fn decode(&self, body: &[u8]) -> Result<Data, CodecError>;
}

/// Lower-cased media type without parameters.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether `content_type` is JSON (`application/json` or a `+json` suffix).
pub fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == JSON || essence.ends_with("+json")
}

/// Payload codecs keyed by media type.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn PayloadCodec>>,
    default_content_type: String,
}

impl CodecRegistry {
    /// Empty registry using `default_content_type` when none is declared.
    pub fn new(default_content_type: impl Into<String>) -> Self {
        Self {
            codecs: HashMap::new(),
            default_content_type: default_content_type.into(),
        }
    }

    /// JSON, text and octet-stream codecs.
    pub fn standard(default_content_type: impl Into<String>) -> Self {
        let mut registry = Self::new(default_content_type);
        registry.register(JSON, Arc::new(JsonCodec));
        registry.register(TEXT, Arc::new(TextCodec));
        registry.register(OCTET_STREAM, Arc::new(OctetCodec));
        registry
    }

    pub fn register(&mut self, content_type: &str, codec: Arc<dyn PayloadCodec>) {
        self.codecs.insert(essence(content_type), codec);
    }

    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// Codec for the declared content type, or for the default one.
    pub fn resolve(&self, content_type: Option<&str>) -> BindingResult<Arc<dyn PayloadCodec>> {
        let content_type = content_type.unwrap_or(&self.default_content_type);
        let key = essence(content_type);

        if let Some(codec) = self.codecs.get(&key) {
            return Ok(codec.clone());
        }
        if key.ends_with("+json") {
            if let Some(codec) = self.codecs.get(JSON) {
                return Ok(codec.clone());
            }
        }
        Err(BindingError::PayloadCodec(content_type.to_string()))
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.codecs.keys().collect();
        types.sort();
        f.debug_struct("CodecRegistry")
            .field("codecs", &types)
            .field("default_content_type", &self.default_content_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essence() {
        assert_eq!(essence("Application/JSON; charset=utf-8"), "application/json");
        assert_eq!(essence("text/plain"), "text/plain");
        assert!(is_json("application/cloudevents+json"));
        assert!(!is_json("text/json-ish"));
    }

    #[test]
    fn test_resolve() {
        let registry = CodecRegistry::standard(TEXT);

        assert_eq!(registry.resolve(Some("application/json")).unwrap().name(), "json");
        assert_eq!(registry.resolve(Some("application/vnd.order+json")).unwrap().name(), "json");
        assert_eq!(registry.resolve(Some("TEXT/PLAIN; charset=utf-8")).unwrap().name(), "text");
        assert_eq!(registry.resolve(None).unwrap().name(), "text");
    }

    #[test]
    fn test_resolve_unregistered() {
        let registry = CodecRegistry::standard(TEXT);
        let err = registry.resolve(Some("image/png")).err().unwrap();
        assert!(matches!(err, BindingError::PayloadCodec(ct) if ct == "image/png"));

        let empty = CodecRegistry::new(TEXT);
        assert!(empty.resolve(None).is_err());
    }
}
