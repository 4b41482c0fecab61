//! Binding dispatcher.
//!
//! # Responsibilities
//! - Select binary or structured mode from the inbound Content-Type
//! - Run the unmarshaller pipeline or the structured codec
//! - Encode in the mode the caller picks, setting Content-Type and
//!   Content-Length from the serialized body
//! - Convert between `http` messages and transport-neutral `WireMessage`s
//!
//! # Design Decisions
//! - Markers are configuration values, compared by media-type essence
//! - Decoding only starts once the whole body is buffered
//! - Encode failures happen before any `http` message exists, so a failed
//!   encode never leaves a half-written request or response

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use bytes::Bytes;

use crate::codec::{essence, CodecRegistry, StructuredCodec};
use crate::config::BindingConfig;
use crate::error::{BindingError, BindingResult};
use crate::event::Envelope;
use crate::extensions::{ExtensionRegistry, RegistryError};
use crate::mapping::headers::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::mapping::HeaderMapper;
use crate::observability::metrics;
use crate::pipeline::{Marshaller, Unmarshaller};
use crate::wire::{HeaderMapping, WireMessage};

/// Wire encoding of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attributes in headers, payload in the body.
    Binary,
    /// The whole envelope as one JSON document.
    Structured,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Binary => "binary",
            Mode::Structured => "structured",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes and encodes events over HTTP messages.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct HttpBinding {
    binary_content_type: String,
    structured_content_type: String,
    marshaller: Marshaller,
    unmarshaller: Unmarshaller,
    structured: StructuredCodec,
    max_body_size: usize,
}

impl HttpBinding {
    /// Binding with the standard extensions (distributed tracing, sampling).
    pub fn from_config(config: &BindingConfig) -> Result<Self, RegistryError> {
        Ok(Self::new(config, ExtensionRegistry::standard()?))
    }

    pub fn new(config: &BindingConfig, extensions: ExtensionRegistry) -> Self {
        let mapper = HeaderMapper::new(config.header_prefix.clone());
        let extensions = Arc::new(extensions);
        let codecs = Arc::new(CodecRegistry::standard(
            config.default_payload_content_type.clone(),
        ));

        Self {
            binary_content_type: config.binary_content_type.clone(),
            structured_content_type: config.structured_content_type.clone(),
            marshaller: Marshaller::new(mapper.clone(), extensions.clone(), codecs.clone()),
            unmarshaller: Unmarshaller::new(mapper, extensions.clone(), codecs),
            structured: StructuredCodec::new(extensions),
            max_body_size: config.max_body_size,
        }
    }

    pub fn binary_content_type(&self) -> &str {
        &self.binary_content_type
    }

    pub fn structured_content_type(&self) -> &str {
        &self.structured_content_type
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Pick the decode mode from a message's Content-Type.
    pub fn detect(&self, headers: &HeaderMapping) -> BindingResult<Mode> {
        let content_type = headers.get(CONTENT_TYPE);
        match content_type.map(essence) {
            Some(found) if found == essence(&self.binary_content_type) => Ok(Mode::Binary),
            Some(found) if found == essence(&self.structured_content_type) => Ok(Mode::Structured),
            _ => Err(BindingError::UnsupportedContentType(
                content_type.map(str::to_string),
            )),
        }
    }

    pub fn decode(&self, wire: &WireMessage) -> BindingResult<Envelope> {
        self.decode_with_mode(wire).map(|(envelope, _)| envelope)
    }

    /// Decode a fully buffered message, reporting the mode it arrived in.
    pub fn decode_with_mode(&self, wire: &WireMessage) -> BindingResult<(Envelope, Mode)> {
        let result = self.detect(&wire.headers).and_then(|mode| {
            let envelope = match mode {
                Mode::Binary => self.unmarshaller.unmarshal(wire)?,
                Mode::Structured => self.structured.decode(&wire.body_bytes())?,
            };
            Ok((envelope, mode))
        });

        match &result {
            Ok((envelope, mode)) => {
                tracing::debug!(id = %envelope.id(), mode = %mode, "Decoded event");
                metrics::record_decoded(mode.as_str());
            }
            Err(e) => {
                tracing::debug!(error = %e, kind = e.kind(), "Failed to decode event");
                metrics::record_decode_failure(e.kind());
            }
        }
        result
    }

    /// Decode from `http` parts.
    pub fn decode_http(&self, headers: &HeaderMap, body: Bytes) -> BindingResult<(Envelope, Mode)> {
        self.decode_with_mode(&to_wire(headers, body))
    }

    pub fn encode(&self, envelope: &Envelope, mode: Mode) -> BindingResult<WireMessage> {
        let wire = match mode {
            Mode::Binary => {
                let mut wire = self.marshaller.marshal(envelope)?;
                if !wire.headers.contains(CONTENT_TYPE) {
                    wire.headers
                        .insert(CONTENT_TYPE, self.binary_content_type.clone());
                }
                wire
            }
            Mode::Structured => {
                let body = self.structured.encode(envelope)?;
                let mut headers = HeaderMapping::new();
                headers.insert(CONTENT_TYPE, self.structured_content_type.clone());
                headers.insert(CONTENT_LENGTH, body.len().to_string());
                WireMessage::new(headers, Some(body))
            }
        };

        tracing::debug!(id = %envelope.id(), mode = %mode, bytes = wire.content_length(), "Encoded event");
        metrics::record_encoded(mode.as_str());
        Ok(wire)
    }

    /// Encode as an outbound `POST` request.
    pub fn request(&self, envelope: &Envelope, mode: Mode, uri: Uri) -> BindingResult<Request<Body>> {
        let wire = self.encode(envelope, mode)?;
        let headers = header_map(&wire.headers)?;

        let mut request = Request::new(Body::from(wire.body_bytes()));
        *request.method_mut() = Method::POST;
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }

    /// Encode as a response with the given status.
    pub fn response(
        &self,
        envelope: &Envelope,
        mode: Mode,
        status: StatusCode,
    ) -> BindingResult<Response<Body>> {
        let wire = self.encode(envelope, mode)?;
        let headers = header_map(&wire.headers)?;

        let mut response = Response::new(Body::from(wire.body_bytes()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// The structured-mode JSON document for an event.
    pub fn structured_json(&self, envelope: &Envelope) -> BindingResult<serde_json::Value> {
        self.structured.to_json(envelope)
    }

    /// Buffer a request body up to `max_body_size`, then decode it.
    pub async fn read_request(&self, request: Request<Body>) -> BindingResult<(Envelope, Mode)> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|e| BindingError::Body(e.to_string()))?;
        self.decode_http(&parts.headers, body)
    }
}

/// Copy `http` headers into a `WireMessage`. Values that are not visible
/// ASCII are dropped.
pub fn to_wire(headers: &HeaderMap, body: Bytes) -> WireMessage {
    let mut mapping = HeaderMapping::new();
    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => {
                mapping.insert(name.as_str(), value);
            }
            Err(_) => tracing::debug!(header = %name, "Ignoring non-ASCII header value"),
        }
    }
    WireMessage::new(mapping, Some(body))
}

/// Convert a header mapping into an `http::HeaderMap`.
pub fn header_map(headers: &HeaderMapping) -> BindingResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| BindingError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| BindingError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Data;
    use crate::extensions::DistributedTracing;
    use serde_json::json;

    fn binding() -> HttpBinding {
        HttpBinding::from_config(&BindingConfig::default()).unwrap()
    }

    fn event() -> Envelope {
        Envelope::builder()
            .id("1234")
            .source("/test")
            .event_type("com.example.test")
            .content_type("application/json")
            .data("{\"x\":1}")
            .extension(DistributedTracing::new("00-abc-def-01").unwrap().with_tracestate("vendor=1"))
            .build()
            .unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMapping {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_detect_mode() {
        let binding = binding();
        assert_eq!(
            binding.detect(&headers(&[("content-type", "application/json")])).unwrap(),
            Mode::Binary
        );
        assert_eq!(
            binding
                .detect(&headers(&[("Content-Type", "Application/CloudEvents+JSON; charset=utf-8")]))
                .unwrap(),
            Mode::Structured
        );
        assert!(matches!(
            binding.detect(&headers(&[("content-type", "text/plain")])),
            Err(BindingError::UnsupportedContentType(Some(_)))
        ));
        assert!(matches!(
            binding.detect(&HeaderMapping::new()),
            Err(BindingError::UnsupportedContentType(None))
        ));
    }

    #[test]
    fn test_custom_markers() {
        let config = BindingConfig {
            binary_content_type: "application/vnd.binary+json".into(),
            structured_content_type: "application/vnd.event+json".into(),
            ..BindingConfig::default()
        };
        let binding = HttpBinding::from_config(&config).unwrap();

        assert!(binding.detect(&headers(&[("content-type", "application/json")])).is_err());
        assert_eq!(
            binding
                .detect(&headers(&[("content-type", "application/vnd.event+json")]))
                .unwrap(),
            Mode::Structured
        );

        let wire = binding.encode(&event(), Mode::Structured).unwrap();
        assert_eq!(wire.headers.get("content-type"), Some("application/vnd.event+json"));
    }

    #[test]
    fn test_round_trip_both_modes() {
        let binding = binding();
        let original = event();
        for mode in [Mode::Binary, Mode::Structured] {
            let wire = binding.encode(&original, mode).unwrap();
            let (decoded, detected) = binding.decode_with_mode(&wire).unwrap();
            assert_eq!(detected, mode);
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_structured_sets_length() {
        let wire = binding().encode(&event(), Mode::Structured).unwrap();
        let length: usize = wire.headers.get("content-length").unwrap().parse().unwrap();
        assert_eq!(length, wire.content_length());
        assert!(length > 0);
    }

    #[test]
    fn test_binary_without_payload_uses_marker() {
        let envelope = Envelope::builder()
            .id("1")
            .source("/s")
            .event_type("t")
            .build()
            .unwrap();

        let wire = binding().encode(&envelope, Mode::Binary).unwrap();
        assert_eq!(wire.headers.get("content-type"), Some("application/json"));
        assert_eq!(wire.headers.get("content-length"), Some("0"));
        assert!(wire.body.is_none());

        let decoded = binding().decode(&wire).unwrap();
        assert_eq!(decoded.content_type(), None);
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_structured_empty_body() {
        let wire = WireMessage::new(
            headers(&[("content-type", "application/cloudevents+json")]),
            Some(Bytes::new()),
        );
        assert!(matches!(binding().decode(&wire), Err(BindingError::MissingBody)));
    }

    #[test]
    fn test_http_header_conversion() {
        let wire = binding().encode(&event(), Mode::Binary).unwrap();
        let map = header_map(&wire.headers).unwrap();
        assert_eq!(map.get("ce-eventid").unwrap(), "1234");
        assert_eq!(map.get("ce-traceparent").unwrap(), "00-abc-def-01");

        let back = to_wire(&map, wire.body_bytes());
        assert_eq!(back.headers.get("CE-EventID"), Some("1234"));
        assert_eq!(back.body_bytes(), Bytes::from_static(b"{\"x\":1}"));
    }

    #[test]
    fn test_invalid_header_value() {
        let result = header_map(&headers(&[("ce-eventid", "line\nbreak")]));
        assert!(matches!(result, Err(BindingError::InvalidHeader { .. })));
    }

    #[tokio::test]
    async fn test_request_and_read_back() {
        let binding = binding();
        let request = binding
            .request(&event(), Mode::Binary, Uri::from_static("http://localhost/events"))
            .unwrap();
        assert_eq!(*request.method(), Method::POST);
        assert_eq!(request.headers().get("content-length").unwrap(), "7");

        let (decoded, mode) = binding.read_request(request).await.unwrap();
        assert_eq!(mode, Mode::Binary);
        assert_eq!(decoded.data(), Some(&Data::Json(json!({"x": 1}))));
    }

    #[tokio::test]
    async fn test_read_request_over_limit() {
        let config = BindingConfig {
            max_body_size: 4,
            ..BindingConfig::default()
        };
        let binding = HttpBinding::from_config(&config).unwrap();
        let request = binding
            .request(&event(), Mode::Structured, Uri::from_static("/"))
            .unwrap();

        assert!(matches!(
            binding.read_request(request).await,
            Err(BindingError::Body(_))
        ));
    }

    #[test]
    fn test_response_status() {
        let response = binding()
            .response(&event(), Mode::Structured, StatusCode::OK)
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/cloudevents+json"
        );
    }
}
