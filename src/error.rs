//! Binding error types.
//!
//! Every failure the binding can observe while decoding or encoding a
//! message is a variant of [`BindingError`]. Decode failures are always
//! returned to the caller; a partially built envelope is never handed out.

use thiserror::Error;

use crate::codec::CodecError;
use crate::event::ValidationError;

/// Errors raised while moving an event between its envelope and wire forms.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Content-Type missing or not one of the configured markers.
    #[error("no cloudevent type identified (content-type: {})", .0.as_deref().unwrap_or("<missing>"))]
    UnsupportedContentType(Option<String>),

    /// Structured message with an empty body.
    #[error("no cloudevent body")]
    MissingBody,

    /// A required attribute is missing or one of them is malformed.
    #[error("attribute validation failed: {0}")]
    AttributeValidation(#[from] ValidationError),

    /// No payload codec is registered for the declared content type.
    #[error("no payload codec registered for content type {0}")]
    PayloadCodec(String),

    /// The payload codec rejected the data or the body.
    #[error("payload codec for {content_type} failed: {source}")]
    PayloadEncoding {
        content_type: String,
        #[source]
        source: CodecError,
    },

    /// The structured body is not valid JSON.
    #[error("malformed structured event: {0}")]
    Json(#[from] serde_json::Error),

    /// The structured body is JSON but not an event document.
    #[error("malformed structured event: {0}")]
    MalformedEvent(String),

    /// An envelope carries an extension the registry does not know.
    #[error("extension {0} is not registered")]
    UnregisteredExtension(String),

    /// An extension key would overwrite an attribute or another extension.
    #[error("extension key {key} collides with header {header}")]
    ExtensionCollision { key: String, header: String },

    /// A header could not be represented on the wire.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The transport failed to deliver the full body.
    #[error("failed to read body: {0}")]
    Body(String),

    /// A pipeline stage ran before the stage it depends on.
    #[error("stage {stage} requires {requires} to run first")]
    StageOrder {
        stage: &'static str,
        requires: &'static str,
    },
}

impl BindingError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BindingError::UnsupportedContentType(_) => "unsupported_content_type",
            BindingError::MissingBody => "missing_body",
            BindingError::AttributeValidation(_) => "attribute_validation",
            BindingError::PayloadCodec(_) => "payload_codec",
            BindingError::PayloadEncoding { .. } => "payload_encoding",
            BindingError::Json(_) | BindingError::MalformedEvent(_) => "malformed_event",
            BindingError::UnregisteredExtension(_) => "unregistered_extension",
            BindingError::ExtensionCollision { .. } => "extension_collision",
            BindingError::InvalidHeader { .. } => "invalid_header",
            BindingError::Body(_) => "body",
            BindingError::StageOrder { .. } => "stage_order",
        }
    }
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindingError::UnsupportedContentType(Some("text/plain".into()));
        assert_eq!(
            err.to_string(),
            "no cloudevent type identified (content-type: text/plain)"
        );

        let err = BindingError::UnsupportedContentType(None);
        assert!(err.to_string().contains("<missing>"));

        assert_eq!(BindingError::MissingBody.to_string(), "no cloudevent body");
    }

    #[test]
    fn test_error_kind() {
        let err = BindingError::from(ValidationError::MissingAttribute("id"));
        assert_eq!(err.kind(), "attribute_validation");
        assert_eq!(BindingError::PayloadCodec("image/png".into()).kind(), "payload_codec");
    }
}
