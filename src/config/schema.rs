//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Receiver server settings.
    pub server: ServerConfig,

    /// Wire binding settings (markers, header prefix, codecs).
    pub binding: BindingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Receiver server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Reply with the received event instead of an empty 202.
    pub echo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            echo: true,
        }
    }
}

/// HTTP binding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Content-Type that selects binary mode on decode.
    pub binary_content_type: String,

    /// Content-Type that selects structured mode on decode and is written
    /// on structured encode.
    pub structured_content_type: String,

    /// Prefix of attribute and extension headers.
    pub header_prefix: String,

    /// Spec version stamped on events built by the CLI.
    pub spec_version: String,

    /// Payload content type assumed when an event declares none.
    pub default_payload_content_type: String,

    /// Maximum body size buffered before decoding, in bytes.
    pub max_body_size: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            binary_content_type: "application/json".to_string(),
            structured_content_type: "application/cloudevents+json".to_string(),
            header_prefix: "CE-".to_string(),
            spec_version: "0.2".to_string(),
            default_payload_content_type: "text/plain".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
