//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the content-type markers are distinct media types
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation issues, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ConfigIssue>>

use std::fmt;
use std::net::SocketAddr;

use crate::codec::essence;
use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every issue.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();
    let binding = &config.binding;

    check_media_type(&mut issues, "binding.binary_content_type", &binding.binary_content_type);
    check_media_type(
        &mut issues,
        "binding.structured_content_type",
        &binding.structured_content_type,
    );
    check_media_type(
        &mut issues,
        "binding.default_payload_content_type",
        &binding.default_payload_content_type,
    );
    if essence(&binding.binary_content_type) == essence(&binding.structured_content_type) {
        issues.push(ConfigIssue::new(
            "binding.structured_content_type",
            "must differ from binary_content_type",
        ));
    }

    let prefix_ok = !binding.header_prefix.is_empty()
        && binding.header_prefix.chars().all(is_token_char);
    if !prefix_ok {
        issues.push(ConfigIssue::new(
            "binding.header_prefix",
            format!("{:?} is not a valid header name prefix", binding.header_prefix),
        ));
    }
    if binding.spec_version.trim().is_empty() {
        issues.push(ConfigIssue::new("binding.spec_version", "must not be empty"));
    }
    if binding.max_body_size == 0 {
        issues.push(ConfigIssue::new("binding.max_body_size", "must be greater than zero"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "server.bind_address",
            format!("{:?} is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        issues.push(ConfigIssue::new("server.request_timeout_secs", "must be greater than zero"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        issues.push(ConfigIssue::new(
            "observability.log_level",
            format!("unknown level {:?}", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", observability.metrics_address),
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_media_type(issues: &mut Vec<ConfigIssue>, field: &'static str, value: &str) {
    let essence = essence(value);
    let valid = match essence.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && kind.chars().all(is_token_char)
                && subtype.chars().all(is_token_char)
        }
        None => false,
    };
    if !valid {
        issues.push(ConfigIssue::new(field, format!("{:?} is not a media type", value)));
    }
}

/// RFC 7230 `tchar`.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
