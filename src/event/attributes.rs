//! Core event attributes and their validation rules.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use url::Url;

/// Spec version written by this binding.
pub const SPEC_VERSION: &str = "0.2";

/// Errors raised when an attribute is missing or cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required attribute {0} is missing")]
    MissingAttribute(&'static str),

    #[error("required attribute {0} is empty")]
    EmptyAttribute(&'static str),

    #[error("attribute {name} is malformed: {reason}")]
    MalformedAttribute { name: &'static str, reason: String },
}

/// Names of the core attributes, in canonical (lower-case) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Id,
    Source,
    Type,
    SpecVersion,
    Time,
    SchemaUrl,
    ContentType,
}

impl AttributeName {
    pub const ALL: [AttributeName; 7] = [
        AttributeName::Id,
        AttributeName::Source,
        AttributeName::Type,
        AttributeName::SpecVersion,
        AttributeName::Time,
        AttributeName::SchemaUrl,
        AttributeName::ContentType,
    ];

    /// Canonical key used by the key/value representation and structured JSON.
    pub fn key(self) -> &'static str {
        match self {
            AttributeName::Id => "id",
            AttributeName::Source => "source",
            AttributeName::Type => "type",
            AttributeName::SpecVersion => "specversion",
            AttributeName::Time => "time",
            AttributeName::SchemaUrl => "schemaurl",
            AttributeName::ContentType => "contenttype",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            AttributeName::Id | AttributeName::Source | AttributeName::Type | AttributeName::SpecVersion
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.key().eq_ignore_ascii_case(key))
    }
}

/// The attribute set of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub(crate) id: String,
    pub(crate) source: String,
    pub(crate) event_type: String,
    pub(crate) spec_version: String,
    pub(crate) time: Option<DateTime<Utc>>,
    pub(crate) schema_url: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl Attributes {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn spec_version(&self) -> &str {
        &self.spec_version
    }

    pub fn time(&self) -> Option<&DateTime<Utc>> {
        self.time.as_ref()
    }

    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Check required attributes are non-empty and typed ones are well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(AttributeName::Id, &self.id)?;
        require_non_empty(AttributeName::Source, &self.source)?;
        require_non_empty(AttributeName::Type, &self.event_type)?;
        require_non_empty(AttributeName::SpecVersion, &self.spec_version)?;
        validate_source(&self.source)?;
        if let Some(schema_url) = &self.schema_url {
            validate_schema_url(schema_url)?;
        }
        Ok(())
    }
}

fn require_non_empty(name: AttributeName, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyAttribute(name.key()));
    }
    Ok(())
}

/// `source` is a URI-reference: absolute URIs and relative references are both accepted.
pub(crate) fn validate_source(source: &str) -> Result<(), ValidationError> {
    match Url::parse(source) {
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e) => Err(ValidationError::MalformedAttribute {
            name: AttributeName::Source.key(),
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn validate_schema_url(schema_url: &str) -> Result<(), ValidationError> {
    Url::parse(schema_url)
        .map(|_| ())
        .map_err(|e| ValidationError::MalformedAttribute {
            name: AttributeName::SchemaUrl.key(),
            reason: e.to_string(),
        })
}

/// Parse an RFC 3339 timestamp into UTC.
pub(crate) fn parse_time(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ValidationError::MalformedAttribute {
            name: AttributeName::Time.key(),
            reason: e.to_string(),
        })
}

pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
