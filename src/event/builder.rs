//! Envelope construction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::event::{AttributeName, Attributes, Data, Envelope, ValidationError, SPEC_VERSION};
use crate::extensions::{Extension, ExtensionFormat, Extensions};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Builder that validates required attributes before producing an [`Envelope`].
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    id: Option<String>,
    source: Option<String>,
    event_type: Option<String>,
    spec_version: Option<String>,
    time: Option<DateTime<Utc>>,
    schema_url: Option<String>,
    content_type: Option<String>,
    data: Option<Data>,
    extensions: Extensions,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Assign a random UUID v4 as the event id.
    pub fn random_id(self) -> Self {
        self.id(Uuid::new_v4().to_string())
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Defaults to [`SPEC_VERSION`] when not set.
    pub fn spec_version(mut self, spec_version: impl Into<String>) -> Self {
        self.spec_version = Some(spec_version.into());
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    /// Media type of the payload. Dropped by [`build`](Self::build) when the
    /// event has no payload.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub(crate) fn maybe_data(mut self, data: Option<Data>) -> Self {
        self.data = data;
        self
    }

    /// Serialize `value` as the JSON payload.
    ///
    /// Sets the content type to `application/json` unless one was given.
    pub fn json_data<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.data = Some(Data::from_serializable(value)?);
        if self.content_type.is_none() {
            self.content_type = Some(JSON_CONTENT_TYPE.to_string());
        }
        Ok(self)
    }

    /// Copy every attribute from an existing attribute set.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.id = Some(attributes.id);
        self.source = Some(attributes.source);
        self.event_type = Some(attributes.event_type);
        self.spec_version = Some(attributes.spec_version);
        self.time = attributes.time;
        self.schema_url = attributes.schema_url;
        self.content_type = attributes.content_type;
        self
    }

    /// Attach an extension, replacing any extension with the same name.
    pub fn extension<T: ExtensionFormat>(mut self, extension: T) -> Self {
        self.extensions.insert(extension);
        self
    }

    pub fn extension_boxed(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.insert_boxed(extension);
        self
    }

    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Validate and assemble the envelope.
    ///
    /// The payload is conformed to the content type with [`Data::conform`].
    pub fn build(self) -> Result<Envelope, ValidationError> {
        let content_type = self.content_type.filter(|_| self.data.is_some());
        let data = self
            .data
            .map(|data| data.conform(content_type.as_deref()));

        let attributes = Attributes {
            id: required(self.id, AttributeName::Id)?,
            source: required(self.source, AttributeName::Source)?,
            event_type: required(self.event_type, AttributeName::Type)?,
            spec_version: self.spec_version.unwrap_or_else(|| SPEC_VERSION.to_string()),
            time: self.time,
            schema_url: self.schema_url,
            content_type,
        };
        attributes.validate()?;

        Ok(Envelope::from_parts(attributes, data, self.extensions))
    }
}

fn required(value: Option<String>, name: AttributeName) -> Result<String, ValidationError> {
    value.ok_or(ValidationError::MissingAttribute(name.key()))
}
