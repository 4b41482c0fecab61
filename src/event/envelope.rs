//! The immutable event envelope.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::event::{Attributes, Data, EnvelopeBuilder};
use crate::extensions::{ExtensionFormat, Extensions};

/// One event: attributes, optional payload and extensions.
///
/// Built once through [`EnvelopeBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    attributes: Attributes,
    data: Option<Data>,
    extensions: Extensions,
}

impl Envelope {
    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::new()
    }

    pub(crate) fn from_parts(attributes: Attributes, data: Option<Data>, extensions: Extensions) -> Self {
        Self {
            attributes,
            data,
            extensions,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    pub fn source(&self) -> &str {
        self.attributes.source()
    }

    pub fn event_type(&self) -> &str {
        self.attributes.event_type()
    }

    pub fn spec_version(&self) -> &str {
        self.attributes.spec_version()
    }

    pub fn time(&self) -> Option<&DateTime<Utc>> {
        self.attributes.time()
    }

    pub fn schema_url(&self) -> Option<&str> {
        self.attributes.schema_url()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.attributes.content_type()
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Deserialize the payload into `T`; `Ok(None)` when there is no payload.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.data.as_ref().map(Data::to_typed).transpose()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Typed access to one extension.
    pub fn extension<T: ExtensionFormat>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn into_parts(self) -> (Attributes, Option<Data>, Extensions) {
        (self.attributes, self.data, self.extensions)
    }
}
