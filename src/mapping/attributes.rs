//! Attribute mapper: `Attributes` ⇄ `KeyValues`.

use crate::event::attributes::{format_time, parse_time};
use crate::event::{AttributeName, Attributes, ValidationError};
use crate::mapping::KeyValues;

/// Flatten attributes into canonical key/value pairs. Absent optional
/// attributes produce no entry.
pub fn marshal(attributes: &Attributes) -> KeyValues {
    let mut values = KeyValues::new();
    values.insert(AttributeName::Id.key().into(), attributes.id.clone());
    values.insert(AttributeName::Source.key().into(), attributes.source.clone());
    values.insert(AttributeName::Type.key().into(), attributes.event_type.clone());
    values.insert(AttributeName::SpecVersion.key().into(), attributes.spec_version.clone());
    if let Some(time) = &attributes.time {
        values.insert(AttributeName::Time.key().into(), format_time(time));
    }
    if let Some(schema_url) = &attributes.schema_url {
        values.insert(AttributeName::SchemaUrl.key().into(), schema_url.clone());
    }
    if let Some(content_type) = &attributes.content_type {
        values.insert(AttributeName::ContentType.key().into(), content_type.clone());
    }
    values
}

/// Rebuild attributes from canonical key/value pairs.
///
/// Keys that are not attributes are ignored. A missing required attribute
/// or an unparsable typed one fails; nothing is defaulted.
pub fn unmarshal(values: &KeyValues) -> Result<Attributes, ValidationError> {
    let required = |name: AttributeName| {
        values
            .get(name.key())
            .cloned()
            .ok_or(ValidationError::MissingAttribute(name.key()))
    };
    let optional = |name: AttributeName| values.get(name.key()).cloned();

    let attributes = Attributes {
        id: required(AttributeName::Id)?,
        source: required(AttributeName::Source)?,
        event_type: required(AttributeName::Type)?,
        spec_version: required(AttributeName::SpecVersion)?,
        time: optional(AttributeName::Time)
            .map(|t| parse_time(&t))
            .transpose()?,
        schema_url: optional(AttributeName::SchemaUrl),
        content_type: optional(AttributeName::ContentType),
    };
    attributes.validate()?;
    Ok(attributes)
}
