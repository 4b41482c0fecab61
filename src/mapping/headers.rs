//! Header mapper: canonical `KeyValues` ⇄ literal HTTP header names.
//!
//! # Header Names
//! ```text
//! id          → {prefix}EventID
//! type        → {prefix}EventType
//! source      → {prefix}Source
//! specversion → {prefix}SpecVersion
//! time        → {prefix}EventTime
//! schemaurl   → {prefix}SchemaURL
//! contenttype → Content-Type (never prefixed)
//! <ext key>   → {prefix}<ext key>
//! ```

use crate::error::{BindingError, BindingResult};
use crate::event::AttributeName;
use crate::mapping::KeyValues;
use crate::wire::HeaderMapping;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const DEFAULT_PREFIX: &str = "CE-";

/// Header name suffixes for every prefixed attribute.
const ATTRIBUTE_SUFFIXES: [(AttributeName, &str); 6] = [
    (AttributeName::Id, "EventID"),
    (AttributeName::Type, "EventType"),
    (AttributeName::Source, "Source"),
    (AttributeName::SpecVersion, "SpecVersion"),
    (AttributeName::Time, "EventTime"),
    (AttributeName::SchemaUrl, "SchemaURL"),
];

/// Attribute whose header suffix matches `suffix`, ignoring case.
pub fn attribute_for_header_suffix(suffix: &str) -> Option<AttributeName> {
    ATTRIBUTE_SUFFIXES
        .iter()
        .find(|(_, s)| s.eq_ignore_ascii_case(suffix))
        .map(|(name, _)| *name)
}

/// Converts canonical keys to and from binary-mode header names.
#[derive(Debug, Clone)]
pub struct HeaderMapper {
    prefix: String,
}

impl Default for HeaderMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl HeaderMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Wire header name for an attribute.
    pub fn attribute_header(&self, name: AttributeName) -> String {
        if name == AttributeName::ContentType {
            return CONTENT_TYPE.to_string();
        }
        let suffix = ATTRIBUTE_SUFFIXES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
            .unwrap_or_else(|| name.key());
        format!("{}{}", self.prefix, suffix)
    }

    /// Wire header name for an extension key, kept exactly as registered.
    pub fn extension_header(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Write attribute key/value pairs as headers.
    pub fn attributes_to_headers(&self, values: &KeyValues, headers: &mut HeaderMapping) {
        for (key, value) in values {
            if let Some(name) = AttributeName::from_key(key) {
                headers.insert(self.attribute_header(name), value.clone());
            }
        }
    }

    /// Write extension key/value pairs as headers.
    ///
    /// An extension header that already exists is a collision: nothing is
    /// overwritten and the call fails.
    pub fn extensions_to_headers(
        &self,
        values: &KeyValues,
        headers: &mut HeaderMapping,
    ) -> BindingResult<()> {
        for (key, value) in values {
            let header = self.extension_header(key);
            if headers.contains(&header) {
                return Err(BindingError::ExtensionCollision {
                    key: key.clone(),
                    header,
                });
            }
            headers.insert(header, value.clone());
        }
        Ok(())
    }

    /// Read attribute key/value pairs from headers, any casing.
    pub fn headers_to_attributes(&self, headers: &HeaderMapping) -> KeyValues {
        let mut values = KeyValues::new();
        for (header, value) in headers.iter() {
            let name = if header.eq_ignore_ascii_case(CONTENT_TYPE) {
                Some(AttributeName::ContentType)
            } else {
                self.strip_prefix(header).and_then(attribute_for_header_suffix)
            };
            if let Some(name) = name {
                values.insert(name.key().to_string(), value.to_string());
            }
        }
        values
    }

    /// Read every prefixed, non-attribute header as an extension key.
    ///
    /// Keys are lower-cased; whether an extension claims them is decided by
    /// the registry.
    pub fn headers_to_extensions(&self, headers: &HeaderMapping) -> KeyValues {
        let mut values = KeyValues::new();
        for (header, value) in headers.iter() {
            let Some(suffix) = self.strip_prefix(header) else {
                continue;
            };
            if suffix.is_empty() || attribute_for_header_suffix(suffix).is_some() {
                continue;
            }
            values.insert(suffix.to_ascii_lowercase(), value.to_string());
        }
        values
    }

    fn strip_prefix<'h>(&self, header: &'h str) -> Option<&'h str> {
        let prefix_len = self.prefix.len();
        if header.len() < prefix_len || !header.is_char_boundary(prefix_len) {
            return None;
        }
        let (head, tail) = header.split_at(prefix_len);
        head.eq_ignore_ascii_case(&self.prefix).then_some(tail)
    }
}
