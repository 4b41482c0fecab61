//! Transport-independent wire message.
//!
//! A [`WireMessage`] is what the marshaller produces and the unmarshaller
//! consumes: a header mapping plus an optional raw body. Conversion to and
//! from a concrete HTTP library happens in [`crate::http::binding`].

use bytes::Bytes;

/// Header mapping with case-insensitive lookup.
///
/// Names keep the exact casing they were inserted with. Inserting a name
/// that already exists (in any casing) replaces the previous entry, so the
/// last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    entries: Vec<(String, String)>,
}

impl HeaderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                let (_, old) = std::mem::replace(&mut self.entries[idx], (name, value));
                Some(old)
            }
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderMapping::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// Header mapping plus raw body, ready to be written to a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMessage {
    pub headers: HeaderMapping,
    pub body: Option<Bytes>,
}

impl WireMessage {
    pub fn new(headers: HeaderMapping, body: Option<Bytes>) -> Self {
        Self { headers, body }
    }

    /// Length of the body in bytes, zero when there is none.
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map(Bytes::len).unwrap_or(0)
    }

    /// The body, or an empty buffer.
    pub fn body_bytes(&self) -> Bytes {
        self.body.clone().unwrap_or_default()
    }
}
