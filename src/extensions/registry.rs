//! Registry of known extension formats.
//!
//! # Responsibilities
//! - Map an extension name to its marshal / unmarshal functions
//! - Reject extension keys that would shadow attributes or other extensions
//!
//! # Design Decisions
//! - Populated once at startup, read-only afterwards; shared via `Arc`
//!   without locking
//! - Registration order is the order extensions are decoded in

use std::fmt;

use thiserror::Error;

use crate::event::AttributeName;
use crate::extensions::{Extension, ExtensionError, ExtensionFormat};
use crate::mapping::headers::attribute_for_header_suffix;
use crate::mapping::KeyValues;

/// Structured-mode fields that are not attributes but still reserved.
const RESERVED_FIELDS: [&str; 2] = ["data", "data_base64"];

/// Errors raised while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("extension {0} is already registered")]
    DuplicateName(&'static str),

    #[error("extension {extension} declares invalid key {key:?} (expected lower-case alphanumeric)")]
    InvalidKey {
        extension: &'static str,
        key: &'static str,
    },

    #[error("extension {extension} key {key} collides with a reserved attribute name")]
    ReservedKey {
        extension: &'static str,
        key: &'static str,
    },

    #[error("extension {extension} key {key} is already owned by extension {owner}")]
    KeyConflict {
        extension: &'static str,
        key: &'static str,
        owner: &'static str,
    },
}

type MarshalFn = Box<dyn Fn(&dyn Extension) -> Option<KeyValues> + Send + Sync>;
type UnmarshalFn =
    Box<dyn Fn(&KeyValues) -> Result<Option<Box<dyn Extension>>, ExtensionError> + Send + Sync>;

/// Marshal / unmarshal pair for one extension format.
pub struct ExtensionEntry {
    name: &'static str,
    keys: &'static [&'static str],
    marshal: MarshalFn,
    unmarshal: UnmarshalFn,
}

impl ExtensionEntry {
    /// Entry backed by an [`ExtensionFormat`] implementation.
    pub fn of<T: ExtensionFormat>() -> Self {
        Self {
            name: T::NAME,
            keys: T::KEYS,
            marshal: Box::new(|ext: &dyn Extension| ext.as_any().downcast_ref::<T>().map(T::marshal)),
            unmarshal: Box::new(|values: &KeyValues| {
                T::unmarshal(values).map(|ext| ext.map(|e| Box::new(e) as Box<dyn Extension>))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    /// `None` when `extension` is not of this entry's type.
    pub fn marshal(&self, extension: &dyn Extension) -> Option<KeyValues> {
        (self.marshal)(extension)
    }

    pub fn unmarshal(&self, values: &KeyValues) -> Result<Option<Box<dyn Extension>>, ExtensionError> {
        (self.unmarshal)(values)
    }
}

impl fmt::Debug for ExtensionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionEntry")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .finish()
    }
}

/// Known extension formats, keyed by name.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    entries: Vec<ExtensionEntry>,
}

impl ExtensionRegistry {
    /// An empty registry; every extension header is ignored on decode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in formats (distributed tracing, sampling).
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new()
            .with::<crate::extensions::DistributedTracing>()?
            .with::<crate::extensions::Sampling>()
    }

    pub fn register<T: ExtensionFormat>(&mut self) -> Result<&mut Self, RegistryError> {
        self.register_entry(ExtensionEntry::of::<T>())?;
        Ok(self)
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with<T: ExtensionFormat>(mut self) -> Result<Self, RegistryError> {
        self.register::<T>()?;
        Ok(self)
    }

    pub fn register_entry(&mut self, entry: ExtensionEntry) -> Result<(), RegistryError> {
        if self.get(entry.name).is_some() {
            return Err(RegistryError::DuplicateName(entry.name));
        }
        for &key in entry.keys {
            check_key(entry.name, key)?;
            if let Some(owner) = self.owner_of(key) {
                return Err(RegistryError::KeyConflict {
                    extension: entry.name,
                    key,
                    owner,
                });
            }
        }

        tracing::debug!(extension = entry.name, keys = ?entry.keys, "Extension registered");
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Name of the extension that owns `key`, if any.
    pub fn owner_of(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
            .map(|e| e.name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ExtensionEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_key(extension: &'static str, key: &'static str) -> Result<(), RegistryError> {
    let well_formed = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !well_formed {
        return Err(RegistryError::InvalidKey { extension, key });
    }

    let reserved = AttributeName::from_key(key).is_some()
        || attribute_for_header_suffix(key).is_some()
        || RESERVED_FIELDS.contains(&key);
    if reserved {
        return Err(RegistryError::ReservedKey { extension, key });
    }
    Ok(())
}
