//! Event extensions.
//!
//! # Data Flow
//! ```text
//! Extension type (implements ExtensionFormat)
//!     → registry.rs (name → marshal / unmarshal entry, filled at startup)
//!     → mapping::extensions (Extensions ↔ KeyValues)
//!     → mapping::headers / codec::structured (KeyValues ↔ wire)
//! ```
//!
//! # Design Decisions
//! - Extensions are flat string key/value groups; one extension never reads
//!   another extension's keys
//! - Unknown or malformed extension values are skipped, never fatal
//! - Key collisions are rejected when the registry is built, not at runtime

pub mod distributed_tracing;
pub mod registry;
pub mod sampling;

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::mapping::KeyValues;

pub use distributed_tracing::DistributedTracing;
pub use registry::{ExtensionEntry, ExtensionRegistry, RegistryError};
pub use sampling::Sampling;

/// A registered extension value failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("extension {extension} key {key} is malformed: {reason}")]
    Malformed {
        extension: &'static str,
        key: &'static str,
        reason: String,
    },
}

/// A strongly typed extension format.
///
/// Implementors describe how their value flattens into string key/value
/// pairs. Registering the type with an [`ExtensionRegistry`] is what makes
/// the pipelines aware of it.
pub trait ExtensionFormat: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Unique extension name.
    const NAME: &'static str;

    /// Every key this extension may write. Lower-case alphanumeric.
    const KEYS: &'static [&'static str];

    fn marshal(&self) -> KeyValues;

    /// `Ok(None)` when the extension is absent from `values`.
    fn unmarshal(values: &KeyValues) -> Result<Option<Self>, ExtensionError>;
}

/// Object-safe view of an extension value held by an envelope.
pub trait Extension: fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn Extension>;
    fn dyn_eq(&self, other: &dyn Extension) -> bool;
}

impl<T: ExtensionFormat> Extension for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Extension> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn Extension) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl Clone for Box<dyn Extension> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// Extensions attached to one envelope, unique by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    items: Vec<Box<dyn Extension>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an extension, replacing one with the same name.
    pub fn insert<T: ExtensionFormat>(&mut self, extension: T) {
        self.insert_boxed(Box::new(extension));
    }

    pub fn insert_boxed(&mut self, extension: Box<dyn Extension>) {
        match self.items.iter().position(|e| e.name() == extension.name()) {
            Some(idx) => self.items[idx] = extension,
            None => self.items.push(extension),
        }
    }

    pub fn get<T: ExtensionFormat>(&self) -> Option<&T> {
        self.get_by_name(T::NAME)
            .and_then(|e| e.as_any().downcast_ref::<T>())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&dyn Extension> {
        self.items
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Extension>> {
        let idx = self.items.iter().position(|e| e.name() == name)?;
        Some(self.items.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Extension> {
        self.items.iter().map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Equal when both hold the same extensions, regardless of order.
impl PartialEq for Extensions {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|ext| {
                other
                    .get_by_name(ext.name())
                    .is_some_and(|o| ext.dyn_eq(o))
            })
    }
}
