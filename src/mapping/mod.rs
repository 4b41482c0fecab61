//! Pure mapping functions between typed values and the canonical
//! key/value representation.
//!
//! # Data Flow
//! ```text
//! Attributes  ⇄ attributes.rs ⇄ ┐
//!                                ├ KeyValues ⇄ headers.rs ⇄ HeaderMapping (binary mode)
//! Extensions  ⇄ extensions.rs ⇄ ┘           ⇄ codec::structured ⇄ JSON fields
//! ```
//!
//! # Design Decisions
//! - Keys are canonical lower-case attribute / extension names
//! - Every function is side-effect free and reports failure explicitly
//! - Header casing is decided here, lookups accept any casing

pub mod attributes;
pub mod extensions;
pub mod headers;

use std::collections::BTreeMap;

/// Canonical key/value representation shared by both wire encodings.
pub type KeyValues = BTreeMap<String, String>;

pub use headers::HeaderMapper;
