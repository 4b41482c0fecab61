//! Event envelope subsystem.
//!
//! # Data Flow
//! ```text
//! EnvelopeBuilder (id, source, type, ... , data, extensions)
//!     → build() validates required attributes
//!     → Envelope (immutable)
//!     → marshaller pipeline / structured codec
//! ```
//!
//! # Design Decisions
//! - Required attributes are never defaulted on decode; only the builder
//!   fills in the spec version for locally created events
//! - Time is held as `DateTime<Utc>` and written as RFC 3339

pub mod attributes;
pub mod builder;
pub mod data;
pub mod envelope;

pub use attributes::{AttributeName, Attributes, ValidationError, SPEC_VERSION};
pub use builder::EnvelopeBuilder;
pub use data::Data;
pub use envelope::Envelope;
