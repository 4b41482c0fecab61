//! CloudEvents HTTP binding.
//!
//! Moves events between an immutable [`Envelope`] and HTTP messages in
//! binary mode (attributes in `CE-` headers, payload in the body) or
//! structured mode (one JSON document).

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod extensions;
pub mod http;
pub mod mapping;
pub mod observability;
pub mod pipeline;
pub mod wire;

pub use config::schema::AppConfig;
pub use error::{BindingError, BindingResult};
pub use event::{Data, Envelope, EnvelopeBuilder};
pub use extensions::{DistributedTracing, ExtensionFormat, ExtensionRegistry, Sampling};
pub use http::{EventClient, EventServer, HttpBinding, Mode};
pub use wire::{HeaderMapping, WireMessage};
