//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound:
//!     hyper connection
//!     → server.rs (Axum router, middleware)
//!     → extract.rs (buffer full body)
//!     → binding.rs (detect mode → unmarshaller pipeline | structured codec)
//!     → Envelope to the handler
//!
//! Outbound:
//!     Envelope + Mode
//!     → binding.rs (marshaller pipeline | structured codec)
//!     → http::Request / http::Response, or client.rs (reqwest)
//! ```

pub mod binding;
pub mod client;
pub mod extract;
pub mod server;

pub use binding::{HttpBinding, Mode};
pub use client::{ClientError, EventClient};
pub use extract::{Event, EventRejection};
pub use server::{AppState, EventServer};
