//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! binding, extension decoding, server:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters per mode and failure kind)
//!
//! Consumers:
//!     → stdout (fmt subscriber, RUST_LOG aware)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; binaries install subscribers
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
