//! Marshaller / unmarshaller pipelines.
//!
//! # Data Flow
//! ```text
//! Binary encode (marshaller.rs):
//!     Envelope
//!     → marshal-attributes → attributes-to-headers
//!     → marshal-extensions → extensions-to-headers
//!     → encode-payload (codec by content type, Content-Length)
//!     → WireMessage
//!
//! Binary decode (unmarshaller.rs):
//!     WireMessage
//!     → headers-to-attributes → parse-attributes
//!     → decode-payload (content type resolved by parse-attributes)
//!     → headers-to-extensions → unmarshal-extensions
//!     → build (terminal, re-validates)
//!     → Envelope
//! ```
//!
//! # Design Decisions
//! - A pipeline is an ordered list of named stages over one input and one
//!   intermediate state; every stage is a plain function testable alone
//! - Stage order is fixed when the pipeline is assembled
//! - The first failing stage aborts the run; no partial result escapes

pub mod marshaller;
pub mod unmarshaller;

use std::fmt;

use crate::error::BindingResult;

pub use marshaller::{EncodeState, Marshaller};
pub use unmarshaller::{DecodeState, Unmarshaller};

type StageFn<I, S> = Box<dyn Fn(&I, &mut S) -> BindingResult<()> + Send + Sync>;

struct Stage<I, S> {
    name: &'static str,
    run: StageFn<I, S>,
}

/// Ordered stages that read input `I` and accumulate into state `S`.
pub struct Pipeline<I, S> {
    label: &'static str,
    stages: Vec<Stage<I, S>>,
}

impl<I, S> Pipeline<I, S> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            stages: Vec::new(),
        }
    }

    /// Append a stage; stages run in the order they are added.
    pub fn stage<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: Fn(&I, &mut S) -> BindingResult<()> + Send + Sync + 'static,
    {
        self.stages.push(Stage {
            name,
            run: Box::new(run),
        });
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name).collect()
    }

    /// Run every stage in order, returning the final state.
    pub fn run(&self, input: &I, mut state: S) -> BindingResult<S> {
        for stage in &self.stages {
            tracing::trace!(pipeline = self.label, stage = stage.name, "Running stage");
            if let Err(e) = (stage.run)(input, &mut state) {
                tracing::debug!(
                    pipeline = self.label,
                    stage = stage.name,
                    kind = e.kind(),
                    error = %e,
                    "Stage failed"
                );
                return Err(e);
            }
        }
        Ok(state)
    }
}

impl<I, S> fmt::Debug for Pipeline<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("label", &self.label)
            .field("stages", &self.stage_names())
            .finish()
    }
}
