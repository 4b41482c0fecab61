//! Distributed tracing extension (W3C trace context).

use crate::extensions::{ExtensionError, ExtensionFormat};
use crate::mapping::KeyValues;

const TRACEPARENT: &str = "traceparent";
const TRACESTATE: &str = "tracestate";

/// Trace context propagated alongside an event.
///
/// Both values are carried verbatim. `traceparent` must be non-empty and
/// free of surrounding whitespace, since HTTP strips it from header values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedTracing {
    traceparent: String,
    tracestate: Option<String>,
}

impl DistributedTracing {
    pub fn new(traceparent: impl Into<String>) -> Result<Self, ExtensionError> {
        let traceparent = traceparent.into();
        check_value(TRACEPARENT, &traceparent)?;
        Ok(Self {
            traceparent,
            tracestate: None,
        })
    }

    pub fn with_tracestate(mut self, tracestate: impl Into<String>) -> Self {
        self.tracestate = Some(tracestate.into());
        self
    }

    pub fn traceparent(&self) -> &str {
        &self.traceparent
    }

    pub fn tracestate(&self) -> Option<&str> {
        self.tracestate.as_deref()
    }
}

fn check_value(key: &'static str, value: &str) -> Result<(), ExtensionError> {
    let reason = if value.is_empty() {
        "empty value"
    } else if value.trim() != value {
        "surrounding whitespace"
    } else {
        return Ok(());
    };
    Err(ExtensionError::Malformed {
        extension: DistributedTracing::NAME,
        key,
        reason: reason.to_string(),
    })
}

impl ExtensionFormat for DistributedTracing {
    const NAME: &'static str = "distributedtracing";
    const KEYS: &'static [&'static str] = &[TRACEPARENT, TRACESTATE];

    fn marshal(&self) -> KeyValues {
        let mut values = KeyValues::new();
        values.insert(TRACEPARENT.to_string(), self.traceparent.clone());
        if let Some(state) = &self.tracestate {
            values.insert(TRACESTATE.to_string(), state.clone());
        }
        values
    }

    fn unmarshal(values: &KeyValues) -> Result<Option<Self>, ExtensionError> {
        // tracestate without traceparent carries no context
        let Some(traceparent) = values.get(TRACEPARENT) else {
            return Ok(None);
        };
        let mut tracing = Self::new(traceparent.clone())?;
        tracing.tracestate = values.get(TRACESTATE).cloned();
        Ok(Some(tracing))
    }
}
