//! Sampling extension.

use crate::extensions::{ExtensionError, ExtensionFormat};
use crate::mapping::KeyValues;

const SAMPLED_RATE: &str = "sampledrate";

/// Rate at which the producer sampled this event (1 in `rate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    rate: u32,
}

impl Sampling {
    /// Fails for a rate of zero, which could never be read back.
    pub fn new(rate: u32) -> Result<Self, ExtensionError> {
        if rate == 0 {
            return Err(malformed("rate must be at least 1".to_string()));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }
}

fn malformed(reason: String) -> ExtensionError {
    ExtensionError::Malformed {
        extension: Sampling::NAME,
        key: SAMPLED_RATE,
        reason,
    }
}

impl ExtensionFormat for Sampling {
    const NAME: &'static str = "sampling";
    const KEYS: &'static [&'static str] = &[SAMPLED_RATE];

    fn marshal(&self) -> KeyValues {
        let mut values = KeyValues::new();
        values.insert(SAMPLED_RATE.to_string(), self.rate.to_string());
        values
    }

    fn unmarshal(values: &KeyValues) -> Result<Option<Self>, ExtensionError> {
        let Some(raw) = values.get(SAMPLED_RATE) else {
            return Ok(None);
        };
        let rate = raw
            .trim()
            .parse::<u32>()
            .map_err(|e| malformed(e.to_string()))?;
        Self::new(rate).map(Some)
    }
}
