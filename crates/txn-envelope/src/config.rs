//! Envelope configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use txn_envelope::config::EnvelopeConfigBuilder;
//!
//! let config = EnvelopeConfigBuilder::new()
//!     .max_items(64)
//!     .max_envelope_bytes(256 * 1024)
//!     .build()
//!     .expect("Valid config");
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;

/// Default cap on ordinary items per transaction.
pub const DEFAULT_MAX_ITEMS: usize = 1024;

/// Default cap on the serialized body size (1 MiB).
pub const DEFAULT_MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Limits applied when building, encoding and decoding transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Maximum ordinary items in one transaction
    pub max_items: usize,
    /// Maximum serialized body size in bytes
    pub max_envelope_bytes: usize,
    /// Frames buffered per endpoint inbox
    pub inbox_capacity: usize,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_BYTES,
            inbox_capacity: shared_bus::DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl EnvelopeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for unset variables.
    ///
    /// # Environment Variables
    ///
    /// - `TXN_MAX_ITEMS`: Items per transaction (default: 1024)
    /// - `TXN_MAX_ENVELOPE_BYTES`: Body size limit (default: 1048576)
    /// - `TXN_INBOX_CAPACITY`: Frames per inbox (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_items: env_usize("TXN_MAX_ITEMS", defaults.max_items)?,
            max_envelope_bytes: env_usize("TXN_MAX_ENVELOPE_BYTES", defaults.max_envelope_bytes)?,
            inbox_capacity: env_usize("TXN_INBOX_CAPACITY", defaults.inbox_capacity)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate that every limit is usable on the wire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items == 0 {
            return Err(ConfigError::Invalid("max_items cannot be 0".to_string()));
        }
        // Item count is written as u32
        if self.max_items > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "max_items must not exceed {}",
                u32::MAX
            )));
        }
        if self.max_envelope_bytes < MIN_ENVELOPE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_envelope_bytes must be at least {MIN_ENVELOPE_BYTES}"
            )));
        }
        if self.max_envelope_bytes > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "max_envelope_bytes must not exceed {}",
                u32::MAX
            )));
        }
        if self.inbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "inbox_capacity cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Smallest body: target, scope flag, empty final-state tag, items flag.
const MIN_ENVELOPE_BYTES: usize = 16 + 1 + 2 + 1;

fn env_usize(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(default),
    }
}

/// Builder for EnvelopeConfig with validation
#[derive(Default)]
pub struct EnvelopeConfigBuilder {
    max_items: Option<usize>,
    max_envelope_bytes: Option<usize>,
    inbox_capacity: Option<usize>,
}

impl EnvelopeConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum items per transaction
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Set maximum serialized body size
    pub fn max_envelope_bytes(mut self, bytes: usize) -> Self {
        self.max_envelope_bytes = Some(bytes);
        self
    }

    /// Set per-endpoint inbox capacity
    pub fn inbox_capacity(mut self, frames: usize) -> Self {
        self.inbox_capacity = Some(frames);
        self
    }

    /// Build the EnvelopeConfig, validating all parameters
    pub fn build(self) -> Result<EnvelopeConfig, ConfigError> {
        let defaults = EnvelopeConfig::default();

        let config = EnvelopeConfig {
            max_items: self.max_items.unwrap_or(defaults.max_items),
            max_envelope_bytes: self.max_envelope_bytes.unwrap_or(defaults.max_envelope_bytes),
            inbox_capacity: self.inbox_capacity.unwrap_or(defaults.inbox_capacity),
        };

        config.validate()?;
        Ok(config)
    }
}

/// The subset of the config a transaction carries around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Limits {
    pub max_items: usize,
    pub max_envelope_bytes: usize,
}

impl From<&EnvelopeConfig> for Limits {
    fn from(config: &EnvelopeConfig) -> Self {
        Self {
            max_items: config.max_items,
            max_envelope_bytes: config.max_envelope_bytes,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&EnvelopeConfig::default())
    }
}
