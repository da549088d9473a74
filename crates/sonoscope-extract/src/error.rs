//! Error types for extractor configuration and adapter creation.

use thiserror::Error;

/// Validation errors for keys and states, raised at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid extractor key '{0}': identifier and feature must be non-empty")]
    InvalidKey(String),

    #[error("invalid extractor state: {0}")]
    InvalidState(String),
}

/// Staged failures while binding a key + state to a catalogue entry.
///
/// The first three variants are configuration mistakes the caller can fix
/// by editing the key or state; the rest are extractor-side failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("invalid extractor key '{0}': identifier and feature must be non-empty")]
    InvalidKey(String),

    #[error("invalid extractor state: {0}")]
    InvalidState(String),

    #[error("unknown parameter '{parameter}' for extractor '{identifier}'")]
    UnknownParameter {
        identifier: String,
        parameter: String,
    },

    #[error("extractor '{0}' not found in catalogue")]
    NotFound(String),

    #[error("extractor '{identifier}' has no output '{feature}'")]
    UnknownFeature {
        identifier: String,
        feature: String,
    },

    #[error(
        "extractor '{identifier}' rejected configuration: \
         {channels} channel(s), step {step_size}, block {block_size}"
    )]
    InitialisationRejected {
        identifier: String,
        channels: usize,
        step_size: usize,
        block_size: usize,
    },
}

impl AdapterError {
    /// True for errors in the caller-supplied configuration (key, state,
    /// parameter names), false for extractor-side failures (missing from
    /// the catalogue, unknown output, rejected initialisation).
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            AdapterError::InvalidKey(_)
                | AdapterError::InvalidState(_)
                | AdapterError::UnknownParameter { .. }
        )
    }
}

impl From<ConfigError> for AdapterError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::InvalidKey(k) => AdapterError::InvalidKey(k),
            ConfigError::InvalidState(s) => AdapterError::InvalidState(s),
        }
    }
}
