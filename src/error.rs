// src/error.rs
//! Unified error handling for the fusion core
//!
//! Sensor drivers surface [`HalError`]; everything above the HAL converts
//! into [`CoreError`] so the task layer has a single error currency.

use crate::hal::HalError;
use thiserror::Error;

/// Unified error type for the fusion core
#[derive(Debug, Error)]
pub enum CoreError {
    /// Sensor channel failures, tagged with the owning channel
    #[error("Sensor error on {channel} channel: {source}")]
    Sensor {
        channel: SensorChannel,
        #[source]
        source: HalError,
    },

    /// Configuration loading or validation failures
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Telemetry sink rejected or dropped a payload
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Session state machine misuse
    #[error("Session error: {0}")]
    Session(String),
}

/// Acquisition channel identifiers for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Flow,
    Cardio,
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorChannel::Flow => write!(f, "flow"),
            SensorChannel::Cardio => write!(f, "cardio"),
        }
    }
}

impl CoreError {
    /// Wrap a HAL error with its owning channel
    pub fn sensor(channel: SensorChannel, source: HalError) -> Self {
        CoreError::Sensor { channel, source }
    }
}

/// Common result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
