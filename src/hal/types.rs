// src/hal/types.rs
//! Core types for sensor abstraction

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single respiratory flow sample.
///
/// Drivers convert from the sensor's native unit (typically standard
/// liters per minute) to L/s before handing samples to the core;
/// positive flow is inhalation by convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    /// Flow rate in liters per second
    pub flow_lps: f32,
    /// Die temperature in °C
    pub temperature_c: f32,
}

/// Single raw photoplethysmography sample (one red + one infrared intensity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpgSample {
    pub red: u32,
    pub ir: u32,
}

/// Sensor identification for logging and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub name: String,
    pub model: String,
    pub serial_number: String,
}

/// Sensor driver errors
#[derive(Debug, Clone, Error)]
pub enum HalError {
    #[error("Sensor initialization failed: {0}")]
    InitFailed(String),

    #[error("Sensor read failed: {0}")]
    ReadFailed(String),

    #[error("Sensor data-ready wait exceeded {timeout_ms} ms")]
    DataReadyTimeout { timeout_ms: u64 },

    #[error("Sensor is not initialized")]
    NotInitialized,
}

/// Convert a flow reading from standard liters per minute to liters per second
pub fn slm_to_lps(slm: f32) -> f32 {
    slm * crate::config::constants::flow::SLM_TO_LPS
}
