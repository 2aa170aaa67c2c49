// src/hal/traits.rs
//! Sensor traits the acquisition loops are written against

use crate::hal::types::{FlowSample, HalError, PpgSample, SensorInfo};
use async_trait::async_trait;

/// Respiratory flow sensor (one channel).
///
/// `read_sample` returns flow in L/s, already converted from the sensor's
/// native unit. Initialization failure is permanent for the owning
/// acquisition task; drivers should not retry internally.
#[async_trait]
pub trait FlowSensor: Send {
    /// Initialize and start continuous measurement
    async fn initialize(&mut self) -> Result<(), HalError>;

    /// Read the next flow sample
    async fn read_sample(&mut self) -> Result<FlowSample, HalError>;

    /// Sensor identification
    fn sensor_info(&self) -> SensorInfo;
}

/// Pulse-oximetry (PPG) sensor (one red/IR channel pair).
///
/// `read_sample` waits for the sensor's data-ready condition with a bounded
/// timeout and returns [`HalError::DataReadyTimeout`] when it expires, never
/// stalling the caller indefinitely.
#[async_trait]
pub trait PpgSensor: Send {
    /// Initialize and configure the sensor
    async fn initialize(&mut self) -> Result<(), HalError>;

    /// Read the next raw red/IR sample pair
    async fn read_sample(&mut self) -> Result<PpgSample, HalError>;

    /// Sensor identification
    fn sensor_info(&self) -> SensorInfo;
}
