// src/hal/ppg_simulator.rs
//! Simulated pulse-oximetry sensor
//!
//! Models the data-ready behavior of a FIFO-based PPG front end: a sample
//! becomes available every `data_ready_interval_ms`, and `read_sample`
//! waits for readiness with the same bounded poll a real driver uses.

use crate::hal::traits::PpgSensor;
use crate::hal::types::{HalError, PpgSample, SensorInfo};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Sample generation mode
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum PpgWaveform {
    /// Strictly incrementing red/IR counts, for window-content assertions
    Incrementing { start: u32 },
    /// Crude cardiac pulse: DC level plus a periodic systolic bump
    Pulse {
        dc_level: u32,
        pulse_amplitude: u32,
        period_ms: u64,
    },
}

/// Simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PpgSimulatorConfig {
    pub waveform: PpgWaveform,
    /// A new sample becomes ready this often (0 = always ready)
    pub data_ready_interval_ms: u64,
    /// Bounded wait before `read_sample` gives up
    pub data_ready_timeout_ms: u64,
    /// Fail `initialize()` to exercise the fatal-channel path
    pub fail_init: bool,
}

impl Default for PpgSimulatorConfig {
    fn default() -> Self {
        Self {
            waveform: PpgWaveform::Pulse {
                dc_level: 120_000,
                pulse_amplitude: 4_000,
                period_ms: 800,
            },
            data_ready_interval_ms: 0,
            data_ready_timeout_ms: crate::config::constants::cardio::DATA_READY_TIMEOUT_MS,
            fail_init: false,
        }
    }
}

/// Simulated PPG sensor
pub struct PpgSimulator {
    config: PpgSimulatorConfig,
    initialized: bool,
    sample_index: u64,
    last_ready: Option<Instant>,
}

impl PpgSimulator {
    pub fn new(config: PpgSimulatorConfig) -> Self {
        Self {
            config,
            initialized: false,
            sample_index: 0,
            last_ready: None,
        }
    }

    /// Incrementing-count simulator starting at `start`
    pub fn incrementing(start: u32) -> Self {
        Self::new(PpgSimulatorConfig {
            waveform: PpgWaveform::Incrementing { start },
            ..PpgSimulatorConfig::default()
        })
    }

    fn generate(&mut self) -> PpgSample {
        let sample = match &self.config.waveform {
            PpgWaveform::Incrementing { start } => {
                let v = start + self.sample_index as u32;
                PpgSample { red: v, ir: v }
            }
            PpgWaveform::Pulse {
                dc_level,
                pulse_amplitude,
                period_ms,
            } => {
                let t_ms = self.sample_index
                    * crate::config::constants::cardio::SAMPLE_INTERVAL_MS;
                let phase =
                    2.0 * std::f32::consts::PI * (t_ms % period_ms) as f32 / *period_ms as f32;
                let bump = (*pulse_amplitude as f32 * phase.sin().max(0.0)) as u32;
                PpgSample {
                    red: dc_level + bump,
                    ir: dc_level + bump / 2,
                }
            }
        };
        self.sample_index += 1;
        sample
    }

    /// Bounded data-ready wait; real drivers poll a status register the
    /// same way instead of spinning forever.
    async fn await_data_ready(&mut self) -> Result<(), HalError> {
        if self.config.data_ready_interval_ms == 0 {
            return Ok(());
        }

        let interval = Duration::from_millis(self.config.data_ready_interval_ms);
        let deadline = Instant::now() + Duration::from_millis(self.config.data_ready_timeout_ms);
        let poll =
            Duration::from_millis(crate::config::constants::cardio::DATA_READY_POLL_INTERVAL_MS);

        loop {
            let ready = match self.last_ready {
                Some(last) => last.elapsed() >= interval,
                None => true,
            };
            if ready {
                self.last_ready = Some(Instant::now());
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HalError::DataReadyTimeout {
                    timeout_ms: self.config.data_ready_timeout_ms,
                });
            }
            tokio::time::sleep(poll).await;
        }
    }
}

#[async_trait]
impl PpgSensor for PpgSimulator {
    async fn initialize(&mut self) -> Result<(), HalError> {
        if self.config.fail_init {
            return Err(HalError::InitFailed(
                "simulated PPG sensor init failure".to_string(),
            ));
        }
        self.initialized = true;
        Ok(())
    }

    async fn read_sample(&mut self) -> Result<PpgSample, HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.await_data_ready().await?;
        Ok(self.generate())
    }

    fn sensor_info(&self) -> SensorInfo {
        SensorInfo {
            name: "PPG Simulator".to_string(),
            model: "SIM-PPG".to_string(),
            serial_number: "00000000".to_string(),
        }
    }
}
