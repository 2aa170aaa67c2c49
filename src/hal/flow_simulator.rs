// src/hal/flow_simulator.rs
//! Simulated respiratory flow sensor
//!
//! Generates breathing waveforms for tests and demos: a sinusoidal
//! inhale/exhale cycle, a scripted sample sequence, or a constant level.
//! The simulator honors the same initialization contract as a real driver
//! and can be told to fail initialization to exercise the fatal-channel
//! error path.

use crate::hal::traits::FlowSensor;
use crate::hal::types::{FlowSample, HalError, SensorInfo};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Flow waveform selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum FlowPattern {
    /// Sinusoidal breathing: positive half = inhale, negative half = exhale
    Sinusoidal {
        period_ms: u64,
        amplitude_lps: f32,
    },
    /// Fixed sequence of L/s samples; holds the last value once exhausted
    Scripted(Vec<f32>),
    /// Constant flow level
    Constant(f32),
}

/// Simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowSimulatorConfig {
    pub pattern: FlowPattern,
    /// Additive noise amplitude in L/s (0 disables)
    pub noise_lps: f32,
    pub temperature_c: f32,
    /// Fail `initialize()` to exercise the fatal-channel path
    pub fail_init: bool,
}

impl Default for FlowSimulatorConfig {
    fn default() -> Self {
        Self {
            pattern: FlowPattern::Sinusoidal {
                period_ms: 4000,
                amplitude_lps: 0.8,
            },
            noise_lps: 0.0,
            temperature_c: 24.5,
            fail_init: false,
        }
    }
}

/// Simulated flow sensor
pub struct FlowSimulator {
    config: FlowSimulatorConfig,
    initialized: bool,
    sample_index: u64,
    /// Nominal time advanced per sample, for waveform phase
    sample_interval_ms: u64,
}

impl FlowSimulator {
    pub fn new(config: FlowSimulatorConfig) -> Self {
        Self {
            config,
            initialized: false,
            sample_index: 0,
            sample_interval_ms: crate::config::constants::flow::SAMPLE_INTERVAL_MS,
        }
    }

    /// Scripted simulator holding the given L/s sequence
    pub fn scripted(samples: Vec<f32>) -> Self {
        Self::new(FlowSimulatorConfig {
            pattern: FlowPattern::Scripted(samples),
            ..FlowSimulatorConfig::default()
        })
    }

    fn next_flow(&mut self) -> f32 {
        let base = match &self.config.pattern {
            FlowPattern::Sinusoidal {
                period_ms,
                amplitude_lps,
            } => {
                let t_ms = self.sample_index * self.sample_interval_ms;
                let phase =
                    2.0 * std::f32::consts::PI * (t_ms % period_ms) as f32 / *period_ms as f32;
                amplitude_lps * phase.sin()
            }
            FlowPattern::Scripted(samples) => {
                let idx = (self.sample_index as usize).min(samples.len().saturating_sub(1));
                samples.get(idx).copied().unwrap_or(0.0)
            }
            FlowPattern::Constant(level) => *level,
        };
        self.sample_index += 1;

        if self.config.noise_lps > 0.0 {
            let noise = rand::thread_rng().gen_range(-self.config.noise_lps..self.config.noise_lps);
            base + noise
        } else {
            base
        }
    }
}

#[async_trait]
impl FlowSensor for FlowSimulator {
    async fn initialize(&mut self) -> Result<(), HalError> {
        if self.config.fail_init {
            return Err(HalError::InitFailed(
                "simulated flow sensor init failure".to_string(),
            ));
        }
        self.initialized = true;
        Ok(())
    }

    async fn read_sample(&mut self) -> Result<FlowSample, HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }

        Ok(FlowSample {
            flow_lps: self.next_flow(),
            temperature_c: self.config.temperature_c,
        })
    }

    fn sensor_info(&self) -> SensorInfo {
        SensorInfo {
            name: "Flow Simulator".to_string(),
            model: "SIM-FLOW".to_string(),
            serial_number: "00000000".to_string(),
        }
    }
}
