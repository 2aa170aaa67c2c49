// src/config/mod.rs
//! Configuration management for the fusion core

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigLoader, ConfigError};

use serde::{Deserialize, Serialize};

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub cardio: CardioConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Respiratory flow channel configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FlowConfig {
    #[serde(default = "defaults::flow_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "defaults::inhale_threshold_lps")]
    pub inhale_threshold_lps: f32,

    #[serde(default = "defaults::exhale_threshold_lps")]
    pub exhale_threshold_lps: f32,
}

/// Cardio (PPG) channel configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CardioConfig {
    #[serde(default = "defaults::cardio_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "defaults::settle_interval_ms")]
    pub settle_interval_ms: u64,

    #[serde(default = "defaults::data_ready_timeout_ms")]
    pub data_ready_timeout_ms: u64,
}

/// Session controller configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "defaults::tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "defaults::min_duration_s")]
    pub min_duration_s: u64,

    #[serde(default = "defaults::max_duration_s")]
    pub max_duration_s: u64,
}

/// Telemetry staleness configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "defaults::flow_stale_after_ms")]
    pub flow_stale_after_ms: u64,

    #[serde(default = "defaults::cardio_stale_after_ms")]
    pub cardio_stale_after_ms: u64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn flow_sample_interval_ms() -> u64 { flow::SAMPLE_INTERVAL_MS }
    pub fn inhale_threshold_lps() -> f32 { flow::INHALE_THRESHOLD_LPS }
    pub fn exhale_threshold_lps() -> f32 { flow::EXHALE_THRESHOLD_LPS }

    pub fn cardio_sample_interval_ms() -> u64 { cardio::SAMPLE_INTERVAL_MS }
    pub fn settle_interval_ms() -> u64 { cardio::SETTLE_INTERVAL_MS }
    pub fn data_ready_timeout_ms() -> u64 { cardio::DATA_READY_TIMEOUT_MS }

    pub fn tick_interval_ms() -> u64 { session::TICK_INTERVAL_MS }
    pub fn min_duration_s() -> u64 { session::MIN_DURATION_S }
    pub fn max_duration_s() -> u64 { session::MAX_DURATION_S }

    pub fn flow_stale_after_ms() -> u64 { telemetry::FLOW_STALE_AFTER_MS }
    pub fn cardio_stale_after_ms() -> u64 { telemetry::CARDIO_STALE_AFTER_MS }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: defaults::flow_sample_interval_ms(),
            inhale_threshold_lps: defaults::inhale_threshold_lps(),
            exhale_threshold_lps: defaults::exhale_threshold_lps(),
        }
    }
}

impl Default for CardioConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: defaults::cardio_sample_interval_ms(),
            settle_interval_ms: defaults::settle_interval_ms(),
            data_ready_timeout_ms: defaults::data_ready_timeout_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: defaults::tick_interval_ms(),
            min_duration_s: defaults::min_duration_s(),
            max_duration_s: defaults::max_duration_s(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            flow_stale_after_ms: defaults::flow_stale_after_ms(),
            cardio_stale_after_ms: defaults::cardio_stale_after_ms(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            flow: FlowConfig::default(),
            cardio: CardioConfig::default(),
            session: SessionConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.flow.sample_interval_ms < flow::MIN_SAMPLE_INTERVAL_MS
            || self.flow.sample_interval_ms > flow::MAX_SAMPLE_INTERVAL_MS
        {
            errors.push(format!(
                "Flow sample interval {} ms outside supported range {}..{} ms",
                self.flow.sample_interval_ms,
                flow::MIN_SAMPLE_INTERVAL_MS,
                flow::MAX_SAMPLE_INTERVAL_MS
            ));
        }

        if self.flow.inhale_threshold_lps <= 0.0 {
            errors.push(format!(
                "Inhale threshold must be positive, got {}",
                self.flow.inhale_threshold_lps
            ));
        }

        if self.flow.exhale_threshold_lps >= 0.0 {
            errors.push(format!(
                "Exhale threshold must be negative, got {}",
                self.flow.exhale_threshold_lps
            ));
        }

        // Expiry is detected at tick cadence; a tick longer than the shortest
        // session would miss the deadline by more than one period.
        if self.session.tick_interval_ms >= self.session.min_duration_s * 1000 {
            errors.push(format!(
                "Tick interval {} ms too coarse for minimum session duration {} s",
                self.session.tick_interval_ms, self.session.min_duration_s
            ));
        }

        if self.session.min_duration_s > self.session.max_duration_s {
            errors.push(format!(
                "Minimum duration {} s exceeds maximum {} s",
                self.session.min_duration_s, self.session.max_duration_s
            ));
        }

        if self.cardio.data_ready_timeout_ms == 0 {
            errors.push("Data-ready timeout must be non-zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Integration step used by the breath detector, in seconds
    pub fn flow_interval_seconds(&self) -> f32 {
        self.flow.sample_interval_ms as f32 / 1000.0
    }
}
