// src/session/breath.rs
//! Breath-cycle detection from a noisy flow signal
//!
//! Integrates flow into discrete breath volumes with threshold hysteresis:
//! flow above the inhale threshold arms the cycle and accumulates volume by
//! rectangular integration; the first crossing below the exhale threshold
//! while armed completes the breath. Samples inside the dead band between
//! the two thresholds change nothing.
//!
//! The detector is owned exclusively by the flow acquisition task; its
//! hysteresis flag and accumulator are never shared. The epoch lets the
//! owner discard in-progress state when a session restarts underneath it.

use crate::config::FlowConfig;

/// Outcome of feeding one flow sample to the detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreathEvent {
    /// No state change (dead band, or exhale while unarmed)
    Idle,
    /// Inhalation in progress; `volume` is the accumulated total so far
    Accumulating { volume: f32 },
    /// A breath completed; `volume` is its final integrated total
    Completed { volume: f32 },
}

/// Streaming breath detector
#[derive(Debug, Clone)]
pub struct BreathDetector {
    inhale_threshold_lps: f32,
    exhale_threshold_lps: f32,
    interval_s: f32,
    armed: bool,
    accumulated_l: f32,
    epoch: u64,
}

impl BreathDetector {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            inhale_threshold_lps: config.inhale_threshold_lps,
            exhale_threshold_lps: config.exhale_threshold_lps,
            interval_s: config.sample_interval_ms as f32 / 1000.0,
            armed: false,
            accumulated_l: 0.0,
            epoch: 0,
        }
    }

    /// Feed one flow sample (L/s) and advance the cycle state machine
    pub fn process(&mut self, flow_lps: f32) -> BreathEvent {
        if flow_lps > self.inhale_threshold_lps {
            self.armed = true;
            self.accumulated_l += flow_lps * self.interval_s;
            BreathEvent::Accumulating {
                volume: self.accumulated_l,
            }
        } else if flow_lps < self.exhale_threshold_lps && self.armed {
            let volume = self.accumulated_l;
            self.armed = false;
            self.accumulated_l = 0.0;
            BreathEvent::Completed { volume }
        } else {
            BreathEvent::Idle
        }
    }

    /// Session epoch this detector state belongs to
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Discard in-progress state and adopt a new session epoch
    pub fn resync(&mut self, epoch: u64) {
        self.armed = false;
        self.accumulated_l = 0.0;
        self.epoch = epoch;
    }

    /// Volume accumulated in the in-progress breath
    pub fn accumulated(&self) -> f32 {
        self.accumulated_l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use proptest::prelude::*;

    fn detector() -> BreathDetector {
        BreathDetector::new(&FlowConfig::default())
    }

    #[test]
    fn test_dead_band_changes_nothing() {
        let mut d = detector();
        for flow in [-0.09, 0.0, 0.05, 0.1, -0.1, 0.09] {
            assert_eq!(d.process(flow), BreathEvent::Idle);
        }
        assert_eq!(d.accumulated(), 0.0);
    }

    #[test]
    fn test_single_breath_integration() {
        let mut d = detector();

        // 1.0 L/s for 1.0 s at 100 ms cadence
        let mut last = 0.0;
        for _ in 0..10 {
            match d.process(1.0) {
                BreathEvent::Accumulating { volume } => last = volume,
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert!((last - 1.0).abs() < 1e-5);

        // Exhale crossing completes the breath with the integrated volume
        match d.process(-0.5) {
            BreathEvent::Completed { volume } => assert!((volume - 1.0).abs() < 1e-5),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(d.accumulated(), 0.0);

        // Further exhalation without re-arming is inert
        assert_eq!(d.process(-0.5), BreathEvent::Idle);
    }

    #[test]
    fn test_exhale_without_arm_is_inert() {
        let mut d = detector();
        assert_eq!(d.process(-1.0), BreathEvent::Idle);
        assert_eq!(d.process(-0.2), BreathEvent::Idle);
    }

    #[test]
    fn test_resync_discards_partial_breath() {
        let mut d = detector();
        d.process(1.0);
        d.process(1.0);
        assert!(d.accumulated() > 0.0);

        d.resync(7);
        assert_eq!(d.accumulated(), 0.0);
        assert_eq!(d.epoch(), 7);
        // Exhale right after resync must not complete a phantom breath
        assert_eq!(d.process(-0.5), BreathEvent::Idle);
    }

    proptest! {
        #[test]
        fn prop_dead_band_never_accumulates(samples in prop::collection::vec(-0.0999f32..0.0999, 0..200)) {
            let mut d = detector();
            for flow in samples {
                prop_assert_eq!(d.process(flow), BreathEvent::Idle);
            }
            prop_assert_eq!(d.accumulated(), 0.0);
        }
    }
}
