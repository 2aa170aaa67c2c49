// src/session/record.rs
//! Shared session record and its locking discipline
//!
//! One [`SessionHandle`] is created at startup and cloned into each task.
//! All cross-task mutable state (the record plus the breath history, which
//! is logically part of session state) lives behind a single mutex, and
//! every access goes through an accessor method whose critical section is a
//! field copy. No lock is ever held across I/O.

use crate::cardio::CardioEstimate;
use crate::config::constants::session::BREATH_HISTORY_LEN;
use crate::config::TelemetryConfig;
use crate::hal::FlowSample;
use crate::session::breath::{BreathDetector, BreathEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Fused sensor and session state, as last written by the three loops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    /// Flow in L/s, positive = inhalation
    pub flow_rate: f32,
    /// Flow-sensor die temperature, °C
    pub temperature: f32,
    /// Accumulated volume of the in-progress breath, liters
    pub volume: f32,

    pub heart_rate: i32,
    pub heart_rate_valid: bool,
    pub spo2: i32,
    pub spo2_valid: bool,

    pub exercise_active: bool,
    /// Milliseconds left in the active session, 0 when inactive
    pub time_remaining_ms: u64,
    /// Completed breaths this session
    pub breath_count: u16,
    /// Mirror of the detector accumulator, reset on breath completion
    pub current_breath_volume: f32,

    /// Milliseconds since process start
    pub timestamp_ms: u64,
    /// Monotonic across session boundaries, never reset
    pub sequence_number: u32,
}

/// Fixed ring of the most recent completed breath volumes.
///
/// Slots that were never written stay 0 and are excluded from the summary
/// average, matching the bounded-window semantics of the reference.
#[derive(Debug, Clone)]
pub struct BreathHistory {
    slots: [f32; BREATH_HISTORY_LEN],
    index: usize,
}

impl BreathHistory {
    pub fn new() -> Self {
        Self {
            slots: [0.0; BREATH_HISTORY_LEN],
            index: 0,
        }
    }

    /// Record a completed breath, overwriting the oldest slot when full
    pub fn push(&mut self, volume_l: f32) {
        self.slots[self.index] = volume_l;
        self.index = (self.index + 1) % BREATH_HISTORY_LEN;
    }

    pub fn clear(&mut self) {
        self.slots = [0.0; BREATH_HISTORY_LEN];
        self.index = 0;
    }

    pub fn slots(&self) -> &[f32; BREATH_HISTORY_LEN] {
        &self.slots
    }

    /// Average over written (non-zero) slots; 0 when no breath completed
    pub fn average_completed(&self) -> f32 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for &v in &self.slots {
            if v > 0.0 {
                sum += v;
                count += 1;
            }
        }
        if count > 0 {
            sum / count as f32
        } else {
            0.0
        }
    }
}

impl Default for BreathHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Consistent read of session state plus derived channel health
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub record: SessionRecord,
    /// No flow-channel update within the configured horizon
    pub flow_stale: bool,
    /// No cardio-channel update within the configured horizon
    pub cardio_stale: bool,
}

/// Everything the summary needs, copied out in one critical section
#[derive(Debug, Clone)]
pub struct SessionCloseout {
    pub history: [f32; BREATH_HISTORY_LEN],
    pub breath_count: u16,
    pub heart_rate: i32,
    pub spo2: i32,
}

struct SessionInner {
    record: SessionRecord,
    history: BreathHistory,
    /// Bumped on every session start so acquisition-side detector state
    /// from the previous session is discarded
    epoch: u64,
    flow_updated_ms: Option<u64>,
    cardio_updated_ms: Option<u64>,
}

/// Cloneable handle to the single shared session aggregate
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionInner>>,
    started_at: Instant,
}

impl SessionHandle {
    /// Create the zero-initialized shared record
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                record: SessionRecord::default(),
                history: BreathHistory::new(),
                epoch: 0,
                flow_updated_ms: None,
                cardio_updated_ms: None,
            })),
            started_at: Instant::now(),
        }
    }

    /// Milliseconds since the handle was created (the process timestamp base)
    pub fn now_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// Record one flow sample and run breath detection against it.
    ///
    /// Flow and temperature are always recorded; integration and breath
    /// counting only happen while a session is active. The detector is
    /// resynced first if a restart bumped the epoch since its last sample.
    pub fn apply_flow(&self, sample: FlowSample, detector: &mut BreathDetector) {
        let now = self.now_ms();
        let mut inner = self.inner.lock();

        inner.record.flow_rate = sample.flow_lps;
        inner.record.temperature = sample.temperature_c;
        inner.flow_updated_ms = Some(now);

        if !inner.record.exercise_active {
            return;
        }

        if detector.epoch() != inner.epoch {
            detector.resync(inner.epoch);
        }

        match detector.process(sample.flow_lps) {
            BreathEvent::Accumulating { volume } => {
                inner.record.current_breath_volume = volume;
                inner.record.volume = volume;
            }
            BreathEvent::Completed { volume } => {
                inner.history.push(volume);
                inner.record.breath_count = inner.record.breath_count.wrapping_add(1);
                inner.record.current_breath_volume = 0.0;
            }
            BreathEvent::Idle => {}
        }
    }

    /// Record a fresh heart-rate/SpO2 estimate
    pub fn apply_cardio(&self, estimate: CardioEstimate) {
        let now = self.now_ms();
        let mut inner = self.inner.lock();

        inner.record.heart_rate = estimate.heart_rate;
        inner.record.heart_rate_valid = estimate.heart_rate_valid;
        inner.record.spo2 = estimate.spo2;
        inner.record.spo2_valid = estimate.spo2_valid;
        inner.cardio_updated_ms = Some(now);
    }

    /// Arm a new session (or restart the active one in place): clears the
    /// per-session counters and history and bumps the epoch. The sequence
    /// number deliberately survives.
    pub fn begin_session(&self, duration_ms: u64) {
        let mut inner = self.inner.lock();

        inner.record.exercise_active = true;
        inner.record.time_remaining_ms = duration_ms;
        inner.record.volume = 0.0;
        inner.record.breath_count = 0;
        inner.record.current_breath_volume = 0.0;
        inner.history.clear();
        inner.epoch += 1;
    }

    /// One active-state controller tick: refresh the derived fields and
    /// copy out a snapshot for emission.
    pub fn tick_active(&self, remaining_ms: u64, telemetry: &TelemetryConfig) -> Snapshot {
        let now = self.now_ms();
        let mut inner = self.inner.lock();

        inner.record.time_remaining_ms = remaining_ms;
        inner.record.timestamp_ms = now;
        inner.record.sequence_number = inner.record.sequence_number.wrapping_add(1);

        Snapshot {
            record: inner.record.clone(),
            flow_stale: Self::is_stale(inner.flow_updated_ms, now, telemetry.flow_stale_after_ms),
            cardio_stale: Self::is_stale(
                inner.cardio_updated_ms,
                now,
                telemetry.cardio_stale_after_ms,
            ),
        }
    }

    /// Deactivate the session and copy out everything the summary needs.
    /// The partial volume of an uncompleted breath is left out of the
    /// history by construction.
    pub fn end_session(&self) -> SessionCloseout {
        let mut inner = self.inner.lock();

        inner.record.exercise_active = false;
        inner.record.time_remaining_ms = 0;

        SessionCloseout {
            history: *inner.history.slots(),
            breath_count: inner.record.breath_count,
            heart_rate: inner.record.heart_rate,
            spo2: inner.record.spo2,
        }
    }

    /// Plain read of the current record (tests, diagnostics)
    pub fn read_record(&self) -> SessionRecord {
        self.inner.lock().record.clone()
    }

    /// Current session epoch
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    fn is_stale(updated_ms: Option<u64>, now_ms: u64, horizon_ms: u64) -> bool {
        match updated_ms {
            Some(t) => now_ms.saturating_sub(t) > horizon_ms,
            None => true,
        }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
