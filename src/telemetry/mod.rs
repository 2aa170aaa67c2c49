// src/telemetry/mod.rs
//! Wire payloads and the telemetry sink boundary
//!
//! The three payload shapes here are the entire contract with the external
//! messaging collaborator; transport, encoding framing, reconnection and
//! subscription mechanics live on the other side of [`TelemetrySink`].
//! Field names match the JSON keys of the deployed wire format.

use crate::session::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Per-tick session snapshot, emitted while a session is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub seq: u32,
    /// Flow rate, L/s
    pub flow: f32,
    /// Accumulated volume of the in-progress breath, L
    pub volume: f32,
    /// Temperature, °C
    pub temp: f32,
    pub heart_rate: i32,
    pub hr_valid: bool,
    pub spo2: i32,
    pub spo2_valid: bool,
    pub exercise_active: bool,
    /// Remaining session time, ms
    pub time_remaining: u64,
    pub breath_count: u16,
    /// Milliseconds since process start
    pub timestamp: u64,
    /// Flow channel has not updated within its staleness horizon
    pub flow_stale: bool,
    /// Cardio channel has not updated within its staleness horizon
    pub cardio_stale: bool,
}

impl From<&Snapshot> for TelemetrySnapshot {
    fn from(snap: &Snapshot) -> Self {
        let r = &snap.record;
        Self {
            seq: r.sequence_number,
            flow: r.flow_rate,
            volume: r.volume,
            temp: r.temperature,
            heart_rate: r.heart_rate,
            hr_valid: r.heart_rate_valid,
            spo2: r.spo2,
            spo2_valid: r.spo2_valid,
            exercise_active: r.exercise_active,
            time_remaining: r.time_remaining_ms,
            breath_count: r.breath_count,
            timestamp: r.timestamp_ms,
            flow_stale: snap.flow_stale,
            cardio_stale: snap.cardio_stale,
        }
    }
}

/// One-shot session summary, emitted exactly once per completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Average completed-breath volume, L; 0 when no breath completed
    pub avg_volume: f32,
    pub total_breaths: u16,
    /// Session duration, seconds
    pub duration: u64,
    pub final_heart_rate: i32,
    pub final_spo2: i32,
}

/// Acknowledgement produced when a start command is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartAck {
    pub status: String,
    /// Accepted duration, seconds
    pub duration: u64,
}

impl StartAck {
    pub fn started(duration_s: u64) -> Self {
        Self {
            status: "started".to_string(),
            duration: duration_s,
        }
    }
}

/// Commands delivered to the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start (or restart in place) a session of the given duration
    Start { duration_s: u64 },
}

impl SessionCommand {
    /// Parse a raw command payload from the control channel.
    ///
    /// A payload without a non-negative integer `duration` field is not a
    /// command: it is silently ignored, producing no state change and no
    /// acknowledgement.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(payload).ok()?;
        let duration_s = value.get("duration")?.as_u64()?;
        Some(SessionCommand::Start { duration_s })
    }
}

/// Telemetry emission failures; never fatal to the core, which logs and
/// lets the next tick supersede the lost payload
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry sink unavailable: {0}")]
    Unavailable(String),

    #[error("Payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Boundary to the external messaging collaborator.
///
/// Publishes must not block: a disconnected sink returns an error and the
/// payload is dropped, never stalling acquisition or the controller.
pub trait TelemetrySink: Send + Sync {
    fn publish_snapshot(&self, snapshot: &TelemetrySnapshot) -> Result<(), TelemetryError>;
    fn publish_summary(&self, summary: &SessionSummary) -> Result<(), TelemetryError>;
    fn publish_ack(&self, ack: &StartAck) -> Result<(), TelemetryError>;
}

/// Sink that serializes payloads and writes them to the log, mirroring a
/// serial-console deployment
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish_snapshot(&self, snapshot: &TelemetrySnapshot) -> Result<(), TelemetryError> {
        info!(target: "telemetry", "[DATA] {}", serde_json::to_string(snapshot)?);
        Ok(())
    }

    fn publish_summary(&self, summary: &SessionSummary) -> Result<(), TelemetryError> {
        info!(target: "telemetry", "[SUMMARY] {}", serde_json::to_string(summary)?);
        Ok(())
    }

    fn publish_ack(&self, ack: &StartAck) -> Result<(), TelemetryError> {
        info!(target: "telemetry", "[STATUS] {}", serde_json::to_string(ack)?);
        Ok(())
    }
}

/// Message carried by [`ChannelSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    Snapshot(TelemetrySnapshot),
    Summary(SessionSummary),
    Ack(StartAck),
}

/// Sink bridging payloads onto a bounded channel, for tests and for
/// feeding a real bus client task. Drops on a full queue rather than
/// blocking the controller.
pub struct ChannelSink {
    tx: mpsc::Sender<SinkMessage>,
}

impl ChannelSink {
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<SinkMessage>) {
        let (tx, rx) = mpsc::channel(depth);
        (Self { tx }, rx)
    }

    fn send(&self, message: SinkMessage) -> Result<(), TelemetryError> {
        self.tx
            .try_send(message)
            .map_err(|e| TelemetryError::Unavailable(e.to_string()))
    }
}

impl TelemetrySink for ChannelSink {
    fn publish_snapshot(&self, snapshot: &TelemetrySnapshot) -> Result<(), TelemetryError> {
        self.send(SinkMessage::Snapshot(snapshot.clone()))
    }

    fn publish_summary(&self, summary: &SessionSummary) -> Result<(), TelemetryError> {
        self.send(SinkMessage::Summary(summary.clone()))
    }

    fn publish_ack(&self, ack: &StartAck) -> Result<(), TelemetryError> {
        self.send(SinkMessage::Ack(ack.clone()))
    }
}
