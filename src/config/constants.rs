// src/config/constants.rs
//! System-wide configuration constants

/// Respiratory flow channel constants
pub mod flow {
    /// Interval between flow samples (reference cadence)
    pub const SAMPLE_INTERVAL_MS: u64 = 100;

    /// Flow above this threshold arms the inhalation state (L/s)
    pub const INHALE_THRESHOLD_LPS: f32 = 0.1;

    /// Flow below this threshold completes an armed breath (L/s)
    pub const EXHALE_THRESHOLD_LPS: f32 = -0.1;

    /// Sensors report standard liters per minute; the core works in L/s
    pub const SLM_TO_LPS: f32 = 1.0 / 60.0;

    pub const MIN_SAMPLE_INTERVAL_MS: u64 = 10;
    pub const MAX_SAMPLE_INTERVAL_MS: u64 = 1000;
}

/// Cardio (PPG) channel constants
pub mod cardio {
    /// Full sliding-window size fed to the HR/SpO2 kernel
    pub const WINDOW_SIZE: usize = 100;

    /// Samples discarded and refilled on each refresh cycle
    pub const REFRESH_SIZE: usize = 25;

    /// Spacing enforced between raw PPG samples while filling
    pub const SAMPLE_INTERVAL_MS: u64 = 10;

    /// Settle delay after a full window recompute
    pub const SETTLE_INTERVAL_MS: u64 = 1000;

    /// Bounded wait for sensor data-ready before a read is abandoned
    pub const DATA_READY_TIMEOUT_MS: u64 = 250;
    pub const DATA_READY_POLL_INTERVAL_MS: u64 = 1;
}

/// Exercise session constants
pub mod session {
    /// Controller tick cadence (telemetry + expiry checks)
    pub const TICK_INTERVAL_MS: u64 = 200;

    /// Completed breath volumes retained for the session summary
    pub const BREATH_HISTORY_LEN: usize = 10;

    /// Command channel depth between the bus collaborator and the controller
    pub const COMMAND_QUEUE_DEPTH: usize = 16;

    pub const MIN_DURATION_S: u64 = 1;
    pub const MAX_DURATION_S: u64 = 3600;
}

/// Telemetry constants
pub mod telemetry {
    /// Flow fields older than this are flagged stale in snapshots
    pub const FLOW_STALE_AFTER_MS: u64 = 1000;

    /// Cardio fields older than this are flagged stale in snapshots
    pub const CARDIO_STALE_AFTER_MS: u64 = 5000;

    /// Depth of the bounded channel behind `ChannelSink`
    pub const SINK_QUEUE_DEPTH: usize = 64;
}
