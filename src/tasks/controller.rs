// src/tasks/controller.rs
//! Session controller / telemetry loop
//!
//! Sole consumer of externally-issued session commands and sole driver of
//! the exercise state machine. Each tick drains pending commands, then
//! performs exactly one expiry check: an active session either emits a
//! telemetry snapshot or, once the deadline has passed, is closed out and
//! summarized exactly once. Expiry is therefore detected with a bounded
//! latency of at most one tick period.

use crate::config::{SessionConfig, TelemetryConfig};
use crate::session::{SessionCloseout, SessionHandle};
use crate::telemetry::{
    SessionCommand, SessionSummary, StartAck, TelemetrySink, TelemetrySnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Deadline state of the active session, owned by the controller only
struct ActiveSession {
    started: Instant,
    duration: Duration,
    duration_s: u64,
}

/// Run the controller loop until the task is aborted.
pub async fn run_controller(
    handle: SessionHandle,
    sink: Arc<dyn TelemetrySink>,
    mut commands: mpsc::Receiver<SessionCommand>,
    session_cfg: SessionConfig,
    telemetry_cfg: TelemetryConfig,
) {
    let mut ticker =
        tokio::time::interval(Duration::from_millis(session_cfg.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut active: Option<ActiveSession> = None;

    loop {
        ticker.tick().await;

        // Commands first: a start received while active restarts in place
        while let Ok(command) = commands.try_recv() {
            match command {
                SessionCommand::Start { duration_s } => {
                    if duration_s < session_cfg.min_duration_s
                        || duration_s > session_cfg.max_duration_s
                    {
                        warn!(duration_s, "start command outside duration limits, ignored");
                        continue;
                    }

                    handle.begin_session(duration_s * 1000);
                    active = Some(ActiveSession {
                        started: Instant::now(),
                        duration: Duration::from_secs(duration_s),
                        duration_s,
                    });
                    info!(duration_s, "exercise session started");

                    if let Err(e) = sink.publish_ack(&StartAck::started(duration_s)) {
                        warn!(error = %e, "start acknowledgement dropped");
                    }
                }
            }
        }

        let Some(session) = &active else {
            continue;
        };

        let elapsed = session.started.elapsed();
        if elapsed >= session.duration {
            let closeout = handle.end_session();
            let summary = summarize(&closeout, session.duration_s);
            info!(
                total_breaths = summary.total_breaths,
                avg_volume = summary.avg_volume,
                "exercise session expired"
            );
            if let Err(e) = sink.publish_summary(&summary) {
                warn!(error = %e, "session summary dropped");
            }
            active = None;
        } else {
            let remaining_ms = (session.duration - elapsed).as_millis() as u64;
            let snapshot = handle.tick_active(remaining_ms, &telemetry_cfg);
            if let Err(e) = sink.publish_snapshot(&TelemetrySnapshot::from(&snapshot)) {
                warn!(error = %e, "telemetry snapshot dropped");
            }
        }
    }
}

/// Build the one-shot summary from a session closeout.
///
/// The average covers only slots a completed breath was written into;
/// unused history slots never contribute to the sum or the divisor.
pub fn summarize(closeout: &SessionCloseout, duration_s: u64) -> SessionSummary {
    let mut sum = 0.0;
    let mut completed = 0u32;
    for &volume in &closeout.history {
        if volume > 0.0 {
            sum += volume;
            completed += 1;
        }
    }
    let avg_volume = if completed > 0 {
        sum / completed as f32
    } else {
        0.0
    };

    SessionSummary {
        avg_volume,
        total_breaths: closeout.breath_count,
        duration: duration_s,
        final_heart_rate: closeout.heart_rate,
        final_spo2: closeout.spo2,
    }
}
