// src/tasks/flow_task.rs
//! Respiratory flow acquisition loop

use crate::config::FlowConfig;
use crate::error::{CoreError, SensorChannel};
use crate::hal::FlowSensor;
use crate::session::{BreathDetector, SessionHandle};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Run the flow acquisition loop until the task is aborted.
///
/// One sample per interval: read flow, run breath detection, update the
/// shared record under the session lock. Initialization failure is fatal
/// to this loop only; the other contexts keep running and the flow fields
/// go stale in telemetry.
pub async fn run_flow_task(
    mut sensor: Box<dyn FlowSensor>,
    handle: SessionHandle,
    config: FlowConfig,
) {
    if let Err(e) = sensor.initialize().await {
        error!(
            error = %CoreError::sensor(SensorChannel::Flow, e),
            "flow acquisition disabled"
        );
        return;
    }
    info!(sensor = %sensor.sensor_info().name, "flow acquisition started");

    let mut detector = BreathDetector::new(&config);
    let mut ticker = tokio::time::interval(Duration::from_millis(config.sample_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match sensor.read_sample().await {
            Ok(sample) => handle.apply_flow(sample, &mut detector),
            // A missed sample is superseded by the next interval
            Err(e) => warn!(error = %e, "flow sample read failed"),
        }
    }
}
