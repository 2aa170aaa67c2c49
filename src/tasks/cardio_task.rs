// src/tasks/cardio_task.rs
//! Cardio (PPG) acquisition loop

use crate::cardio::{CardioKernel, CardioWindow};
use crate::config::CardioConfig;
use crate::error::{CoreError, SensorChannel};
use crate::hal::PpgSensor;
use crate::session::SessionHandle;
use std::time::Duration;
use tracing::{error, info, warn};

/// Run the cardio acquisition loop until the task is aborted.
///
/// Cold start fills the whole window sample by sample, then each refresh
/// cycle shifts out the oldest quarter, refills the tail and re-invokes
/// the kernel. Estimates land in the shared record under the session
/// lock; the window itself is task-private and unlocked.
pub async fn run_cardio_task(
    mut sensor: Box<dyn PpgSensor>,
    mut kernel: Box<dyn CardioKernel>,
    handle: SessionHandle,
    config: CardioConfig,
) {
    if let Err(e) = sensor.initialize().await {
        error!(
            error = %CoreError::sensor(SensorChannel::Cardio, e),
            "cardio acquisition disabled"
        );
        return;
    }
    info!(sensor = %sensor.sensor_info().name, "cardio acquisition started");

    let sample_interval = Duration::from_millis(config.sample_interval_ms);
    let settle_interval = Duration::from_millis(config.settle_interval_ms);
    let mut window = CardioWindow::new();

    fill_window(sensor.as_mut(), &mut window, sample_interval).await;
    handle.apply_cardio(window.estimate(kernel.as_mut()));

    loop {
        window.shift();
        fill_window(sensor.as_mut(), &mut window, sample_interval).await;
        handle.apply_cardio(window.estimate(kernel.as_mut()));
        tokio::time::sleep(settle_interval).await;
    }
}

/// Collect samples until the window is full, one per interval.
///
/// Read failures (including bounded data-ready timeouts) skip the slot
/// and retry on the next interval instead of stalling the task.
async fn fill_window(
    sensor: &mut dyn PpgSensor,
    window: &mut CardioWindow,
    sample_interval: Duration,
) {
    while !window.is_full() {
        match sensor.read_sample().await {
            Ok(sample) => {
                window.push(sample);
            }
            Err(e) => warn!(error = %e, "PPG sample read failed"),
        }
        tokio::time::sleep(sample_interval).await;
    }
}
