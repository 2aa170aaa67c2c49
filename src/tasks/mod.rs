// src/tasks/mod.rs
//! The three periodic execution contexts
//!
//! Two acquisition loops and one controller loop, each a tokio task that
//! sleeps between work units and never terminates under normal operation.
//! The shared [`SessionHandle`] is the only cross-task mutable state.

pub mod cardio_task;
pub mod controller;
pub mod flow_task;

pub use cardio_task::run_cardio_task;
pub use controller::run_controller;
pub use flow_task::run_flow_task;

use crate::cardio::CardioKernel;
use crate::config::constants::session::COMMAND_QUEUE_DEPTH;
use crate::config::SystemConfig;
use crate::hal::{FlowSensor, PpgSensor};
use crate::session::SessionHandle;
use crate::telemetry::{SessionCommand, TelemetrySink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Join handles for the three spawned loops
pub struct TaskHandles {
    pub flow: JoinHandle<()>,
    pub cardio: JoinHandle<()>,
    pub controller: JoinHandle<()>,
}

impl TaskHandles {
    /// Abort all three loops (tests, shutdown)
    pub fn abort_all(&self) {
        self.flow.abort();
        self.cardio.abort();
        self.controller.abort();
    }
}

/// Bounded channel carrying parsed commands from the bus collaborator to
/// the controller, which is their only consumer
pub fn command_channel() -> (mpsc::Sender<SessionCommand>, mpsc::Receiver<SessionCommand>) {
    mpsc::channel(COMMAND_QUEUE_DEPTH)
}

/// Spawn the acquisition loops and the controller against one shared
/// session handle.
pub fn spawn_all(
    flow_sensor: Box<dyn FlowSensor>,
    ppg_sensor: Box<dyn PpgSensor>,
    kernel: Box<dyn CardioKernel>,
    sink: Arc<dyn TelemetrySink>,
    handle: SessionHandle,
    config: SystemConfig,
    commands: mpsc::Receiver<SessionCommand>,
) -> TaskHandles {
    let flow = tokio::spawn(run_flow_task(
        flow_sensor,
        handle.clone(),
        config.flow.clone(),
    ));
    let cardio = tokio::spawn(run_cardio_task(
        ppg_sensor,
        kernel,
        handle.clone(),
        config.cardio.clone(),
    ));
    let controller = tokio::spawn(run_controller(
        handle,
        sink,
        commands,
        config.session.clone(),
        config.telemetry.clone(),
    ));

    TaskHandles {
        flow,
        cardio,
        controller,
    }
}
