//! spiro-core: respiratory flow and pulse-oximetry fusion for breathing
//! exercise sessions
//!
//! This library fuses two independent sensor streams into a single
//! time-windowed exercise session record and drives a bounded-duration
//! breathing-exercise state machine from that fusion. It features:
//!
//! - Hardware abstraction layer for flow and PPG sensors, with simulators
//! - Breath-cycle detection by threshold hysteresis and streaming integration
//! - Sliding-window heart-rate/SpO2 estimation behind a kernel seam
//! - A deadline-driven session controller emitting per-tick telemetry and
//!   one-shot session summaries
//! - Three cooperating tokio tasks sharing one lock-protected session record
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use spiro_core::cardio::StaticKernel;
//! use spiro_core::config::SystemConfig;
//! use spiro_core::hal::{FlowSimulator, FlowSimulatorConfig, PpgSimulator, PpgSimulatorConfig};
//! use spiro_core::session::SessionHandle;
//! use spiro_core::tasks::{command_channel, spawn_all};
//! use spiro_core::telemetry::{LogSink, SessionCommand};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SystemConfig::default();
//!     let handle = SessionHandle::new();
//!     let (commands_tx, commands_rx) = command_channel();
//!
//!     let tasks = spawn_all(
//!         Box::new(FlowSimulator::new(FlowSimulatorConfig::default())),
//!         Box::new(PpgSimulator::new(PpgSimulatorConfig::default())),
//!         Box::new(StaticKernel::new(72, 98)),
//!         Arc::new(LogSink),
//!         handle,
//!         config,
//!         commands_rx,
//!     );
//!
//!     commands_tx
//!         .send(SessionCommand::Start { duration_s: 30 })
//!         .await
//!         .unwrap();
//!
//!     tasks.controller.await.unwrap();
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod cardio;
pub mod config;
pub mod error;
pub mod hal;
pub mod session;
pub mod tasks;
pub mod telemetry;

// Re-export commonly used types for convenience
pub use cardio::{CardioEstimate, CardioKernel, CardioWindow};
pub use error::{CoreError, CoreResult, SensorChannel};
pub use hal::{FlowSample, FlowSensor, HalError, PpgSample, PpgSensor, SensorInfo};
pub use session::{BreathDetector, BreathEvent, SessionHandle, SessionRecord};
pub use telemetry::{
    SessionCommand, SessionSummary, StartAck, TelemetrySink, TelemetrySnapshot,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
