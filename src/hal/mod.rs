// src/hal/mod.rs
//! Hardware abstraction layer for the flow and PPG sensors

pub mod traits;
pub mod types;
pub mod flow_simulator;
pub mod ppg_simulator;

pub use traits::*;
pub use types::*;
pub use flow_simulator::{FlowSimulator, FlowSimulatorConfig, FlowPattern};
pub use ppg_simulator::{PpgSimulator, PpgSimulatorConfig};
