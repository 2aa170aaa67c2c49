// src/session/mod.rs
//! Exercise session state: shared record, breath history, breath detection

pub mod breath;
pub mod record;

pub use breath::{BreathDetector, BreathEvent};
pub use record::{BreathHistory, SessionCloseout, SessionHandle, SessionRecord, Snapshot};
