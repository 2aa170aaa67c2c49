// src/bin/monitor_main.rs
//! Demo monitor: simulated sensors, log-backed telemetry sink, one scripted
//! 30-second session. A deployment replaces the simulators with real
//! drivers and the `LogSink` with a bus-backed sink, and feeds the command
//! channel from the message-bus subscription.

use spiro_core::cardio::StaticKernel;
use spiro_core::config::ConfigLoader;
use spiro_core::hal::{FlowSimulator, FlowSimulatorConfig, PpgSimulator, PpgSimulatorConfig};
use spiro_core::session::SessionHandle;
use spiro_core::tasks::{command_channel, spawn_all};
use spiro_core::telemetry::{LogSink, SessionCommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConfigLoader::new().load_system_config()?;
    info!(
        flow_interval_ms = config.flow.sample_interval_ms,
        tick_interval_ms = config.session.tick_interval_ms,
        "starting spiro monitor"
    );

    let handle = SessionHandle::new();
    let (commands_tx, commands_rx) = command_channel();

    let tasks = spawn_all(
        Box::new(FlowSimulator::new(FlowSimulatorConfig::default())),
        Box::new(PpgSimulator::new(PpgSimulatorConfig::default())),
        Box::new(StaticKernel::new(72, 98)),
        Arc::new(LogSink),
        handle,
        config,
        commands_rx,
    );

    // Scripted start; a real deployment parses these off the control topic
    // with SessionCommand::parse and forwards them here.
    commands_tx
        .send(SessionCommand::Start { duration_s: 30 })
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    tasks.abort_all();

    Ok(())
}
