// tests/session_lifecycle.rs
//! End-to-end session lifecycle tests against simulated sensors.
//!
//! All tests run under tokio's paused clock so the 100 ms / 10 ms / 200 ms
//! loop cadences execute instantly and deterministically.

use spiro_core::cardio::{CardioEstimate, CardioKernel, StaticKernel};
use spiro_core::config::SystemConfig;
use spiro_core::hal::{FlowSimulator, FlowSimulatorConfig, PpgSimulator};
use spiro_core::session::SessionHandle;
use spiro_core::tasks::{command_channel, spawn_all, TaskHandles};
use spiro_core::telemetry::{ChannelSink, SessionCommand, SinkMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One simulated breath: quiet lead-in (covers the gap until the start
/// command is processed), 1.0 L/s inhale for 1.0 s, a short exhale burst,
/// then quiet flow for the rest of the session.
fn one_breath_script() -> Vec<f32> {
    let mut samples = vec![0.0; 8];
    samples.extend_from_slice(&[1.0; 10]);
    samples.extend_from_slice(&[-0.5, -0.5, -0.2]);
    samples.push(0.0);
    samples
}

fn spawn_system(
    flow: FlowSimulator,
    ppg: PpgSimulator,
    kernel: Box<dyn CardioKernel>,
) -> (
    TaskHandles,
    mpsc::Sender<SessionCommand>,
    mpsc::Receiver<SinkMessage>,
    SessionHandle,
) {
    let (sink, sink_rx) = ChannelSink::new(256);
    let handle = SessionHandle::new();
    let (commands_tx, commands_rx) = command_channel();

    let tasks = spawn_all(
        Box::new(flow),
        Box::new(ppg),
        kernel,
        Arc::new(sink),
        handle.clone(),
        SystemConfig::default(),
        commands_rx,
    );

    (tasks, commands_tx, sink_rx, handle)
}

fn drain(rx: &mut mpsc::Receiver<SinkMessage>) -> Vec<SinkMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

fn incrementing_ppg() -> PpgSimulator {
    PpgSimulator::incrementing(0)
}

#[tokio::test(start_paused = true)]
async fn test_full_session_lifecycle() {
    let (tasks, commands, mut sink_rx, _handle) = spawn_system(
        FlowSimulator::scripted(one_breath_script()),
        incrementing_ppg(),
        Box::new(StaticKernel::new(72, 98)),
    );

    commands
        .send(SessionCommand::Start { duration_s: 3 })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    tasks.abort_all();

    let messages = drain(&mut sink_rx);

    let acks: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            SinkMessage::Ack(a) => Some(a),
            _ => None,
        })
        .collect();
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].status, "started");
    assert_eq!(acks[0].duration, 3);

    let snapshots: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            SinkMessage::Snapshot(s) => Some(s),
            _ => None,
        })
        .collect();
    assert!(!snapshots.is_empty());
    for snapshot in &snapshots {
        assert!(snapshot.exercise_active);
        assert!(snapshot.time_remaining <= 3000);
    }
    for pair in snapshots.windows(2) {
        assert!(pair[1].seq > pair[0].seq, "sequence must be monotonic");
    }

    // The scripted breath completed once, with ~1.0 L integrated
    let last = snapshots.last().unwrap();
    assert_eq!(last.breath_count, 1);

    let summaries: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            SinkMessage::Summary(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(summaries.len(), 1, "summary must be emitted exactly once");
    let summary = summaries[0];
    assert_eq!(summary.total_breaths, 1);
    assert!((summary.avg_volume - 1.0).abs() < 0.05);
    assert_eq!(summary.duration, 3);
    assert_eq!(summary.final_heart_rate, 72);
    assert_eq!(summary.final_spo2, 98);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_session_without_stacking() {
    let (tasks, commands, mut sink_rx, handle) = spawn_system(
        FlowSimulator::scripted(vec![1.0; 20]),
        incrementing_ppg(),
        Box::new(StaticKernel::new(70, 97)),
    );

    commands
        .send(SessionCommand::Start { duration_s: 5 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Restart in place with a longer duration before the first expires
    commands
        .send(SessionCommand::Start { duration_s: 10 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Counters were cleared by the restart; the partial inhale from the
    // first session is gone
    let record = handle.read_record();
    assert!(record.exercise_active);
    assert_eq!(record.breath_count, 0);

    // No summary yet: the 5 s deadline was replaced, not stacked
    let mid_messages = drain(&mut sink_rx);
    assert!(mid_messages
        .iter()
        .all(|m| !matches!(m, SinkMessage::Summary(_))));
    let acks = mid_messages
        .iter()
        .filter(|m| matches!(m, SinkMessage::Ack(_)))
        .count();
    assert_eq!(acks, 2);

    // Restarted timer runs the full 10 s from the restart
    tokio::time::sleep(Duration::from_secs(11)).await;
    tasks.abort_all();

    let summaries: Vec<_> = drain(&mut sink_rx)
        .into_iter()
        .filter_map(|m| match m {
            SinkMessage::Summary(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].duration, 10);
}

#[tokio::test(start_paused = true)]
async fn test_sequence_numbers_survive_session_boundaries() {
    let (tasks, commands, mut sink_rx, _handle) = spawn_system(
        FlowSimulator::scripted(vec![0.0]),
        incrementing_ppg(),
        Box::new(StaticKernel::new(70, 97)),
    );

    commands
        .send(SessionCommand::Start { duration_s: 1 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    commands
        .send(SessionCommand::Start { duration_s: 1 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    tasks.abort_all();

    let messages = drain(&mut sink_rx);

    let summaries = messages
        .iter()
        .filter(|m| matches!(m, SinkMessage::Summary(_)))
        .count();
    assert_eq!(summaries, 2, "one summary per session");

    let seqs: Vec<u32> = messages
        .iter()
        .filter_map(|m| match m {
            SinkMessage::Snapshot(s) => Some(s.seq),
            _ => None,
        })
        .collect();
    assert!(seqs.len() >= 2);
    for pair in seqs.windows(2) {
        assert!(
            pair[1] > pair[0],
            "sequence must keep increasing across sessions"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_flow_sensor_failure_leaves_cardio_running() {
    let failing_flow = FlowSimulator::new(FlowSimulatorConfig {
        fail_init: true,
        ..FlowSimulatorConfig::default()
    });

    let (tasks, commands, mut sink_rx, _handle) = spawn_system(
        failing_flow,
        incrementing_ppg(),
        Box::new(StaticKernel::new(72, 98)),
    );

    commands
        .send(SessionCommand::Start { duration_s: 3 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;
    tasks.abort_all();

    let snapshots: Vec<_> = drain(&mut sink_rx)
        .into_iter()
        .filter_map(|m| match m {
            SinkMessage::Snapshot(s) => Some(s),
            _ => None,
        })
        .collect();
    assert!(!snapshots.is_empty(), "telemetry continues without flow");

    let last = snapshots.last().unwrap();
    assert!(last.flow_stale, "halted flow channel must be flagged stale");
    assert!(!last.cardio_stale);
    assert!(last.hr_valid);
    assert_eq!(last.heart_rate, 72);
    // Flow fields stay at their zero-initialized values
    assert_eq!(last.flow, 0.0);
    assert_eq!(last.breath_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_cardio_window_slides_by_refresh_size() {
    /// Kernel double that records the IR window contents of each invocation
    struct RecordingKernel {
        windows: Arc<parking_lot::Mutex<Vec<Vec<u32>>>>,
    }

    impl CardioKernel for RecordingKernel {
        fn estimate(&mut self, ir: &[u32], _red: &[u32]) -> CardioEstimate {
            self.windows.lock().push(ir.to_vec());
            CardioEstimate {
                heart_rate: 60,
                heart_rate_valid: true,
                spo2: 95,
                spo2_valid: true,
            }
        }
    }

    let windows = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let kernel = RecordingKernel {
        windows: windows.clone(),
    };

    let (tasks, _commands, _sink_rx, _handle) = spawn_system(
        FlowSimulator::scripted(vec![0.0]),
        incrementing_ppg(),
        Box::new(kernel),
    );

    // Cold fill takes ~1 s, each refresh ~0.25 s + 1 s settle
    tokio::time::sleep(Duration::from_secs(4)).await;
    tasks.abort_all();

    let windows = windows.lock();
    assert!(windows.len() >= 2, "expected at least cold start + 1 refresh");

    let first: Vec<u32> = (0..100).collect();
    assert_eq!(windows[0], first);

    // Each refresh retains samples [25..99] as [0..74] and appends 25 fresh
    for (i, window) in windows.iter().enumerate().skip(1) {
        let start = 25 * i as u32;
        let expected: Vec<u32> = (start..start + 100).collect();
        assert_eq!(window, &expected, "window {} contents", i);
    }
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_duration_is_ignored() {
    let (tasks, commands, mut sink_rx, handle) = spawn_system(
        FlowSimulator::scripted(vec![0.0]),
        incrementing_ppg(),
        Box::new(StaticKernel::new(70, 97)),
    );

    commands
        .send(SessionCommand::Start { duration_s: 0 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    tasks.abort_all();

    assert!(!handle.read_record().exercise_active);
    let messages = drain(&mut sink_rx);
    assert!(messages.is_empty(), "no ack and no telemetry for a rejected start");
}
