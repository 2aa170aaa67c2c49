use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use spiro_core::cardio::{CardioWindow, StaticKernel};
use spiro_core::config::FlowConfig;
use spiro_core::hal::PpgSample;
use spiro_core::session::BreathDetector;

/// One synthetic breath cycle at the 100 ms acquisition cadence
fn breath_cycle() -> Vec<f32> {
    let mut samples = vec![1.0; 10];
    samples.extend_from_slice(&[-0.5, -0.5, -0.2, 0.0, 0.05, -0.05]);
    samples
}

fn benchmark_breath_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("breath_detector");
    let cycle = breath_cycle();

    group.throughput(Throughput::Elements(cycle.len() as u64 * 100));
    group.bench_function("process_100_cycles", |b| {
        b.iter(|| {
            let mut detector = BreathDetector::new(&FlowConfig::default());
            let mut completed = 0u32;
            for _ in 0..100 {
                for &flow in &cycle {
                    if let spiro_core::session::BreathEvent::Completed { .. } =
                        detector.process(black_box(flow))
                    {
                        completed += 1;
                    }
                }
            }
            black_box(completed)
        });
    });

    group.finish();
}

fn benchmark_cardio_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("cardio_window");

    group.bench_function("shift_and_refill", |b| {
        let mut window = CardioWindow::new();
        let mut v = 0u32;
        while !window.is_full() {
            window.push(PpgSample { red: v, ir: v });
            v += 1;
        }
        let mut kernel = StaticKernel::new(72, 98);

        b.iter(|| {
            window.shift();
            while !window.is_full() {
                window.push(PpgSample { red: v, ir: v });
                v = v.wrapping_add(1);
            }
            black_box(window.estimate(&mut kernel))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_breath_detector, benchmark_cardio_window);
criterion_main!(benches);
