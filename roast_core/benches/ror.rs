use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use roast_core::dose::{DoseModel, cumulative_dose};
use roast_core::ror::{FiniteDifference, RorEstimator, SavitzkyGolay};

// Synthetic roast: curve with a dip at the turning point plus white noise
fn synth_roast(n: usize, noise_amp: f64, seed: u32) -> (Vec<f64>, Vec<f64>) {
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    let mut time = Vec::with_capacity(n);
    let mut temp = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64;
        let base = 200.0 - 90.0 * (-t / 60.0).exp() * (t / 60.0) + 0.12 * t;
        time.push(t);
        temp.push(base + (next_f64() * 2.0 - 1.0) * noise_amp);
    }
    (time, temp)
}

pub fn bench_estimators(c: &mut Criterion) {
    let mut g = c.benchmark_group("ror");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p roast_core --bench ror
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(1));
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    // Twelve-minute roast logged once per second.
    let (time, temp) = synth_roast(720, 0.3, 0xC0FFEE);

    for &window_seconds in &[5.0f64, 15.0, 30.0] {
        let fd = FiniteDifference { window_seconds };
        g.bench_function(format!("moving_average_{window_seconds}s"), |b| {
            b.iter_batched(
                || temp.clone(),
                |t| black_box(fd.estimate(black_box(&time), &t)),
                BatchSize::SmallInput,
            )
        });
    }
    for &window_length in &[7usize, 15, 31] {
        let sg = SavitzkyGolay {
            window_length,
            ..SavitzkyGolay::default()
        };
        g.bench_function(format!("savitzky_golay_w{window_length}"), |b| {
            b.iter(|| black_box(sg.estimate(black_box(&time), black_box(&temp))));
        });
    }
    g.bench_function("dose_arrhenius", |b| {
        let model = DoseModel::arrhenius_default();
        b.iter(|| black_box(cumulative_dose(black_box(&time), black_box(&temp), &model, 5.0)));
    });
    g.finish();
}

criterion_group!(ror, bench_estimators);
criterion_main!(ror);
