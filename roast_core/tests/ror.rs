use roast_core::ror::{FiniteDifference, RorMethod, SavitzkyGolay, compute_ror, compute_ror_all};
use roast_core::{Channel, Series};
use rstest::rstest;

fn env_series(time: Vec<f64>, temp: Vec<f64>) -> Series {
    Series::new(time).with_column(Channel::Env.temp_column(), temp)
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        if e.is_nan() {
            assert!(a.is_nan(), "{actual:?}");
        } else {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }
}

#[test]
fn constant_slope_yields_ten_degrees_per_minute() {
    let s = env_series(vec![0.0, 60.0, 120.0], vec![100.0, 110.0, 120.0]);
    let out = compute_ror(&s, Channel::Env, &FiniteDifference::default());
    assert_close(out.column("ror_ibts").unwrap(), &[f64::NAN, 10.0, 10.0]);
}

#[test]
fn irregular_intervals_use_actual_dt() {
    let s = env_series(vec![0.0, 2.0, 5.0], vec![100.0, 102.0, 108.0]);
    let method = FiniteDifference { window_seconds: 1.0 };
    let out = compute_ror(&s, Channel::Env, &method);
    assert_close(out.column("ror_ibts").unwrap(), &[f64::NAN, 60.0, 120.0]);
}

#[rstest]
#[case(vec![0.0, 60.0, 120.0], vec![100.0, 110.0, 120.0], vec![f64::NAN, 10.0, 10.0])]
#[case(vec![0.0, 2.0, 5.0], vec![100.0, 102.0, 108.0], vec![f64::NAN, 60.0, 120.0])]
fn raw_rate_column_with_default_method(
    #[case] time: Vec<f64>,
    #[case] temp: Vec<f64>,
    #[case] expected: Vec<f64>,
) {
    let out = compute_ror(&env_series(time, temp), Channel::Env, &FiniteDifference::default());
    assert_close(out.column("ror_raw_ibts").unwrap(), &expected);
}

#[test]
fn default_window_smooths_irregular_intervals() {
    // median dt 2.5 s -> 6-sample window covers every point.
    let s = env_series(vec![0.0, 2.0, 5.0], vec![100.0, 102.0, 108.0]);
    let out = compute_ror(&s, Channel::Env, &FiniteDifference::default());
    assert_close(out.column("ror_ibts").unwrap(), &[90.0, 90.0, 90.0]);
    assert_close(out.column("ror_raw_ibts").unwrap(), &[f64::NAN, 60.0, 120.0]);
}

#[test]
fn moving_average_smooths_over_window() {
    // dt = 10 s, window 30 s -> 3 samples centred.
    let s = env_series(vec![0.0, 10.0, 20.0, 30.0], vec![100.0, 101.0, 103.0, 106.0]);
    let method = FiniteDifference { window_seconds: 30.0 };
    let out = compute_ror(&s, Channel::Env, &method);
    // raw: NaN, 6, 12, 18
    assert_close(out.column("ror_ibts").unwrap(), &[6.0, 9.0, 12.0, 15.0]);
}

#[test]
fn empty_series_is_returned_unchanged() {
    let s = env_series(Vec::new(), Vec::new());
    let out = compute_ror(&s, Channel::Env, &FiniteDifference::default());
    assert!(out.is_empty());
    assert!(!out.has_column("ror_ibts"));
}

#[test]
fn missing_channel_leaves_column_absent() {
    let s = env_series(vec![0.0, 1.0], vec![1.0, 2.0]);
    let out = compute_ror(&s, Channel::Probe, &FiniteDifference::default());
    assert!(!out.has_column("ror_probe"));
    assert_eq!(out, s);
}

#[test]
fn duplicate_time_stamp_gives_nan() {
    let s = env_series(vec![0.0, 60.0, 60.0], vec![100.0, 110.0, 111.0]);
    let out = compute_ror(&s, Channel::Env, &FiniteDifference { window_seconds: 1.0 });
    let r = out.column("ror_ibts").unwrap();
    assert!(r[2].is_nan());
}

#[test]
fn unsorted_input_is_sorted_before_differencing() {
    let s = env_series(vec![120.0, 0.0, 60.0], vec![120.0, 100.0, 110.0]);
    let out = compute_ror(&s, Channel::Env, &FiniteDifference::default());
    assert_eq!(out.time(), &[0.0, 60.0, 120.0]);
    assert_close(out.column("ror_ibts").unwrap(), &[f64::NAN, 10.0, 10.0]);
}

#[test]
fn savitzky_golay_on_linear_ramp() {
    // 0.5 degrees per second = 30 per minute, sampled every 2 s.
    let time: Vec<f64> = (0..40).map(|i| f64::from(i) * 2.0).collect();
    let temp: Vec<f64> = time.iter().map(|t| 100.0 + 0.5 * t).collect();
    let out = compute_ror(&env_series(time, temp), Channel::Env, &SavitzkyGolay::default());
    let r = out.column("ror_ibts").unwrap();
    assert!(r.iter().all(|v| (v - 30.0).abs() < 1e-6), "{r:?}");
}

#[test]
fn savitzky_golay_fills_gaps_before_filtering() {
    let time: Vec<f64> = (0..20).map(f64::from).collect();
    let mut temp: Vec<f64> = time.iter().map(|t| 150.0 + t).collect();
    temp[7] = f64::NAN;
    let sg = SavitzkyGolay {
        window_length: 7,
        polyorder: 2,
        deriv: 1,
    };
    let out = compute_ror(&env_series(time, temp), Channel::Env, &sg);
    let r = out.column("ror_ibts").unwrap();
    assert!(r.iter().all(|v| (v - 60.0).abs() < 1e-6), "{r:?}");
}

#[test]
fn savitzky_golay_without_enough_samples_is_zero() {
    let s = env_series(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let out = compute_ror(&s, Channel::Env, &SavitzkyGolay::default());
    assert_eq!(out.column("ror_ibts").unwrap(), &[0.0; 5]);
}

#[test]
fn savitzky_golay_invalid_polyorder_is_zero() {
    let time: Vec<f64> = (0..10).map(f64::from).collect();
    let s = env_series(time.clone(), time);
    let sg = SavitzkyGolay {
        window_length: 5,
        polyorder: 5,
        deriv: 1,
    };
    let out = compute_ror(&s, Channel::Env, &sg);
    assert_eq!(out.column("ror_ibts").unwrap(), &[0.0; 10]);
}

#[rstest]
#[case(1, 2.0)]
#[case(2, 2.0)]
#[case(2, 0.5)]
fn savitzky_golay_rescales_each_derivative_order(#[case] deriv: u32, #[case] dt: f64) {
    // 0.5 t^2: slope t deg/s, curvature 1 deg/s^2.
    let time: Vec<f64> = (0..30).map(|i| f64::from(i) * dt).collect();
    let temp: Vec<f64> = time.iter().map(|t| 0.5 * t * t).collect();
    let sg = SavitzkyGolay {
        window_length: 7,
        polyorder: 2,
        deriv,
    };
    let out = compute_ror(&env_series(time.clone(), temp), Channel::Env, &sg);
    let r = out.column("ror_ibts").unwrap();
    for (v, t) in r.iter().zip(&time) {
        let expected = if deriv == 1 { t * 60.0 } else { 3600.0 };
        assert!((v - expected).abs() < 1e-6 * expected.max(1.0), "{r:?}");
    }
}

#[test]
fn savitzky_golay_huge_derivative_stays_finite() {
    let time: Vec<f64> = (0..20).map(f64::from).collect();
    let temp: Vec<f64> = time.iter().map(|t| 100.0 + t).collect();
    let sg = SavitzkyGolay {
        window_length: 7,
        polyorder: 2,
        deriv: 200,
    };
    let out = compute_ror(&env_series(time, temp), Channel::Env, &sg);
    let r = out.column("ror_ibts").unwrap();
    assert!(r.iter().all(|v| *v == 0.0), "{r:?}");
}

#[test]
fn both_channels_keep_separate_columns() {
    let s = env_series(vec![0.0, 60.0], vec![100.0, 110.0])
        .with_column(Channel::Probe.temp_column(), vec![50.0, 80.0]);
    let method = RorMethod::default();
    let out = compute_ror_all(&s, &method, &method);
    assert_close(out.column("ror_ibts").unwrap(), &[f64::NAN, 10.0]);
    assert_close(out.column("ror_probe").unwrap(), &[f64::NAN, 30.0]);
}
