//! Rate-of-rise (RoR) estimation in degrees per minute.
//!
//! Two estimators share the [`RorEstimator`] seam:
//! - [`FiniteDifference`]: point-to-point slope smoothed by a centred moving
//!   average whose width is given in seconds.
//! - [`SavitzkyGolay`]: local polynomial derivative. Its window is symmetric,
//!   so it reacts to samples on both sides; this is a different smoothing
//!   shape from the moving average, not a defect to reconcile.
//!
//! Neither estimator fails: insufficient data degrades to `NaN` cells or an
//! all-zero column.

use crate::numeric::{SavgolKernel, fill_gaps};
use crate::series::{Channel, Series, median_interval};

pub trait RorEstimator {
    /// Rate of change of `temp` over `time` (both sorted by time), per minute.
    fn estimate(&self, time: &[f64], temp: &[f64]) -> Vec<f64>;
}

/// Finite difference followed by a centred moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteDifference {
    /// Smoothing width in seconds; translated to samples via the median interval.
    pub window_seconds: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            window_seconds: 15.0,
        }
    }
}

impl FiniteDifference {
    /// Smoothing width in samples: `round(window_seconds / median_dt)`, at least 1.
    pub fn window_samples(&self, time: &[f64]) -> usize {
        let w = (self.window_seconds / median_interval(time)).round();
        if w.is_finite() && w >= 1.0 { w as usize } else { 1 }
    }
}

impl RorEstimator for FiniteDifference {
    fn estimate(&self, time: &[f64], temp: &[f64]) -> Vec<f64> {
        let raw = point_rate(time, temp);
        let window = self.window_samples(time);
        tracing::trace!(window, "moving-average RoR window");
        centered_mean(&raw, window)
    }
}

/// Savitzky-Golay derivative filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavitzkyGolay {
    /// Window in samples; an even value is bumped to the next odd one.
    pub window_length: usize,
    pub polyorder: usize,
    /// Derivative order (1 = rate of rise).
    pub deriv: u32,
}

impl Default for SavitzkyGolay {
    fn default() -> Self {
        Self {
            window_length: 15,
            polyorder: 2,
            deriv: 1,
        }
    }
}

impl SavitzkyGolay {
    pub fn effective_window(&self) -> usize {
        if self.window_length % 2 == 0 {
            self.window_length + 1
        } else {
            self.window_length
        }
    }
}

impl RorEstimator for SavitzkyGolay {
    fn estimate(&self, time: &[f64], temp: &[f64]) -> Vec<f64> {
        let n = temp.len();
        let window = self.effective_window();
        if n < window {
            tracing::debug!(samples = n, window, "not enough samples for Savitzky-Golay");
            return vec![0.0; n];
        }
        let dense = fill_gaps(temp);
        let filtered = SavgolKernel::new(window, self.polyorder, self.deriv)
            .and_then(|k| k.apply(&dense));
        let deriv = match filtered {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, window, polyorder = self.polyorder, "Savitzky-Golay failed; using zeros");
                return vec![0.0; n];
            }
        };
        let dt = median_interval(time);
        let exp = self.deriv as i32;
        let scale = 60f64.powi(exp) / dt.powi(exp);
        deriv
            .into_iter()
            .map(|d| {
                let v = d * scale;
                if v.is_finite() { v } else { 0.0 }
            })
            .collect()
    }
}

/// Estimator selection carried by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RorMethod {
    MovingAverage(FiniteDifference),
    SavitzkyGolay(SavitzkyGolay),
}

impl Default for RorMethod {
    fn default() -> Self {
        Self::MovingAverage(FiniteDifference::default())
    }
}

impl RorEstimator for RorMethod {
    fn estimate(&self, time: &[f64], temp: &[f64]) -> Vec<f64> {
        match self {
            RorMethod::MovingAverage(m) => m.estimate(time, temp),
            RorMethod::SavitzkyGolay(m) => m.estimate(time, temp),
        }
    }
}

/// Raw point-to-point rate: `(ΔT / Δt) * 60`. The first sample and any
/// zero-duration step yield `NaN`.
pub fn point_rate(time: &[f64], temp: &[f64]) -> Vec<f64> {
    let n = time.len().min(temp.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(f64::NAN);
    for i in 1..n {
        let dt = time[i] - time[i - 1];
        out.push(if dt == 0.0 {
            f64::NAN
        } else {
            (temp[i] - temp[i - 1]) / dt * 60.0
        });
    }
    out
}

/// Centred rolling mean with `min_periods = 1`: `NaN` cells are ignored and a
/// window with no values stays `NaN`. For even widths the window leans left,
/// covering `[i - w/2, i + w/2 - 1]`.
pub fn centered_mean(v: &[f64], window: usize) -> Vec<f64> {
    let n = v.len();
    let window = window.max(1);
    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(behind);
            let hi = (i + ahead).min(n.saturating_sub(1));
            crate::numeric::nan_mean(&v[lo..=hi]).unwrap_or(f64::NAN)
        })
        .collect()
}

/// Append `ror_<channel>` computed with `method`, plus the unsmoothed
/// `ror_raw_<channel>` from [`point_rate`].
///
/// Returns the input unchanged when it is empty or lacks the channel.
/// Output rows follow the time-sorted order of the input.
pub fn compute_ror(series: &Series, channel: Channel, method: &impl RorEstimator) -> Series {
    let Some(temp) = series.column(channel.temp_column()) else {
        return series.clone();
    };
    if temp.is_empty() {
        return series.clone();
    }
    let mut out = if series.is_sorted_by_time() {
        series.clone()
    } else {
        series.sorted_by_time()
    };
    let temp = out
        .column(channel.temp_column())
        .map(<[f64]>::to_vec)
        .unwrap_or_default();
    let raw = point_rate(out.time(), &temp);
    let ror = method.estimate(out.time(), &temp);
    out.set_column(channel.ror_raw_column(), raw);
    out.set_column(channel.ror_column(), ror);
    out
}

/// [`compute_ror`] for every channel present in the series.
pub fn compute_ror_all(series: &Series, env: &RorMethod, probe: &RorMethod) -> Series {
    let out = compute_ror(series, Channel::Env, env);
    compute_ror(&out, Channel::Probe, probe)
}
