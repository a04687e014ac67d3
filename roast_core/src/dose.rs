//! Cumulative thermal dose.
//!
//! Dose is the running integral of a temperature-dependent rate weight over
//! time, starting at a time threshold. Both weight models share the exact
//! same accumulation so their totals stay comparable:
//!
//! 1. keep rows with `time >= start_time_threshold`, sorted by time;
//! 2. `dt` per step, the first retained row gets `dt = 0`;
//! 3. trapezoidal temperature `(T[i] + T[i-1]) / 2` (first row: its own `T`);
//! 4. `inc = w(T_avg) * dt`, cumulatively summed;
//! 5. rows before the threshold read `0.0`.

use crate::series::{Channel, Series};

pub const KELVIN_OFFSET: f64 = 273.15;

/// Rate-weight model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoseModel {
    /// `2 ^ ((T - t_base) / 10)`: rate doubles every ten degrees.
    PowerLaw { t_base: f64 },
    /// `a * exp(-ea / (r * (T + 273.15)))` with `T` in Celsius.
    Arrhenius { a: f64, ea: f64, r: f64 },
}

impl DoseModel {
    pub const DEFAULT_T_BASE: f64 = 100.0;

    pub const fn power_law(t_base: f64) -> Self {
        Self::PowerLaw { t_base }
    }

    /// Arrhenius model with constants fitted to stay comparable with the
    /// power-law model over typical roast temperatures.
    pub const fn arrhenius_default() -> Self {
        Self::Arrhenius {
            a: 0.788,
            ea: 26.02,
            r: 0.008_314,
        }
    }

    /// Instantaneous weight at temperature `t` (Celsius).
    #[inline]
    pub fn weight(&self, t: f64) -> f64 {
        match *self {
            DoseModel::PowerLaw { t_base } => 2f64.powf((t - t_base) / 10.0),
            DoseModel::Arrhenius { a, ea, r } => a * (-ea / (r * (t + KELVIN_OFFSET))).exp(),
        }
    }

    /// Column name stem shared by every channel.
    pub const fn column_prefix(&self) -> &'static str {
        match self {
            DoseModel::PowerLaw { .. } => "thermal_dose",
            DoseModel::Arrhenius { .. } => "thermal_dose_arrhenius",
        }
    }

    /// Name of the derived column for `channel` under this model.
    pub fn column(&self, channel: Channel) -> String {
        format!("{}_{}", self.column_prefix(), channel.suffix())
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DoseModel::PowerLaw { .. } => "power_law",
            DoseModel::Arrhenius { .. } => "arrhenius",
        }
    }
}

/// Dose over `time`/`temp` in input row order.
///
/// A `NaN` increment (missing temperature) leaves that row `NaN` and is
/// skipped by the running sum.
pub fn cumulative_dose(time: &[f64], temp: &[f64], model: &DoseModel, start_time_threshold: f64) -> Vec<f64> {
    let n = time.len().min(temp.len());
    let mut out = vec![0.0; n];

    let mut kept: Vec<usize> = (0..n).filter(|&i| time[i] >= start_time_threshold).collect();
    if kept.is_empty() {
        return out;
    }
    kept.sort_by(|&a, &b| time[a].total_cmp(&time[b]));

    let mut acc = 0.0;
    let mut prev: Option<usize> = None;
    for &i in &kept {
        let (dt, t_avg) = match prev {
            Some(p) => (time[i] - time[p], (temp[i] + temp[p]) / 2.0),
            None => (0.0, temp[i]),
        };
        let inc = model.weight(t_avg) * dt;
        if inc.is_nan() {
            out[i] = f64::NAN;
        } else {
            acc += inc;
            out[i] = acc;
        }
        prev = Some(i);
    }
    out
}

/// Append the dose column for `channel` under `model`.
///
/// Never fails: a missing channel leaves the series unchanged and an empty
/// retained window yields an all-zero column.
pub fn compute_thermal_dose(
    series: &Series,
    channel: Channel,
    model: &DoseModel,
    start_time_threshold: f64,
) -> Series {
    let Some(temp) = series.column(channel.temp_column()) else {
        return series.clone();
    };
    let dose = cumulative_dose(series.time(), temp, model, start_time_threshold);
    let mut out = series.clone();
    out.set_column(model.column(channel), dose);
    out
}

/// Dose at the latest timed row of `column`; `0.0` when no row qualifies.
pub fn final_dose(series: &Series, column: &str) -> Option<f64> {
    let values = series.column(column)?;
    let time = series.time();
    let idx = series
        .time_order()
        .into_iter()
        .rev()
        .find(|&i| time[i].is_finite() && !values[i].is_nan());
    Some(idx.map_or(0.0, |i| values[i]))
}
