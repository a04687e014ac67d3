//! Plan-versus-actual comparisons built on top of the engines.

use crate::dose::{DoseModel, cumulative_dose};
use crate::error::NumericError;
use crate::milestones::{Milestones, START};
use crate::numeric::{Polynomial, nan_mean, polyfit};
use crate::plan::{Plan, TARGET_TEMP};
use crate::series::{Channel, Series};

/// Column holding the polynomial plan curve in [`TheoreticalCurve::series`].
pub const THEORETICAL_TEMP: &str = "Theoretical Temp";

/// One week of one-second grid points.
const MAX_GRID_POINTS: usize = 7 * 24 * 3600;

/// Mean RoR between two consecutive events.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseMetric {
    pub from: String,
    pub to: String,
    pub start: f64,
    pub end: f64,
    /// `None` when every RoR cell in the phase is missing.
    pub mean_ror: Option<f64>,
}

impl PhaseMetric {
    pub fn label(&self) -> String {
        format!("{} -> {}", self.from, self.to)
    }
}

/// Mean of `ror_column` over each span between consecutive events (sorted by
/// time, bounds inclusive). Spans shorter than `min_phase_s` or without samples
/// are skipped.
pub fn phase_metrics(
    series: &Series,
    events: &Milestones,
    ror_column: &str,
    min_phase_s: f64,
) -> Vec<PhaseMetric> {
    let Some(ror) = series.column(ror_column) else {
        return Vec::new();
    };
    let sorted = events.sorted();
    sorted
        .windows(2)
        .filter(|w| w[1].1 - w[0].1 >= min_phase_s)
        .filter_map(|w| {
            let ((from, start), (to, end)) = (w[0], w[1]);
            let inside: Vec<f64> = series
                .time()
                .iter()
                .zip(ror)
                .filter(|(t, _)| **t >= start && **t <= end)
                .map(|(_, r)| *r)
                .collect();
            if inside.is_empty() {
                return None;
            }
            Some(PhaseMetric {
                from: from.to_string(),
                to: to.to_string(),
                start,
                end,
                mean_ror: nan_mean(&inside),
            })
        })
        .collect()
}

/// One plan stage next to what actually happened.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanComparisonRow {
    pub phase: String,
    pub plan_time: Option<f64>,
    pub plan_temp: Option<f64>,
    /// Milestone the phase was matched to.
    pub matched: Option<String>,
    pub actual_time: Option<f64>,
    pub actual_temp: Option<f64>,
}

/// Match every plan phase to an actual milestone by name and read the
/// channel temperature at the nearest sample.
///
/// Phases mentioning "start" resolve to `Start = 0` unless a milestone
/// already sits at time zero.
pub fn compare_plan(
    plan: &Plan,
    milestones: &Milestones,
    series: &Series,
    channel: Channel,
) -> Vec<PlanComparisonRow> {
    let has_zero = milestones.iter().any(|(_, t)| t == 0.0);
    plan.stages
        .iter()
        .map(|stage| {
            let (matched, actual_time) =
                if stage.phase.to_lowercase().contains("start") && !has_zero {
                    (Some(START.to_string()), Some(0.0))
                } else {
                    match milestones.find_fuzzy(&stage.phase) {
                        Some((name, t)) => (Some(name.to_string()), Some(t)),
                        None => (None, None),
                    }
                };
            let actual_temp = actual_time
                .and_then(|t| series.value_near(channel.temp_column(), t))
                .filter(|v| !v.is_nan());
            PlanComparisonRow {
                phase: stage.phase.clone(),
                plan_time: stage.time_seconds,
                plan_temp: stage.target_temp,
                matched,
                actual_time,
                actual_temp,
            }
        })
        .collect()
}

/// Dose state at one milestone.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneRow {
    pub name: String,
    pub time: f64,
    pub temp: Option<f64>,
    /// Cumulative dose at the nearest sample.
    pub dose: Option<f64>,
    /// Instantaneous weight at that temperature.
    pub weight: Option<f64>,
}

/// Per-milestone temperature, cumulative dose and weight for `model`,
/// ordered by time.
pub fn milestone_table(
    series: &Series,
    milestones: &Milestones,
    channel: Channel,
    model: &DoseModel,
    start_time_threshold: f64,
) -> Vec<MilestoneRow> {
    let temp = series.column(channel.temp_column());
    let dose = temp.map(|t| cumulative_dose(series.time(), t, model, start_time_threshold));
    milestones
        .sorted()
        .into_iter()
        .map(|(name, time)| {
            let idx = series.nearest_index(time);
            let pick = |col: Option<&[f64]>| {
                idx.zip(col)
                    .map(|(i, c)| c[i])
                    .filter(|v| !v.is_nan())
            };
            let temp_at = pick(temp);
            MilestoneRow {
                name: name.to_string(),
                time,
                temp: temp_at,
                dose: pick(dose.as_deref()),
                weight: temp_at.map(|t| model.weight(t)),
            }
        })
        .collect()
}

/// Dose accumulated along the plan's own stage points (target temperatures).
pub fn plan_dose(plan: &Plan, model: &DoseModel, start_time_threshold: f64) -> f64 {
    let series = plan.to_series();
    let Some(temp) = series.column(TARGET_TEMP) else {
        return 0.0;
    };
    let dose = cumulative_dose(series.time(), temp, model, start_time_threshold);
    dose.iter().rev().copied().find(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Polynomial fit of the plan evaluated on a one-second grid, with its dose.
#[derive(Debug, Clone)]
pub struct TheoreticalCurve {
    pub polynomial: Polynomial,
    /// Grid time, `Theoretical Temp` and the model's dose column.
    pub series: Series,
    pub dose_column: String,
    pub total_dose: f64,
}

/// Fit the plan's target temperatures with a polynomial of `degree` and
/// integrate it from 0 to `max(plan end, horizon)` on a uniform grid with
/// `floor(max) + 1` points.
pub fn theoretical_dose(
    plan: &Plan,
    degree: usize,
    horizon: Option<f64>,
    model: &DoseModel,
    start_time_threshold: f64,
) -> Result<TheoreticalCurve, NumericError> {
    let points = plan.to_series();
    let temps = points.column(TARGET_TEMP).unwrap_or_default();
    let polynomial = polyfit(points.time(), temps, degree)?;

    let end = plan
        .end_time()
        .into_iter()
        .chain(horizon.filter(|h| h.is_finite()))
        .fold(0.0f64, f64::max);
    let n = (end.floor() as usize).saturating_add(1);
    if n > MAX_GRID_POINTS {
        return Err(NumericError::GridTooLarge(n));
    }
    let grid: Vec<f64> = if n == 1 {
        vec![0.0]
    } else {
        let step = end / (n - 1) as f64;
        (0..n).map(|i| i as f64 * step).collect()
    };
    let curve: Vec<f64> = grid.iter().map(|&t| polynomial.eval(t)).collect();
    let dose = cumulative_dose(&grid, &curve, model, start_time_threshold);
    let total_dose = dose.last().copied().filter(|v| !v.is_nan()).unwrap_or(0.0);
    let dose_column = format!("{}_plan", model.column_prefix());
    tracing::debug!(degree = polynomial.degree(), points = n, total_dose, "theoretical plan dose");

    let series = Series::new(grid)
        .with_column(THEORETICAL_TEMP, curve)
        .with_column(dose_column.clone(), dose);
    Ok(TheoreticalCurve {
        polynomial,
        series,
        dose_column,
        total_dose,
    })
}
