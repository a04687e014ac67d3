//! Canonical time-indexed table shared by the ingestors and the engines.
//!
//! Missing cells are `NaN`. Derived columns are appended to a copy; the engines
//! never mutate a caller's series in place.

/// Canonical column holding the parsed time stamp in seconds.
pub const TIME_SECONDS: &str = "Time_Seconds";

/// The two independent temperature channels of a roast log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Environment / IBTS sensor (primary).
    Env,
    /// Bean probe (secondary).
    Probe,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Env, Channel::Probe];

    /// Canonical temperature column name for this channel.
    pub const fn temp_column(self) -> &'static str {
        match self {
            Channel::Env => "IBTS Temp",
            Channel::Probe => "Bean Probe Temp",
        }
    }

    /// Canonical device-computed RoR column name for this channel.
    pub const fn device_ror_column(self) -> &'static str {
        match self {
            Channel::Env => "IBTS ROR",
            Channel::Probe => "Bean Probe ROR",
        }
    }

    /// Suffix that keeps derived columns of both channels apart.
    pub const fn suffix(self) -> &'static str {
        match self {
            Channel::Env => "ibts",
            Channel::Probe => "probe",
        }
    }

    pub fn ror_column(self) -> String {
        format!("ror_{}", self.suffix())
    }

    /// Unsmoothed point-to-point rate column.
    pub fn ror_raw_column(self) -> String {
        format!("ror_raw_{}", self.suffix())
    }

    pub fn dose_column(self) -> String {
        format!("thermal_dose_{}", self.suffix())
    }

    pub fn arrhenius_dose_column(self) -> String {
        format!("thermal_dose_arrhenius_{}", self.suffix())
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    time: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Series {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            columns: Vec::new(),
        }
    }

    /// Builder-style column insertion; panics in debug builds on length mismatch.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.set_column(name, values);
        self
    }

    /// Insert or replace a column. Values are truncated or NaN-padded to the series length.
    pub fn set_column(&mut self, name: impl Into<String>, mut values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.time.len(), "column length mismatch");
        values.resize(self.time.len(), f64::NAN);
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = values;
        } else {
            self.columns.push((name, values));
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Stable sort by time; `NaN` times go last.
    #[must_use]
    pub fn sorted_by_time(&self) -> Self {
        let order = self.time_order();
        Self {
            time: order.iter().map(|&i| self.time[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(n, v)| (n.clone(), order.iter().map(|&i| v[i]).collect()))
                .collect(),
        }
    }

    /// Row permutation that sorts by time (stable, `NaN` last).
    pub fn time_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.time.len()).collect();
        order.sort_by(|&a, &b| nan_last_cmp(self.time[a], self.time[b]));
        order
    }

    pub fn is_sorted_by_time(&self) -> bool {
        self.time
            .windows(2)
            .all(|w| nan_last_cmp(w[0], w[1]) != std::cmp::Ordering::Greater)
    }

    /// Median of consecutive time steps, ignoring undefined steps.
    /// Falls back to `1.0` when no usable positive interval exists.
    pub fn median_interval(&self) -> f64 {
        median_interval(&self.time)
    }

    /// Index of the sample whose time is closest to `t` (first on ties).
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        if !t.is_finite() {
            return None;
        }
        self.time
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .min_by(|a, b| (a.1 - t).abs().total_cmp(&(b.1 - t).abs()))
            .map(|(i, _)| i)
    }

    /// Value of `column` at the sample nearest to `t`.
    pub fn value_near(&self, column: &str, t: f64) -> Option<f64> {
        let idx = self.nearest_index(t)?;
        self.column(column).map(|c| c[idx])
    }

    /// Largest finite time stamp.
    pub fn max_time(&self) -> Option<f64> {
        self.time
            .iter()
            .copied()
            .filter(|t| t.is_finite())
            .max_by(f64::total_cmp)
    }
}

fn nan_last_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
    }
}

/// Median of consecutive differences of `time`, skipping `NaN` steps.
/// Non-positive or undefined medians fall back to `1.0`.
pub fn median_interval(time: &[f64]) -> f64 {
    let diffs: Vec<f64> = time
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| d.is_finite())
        .collect();
    match crate::numeric::median(&diffs) {
        Some(m) if m > 0.0 => m,
        _ => 1.0,
    }
}
