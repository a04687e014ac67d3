//! Named roast events (`Yellowing`, `1st Crack`, `Drop`, ...) and their times.

use crate::series::{Channel, Series};

pub const START: &str = "Start";
pub const DROP: &str = "Drop";
pub const TURNING_POINT: &str = "Turning Point";

/// Default search horizon for the turning point, in seconds.
pub const TURNING_POINT_WINDOW_S: f64 = 180.0;

/// Sparse name → seconds mapping. Names are unique; insertion order is kept
/// so fuzzy lookups are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Milestones {
    entries: Vec<(String, f64)>,
}

impl Milestones {
    /// Insert or overwrite.
    pub fn insert(&mut self, name: impl Into<String>, seconds: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = seconds,
            None => self.entries.push((name, seconds)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), *t))
    }

    /// Entries ordered by time (stable for equal times).
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut v: Vec<(&str, f64)> = self.iter().collect();
        v.sort_by(|a, b| a.1.total_cmp(&b.1));
        v
    }

    /// First milestone whose name contains, or is contained in, `phase`
    /// (case-insensitive).
    pub fn find_fuzzy(&self, phase: &str) -> Option<(&str, f64)> {
        let phase = phase.to_lowercase();
        self.iter().find(|(name, _)| {
            let name = name.to_lowercase();
            phase.contains(&name) || name.contains(&phase)
        })
    }

    /// Copy with the synthesized events used for phase analysis. Only absent
    /// names are filled: `Turning Point` (inferred), `Start = 0` and
    /// `Drop` = last time.
    #[must_use]
    pub fn with_defaults(&self, series: &Series, turning_point_window_s: f64) -> Self {
        let mut out = self.clone();
        if !out.contains(TURNING_POINT)
            && let Some(tp) = infer_turning_point(series, turning_point_window_s)
        {
            out.insert(TURNING_POINT, tp);
        }
        if !out.contains(START) {
            out.insert(START, 0.0);
        }
        if !out.contains(DROP)
            && let Some(end) = series.max_time()
        {
            out.insert(DROP, end);
        }
        out
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Milestones {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut m = Self::default();
        for (n, t) in iter {
            m.insert(n, t);
        }
        m
    }
}

/// Time of the lowest primary-channel temperature within the first
/// `window_s` seconds; falls back to the probe channel when the primary one
/// is absent.
pub fn infer_turning_point(series: &Series, window_s: f64) -> Option<f64> {
    let temp = series
        .column(Channel::Env.temp_column())
        .or_else(|| series.column(Channel::Probe.temp_column()))?;
    series
        .time()
        .iter()
        .zip(temp)
        .filter(|(t, v)| **t < window_s && !v.is_nan())
        .fold(None, |best: Option<(f64, f64)>, (&t, &v)| match best {
            Some((_, bv)) if bv <= v => best,
            _ => Some((t, v)),
        })
        .map(|(t, _)| t)
}
