//! Final-dose comparison across several roast logs.
//!
//! Files are processed one after another. A file that fails to parse is
//! logged and recorded; it never aborts the rest of the batch.

use std::path::{Path, PathBuf};

use crate::analysis::plan_dose;
use crate::dose::final_dose;
use crate::error::ParseError;
use crate::log::parse_log_path;
use crate::milestones::Milestones;
use crate::pipeline::{AnalysisParams, derive_columns};
use crate::plan::Plan;
use crate::series::{Channel, Series};

/// Final doses of one channel under both models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDose {
    pub channel: Channel,
    pub power_law: f64,
    pub arrhenius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoastSummary {
    pub path: PathBuf,
    pub samples: usize,
    pub duration_s: Option<f64>,
    pub milestones: Milestones,
    /// One entry per channel present in the log.
    pub doses: Vec<ChannelDose>,
    /// Roast colour reading; filled in by callers that track it.
    pub agtron: Option<f64>,
}

impl RoastSummary {
    /// File name without directories, for display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    pub fn dose(&self, channel: Channel) -> Option<&ChannelDose> {
        self.doses.iter().find(|d| d.channel == channel)
    }
}

/// Expected doses of the plan a batch is measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDose {
    pub name: String,
    pub power_law: f64,
    pub arrhenius: f64,
}

impl PlanDose {
    /// Plan-point doses under both models of `params`.
    pub fn new(name: impl Into<String>, plan: &Plan, params: &AnalysisParams) -> Self {
        Self {
            name: name.into(),
            power_law: plan_dose(plan, &params.power_law, params.start_time_s),
            arrhenius: plan_dose(plan, &params.arrhenius, params.start_time_s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub summaries: Vec<RoastSummary>,
    pub failures: Vec<(PathBuf, ParseError)>,
    pub plan: Option<PlanDose>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty() && self.failures.is_empty()
    }
}

/// Final doses for every channel of a series already run through
/// [`derive_columns`].
pub fn channel_doses(derived: &Series, params: &AnalysisParams) -> Vec<ChannelDose> {
    Channel::ALL
        .into_iter()
        .filter(|c| derived.has_column(c.temp_column()))
        .map(|channel| ChannelDose {
            channel,
            power_law: final_dose(derived, &params.power_law.column(channel)).unwrap_or(0.0),
            arrhenius: final_dose(derived, &params.arrhenius.column(channel)).unwrap_or(0.0),
        })
        .collect()
}

/// Summarise an already parsed roast.
pub fn summarize(path: &Path, series: &Series, milestones: Milestones, params: &AnalysisParams) -> RoastSummary {
    let derived = derive_columns(series, params);
    RoastSummary {
        path: path.to_path_buf(),
        samples: derived.len(),
        duration_s: derived.max_time(),
        milestones,
        doses: channel_doses(&derived, params),
        agtron: None,
    }
}

/// Parse and summarise every file in `paths`, in order.
pub fn compare_roasts<P: AsRef<Path>>(paths: &[P], params: &AnalysisParams) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        let path = path.as_ref();
        match parse_log_path(path) {
            Ok((series, milestones)) => {
                let summary = summarize(path, &series, milestones, params);
                tracing::debug!(file = %path.display(), samples = summary.samples, "roast summarised");
                report.summaries.push(summary);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping roast log");
                report.failures.push((path.to_path_buf(), e));
            }
        }
    }
    report
}
