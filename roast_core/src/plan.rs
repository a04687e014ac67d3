//! Roast plan ingestion.
//!
//! A plan is a small delimited table of phases with a time stamp and a target
//! temperature, optionally carrying fan and power settings.
//!
//! Expected headers (Polish or English names are accepted):
//! Faza,Czas,Temperatura[,Fan][,Power]
//!
//! Example:
//! Faza,Czas,Temperatura,Fan,Power
//! Start,0:00,200,5,7
//! Yellowing,4:30,160,6,7
//! 1st Crack,8:15,195,8,5

use std::path::Path;

use crate::error::ParseError;
use crate::log::detect_delimiter;
use crate::series::Series;
use crate::time::{parse_number, parse_time};

/// Column under which [`Plan::to_series`] exposes the target temperature.
pub const TARGET_TEMP: &str = "Target Temp";

const TIME_NAMES: [&str; 2] = ["Czas", "Time"];
const PHASE_NAMES: [&str; 2] = ["Faza", "Phase"];
const TEMP_NAMES: [&str; 4] = ["Temperatura", "Temperature", "Temp", "Target Temp"];
const FAN_NAMES: [&str; 2] = ["Fan", "Wentylator"];
const POWER_NAMES: [&str; 2] = ["Power", "Moc"];

#[derive(Debug, Clone, PartialEq)]
pub struct PlanStage {
    pub phase: String,
    pub time_seconds: Option<f64>,
    pub target_temp: Option<f64>,
    /// `None` when the plan has no fan column or the cell is blank.
    pub fan: Option<f64>,
    pub power: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Stages ordered by time; stages without a parseable time go last.
    pub stages: Vec<PlanStage>,
    pub has_fan: bool,
    pub has_power: bool,
}

pub fn parse_plan_path(path: &Path) -> Result<Plan, ParseError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ParseError::Unreadable(format!("{}: {e}", path.display())))?;
    parse_plan(&text)
}

pub fn parse_plan(text: &str) -> Result<Plan, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let first = text.lines().next().unwrap_or_default();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(detect_delimiter(first))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let find = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let (phase_idx, time_idx, temp_idx) = match find(&TIME_NAMES[..]) {
        Some(t) => (find(&PHASE_NAMES[..]), t, find(&TEMP_NAMES[..])),
        // Headerless-looking three column plans are read positionally.
        None if headers.len() == 3 => (Some(0), 1, Some(2)),
        None => return Err(ParseError::MissingPlanTimeColumn),
    };
    let fan_idx = find(&FAN_NAMES[..]);
    let power_idx = find(&POWER_NAMES[..]);

    let mut stages = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let num = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_number);
        stages.push(PlanStage {
            phase: phase_idx
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string(),
            time_seconds: record.get(time_idx).and_then(parse_time),
            target_temp: num(temp_idx),
            fan: num(fan_idx),
            power: num(power_idx),
        });
    }
    stages.sort_by(|a, b| match (a.time_seconds, b.time_seconds) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    tracing::debug!(stages = stages.len(), "parsed plan");

    Ok(Plan {
        stages,
        has_fan: fan_idx.is_some(),
        has_power: power_idx.is_some(),
    })
}

impl Plan {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Last finite stage time.
    pub fn end_time(&self) -> Option<f64> {
        self.stages
            .iter()
            .filter_map(|s| s.time_seconds)
            .max_by(f64::total_cmp)
    }

    /// Timed stages as a series with `Target Temp` (and `Fan` / `Power` when
    /// present in the file) so the engines can run on the plan itself.
    pub fn to_series(&self) -> Series {
        let timed: Vec<&PlanStage> = self
            .stages
            .iter()
            .filter(|s| s.time_seconds.is_some())
            .collect();
        let mut series = Series::new(column_of(&timed, |s| s.time_seconds))
            .with_column(TARGET_TEMP, column_of(&timed, |s| s.target_temp));
        if self.has_fan {
            series.set_column("Fan", column_of(&timed, |s| s.fan));
        }
        if self.has_power {
            series.set_column("Power", column_of(&timed, |s| s.power));
        }
        series
    }
}

fn column_of(timed: &[&PlanStage], f: impl Fn(&PlanStage) -> Option<f64>) -> Vec<f64> {
    timed.iter().map(|s| f(s).unwrap_or(f64::NAN)).collect()
}
