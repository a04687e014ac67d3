//! Parameter bundle and the full derivation pass for one roast.

use crate::dose::{DoseModel, compute_thermal_dose};
use crate::milestones::TURNING_POINT_WINDOW_S;
use crate::ror::{RorMethod, compute_ror};
use crate::series::{Channel, Series};

/// Everything the engines need for one roast, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub ror_env: RorMethod,
    pub ror_probe: RorMethod,
    pub power_law: DoseModel,
    pub arrhenius: DoseModel,
    pub start_time_s: f64,
    pub poly_degree: usize,
    pub turning_point_window_s: f64,
    pub min_phase_s: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ror_env: RorMethod::default(),
            ror_probe: RorMethod::default(),
            power_law: DoseModel::power_law(DoseModel::DEFAULT_T_BASE),
            arrhenius: DoseModel::arrhenius_default(),
            start_time_s: 5.0,
            poly_degree: 3,
            turning_point_window_s: TURNING_POINT_WINDOW_S,
            min_phase_s: 10.0,
        }
    }
}

impl AnalysisParams {
    pub fn ror_method(&self, channel: Channel) -> &RorMethod {
        match channel {
            Channel::Env => &self.ror_env,
            Channel::Probe => &self.ror_probe,
        }
    }

    pub fn models(&self) -> [DoseModel; 2] {
        [self.power_law, self.arrhenius]
    }
}

/// Sort the series and append RoR plus both dose models for every channel present.
pub fn derive_columns(series: &Series, params: &AnalysisParams) -> Series {
    let mut out = series.sorted_by_time();
    for channel in Channel::ALL {
        if !out.has_column(channel.temp_column()) {
            continue;
        }
        out = compute_ror(&out, channel, params.ror_method(channel));
        for model in params.models() {
            out = compute_thermal_dose(&out, channel, &model, params.start_time_s);
        }
    }
    out
}
