//! `From` implementations bridging `roast_config` types to `roast_core` types.

use crate::dose::DoseModel;
use crate::pipeline::AnalysisParams;
use crate::ror::{FiniteDifference, RorMethod, SavitzkyGolay};
use roast_config::{Config, KineticsCfg, RorCfg, RorMethodKind};

// ── RorMethod ────────────────────────────────────────────────────────────────

impl From<&RorCfg> for RorMethod {
    fn from(c: &RorCfg) -> Self {
        match c.method {
            RorMethodKind::MovingAverage => Self::MovingAverage(FiniteDifference {
                window_seconds: c.window_s,
            }),
            RorMethodKind::SavitzkyGolay => Self::SavitzkyGolay(SavitzkyGolay {
                window_length: c.window_length,
                polyorder: c.polyorder,
                deriv: c.deriv,
            }),
        }
    }
}

// ── DoseModel ────────────────────────────────────────────────────────────────

impl From<&KineticsCfg> for DoseModel {
    fn from(c: &KineticsCfg) -> Self {
        Self::Arrhenius {
            a: c.a,
            ea: c.ea,
            r: c.r,
        }
    }
}

// ── AnalysisParams ───────────────────────────────────────────────────────────

impl AnalysisParams {
    /// Resolve parameters, applying the per-plan kinetics override for `plan_name`.
    pub fn from_config(cfg: &Config, plan_name: Option<&str>) -> Self {
        Self {
            ror_env: (&cfg.ror.env).into(),
            ror_probe: (&cfg.ror.probe).into(),
            power_law: DoseModel::power_law(cfg.dose.t_base),
            arrhenius: (&cfg.kinetics_for(plan_name)).into(),
            start_time_s: cfg.dose.start_time_s,
            poly_degree: cfg.analysis.poly_degree,
            turning_point_window_s: cfg.analysis.turning_point_window_s,
            min_phase_s: cfg.analysis.min_phase_s,
        }
    }
}

impl From<&Config> for AnalysisParams {
    fn from(cfg: &Config) -> Self {
        Self::from_config(cfg, None)
    }
}
