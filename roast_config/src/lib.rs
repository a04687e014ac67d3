#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for roast analysis.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty document yields the dashboard defaults.
use serde::Deserialize;
use std::collections::BTreeMap;

/// Rate-of-rise estimator selection.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RorMethodKind {
    /// Finite difference followed by a centred moving average.
    #[default]
    #[serde(alias = "ma")]
    MovingAverage,
    /// Savitzky-Golay derivative filter.
    #[serde(alias = "sg")]
    SavitzkyGolay,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RorCfg {
    pub method: RorMethodKind,
    /// Smoothing window in seconds (moving average only).
    pub window_s: f64,
    /// Savitzky-Golay window length in samples; bumped to odd at runtime.
    pub window_length: usize,
    pub polyorder: usize,
    /// Derivative order; 1 yields rate of rise.
    pub deriv: u32,
}

impl Default for RorCfg {
    fn default() -> Self {
        Self {
            method: RorMethodKind::MovingAverage,
            window_s: 15.0,
            window_length: 15,
            polyorder: 2,
            deriv: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RorChannels {
    /// Environment (IBTS) channel. Also accepts alias "ibts".
    #[serde(alias = "ibts")]
    pub env: RorCfg,
    pub probe: RorCfg,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DoseCfg {
    /// Reference temperature of the power-law model (weight 1 at this temperature).
    pub t_base: f64,
    /// Samples earlier than this contribute nothing. Also accepts alias "start_time".
    #[serde(alias = "start_time")]
    pub start_time_s: f64,
}

impl Default for DoseCfg {
    fn default() -> Self {
        Self {
            t_base: 100.0,
            start_time_s: 5.0,
        }
    }
}

/// Arrhenius constants.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct KineticsCfg {
    /// Pre-exponential factor
    #[serde(alias = "A")]
    pub a: f64,
    /// Activation energy (kJ/mol)
    #[serde(alias = "Ea")]
    pub ea: f64,
    /// Gas constant (kJ/(mol*K))
    #[serde(alias = "R")]
    pub r: f64,
}

impl Default for KineticsCfg {
    fn default() -> Self {
        Self {
            a: 0.788,
            ea: 26.02,
            r: 0.008_314,
        }
    }
}

/// Per-plan override; absent fields fall back to `[kinetics]`.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct PlanKinetics {
    #[serde(default, alias = "A")]
    pub a: Option<f64>,
    #[serde(default, alias = "Ea")]
    pub ea: Option<f64>,
    #[serde(default, alias = "R")]
    pub r: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisCfg {
    /// Degree of the polynomial fitted to the plan points.
    pub poly_degree: usize,
    /// Turning point is searched for within this many seconds from the start.
    pub turning_point_window_s: f64,
    /// Phases shorter than this are left out of the phase metrics.
    pub min_phase_s: f64,
}

impl Default for AnalysisCfg {
    fn default() -> Self {
        Self {
            poly_degree: 3,
            turning_point_window_s: 180.0,
            min_phase_s: 10.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub ror: RorChannels,
    pub dose: DoseCfg,
    pub kinetics: KineticsCfg,
    /// Kinetics overrides keyed by plan file name.
    pub plans: BTreeMap<String, PlanKinetics>,
    pub analysis: AnalysisCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

impl Config {
    /// Kinetic constants for a plan, layering its override on top of `[kinetics]`.
    pub fn kinetics_for(&self, plan_name: Option<&str>) -> KineticsCfg {
        let base = self.kinetics;
        match plan_name.and_then(|p| self.plans.get(p)) {
            Some(o) => KineticsCfg {
                a: o.a.unwrap_or(base.a),
                ea: o.ea.unwrap_or(base.ea),
                r: o.r.unwrap_or(base.r),
            },
            None => base,
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // RoR
        for (name, ror) in [("ror.env", &self.ror.env), ("ror.probe", &self.ror.probe)] {
            if !(ror.window_s.is_finite() && ror.window_s > 0.0) {
                eyre::bail!("{name}.window_s must be > 0");
            }
            if ror.window_length < 3 {
                eyre::bail!("{name}.window_length must be >= 3");
            }
            if ror.polyorder >= ror.window_length {
                eyre::bail!("{name}.polyorder must be < window_length");
            }
            if !(1..=3).contains(&ror.deriv) {
                eyre::bail!("{name}.deriv must be in [1, 3]");
            }
        }

        // Dose
        if !self.dose.t_base.is_finite() {
            eyre::bail!("dose.t_base must be finite");
        }
        if !self.dose.start_time_s.is_finite() || self.dose.start_time_s < 0.0 {
            eyre::bail!("dose.start_time_s must be >= 0");
        }

        // Kinetics
        validate_kinetics("kinetics", &self.kinetics)?;
        for plan in self.plans.keys() {
            let k = self.kinetics_for(Some(plan));
            validate_kinetics(&format!("plans.\"{plan}\""), &k)?;
        }

        // Analysis
        if !(1..=8).contains(&self.analysis.poly_degree) {
            eyre::bail!("analysis.poly_degree must be in [1, 8]");
        }
        let tp = self.analysis.turning_point_window_s;
        if !(tp.is_finite() && tp > 0.0) {
            eyre::bail!("analysis.turning_point_window_s must be > 0");
        }
        let min_phase = self.analysis.min_phase_s;
        if !(min_phase.is_finite() && min_phase >= 0.0) {
            eyre::bail!("analysis.min_phase_s must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

fn validate_kinetics(section: &str, k: &KineticsCfg) -> eyre::Result<()> {
    if !(k.a.is_finite() && k.a > 0.0) {
        eyre::bail!("{section}.a must be > 0");
    }
    if !(k.ea.is_finite() && k.ea >= 0.0) {
        eyre::bail!("{section}.ea must be >= 0");
    }
    if !(k.r.is_finite() && k.r > 0.0) {
        eyre::bail!("{section}.r must be > 0");
    }
    Ok(())
}
