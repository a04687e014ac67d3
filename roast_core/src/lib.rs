#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::many_single_char_names,
    clippy::suboptimal_flops
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Roast log analysis (I/O-light, UI-free).
//!
//! This crate turns exported roaster logs and roast plans into a canonical
//! time series and derives rate-of-rise and thermal-dose curves from it.
//!
//! ## Architecture
//!
//! - **Ingestion**: vendor logs (`log`) and roast plans (`plan`), both
//!   resolving loosely named columns to canonical ones
//! - **Engines**: rate of rise (`ror`) and cumulative thermal dose (`dose`),
//!   each a pure function run once per temperature channel
//! - **Analysis**: milestones, phase metrics and plan comparison (`analysis`)
//! - **Batch**: final doses across many logs with per-file failure isolation,
//!   optionally next to a plan's expected dose; `profiles` finds the logs
//!   and plan of one profile in a data directory
//!
//! ## Failure tiers
//!
//! Structural problems (no `Timeline` marker, no time column) are
//! [`ParseError`]s. Everything else degrades: a bad cell becomes `NaN`, an
//! estimator without enough data yields zeros.

pub mod analysis;
pub mod batch;
pub mod conversions;
pub mod dose;
pub mod error;
pub mod log;
pub mod milestones;
pub mod numeric;
pub mod pipeline;
pub mod plan;
pub mod profiles;
pub mod ror;
pub mod series;
pub mod time;

pub use crate::dose::{DoseModel, compute_thermal_dose};
pub use crate::error::{NumericError, ParseError};
pub use crate::log::{parse_log, parse_log_path};
pub use crate::milestones::Milestones;
pub use crate::pipeline::{AnalysisParams, derive_columns};
pub use crate::plan::{Plan, PlanStage, parse_plan, parse_plan_path};
pub use crate::ror::{FiniteDifference, RorEstimator, RorMethod, SavitzkyGolay, compute_ror};
pub use crate::series::{Channel, Series};
pub use crate::time::parse_time;
