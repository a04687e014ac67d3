//! Command handlers: parse inputs, run the engines, hand results to `report`.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use roast_config::Config;
use roast_core::analysis::{compare_plan, milestone_table, phase_metrics, plan_dose, theoretical_dose};
use roast_core::batch::{PlanDose, channel_doses, compare_roasts};
use roast_core::profiles::{discover_profile, list_profiles};
use roast_core::{AnalysisParams, Channel, derive_columns, parse_log_path, parse_plan_path};

use crate::report::{self, AnalyzeReport, PlanReport, PlanSection};

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn emit(json: bool, text: String, value: serde_json::Value) {
    if json {
        println!("{value}");
    } else {
        print!("{text}");
    }
}

pub fn run_analyze(
    cfg: &Config,
    log: &Path,
    plan_path: Option<&Path>,
    channel: Channel,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    let (series, milestones) =
        parse_log_path(log).wrap_err_with(|| format!("parse roast log {}", log.display()))?;
    let plan = plan_path
        .map(|p| parse_plan_path(p).wrap_err_with(|| format!("parse plan {}", p.display())))
        .transpose()?;
    let plan_name = plan_path.map(file_name);
    let params = AnalysisParams::from_config(cfg, plan_name.as_deref());

    let derived = derive_columns(&series, &params);
    tracing::info!(file = %log.display(), samples = derived.len(), "roast analysed");
    if !derived.has_column(channel.temp_column()) {
        tracing::warn!(%channel, "channel not present in log; per-channel tables stay empty");
    }

    let events = milestones.with_defaults(&derived, params.turning_point_window_s);
    let phases = phase_metrics(&derived, &events, &channel.ror_column(), params.min_phase_s);
    let milestone_rows = milestone_table(&derived, &events, channel, &params.power_law, params.start_time_s);
    let milestone_rows_arrhenius =
        milestone_table(&derived, &events, channel, &params.arrhenius, params.start_time_s);

    let plan_section = plan.map(|plan| {
        let theoretical = match theoretical_dose(
            &plan,
            params.poly_degree,
            derived.max_time(),
            &params.power_law,
            params.start_time_s,
        ) {
            Ok(curve) => Some(curve.total_dose),
            Err(e) => {
                tracing::warn!(error = %e, "could not fit plan curve");
                None
            }
        };
        PlanSection {
            name: plan_name.clone().unwrap_or_default(),
            rows: compare_plan(&plan, &events, &derived, channel),
            dose_power_law: plan_dose(&plan, &params.power_law, params.start_time_s),
            dose_arrhenius: plan_dose(&plan, &params.arrhenius, params.start_time_s),
            theoretical,
        }
    });

    if let Some(out) = out {
        report::write_csv(&derived, out)?;
    }

    let r = AnalyzeReport {
        name: file_name(log),
        samples: derived.len(),
        duration_s: derived.max_time(),
        channel,
        milestones: events.sorted().into_iter().map(|(n, t)| (n.to_string(), t)).collect(),
        doses: channel_doses(&derived, &params),
        phases,
        milestone_rows,
        milestone_rows_arrhenius,
        plan: plan_section,
    };
    emit(json, report::analyze_text(&r), report::analyze_json(&r));
    Ok(())
}

/// Sources of a `compare` run. A profile adds its roast logs and, unless
/// `plan` is set, its plan.
#[derive(Debug, Clone)]
pub struct CompareInputs {
    pub logs: Vec<PathBuf>,
    pub plan: Option<PathBuf>,
    pub plan_name: Option<String>,
    pub profile: Option<String>,
    pub data_dir: PathBuf,
}

pub fn run_compare(cfg: &Config, inputs: &CompareInputs, json: bool) -> Result<()> {
    let mut logs = inputs.logs.clone();
    let mut plan_path = inputs.plan.clone();
    if let Some(profile) = &inputs.profile {
        let files = discover_profile(&inputs.data_dir, profile)
            .wrap_err_with(|| format!("locate profile {profile} in {}", inputs.data_dir.display()))?;
        logs.extend(files.roasts);
        if plan_path.is_none() {
            plan_path = files.plan;
        }
    }
    if logs.is_empty() {
        eyre::bail!("no roast logs to compare");
    }

    let plan_name = inputs
        .plan_name
        .clone()
        .or_else(|| plan_path.as_deref().map(file_name));
    let params = AnalysisParams::from_config(cfg, plan_name.as_deref());
    let plan = match plan_path.as_deref() {
        Some(p) => {
            let plan = parse_plan_path(p).wrap_err_with(|| format!("parse plan {}", p.display()))?;
            Some(PlanDose::new(file_name(p), &plan, &params))
        }
        None => None,
    };

    let mut report = compare_roasts(&logs, &params);
    report.plan = plan;
    tracing::info!(
        ok = report.summaries.len(),
        failed = report.failures.len(),
        plan = report.plan.is_some(),
        "batch comparison finished"
    );

    if report.summaries.is_empty()
        && let Some((path, err)) = report.failures.first()
    {
        return Err(eyre::Report::new(err.clone()).wrap_err(format!(
            "no roast log could be parsed (first failure: {})",
            path.display()
        )));
    }
    if !json {
        for (path, err) in &report.failures {
            eprintln!("skipped {}: {err}", path.display());
        }
    }
    emit(json, report::batch_text(&report), report::batch_json(&report));
    Ok(())
}

pub fn run_profiles(data_dir: &Path, json: bool) -> Result<()> {
    let names = list_profiles(data_dir)
        .wrap_err_with(|| format!("list profiles in {}", data_dir.display()))?;
    let profiles = names
        .iter()
        .map(|name| discover_profile(data_dir, name))
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("read profile folders")?;
    tracing::info!(count = profiles.len(), "profiles listed");
    emit(json, report::profiles_text(&profiles), report::profiles_json(&profiles));
    Ok(())
}

pub fn run_plan(cfg: &Config, file: &Path, horizon: Option<f64>, json: bool) -> Result<()> {
    let plan = parse_plan_path(file).wrap_err_with(|| format!("parse plan {}", file.display()))?;
    let name = file_name(file);
    let params = AnalysisParams::from_config(cfg, Some(&name));

    let fit = |model| theoretical_dose(&plan, params.poly_degree, horizon, model, params.start_time_s);
    let (power, arrh) = (fit(&params.power_law), fit(&params.arrhenius));
    if let Err(e) = &power {
        tracing::warn!(error = %e, "could not fit plan curve");
    }

    let r = PlanReport {
        name,
        dose_power_law: plan_dose(&plan, &params.power_law, params.start_time_s),
        dose_arrhenius: plan_dose(&plan, &params.arrhenius, params.start_time_s),
        poly_degree: power.as_ref().ok().map(|c| c.polynomial.degree()),
        theoretical_power_law: power.ok().map(|c| c.total_dose),
        theoretical_arrhenius: arrh.ok().map(|c| c.total_dose),
        plan,
    };
    emit(json, report::plan_text(&r), report::plan_json(&r));
    Ok(())
}
