//! Text and JSON rendering of analysis results, plus CSV export.

use std::fmt::Write as _;
use std::path::Path;

use eyre::{Result, WrapErr};
use roast_core::analysis::{MilestoneRow, PhaseMetric, PlanComparisonRow};
use roast_core::batch::{BatchReport, ChannelDose};
use roast_core::profiles::ProfileFiles;
use roast_core::series::TIME_SECONDS;
use roast_core::time::format_mmss;
use roast_core::{Channel, Plan, Series};
use serde_json::{Value, json};

/// Plan-related part of an `analyze` run.
#[derive(Debug, Clone)]
pub struct PlanSection {
    pub name: String,
    pub rows: Vec<PlanComparisonRow>,
    pub dose_power_law: f64,
    pub dose_arrhenius: f64,
    /// Power-law dose of the fitted plan curve over the roast duration.
    pub theoretical: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AnalyzeReport {
    pub name: String,
    pub samples: usize,
    pub duration_s: Option<f64>,
    pub channel: Channel,
    pub milestones: Vec<(String, f64)>,
    pub doses: Vec<ChannelDose>,
    pub phases: Vec<PhaseMetric>,
    /// Power-law milestone doses.
    pub milestone_rows: Vec<MilestoneRow>,
    pub milestone_rows_arrhenius: Vec<MilestoneRow>,
    pub plan: Option<PlanSection>,
}

/// Expected dose of a plan on its own.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub name: String,
    pub plan: Plan,
    pub dose_power_law: f64,
    pub dose_arrhenius: f64,
    pub theoretical_power_law: Option<f64>,
    pub theoretical_arrhenius: Option<f64>,
    pub poly_degree: Option<usize>,
}

fn opt_num(v: Option<f64>, decimals: usize) -> String {
    v.filter(|x| x.is_finite())
        .map_or_else(|| "-".to_string(), |x| format!("{x:.decimals$}"))
}

fn opt_time(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), format_mmss)
}

// ── analyze ──────────────────────────────────────────────────────────────────

pub fn analyze_text(r: &AnalyzeReport) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "Roast: {} ({} samples, duration {})",
        r.name,
        r.samples,
        opt_time(r.duration_s)
    );

    s.push_str("\nMilestones:\n");
    for (name, t) in &r.milestones {
        let _ = writeln!(s, "  {name:<16} {}", format_mmss(*t));
    }

    s.push_str("\nFinal thermal dose:\n");
    for d in &r.doses {
        let _ = writeln!(
            s,
            "  {:<6} power_law {:>10.2}  arrhenius {:>12.6}",
            d.channel.suffix(),
            d.power_law,
            d.arrhenius
        );
    }

    let _ = writeln!(s, "\nPhases ({} RoR):", r.channel);
    for p in &r.phases {
        let _ = writeln!(
            s,
            "  {:<32} {:>6} - {:<6} mean RoR {}",
            p.label(),
            format_mmss(p.start),
            format_mmss(p.end),
            opt_num(p.mean_ror, 1)
        );
    }

    let _ = writeln!(s, "\nMilestone doses ({}, power_law):", r.channel);
    milestone_rows_text(&mut s, &r.milestone_rows, 2, 3);
    let _ = writeln!(s, "\nMilestone doses ({}, arrhenius):", r.channel);
    milestone_rows_text(&mut s, &r.milestone_rows_arrhenius, 6, 9);

    if let Some(plan) = &r.plan {
        let _ = writeln!(s, "\nPlan vs actual ({}):", plan.name);
        for row in &plan.rows {
            let _ = writeln!(
                s,
                "  {:<16} plan {:>6} @ {:>6}  actual {:>6} @ {:>6}",
                row.phase,
                opt_time(row.plan_time),
                opt_num(row.plan_temp, 1),
                opt_time(row.actual_time),
                opt_num(row.actual_temp, 1)
            );
        }
        let _ = writeln!(
            s,
            "  plan dose: power_law {:.2}  arrhenius {:.6}  fitted curve {}",
            plan.dose_power_law,
            plan.dose_arrhenius,
            opt_num(plan.theoretical, 2)
        );
    }
    s
}

fn milestone_rows_text(s: &mut String, rows: &[MilestoneRow], dose_decimals: usize, weight_decimals: usize) {
    for m in rows {
        let _ = writeln!(
            s,
            "  {:<16} {:>6}  temp {:>6}  dose {:>12}  weight {:>12}",
            m.name,
            format_mmss(m.time),
            opt_num(m.temp, 1),
            opt_num(m.dose, dose_decimals),
            opt_num(m.weight, weight_decimals)
        );
    }
}

fn milestone_rows_json(rows: &[MilestoneRow]) -> Vec<Value> {
    rows.iter()
        .map(|m| json!({ "name": m.name, "time": m.time, "temp": m.temp, "dose": m.dose, "weight": m.weight }))
        .collect()
}

fn dose_json(d: &ChannelDose) -> Value {
    json!({
        "channel": d.channel.suffix(),
        "power_law": d.power_law,
        "arrhenius": d.arrhenius,
    })
}

pub fn analyze_json(r: &AnalyzeReport) -> Value {
    let milestones: serde_json::Map<String, Value> = r
        .milestones
        .iter()
        .map(|(n, t)| (n.clone(), json!(t)))
        .collect();
    let phases: Vec<Value> = r
        .phases
        .iter()
        .map(|p| json!({ "from": p.from, "to": p.to, "start": p.start, "end": p.end, "mean_ror": p.mean_ror }))
        .collect();
    let plan = r.plan.as_ref().map(|p| {
        let rows: Vec<Value> = p
            .rows
            .iter()
            .map(|row| {
                json!({
                    "phase": row.phase,
                    "plan_time": row.plan_time,
                    "plan_temp": row.plan_temp,
                    "matched": row.matched,
                    "actual_time": row.actual_time,
                    "actual_temp": row.actual_temp,
                })
            })
            .collect();
        json!({
            "name": p.name,
            "stages": rows,
            "dose_power_law": p.dose_power_law,
            "dose_arrhenius": p.dose_arrhenius,
            "theoretical_dose": p.theoretical,
        })
    });
    json!({
        "file": r.name,
        "samples": r.samples,
        "duration_s": r.duration_s,
        "channel": r.channel.suffix(),
        "milestones": milestones,
        "final_dose": r.doses.iter().map(dose_json).collect::<Vec<_>>(),
        "phases": phases,
        "milestone_doses": milestone_rows_json(&r.milestone_rows),
        "milestone_doses_arrhenius": milestone_rows_json(&r.milestone_rows_arrhenius),
        "plan": plan,
    })
}

// ── compare ──────────────────────────────────────────────────────────────────

pub fn batch_text(report: &BatchReport) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<28} {:>8} {:>12} {:>14} {:>12} {:>14}",
        "file", "duration", "ibts_dose", "ibts_arrh", "probe_dose", "probe_arrh"
    );
    for r in &report.summaries {
        let env = r.dose(Channel::Env);
        let probe = r.dose(Channel::Probe);
        let _ = writeln!(
            s,
            "{:<28} {:>8} {:>12} {:>14} {:>12} {:>14}",
            r.name(),
            opt_time(r.duration_s),
            opt_num(env.map(|d| d.power_law), 2),
            opt_num(env.map(|d| d.arrhenius), 6),
            opt_num(probe.map(|d| d.power_law), 2),
            opt_num(probe.map(|d| d.arrhenius), 6)
        );
    }
    if let Some(plan) = &report.plan {
        let _ = writeln!(
            s,
            "{:<28} {:>8} {:>12.2} {:>14.6}",
            format!("PLAN {}", plan.name),
            "-",
            plan.power_law,
            plan.arrhenius
        );
    }
    s
}

pub fn batch_json(report: &BatchReport) -> Value {
    let roasts: Vec<Value> = report
        .summaries
        .iter()
        .map(|r| {
            json!({
                "file": r.name(),
                "samples": r.samples,
                "duration_s": r.duration_s,
                "agtron": r.agtron,
                "final_dose": r.doses.iter().map(dose_json).collect::<Vec<_>>(),
            })
        })
        .collect();
    let failures: Vec<Value> = report
        .failures
        .iter()
        .map(|(p, e)| json!({ "file": p.display().to_string(), "error": e.to_string() }))
        .collect();
    let plan = report.plan.as_ref().map(|p| {
        json!({ "name": p.name, "power_law": p.power_law, "arrhenius": p.arrhenius })
    });
    json!({ "roasts": roasts, "failures": failures, "plan": plan })
}

// ── profiles ─────────────────────────────────────────────────────────────────

pub fn profiles_text(profiles: &[ProfileFiles]) -> String {
    let mut s = String::new();
    for p in profiles {
        let plan = p
            .plan
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "-".to_string(), |n| n.to_string_lossy().into_owned());
        let _ = writeln!(s, "{:<24} plan {:<24} roasts {}", p.name, plan, p.roasts.len());
    }
    s
}

pub fn profiles_json(profiles: &[ProfileFiles]) -> Value {
    let list: Vec<Value> = profiles
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "plan": p.plan.as_ref().map(|x| x.display().to_string()),
                "roasts": p.roasts.iter().map(|x| x.display().to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "profiles": list })
}

// ── plan ─────────────────────────────────────────────────────────────────────

pub fn plan_text(r: &PlanReport) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Plan: {} ({} stages)", r.name, r.plan.len());
    for st in &r.plan.stages {
        let _ = write!(
            s,
            "  {:<16} {:>6}  temp {:>6}",
            st.phase,
            opt_time(st.time_seconds),
            opt_num(st.target_temp, 1)
        );
        if r.plan.has_fan {
            let _ = write!(s, "  fan {:>4}", opt_num(st.fan, 0));
        }
        if r.plan.has_power {
            let _ = write!(s, "  power {:>4}", opt_num(st.power, 0));
        }
        s.push('\n');
    }
    let _ = writeln!(
        s,
        "\nPlan-point dose: power_law {:.2}  arrhenius {:.6}",
        r.dose_power_law, r.dose_arrhenius
    );
    let _ = writeln!(
        s,
        "Fitted curve (degree {}): power_law {}  arrhenius {}",
        r.poly_degree.map_or_else(|| "-".to_string(), |d| d.to_string()),
        opt_num(r.theoretical_power_law, 2),
        opt_num(r.theoretical_arrhenius, 6)
    );
    s
}

pub fn plan_json(r: &PlanReport) -> Value {
    let stages: Vec<Value> = r
        .plan
        .stages
        .iter()
        .map(|st| {
            json!({
                "phase": st.phase,
                "time_s": st.time_seconds,
                "target_temp": st.target_temp,
                "fan": st.fan,
                "power": st.power,
            })
        })
        .collect();
    json!({
        "plan": r.name,
        "stages": stages,
        "dose_power_law": r.dose_power_law,
        "dose_arrhenius": r.dose_arrhenius,
        "poly_degree": r.poly_degree,
        "theoretical_power_law": r.theoretical_power_law,
        "theoretical_arrhenius": r.theoretical_arrhenius,
    })
}

// ── CSV export ───────────────────────────────────────────────────────────────

/// Write `series` with a `Time_Seconds` column first; `NaN` cells stay empty.
pub fn write_csv(series: &Series, path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("create output CSV {}", path.display()))?;
    let names: Vec<&str> = series.column_names().collect();
    let mut header = vec![TIME_SECONDS];
    header.extend(&names);
    w.write_record(&header)?;

    let cell = |v: f64| if v.is_nan() { String::new() } else { v.to_string() };
    for (i, t) in series.time().iter().enumerate() {
        let mut row = vec![cell(*t)];
        row.extend(
            names
                .iter()
                .map(|n| series.column(n).map_or_else(String::new, |c| cell(c[i]))),
        );
        w.write_record(&row)?;
    }
    w.flush().wrap_err("flush output CSV")?;
    tracing::info!(path = %path.display(), rows = series.len(), "wrote derived series");
    Ok(())
}
