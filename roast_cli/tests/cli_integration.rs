use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

// Ten-minute roast sampled every 10 s with a dip around the turning point
fn roast_log() -> String {
    let mut s = String::from(
        "Roast Name,Guji\nYellowing,,Start time\n,,4:30\n1st Crack\n,,Start time\n,,8:20\nTimeline\n\
         Time,IBTS Temp,IBTS ROR,Bean Probe Temp,Bean Probe ROR,Fan,Power\n",
    );
    for i in 0..=60 {
        let t = i * 10;
        let ibts = if t < 60 { 220 - t } else { 160 + (t - 60) / 10 };
        let probe = 30 + t / 5;
        s.push_str(&format!("{}:{:02},{ibts},,{probe},,5,7\n", t / 60, t % 60));
    }
    s
}

const PLAN: &str = "Faza,Czas,Temperatura,Fan\nStart,0:00,210,5\nYellowing,4:30,165,6\n1st Crack,8:15,200,8\n";

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn roast() -> Command {
    Command::cargo_bin("roast").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["analyze"], 2, "required", "stderr")]
#[case(&["analyze", "--log", "{dir}/missing.csv"], 3, "could not be read", "stderr")]
#[case(&["analyze", "--log", "{dir}/nomarker.csv"], 4, "no 'Timeline' section", "stderr")]
#[case(&["analyze", "--log", "{dir}/notime.csv"], 4, "columns found: Temp, Fan", "stderr")]
#[case(&["analyze", "--log", "{dir}/roast.csv"], 0, "Final thermal dose", "stdout")]
#[case(&["analyze", "--log", "{dir}/roast.csv", "--plan", "{dir}/plan.csv"], 0, "Plan vs actual (plan.csv)", "stdout")]
#[case(&["plan", "{dir}/plan.csv"], 0, "Plan-point dose", "stdout")]
#[case(&["plan", "{dir}/twocol.csv"], 4, "no time column", "stderr")]
#[case(&["compare", "{dir}/roast.csv", "{dir}/nomarker.csv"], 0, "roast.csv", "stdout")]
#[case(&["compare", "{dir}/roast.csv", "{dir}/nomarker.csv"], 0, "skipped", "stderr")]
#[case(&["compare", "{dir}/nomarker.csv"], 4, "no 'Timeline' section", "stderr")]
#[case(&["compare"], 2, "required", "stderr")]
#[case(&["compare", "{dir}/roast.csv", "--plan", "{dir}/plan.csv"], 0, "PLAN plan.csv", "stdout")]
#[case(&["compare", "--profile", "Nope", "--data-dir", "{dir}"], 3, "could not be read", "stderr")]
#[case(&["analyze", "--log", "{dir}/roast.csv"], 0, "Milestone doses (ibts, arrhenius)", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    write(&dir, "roast.csv", &roast_log());
    write(&dir, "plan.csv", PLAN);
    write(&dir, "nomarker.csv", "Time,IBTS Temp\n0:00,200\n");
    write(&dir, "notime.csv", "Timeline\nTemp,Fan\n200,5\n");
    write(&dir, "twocol.csv", "Phase,Temp\nStart,200\n");

    let mut cmd = roast();
    let root = dir.path().display().to_string();
    for a in args {
        cmd.arg(a.replace("{dir}", &root));
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn analyze_json_report() {
    let dir = tempdir().unwrap();
    let log = write(&dir, "roast.csv", &roast_log());

    let out = roast()
        .arg("--json")
        .arg("analyze")
        .arg("--log")
        .arg(&log)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["file"], "roast.csv");
    assert_eq!(v["samples"], 61);
    assert_eq!(v["milestones"]["Yellowing"], 270.0);
    assert_eq!(v["milestones"]["Drop"], 600.0);
    assert_eq!(v["final_dose"].as_array().unwrap().len(), 2);
    assert!(v["final_dose"][0]["power_law"].as_f64().unwrap() > 0.0);
    assert!(v["plan"].is_null());
    let arrh = v["milestone_doses_arrhenius"].as_array().unwrap();
    assert_eq!(arrh.len(), v["milestone_doses"].as_array().unwrap().len());
    assert!(arrh.iter().any(|r| r["dose"].as_f64().is_some_and(|d| d > 0.0)));
}

fn profile_dir(dir: &TempDir) -> PathBuf {
    let data = dir.path().join("data");
    let kenya = data.join("Kenya");
    fs::create_dir_all(kenya.join("Plan")).unwrap();
    fs::create_dir_all(kenya.join("Wypały")).unwrap();
    fs::create_dir_all(data.join("Brazil")).unwrap();
    fs::write(kenya.join("Plan").join("kenya_plan.csv"), PLAN).unwrap();
    fs::write(kenya.join("Wypały").join("r1.csv"), roast_log()).unwrap();
    fs::write(kenya.join("Wypały").join("r2.csv"), roast_log()).unwrap();
    data
}

#[test]
fn compare_profile_uses_its_plan_and_logs() {
    let dir = tempdir().unwrap();
    let data = profile_dir(&dir);

    let out = roast()
        .args(["--json", "compare", "--profile", "Kenya", "--data-dir"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let roasts = v["roasts"].as_array().unwrap();
    assert_eq!(roasts.len(), 2);
    assert_eq!(roasts[0]["file"], "r1.csv");
    assert_eq!(v["plan"]["name"], "kenya_plan.csv");
    assert!(v["plan"]["power_law"].as_f64().unwrap() > 0.0);
    assert!(v["plan"]["arrhenius"].as_f64().unwrap() > 0.0);
}

#[test]
fn profiles_lists_each_folder() {
    let dir = tempdir().unwrap();
    let data = profile_dir(&dir);

    roast()
        .arg("profiles")
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("Brazil"))
        .stdout(predicate::str::contains("kenya_plan.csv"))
        .stdout(predicate::str::contains("roasts 2"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let log = write(&dir, "notime.csv", "Timeline\nTemp,Fan\n200,5\n");

    let out = roast()
        .args(["--json", "analyze", "--log"])
        .arg(&log)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    let v: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(v["reason"], "MissingTimeColumn");
    assert_eq!(v["details"]["available_columns"][0], "Temp");
}

#[test]
fn derived_series_is_exported() {
    let dir = tempdir().unwrap();
    let log = write(&dir, "roast.csv", &roast_log());
    let csv = dir.path().join("derived.csv");

    roast()
        .arg("analyze")
        .arg("--log")
        .arg(&log)
        .arg("--out")
        .arg(&csv)
        .assert()
        .success();

    let text = fs::read_to_string(&csv).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("Time_Seconds,"));
    for col in [
        "ror_ibts",
        "ror_raw_ibts",
        "ror_probe",
        "thermal_dose_ibts",
        "thermal_dose_arrhenius_probe",
    ] {
        assert!(header.contains(col), "{header}");
    }
    assert_eq!(text.lines().count(), 62);
}

fn config(dir: &TempDir, body: &str) -> PathBuf {
    write(dir, "roast.toml", body)
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, "[ror.env]\nwindow_s = 0.0\n");
    let log = write(&dir, "roast.csv", &roast_log());

    roast()
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg("--log")
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"))
        .stderr(predicate::str::contains("window_s"));
}

#[test]
fn plan_kinetics_override_changes_arrhenius_dose() {
    let dir = tempdir().unwrap();
    let plan = write(&dir, "plan.csv", PLAN);
    let cfg = config(&dir, "[plans.\"plan.csv\"]\na = 1.576\n");

    let dose = |cfg: Option<&Path>| -> f64 {
        let mut cmd = roast();
        if let Some(c) = cfg {
            cmd.arg("--config").arg(c);
        }
        let out = cmd.arg("--json").arg("plan").arg(&plan).output().unwrap();
        assert!(out.status.success());
        let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        v["dose_arrhenius"].as_f64().unwrap()
    };
    let base = dose(None);
    let doubled = dose(Some(&cfg));
    assert!((doubled - 2.0 * base).abs() < 1e-9 * base.max(1.0));
}
