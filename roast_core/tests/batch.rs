use roast_core::analysis::plan_dose;
use roast_core::batch::{PlanDose, compare_roasts};
use roast_core::{AnalysisParams, Channel, ParseError, parse_plan};

fn flat_log(temp: f64) -> String {
    let mut s = String::from("Roast Name,Test\nTimeline\nTime,IBTS Temp\n");
    for i in 0..=6 {
        s.push_str(&format!("0:{:02},{temp}\n", i * 10));
    }
    s
}

#[test]
fn failing_files_do_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good_a = dir.path().join("a.csv");
    let bad = dir.path().join("bad.csv");
    let good_b = dir.path().join("b.csv");
    let missing = dir.path().join("missing.csv");
    std::fs::write(&good_a, flat_log(100.0)).unwrap();
    std::fs::write(&bad, "no marker here\n").unwrap();
    std::fs::write(&good_b, flat_log(110.0)).unwrap();

    let paths = [&good_a, &bad, &good_b, &missing];
    let report = compare_roasts(&paths, &AnalysisParams::default());

    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.summaries[0].name(), "a.csv");
    assert_eq!(report.summaries[1].name(), "b.csv");
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].1, ParseError::MissingTimeline);
    assert!(matches!(report.failures[1].1, ParseError::Unreadable(_)));

    // Default threshold of 5 s: samples 10..=60 contribute 50 s at weight 1.
    let a = report.summaries[0].dose(Channel::Env).unwrap();
    assert!((a.power_law - 50.0).abs() < 1e-9);
    let b = report.summaries[1].dose(Channel::Env).unwrap();
    assert!((b.power_law - 100.0).abs() < 1e-9);
    assert!(b.arrhenius > a.arrhenius);
    assert!(report.summaries[0].dose(Channel::Probe).is_none());
    assert_eq!(report.summaries[0].duration_s, Some(60.0));
    assert_eq!(report.summaries[0].milestones.get("Drop"), Some(60.0));
}

#[test]
fn empty_batch() {
    let paths: [&str; 0] = [];
    assert!(compare_roasts(&paths, &AnalysisParams::default()).is_empty());
}

#[test]
fn plan_dose_row_uses_both_models() {
    let plan = parse_plan("Faza,Czas,Temperatura\nStart,0:00,150\nMid,0:30,150\nDrop,1:00,150\n").unwrap();
    let params = AnalysisParams::default();
    let row = PlanDose::new("plan.csv", &plan, &params);
    assert_eq!(row.name, "plan.csv");
    assert_eq!(row.power_law, plan_dose(&plan, &params.power_law, params.start_time_s));
    assert_eq!(row.arrhenius, plan_dose(&plan, &params.arrhenius, params.start_time_s));
    assert!(row.power_law > 0.0);
    assert!(row.arrhenius > 0.0);

    let mut report = compare_roasts(&[] as &[&str], &params);
    assert!(report.plan.is_none());
    report.plan = Some(row);
    assert!(report.summaries.is_empty());
}
