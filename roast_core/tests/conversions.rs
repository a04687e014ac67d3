use roast_config::load_toml;
use roast_core::{AnalysisParams, DoseModel, FiniteDifference, RorMethod, SavitzkyGolay};

#[test]
fn defaults_match_engine_defaults() {
    let cfg = load_toml("").unwrap();
    assert_eq!(AnalysisParams::from(&cfg), AnalysisParams::default());
}

#[test]
fn config_selects_estimators_and_kinetics() {
    let cfg = load_toml(
        r#"
[ror.env]
method = "sg"
window_length = 11
polyorder = 3

[ror.probe]
window_s = 20.0

[dose]
t_base = 105.0
start_time_s = 0.0

[plans."Kenya.csv"]
ea = 30.0
"#,
    )
    .unwrap();

    let p = AnalysisParams::from_config(&cfg, Some("Kenya.csv"));
    assert_eq!(
        p.ror_env,
        RorMethod::SavitzkyGolay(SavitzkyGolay {
            window_length: 11,
            polyorder: 3,
            deriv: 1,
        })
    );
    assert_eq!(
        p.ror_probe,
        RorMethod::MovingAverage(FiniteDifference { window_seconds: 20.0 })
    );
    assert_eq!(p.power_law, DoseModel::power_law(105.0));
    assert_eq!(
        p.arrhenius,
        DoseModel::Arrhenius {
            a: 0.788,
            ea: 30.0,
            r: 0.008_314,
        }
    );
    assert_eq!(p.start_time_s, 0.0);

    let other = AnalysisParams::from_config(&cfg, Some("Brazil.csv"));
    assert_eq!(other.arrhenius, DoseModel::arrhenius_default());
}
