#![no_main]
use libfuzzer_sys::fuzz_target;
use roast_core::DoseModel;
use roast_core::analysis::{plan_dose, theoretical_dose};

fuzz_target!(|data: &str| {
    if let Ok(plan) = roast_core::parse_plan(data) {
        let model = DoseModel::power_law(DoseModel::DEFAULT_T_BASE);
        let _ = plan_dose(&plan, &model, 0.0);
        let _ = theoretical_dose(&plan, 3, None, &model, 0.0);
    }
});
