#![no_main]

use chem_econ::core::analytics::run_analysis;
use chem_econ::core::multipliers::MultiplierTable;
use chem_econ::input::{resolve, AnalysisRequest};
use chem_econ::reference_data::{multipliers_from_csv, ProjectDataTable};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static PROJECT_DATA: LazyLock<ProjectDataTable> = LazyLock::new(|| {
    ProjectDataTable::from_csv(include_str!("../../test_data/project_data.csv").as_bytes())
        .unwrap()
});

static MULTIPLIERS: LazyLock<MultiplierTable> = LazyLock::new(|| {
    multipliers_from_csv(include_str!("../../test_data/sectorwise_multipliers.csv").as_bytes())
        .unwrap()
});

const MAX_PERIODS: usize = 100;

fuzz_target!(|request: AnalysisRequest| {
    // requests this long are rejected on ingestion
    if request.construction_periods.unwrap_or_default() > MAX_PERIODS
        || request.operating_periods.unwrap_or_default() > MAX_PERIODS
    {
        return;
    }
    let Ok(configuration) = resolve(&request, &PROJECT_DATA) else {
        return;
    };
    let _ = run_analysis(&configuration, &MULTIPLIERS);
});
