#![allow(clippy::too_many_arguments)]

mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod project_timeline;
pub mod reference_data;

#[macro_use]
extern crate is_close;

pub use crate::core::analytics::{AnalysisResult, AnalysisRow};
use crate::core::analytics::run_batch;
use crate::core::multipliers::MultiplierTable;
use crate::core::parameters::ProjectConfiguration;
pub use crate::errors::ChemEconError;
use crate::errors::{CalculationError, PostprocessingError};
use crate::input::{ingest_requests, resolve};
use crate::output::Output;
pub use crate::reference_data::ReferenceData;
use csv::WriterBuilder;
use std::io::{Read, Write};
use tracing::{debug, info};

/// Reads a request document (or a batch of them), runs every analysis against the shared
/// reference data, and writes one result table per request to the output.
pub fn run_project(
    input: impl Read,
    output: impl Output,
    reference_data: &ReferenceData,
) -> Result<Vec<AnalysisResult>, ChemEconError> {
    let requests = ingest_requests(input).map_err(ChemEconError::InvalidRequest)?;
    let configurations = requests
        .iter()
        .map(|request| resolve(request, &reference_data.project_data))
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(ChemEconError::InvalidRequest)?;
    info!(requests = configurations.len(), "running analyses");

    let results = run_projects(&configurations, &reference_data.multipliers)?;
    for result in &results {
        let prices = result.breakeven_prices();
        info!(
            real = prices.real,
            nominal0 = prices.nominal0,
            real_credit_adjusted = prices.real_credit_adjusted,
            nominal_credit_adjusted0 = prices.nominal_credit_adjusted0,
            total_installed_cost = result.total_installed_cost(),
            "breakeven prices calculated"
        );
    }

    if !output.is_noop() {
        write_results(&output, &results)
            .map_err(|e| ChemEconError::ErrorInPostprocessing(PostprocessingError::new(e)))?;
    }

    Ok(results)
}

/// Runs already-resolved configurations in parallel, failing on the first analysis (in input
/// order) that fails.
pub fn run_projects(
    configurations: &[ProjectConfiguration],
    multipliers: &MultiplierTable,
) -> Result<Vec<AnalysisResult>, CalculationError> {
    run_batch(configurations, multipliers).into_iter().collect()
}

/// Location key for the result table of the request at `index`.
pub fn location_key(index: usize, request_count: usize) -> String {
    if request_count == 1 {
        "results".to_string()
    } else {
        format!("results_{index}")
    }
}

fn write_results(output: &impl Output, results: &[AnalysisResult]) -> anyhow::Result<()> {
    for (index, result) in results.iter().enumerate() {
        let location_key = location_key(index, results.len());
        debug!(location_key, "writing result table");
        write_results_csv(output.writer_for_location_key(&location_key)?, result)?;
    }

    Ok(())
}

/// Writes the per-year result rows of one analysis as CSV.
pub fn write_results_csv(writer: impl Write, result: &AnalysisResult) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    for row in result.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::location_key;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0, 1, "results")]
    #[case(0, 3, "results_0")]
    #[case(2, 3, "results_2")]
    fn should_number_location_keys_only_for_batches(
        #[case] index: usize,
        #[case] request_count: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(location_key(index, request_count), expected);
    }
}
