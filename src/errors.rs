use crate::core::multipliers::ImpactType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChemEconError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during economics calculation: {0}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error during postprocessing: {0}")]
    ErrorInPostprocessing(PostprocessingError),
}

/// Errors raised by the calculation engine itself. Every one of these is terminal for the
/// invocation that raised it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
    #[error("Degenerate model: {0}")]
    DegenerateModel(String),
    #[error("Expected exactly one multiplier row for sector '{sector_code}' and impact type '{impact_type}', found {matches}")]
    MissingMultiplier {
        sector_code: String,
        impact_type: ImpactType,
        matches: usize,
    },
}

impl CalculationError {
    pub(crate) fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostprocessingError {
    error: anyhow::Error,
}

impl PostprocessingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
