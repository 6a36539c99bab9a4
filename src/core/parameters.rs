use crate::compare_floats::within_tolerance;
use crate::errors::CalculationError;
use crate::project_timeline::ProjectTimeline;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum distance the capex spread fractions may sum to away from 1.
pub const CAPEX_SPREAD_TOLERANCE: f64 = 0.01;

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum FundingMode {
    Debt,
    Equity,
    Mixed,
}

/// Green is a new build; Brown is an expansion of an existing plant.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PlantMode {
    Green,
    Brown,
}

impl PlantMode {
    /// Label describing what the breakeven prices represent for this plant mode.
    pub fn cost_mode_label(&self) -> &'static str {
        match self {
            PlantMode::Green => "Supply Cost",
            PlantMode::Brown => "Cash Cost",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum OpexMode {
    Inflated,
    Uninflated,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum CarbonValuation {
    Yes,
    No,
}

impl CarbonValuation {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CarbonValuation::Yes)
    }
}

/// Capacity utilisation for the first operating year, the second, and every year after.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct UtilizationRamp {
    pub first_year: f64,
    pub second_year: f64,
    pub steady_state: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProcessParameters {
    /// Plant capacity (t/yr)
    pub capacity: f64,
    /// Product out per unit of feedstock in, in (0, 1]
    pub process_yield: f64,
    /// Energy content of feedstock (MJ/kg)
    pub feed_energy_content: f64,
    /// CO2 content of feedstock (kg CO2/kg)
    pub feed_carbon_content: f64,
    /// Heat requirement (MJ/t product)
    pub heat_requirement: f64,
    /// Electricity requirement (kWh/t product)
    pub electricity_requirement: f64,
    /// Energy content of natural gas (GJ/t)
    pub natural_gas_energy_content: f64,
    /// CO2 content of natural gas (kg CO2/GJ), used as the grid carbon intensity
    pub natural_gas_carbon_content: f64,
    pub heat_efficiency: f64,
    pub electricity_efficiency: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FinancialParameters {
    pub inflation: f64,
    pub debt_rate: f64,
    pub equity_hurdle_rate: f64,
    pub funding_mode: FundingMode,
    /// Only consulted in Mixed funding mode.
    pub debt_share: f64,
    pub owner_cost: f64,
    pub corporate_tax_rate: f64,
    pub credit_fraction: f64,
    /// Fraction of CAPEX spent in each construction year.
    pub capex_spread: Vec<f64>,
    pub carbon_tax_rate: f64,
    pub carbon_valuation: CarbonValuation,
    pub feed_price: f64,
    pub fuel_price: f64,
    pub electricity_price: f64,
    pub opex_mode: OpexMode,
    pub capex: f64,
    pub opex: f64,
    pub plant_mode: PlantMode,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MacroParameters {
    /// Sector code used to select rows from the multiplier table, e.g. "USA_C20".
    pub sector_code: String,
    /// Share of construction-year investment attributed to the primary (process) channel; the
    /// remainder goes to the construction channel.
    pub primary_share: f64,
}

/// A fully resolved set of inputs for one analysis.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProjectConfiguration {
    pub timeline: ProjectTimeline,
    pub utilization: UtilizationRamp,
    pub process: ProcessParameters,
    pub financial: FinancialParameters,
    pub macro_parameters: MacroParameters,
}

impl ProjectConfiguration {
    /// Checks the inputs the engine cannot compute with, before any computation happens.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.timeline.construction_periods() < 1 {
            return Err(CalculationError::invalid_parameter(
                "construction_periods",
                "at least one construction period is required",
            ));
        }
        if self.timeline.last_year().is_none() {
            return Err(CalculationError::invalid_parameter(
                "base_year",
                format!(
                    "{} periods from {} run past the last representable year",
                    self.timeline.total_periods(),
                    self.timeline.base_year()
                ),
            ));
        }

        check_unit_interval_exclusive_of_zero("process_yield", self.process.process_yield)?;
        check_unit_interval_exclusive_of_zero("heat_efficiency", self.process.heat_efficiency)?;
        check_unit_interval_exclusive_of_zero(
            "electricity_efficiency",
            self.process.electricity_efficiency,
        )?;

        let capex_spread = &self.financial.capex_spread;
        if capex_spread.len() != self.timeline.construction_periods() {
            return Err(CalculationError::invalid_parameter(
                "capex_spread",
                format!(
                    "expected {} values (one per construction period), got {}",
                    self.timeline.construction_periods(),
                    capex_spread.len()
                ),
            ));
        }
        let spread_total = capex_spread.iter().sum::<f64>();
        if !within_tolerance(spread_total, 1., CAPEX_SPREAD_TOLERANCE) {
            return Err(CalculationError::invalid_parameter(
                "capex_spread",
                format!("values must sum to 1.0, but sum to {spread_total}"),
            ));
        }

        if self.financial.funding_mode == FundingMode::Mixed
            && !(0. ..=1.).contains(&self.financial.debt_share)
        {
            return Err(CalculationError::invalid_parameter(
                "debt_share",
                format!(
                    "must be between 0 and 1 in Mixed funding mode, got {}",
                    self.financial.debt_share
                ),
            ));
        }

        Ok(())
    }
}

fn check_unit_interval_exclusive_of_zero(
    parameter: &'static str,
    value: f64,
) -> Result<(), CalculationError> {
    if value > 0. && value <= 1. {
        Ok(())
    } else {
        Err(CalculationError::invalid_parameter(
            parameter,
            format!("must be greater than 0 and at most 1, got {value}"),
        ))
    }
}
