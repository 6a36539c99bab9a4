use crate::compare_floats::max_of_2;
use crate::core::parameters::{ProcessParameters, UtilizationRamp};
use crate::core::units::KILOGRAMS_PER_TONNE;
use crate::errors::CalculationError;
use crate::project_timeline::ProjectTimeline;

// This module converts the technical description of a plant into yearly physical flows:
// production, feedstock, heat and electricity demand, and emissions.

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessYield {
    pub production: Vec<f64>,
    pub feedstock_quantity: Vec<f64>,
    pub fuel_gas_recovered: Vec<f64>,
    pub required_heat: Vec<f64>,
    pub net_heat: Vec<f64>,
    pub required_electricity: Vec<f64>,
    pub direct_emissions: Vec<f64>,
    pub indirect_emissions: Vec<f64>,
}

/// Capacity utilisation per year: zero while building, then the ramp values.
pub fn utilization_schedule(timeline: &ProjectTimeline, ramp: &UtilizationRamp) -> Vec<f64> {
    timeline
        .iter()
        .map(|it| match it.operating_index(timeline) {
            None => 0.,
            Some(0) => ramp.first_year,
            Some(1) => ramp.second_year,
            Some(_) => ramp.steady_state,
        })
        .collect()
}

/// Arguments
/// * `utilization` - capacity utilisation for each year of the timeline
/// * `params` - technical parameters of the process
pub fn calculate_process_yield(
    utilization: &[f64],
    params: &ProcessParameters,
) -> Result<ProcessYield, CalculationError> {
    if params.process_yield <= 0. || params.process_yield > 1. {
        return Err(CalculationError::invalid_parameter(
            "process_yield",
            format!("must be in (0, 1], got {}", params.process_yield),
        ));
    }
    for (parameter, efficiency) in [
        ("heat_efficiency", params.heat_efficiency),
        ("electricity_efficiency", params.electricity_efficiency),
    ] {
        if efficiency <= 0. || efficiency > 1. {
            return Err(CalculationError::invalid_parameter(
                parameter,
                format!("must be in (0, 1], got {efficiency}"),
            ));
        }
    }

    let periods = utilization.len();
    let mut process_yield = ProcessYield {
        production: Vec::with_capacity(periods),
        feedstock_quantity: Vec::with_capacity(periods),
        fuel_gas_recovered: Vec::with_capacity(periods),
        required_heat: Vec::with_capacity(periods),
        net_heat: Vec::with_capacity(periods),
        required_electricity: Vec::with_capacity(periods),
        direct_emissions: Vec::with_capacity(periods),
        indirect_emissions: Vec::with_capacity(periods),
    };

    for utilization in utilization {
        let production = utilization * params.capacity;
        let feedstock_quantity = production / params.process_yield;
        // light ends from the yield loss are burnt as fuel gas and offset the heat duty
        let fuel_gas_recovered =
            params.feed_energy_content * (1. - params.process_yield) * feedstock_quantity;
        let required_heat = params.heat_requirement * production / params.heat_efficiency;
        let net_heat = max_of_2(0., required_heat - fuel_gas_recovered);
        let required_electricity =
            params.electricity_requirement * production / params.electricity_efficiency;

        process_yield.production.push(production);
        process_yield.feedstock_quantity.push(feedstock_quantity);
        process_yield.fuel_gas_recovered.push(fuel_gas_recovered);
        process_yield.required_heat.push(required_heat);
        process_yield.net_heat.push(net_heat);
        process_yield.required_electricity.push(required_electricity);
        process_yield
            .direct_emissions
            .push(required_heat * params.feed_carbon_content);
        process_yield.indirect_emissions.push(
            required_electricity * params.natural_gas_carbon_content / KILOGRAMS_PER_TONNE,
        );
    }

    Ok(process_yield)
}
