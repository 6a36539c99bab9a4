use crate::core::parameters::{FinancialParameters, OpexMode, PlantMode};
use crate::core::process_yield::ProcessYield;
use crate::core::units::compounding_factor;
use crate::project_timeline::ProjectTimeline;

// This module turns unit prices, the capex schedule and fixed opex into the yearly
// investment/cost stream that the price solver has to recover.

#[derive(Clone, Debug, PartialEq)]
pub struct CostStream {
    pub feed_price: Vec<f64>,
    pub fuel_price: Vec<f64>,
    pub electricity_price: Vec<f64>,
    pub feed_cost: Vec<f64>,
    pub fuel_cost: Vec<f64>,
    pub electricity_cost: Vec<f64>,
    pub carbon_cost: Vec<f64>,
    pub yearly_investment: Vec<f64>,
}

/// Unit price for each year, escalated with inflation only when opex is inflated.
pub fn price_path(
    base_price: f64,
    inflation: f64,
    opex_mode: OpexMode,
    total_periods: usize,
) -> Vec<f64> {
    (0..total_periods)
        .map(|index| match opex_mode {
            OpexMode::Inflated => base_price * compounding_factor(inflation, index),
            OpexMode::Uninflated => base_price,
        })
        .collect()
}

/// Arguments
/// * `timeline` - the project timeline
/// * `process_yield` - yearly physical flows of the plant
/// * `financial` - prices, capex/opex and policy settings
/// * `electricity_efficiency` - conversion efficiency of the electricity source
pub fn build_cost_stream(
    timeline: &ProjectTimeline,
    process_yield: &ProcessYield,
    financial: &FinancialParameters,
    electricity_efficiency: f64,
) -> CostStream {
    let total_periods = timeline.total_periods();
    let price = |base_price| {
        price_path(
            base_price,
            financial.inflation,
            financial.opex_mode,
            total_periods,
        )
    };
    let feed_price = price(financial.feed_price);
    let fuel_price = price(financial.fuel_price);
    let electricity_price = price(financial.electricity_price);

    let feed_cost = (0..total_periods)
        .map(|i| process_yield.feedstock_quantity[i] * feed_price[i])
        .collect::<Vec<_>>();
    let fuel_cost = (0..total_periods)
        .map(|i| process_yield.net_heat[i] * fuel_price[i])
        .collect::<Vec<_>>();
    // efficiency is applied again on top of the division already made for required electricity
    let electricity_cost = (0..total_periods)
        .map(|i| {
            electricity_efficiency * process_yield.required_electricity[i] * electricity_price[i]
        })
        .collect::<Vec<_>>();
    let carbon_cost = (0..total_periods)
        .map(|i| {
            if financial.carbon_valuation.is_enabled() {
                financial.carbon_tax_rate * process_yield.direct_emissions[i]
            } else {
                0.
            }
        })
        .collect::<Vec<_>>();

    let yearly_investment = timeline
        .iter()
        .map(|it| {
            let i = it.index;
            if it.is_construction() {
                match financial.plant_mode {
                    PlantMode::Green => financial.capex_spread[i] * financial.capex,
                    PlantMode::Brown => 0.,
                }
            } else {
                financial.opex + feed_cost[i] + fuel_cost[i] + electricity_cost[i] + carbon_cost[i]
            }
        })
        .collect();

    CostStream {
        feed_price,
        fuel_price,
        electricity_price,
        feed_cost,
        fuel_cost,
        electricity_cost,
        carbon_cost,
        yearly_investment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameters::tests::configuration;
    use crate::core::parameters::{CarbonValuation, ProjectConfiguration};
    use crate::core::process_yield::{calculate_process_yield, utilization_schedule};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn cost_stream_for(configuration: &ProjectConfiguration) -> CostStream {
        let utilization = utilization_schedule(&configuration.timeline, &configuration.utilization);
        let process_yield = calculate_process_yield(&utilization, &configuration.process).unwrap();
        build_cost_stream(
            &configuration.timeline,
            &process_yield,
            &configuration.financial,
            configuration.process.electricity_efficiency,
        )
    }

    #[rstest]
    fn should_inflate_prices_when_opex_inflated() {
        let prices = price_path(100., 0.1, OpexMode::Inflated, 3);
        assert_relative_eq!(prices[0], 100.);
        assert_relative_eq!(prices[1], 110.);
        assert_relative_eq!(prices[2], 121., max_relative = 1e-12);
    }

    #[rstest]
    fn should_hold_prices_when_opex_uninflated() {
        assert_eq!(
            price_path(100., 0.1, OpexMode::Uninflated, 3),
            vec![100., 100., 100.]
        );
    }

    #[rstest]
    fn should_spread_capex_over_construction_years(configuration: ProjectConfiguration) {
        let cost_stream = cost_stream_for(&configuration);
        assert_relative_eq!(cost_stream.yearly_investment[0], 2_000_000.);
        assert_relative_eq!(cost_stream.yearly_investment[1], 5_000_000.);
        assert_relative_eq!(cost_stream.yearly_investment[2], 3_000_000.);
    }

    #[rstest]
    fn should_sum_operating_costs(configuration: ProjectConfiguration) {
        let cost_stream = cost_stream_for(&configuration);
        for i in 3..7 {
            assert_relative_eq!(
                cost_stream.yearly_investment[i],
                500_000.
                    + cost_stream.feed_cost[i]
                    + cost_stream.fuel_cost[i]
                    + cost_stream.electricity_cost[i]
                    + cost_stream.carbon_cost[i]
            );
            assert!(cost_stream.feed_cost[i] > 0.);
        }
    }

    #[rstest]
    fn should_reapply_electricity_efficiency(configuration: ProjectConfiguration) {
        let cost_stream = cost_stream_for(&configuration);
        // year 3: production 175,000 t, so required electricity is 600 * 175,000 / 0.5 kWh
        let required_electricity = 600. * 175_000. / 0.5;
        let price = 0.12 * compounding_factor(0.02, 3);
        assert_relative_eq!(
            cost_stream.electricity_cost[3],
            0.5 * required_electricity * price,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_only_charge_carbon_when_valued(mut configuration: ProjectConfiguration) {
        let cost_stream = cost_stream_for(&configuration);
        assert!(cost_stream.carbon_cost.iter().all(|cost| *cost == 0.));

        configuration.financial.carbon_valuation = CarbonValuation::Yes;
        let cost_stream = cost_stream_for(&configuration);
        // direct emissions in year 3 are 3200 * 175,000 / 0.8 * 0.85
        assert_relative_eq!(
            cost_stream.carbon_cost[3],
            50. * 3200. * 175_000. / 0.8 * 0.85,
            max_relative = 1e-12
        );
        assert_eq!(cost_stream.carbon_cost[0], 0.);
    }

    #[rstest]
    fn should_zero_construction_investment_for_brownfield(mut configuration: ProjectConfiguration) {
        let green = cost_stream_for(&configuration);
        configuration.financial.plant_mode = PlantMode::Brown;
        let brown = cost_stream_for(&configuration);

        assert_eq!(&brown.yearly_investment[..3], &[0., 0., 0.]);
        assert_eq!(&brown.yearly_investment[3..], &green.yearly_investment[3..]);
    }
}
