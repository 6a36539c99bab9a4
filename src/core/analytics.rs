use crate::core::breakeven::{
    discover_prices, solve_breakeven_prices, BreakevenPrices, BreakevenSolution, DiscountBasis,
    PriceDiscovery,
};
use crate::core::cost_stream::{build_cost_stream, CostStream};
use crate::core::financing::FinancingTerms;
use crate::core::macro_impact::{propagate, MacroImpact, SpendingChannels};
use crate::core::multipliers::MultiplierTable;
use crate::core::parameters::{CarbonValuation, FundingMode, PlantMode, ProjectConfiguration};
use crate::core::process_yield::{calculate_process_yield, utilization_schedule, ProcessYield};
use crate::core::tax_waterfall::{corporate_tax_rates, tax_payable};
use crate::core::units::{compounding_factor, cumulative_sum, REPORTING_DIVISOR};
use crate::errors::CalculationError;
use crate::project_timeline::ProjectTimeline;
use itertools::izip;
use rayon::prelude::*;
use serde::Serialize;

/// Runs one analysis end to end: process yield, cost stream, financing, tax, the two price passes
/// and the macroeconomic impacts.
pub fn run_analysis(
    configuration: &ProjectConfiguration,
    multipliers: &MultiplierTable,
) -> Result<AnalysisResult, CalculationError> {
    configuration.validate()?;

    let timeline = configuration.timeline;
    let financial = &configuration.financial;

    let utilization = utilization_schedule(&timeline, &configuration.utilization);
    let process_yield = calculate_process_yield(&utilization, &configuration.process)?;
    let cost_stream = build_cost_stream(
        &timeline,
        &process_yield,
        financial,
        configuration.process.electricity_efficiency,
    );
    let investment = &cost_stream.yearly_investment;
    let production = &process_yield.production;

    let financing_terms = FinancingTerms::new(financial);
    let mut bank_charges =
        financing_terms.initial_bank_charges(&timeline, financial.plant_mode, investment);
    let tax_rates = corporate_tax_rates(&timeline, financial.corporate_tax_rate);
    let basis = DiscountBasis {
        discount_rate: financing_terms.discount_rate(),
        inflation: financial.inflation,
    };

    let price_discovery =
        discover_prices(production, investment, &bank_charges, &tax_rates, basis)?;
    financing_terms.apply_revolving_adjustment(
        &timeline,
        &price_discovery.net_revenue,
        &mut bank_charges,
    );

    let tax = tax_payable(
        &timeline,
        financial.plant_mode,
        &price_discovery.net_revenue,
        &tax_rates,
        investment,
        financial.owner_cost,
    );
    let breakeven = solve_breakeven_prices(
        production,
        investment,
        &bank_charges,
        &price_discovery.net_revenue,
        &tax,
        financial.credit_fraction,
        basis,
    )?;

    let channels = SpendingChannels::new(
        &timeline,
        investment,
        financial.opex,
        &bank_charges,
        configuration.macro_parameters.primary_share,
    );
    let macro_impact = propagate(
        &timeline,
        &channels,
        multipliers,
        &configuration.macro_parameters.sector_code,
        investment,
        production,
        breakeven.prices.real,
    )?;

    let total_installed_cost = financial.capex + bank_charges.iter().sum::<f64>();

    Ok(AnalysisResult {
        timeline,
        plant_mode: financial.plant_mode,
        funding_mode: financial.funding_mode,
        carbon_valuation: financial.carbon_valuation,
        feed_price: financial.feed_price,
        inflation: financial.inflation,
        financing_terms,
        process_yield,
        cost_stream,
        bank_charges,
        tax_rates,
        price_discovery,
        tax,
        breakeven,
        macro_impact,
        total_installed_cost,
    })
}

/// Runs independent analyses in parallel against one shared multiplier table. Results are in
/// the same order as the configurations.
pub fn run_batch(
    configurations: &[ProjectConfiguration],
    multipliers: &MultiplierTable,
) -> Vec<Result<AnalysisResult, CalculationError>> {
    configurations
        .par_iter()
        .map(|configuration| run_analysis(configuration, multipliers))
        .collect()
}

/// The complete outcome of one analysis. Built once by [`run_analysis`] and read-only after.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    timeline: ProjectTimeline,
    plant_mode: PlantMode,
    funding_mode: FundingMode,
    carbon_valuation: CarbonValuation,
    feed_price: f64,
    inflation: f64,
    financing_terms: FinancingTerms,
    process_yield: ProcessYield,
    cost_stream: CostStream,
    bank_charges: Vec<f64>,
    tax_rates: Vec<f64>,
    price_discovery: PriceDiscovery,
    tax: Vec<f64>,
    breakeven: BreakevenSolution,
    macro_impact: MacroImpact,
    total_installed_cost: f64,
}

impl AnalysisResult {
    pub fn timeline(&self) -> &ProjectTimeline {
        &self.timeline
    }

    pub fn plant_mode(&self) -> PlantMode {
        self.plant_mode
    }

    pub fn financing_terms(&self) -> &FinancingTerms {
        &self.financing_terms
    }

    pub fn breakeven_prices(&self) -> &BreakevenPrices {
        &self.breakeven.prices
    }

    pub fn process_yield(&self) -> &ProcessYield {
        &self.process_yield
    }

    /// Bank charges after the revolving adjustment.
    pub fn bank_charges(&self) -> &[f64] {
        &self.bank_charges
    }

    pub fn tax_rates(&self) -> &[f64] {
        &self.tax_rates
    }

    pub fn price_discovery(&self) -> &PriceDiscovery {
        &self.price_discovery
    }

    pub fn tax_payable(&self) -> &[f64] {
        &self.tax
    }

    pub fn macro_impact(&self) -> &MacroImpact {
        &self.macro_impact
    }

    /// CAPEX plus every bank charge paid over the project life.
    pub fn total_installed_cost(&self) -> f64 {
        self.total_installed_cost
    }

    /// Price in year `index` when the year-zero price escalates with inflation.
    fn escalated(&self, price0: f64, index: usize) -> f64 {
        price0 * compounding_factor(self.inflation, index)
    }

    /// One row per year, in the column layout used for reporting.
    pub fn rows(&self) -> Vec<AnalysisRow> {
        let prices = &self.breakeven.prices;
        let production = &self.process_yield.production;
        let yearly_cost = izip!(&self.cost_stream.yearly_investment, &self.bank_charges)
            .map(|(investment, bank_charge)| investment + bank_charge)
            .collect::<Vec<_>>();

        let real_cumulative_cash_flow = cumulative_sum(
            &izip!(production, &yearly_cost)
                .map(|(output, cost)| prices.real * output - cost)
                .collect::<Vec<_>>(),
        );
        let nominal_cumulative_cash_flow = cumulative_sum(
            &izip!(production, &yearly_cost)
                .enumerate()
                .map(|(i, (output, cost))| self.escalated(prices.nominal0, i) * output - cost)
                .collect::<Vec<_>>(),
        );

        let value_added = &self.macro_impact.value_added;
        let compensation = &self.macro_impact.compensation;
        let employment = &self.macro_impact.employment;
        let tax_revenue = &self.macro_impact.tax_revenue;
        let reported = |value: f64| value / REPORTING_DIVISOR;

        self.timeline
            .iter()
            .map(|it| {
                let i = it.index;
                AnalysisRow {
                    year: it.year,
                    feedstock_input: self.process_yield.feedstock_quantity[i],
                    product_output: production[i],
                    direct_ghg_emissions: self.process_yield.direct_emissions[i],
                    cost_mode: self.plant_mode.cost_mode_label(),
                    real_cumulative_cash_flow: real_cumulative_cash_flow[i],
                    nominal_cumulative_cash_flow: nominal_cumulative_cash_flow[i],
                    constant_breakeven_price: prices.real,
                    current_breakeven_price: self.escalated(prices.nominal0, i),
                    constant_supply_cost_with_credit: prices.real_credit_adjusted,
                    current_supply_cost_with_credit: self
                        .escalated(prices.nominal_credit_adjusted0, i),
                    project_finance: self.funding_mode,
                    carbon_valued: self.carbon_valuation,
                    feedstock_price: self.feed_price,
                    primary_direct_gdp: reported(value_added.primary_channel.direct[i]),
                    primary_total_gdp: reported(value_added.primary_channel.total[i]),
                    all_direct_gdp: reported(value_added.all_channels.direct[i]),
                    all_total_gdp: reported(value_added.all_channels.total[i]),
                    primary_direct_pay: reported(compensation.primary_channel.direct[i]),
                    primary_total_pay: reported(compensation.primary_channel.total[i]),
                    all_direct_pay: reported(compensation.all_channels.direct[i]),
                    all_total_pay: reported(compensation.all_channels.total[i]),
                    primary_direct_jobs: reported(employment.primary_channel.direct[i]),
                    primary_total_jobs: reported(employment.primary_channel.total[i]),
                    all_direct_jobs: reported(employment.all_channels.direct[i]),
                    all_total_jobs: reported(employment.all_channels.total[i]),
                    direct_tax: reported(tax_revenue.direct[i]),
                    total_tax: reported(tax_revenue.total[i]),
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Feedstock Input (TPA)")]
    pub feedstock_input: f64,
    #[serde(rename = "Product Output (TPA)")]
    pub product_output: f64,
    #[serde(rename = "Direct GHG Emissions (TPA)")]
    pub direct_ghg_emissions: f64,
    #[serde(rename = "Cost Mode")]
    pub cost_mode: &'static str,
    #[serde(rename = "Real cumCash Flow")]
    pub real_cumulative_cash_flow: f64,
    #[serde(rename = "Nominal cumCash Flow")]
    pub nominal_cumulative_cash_flow: f64,
    #[serde(rename = "Constant$ Breakeven Price")]
    pub constant_breakeven_price: f64,
    #[serde(rename = "Current$ Breakeven Price")]
    pub current_breakeven_price: f64,
    #[serde(rename = "Constant$ SC wCredit")]
    pub constant_supply_cost_with_credit: f64,
    #[serde(rename = "Current$ SC wCredit")]
    pub current_supply_cost_with_credit: f64,
    #[serde(rename = "Project Finance")]
    pub project_finance: FundingMode,
    #[serde(rename = "Carbon Valued")]
    pub carbon_valued: CarbonValuation,
    #[serde(rename = "Feedstock Price ($/t)")]
    pub feedstock_price: f64,
    #[serde(rename = "pri_directGDP")]
    pub primary_direct_gdp: f64,
    #[serde(rename = "pri_bothGDP")]
    pub primary_total_gdp: f64,
    #[serde(rename = "All_directGDP")]
    pub all_direct_gdp: f64,
    #[serde(rename = "All_bothGDP")]
    pub all_total_gdp: f64,
    #[serde(rename = "pri_directPAY")]
    pub primary_direct_pay: f64,
    #[serde(rename = "pri_bothPAY")]
    pub primary_total_pay: f64,
    #[serde(rename = "All_directPAY")]
    pub all_direct_pay: f64,
    #[serde(rename = "All_bothPAY")]
    pub all_total_pay: f64,
    #[serde(rename = "pri_directJOB")]
    pub primary_direct_jobs: f64,
    #[serde(rename = "pri_bothJOB")]
    pub primary_total_jobs: f64,
    #[serde(rename = "All_directJOB")]
    pub all_direct_jobs: f64,
    #[serde(rename = "All_bothJOB")]
    pub all_total_jobs: f64,
    #[serde(rename = "pri_directTAX")]
    pub direct_tax: f64,
    #[serde(rename = "pri_bothTAX")]
    pub total_tax: f64,
}
