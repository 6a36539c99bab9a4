use crate::core::parameters::{
    CarbonValuation, FinancialParameters, FundingMode, MacroParameters, OpexMode, PlantMode,
    ProcessParameters, ProjectConfiguration, UtilizationRamp,
};
use crate::project_timeline::ProjectTimeline;
use crate::reference_data::{ProjectDataRow, ProjectDataTable};
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum::Display;
use tracing::{debug, warn};

/// Reads one request document, or a JSON array of them, and checks every value range.
pub fn ingest_requests(json: impl Read) -> anyhow::Result<Vec<AnalysisRequest>> {
    let document: Value = serde_json::from_reader(BufReader::new(json))?;
    let requests = match document {
        Value::Array(documents) => documents
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AnalysisRequest>, _>>()?,
        document => vec![serde_json::from_value(document)?],
    };
    if requests.is_empty() {
        bail!("Input contained no analysis requests");
    }

    for (index, request) in requests.iter().enumerate() {
        request
            .validate()
            .map_err(|errors| anyhow!("Request {index} failed validation: {errors}"))?;
    }

    Ok(requests)
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PlantSize {
    Large,
    Small,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PlantEfficiency {
    High,
    Low,
}

impl PlantEfficiency {
    fn default_yield(&self) -> f64 {
        match self {
            PlantEfficiency::High => 0.9,
            PlantEfficiency::Low => 0.7,
        }
    }
}

/// An analysis request as submitted. Every field is optional; anything absent is taken from the
/// project reference data for the requested location and product, and failing that from the
/// defaults in [`AnalysisRequest::defaults`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields)]
pub struct AnalysisRequest {
    pub location: Option<String>,
    pub product: Option<String>,
    pub plant_size: Option<PlantSize>,
    pub plant_efficiency: Option<PlantEfficiency>,
    pub plant_mode: Option<PlantMode>,
    pub funding_mode: Option<FundingMode>,
    pub opex_mode: Option<OpexMode>,
    pub carbon_valued: Option<CarbonValuation>,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub construction_periods: Option<usize>,
    #[validate(maximum = 100)]
    pub operating_periods: Option<usize>,
    pub capex_spread: Option<Vec<f64>>,
    #[validate(minimum = 1900)]
    #[validate(maximum = 2200)]
    pub base_year: Option<i32>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub utilization_first_year: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub utilization_second_year: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub utilization_steady_state: Option<f64>,
    pub inflation: Option<f64>,
    pub debt_rate: Option<f64>,
    pub equity_hurdle_rate: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub debt_share: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub owner_cost: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub corporate_tax_rate: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub credit_fraction: Option<f64>,
    pub feed_price: Option<f64>,
    pub fuel_price: Option<f64>,
    pub electricity_price: Option<f64>,
    pub carbon_tax_rate: Option<f64>,
    pub capex: Option<f64>,
    pub opex: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub primary_share: Option<f64>,
    #[validate(minimum = 0.)]
    pub capacity: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub process_yield: Option<f64>,
    pub feed_energy_content: Option<f64>,
    pub feed_carbon_content: Option<f64>,
    pub heat_requirement: Option<f64>,
    pub electricity_requirement: Option<f64>,
    pub natural_gas_energy_content: Option<f64>,
    pub natural_gas_carbon_content: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub heat_efficiency: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub electricity_efficiency: Option<f64>,
    pub sector_code: Option<String>,
}

const DEFAULT_LOCATION: &str = "USA";
const DEFAULT_PRODUCT: &str = "Ethylene";
const DEFAULT_SECTOR: &str = "C20";

impl AnalysisRequest {
    /// A request with every field set to the value used when nothing else supplies it.
    pub fn defaults() -> Self {
        Self {
            location: Some(DEFAULT_LOCATION.into()),
            product: Some(DEFAULT_PRODUCT.into()),
            plant_size: Some(PlantSize::Large),
            plant_efficiency: Some(PlantEfficiency::High),
            plant_mode: Some(PlantMode::Green),
            funding_mode: Some(FundingMode::Equity),
            opex_mode: Some(OpexMode::Inflated),
            carbon_valued: Some(CarbonValuation::No),
            construction_periods: Some(3),
            operating_periods: Some(27),
            capex_spread: Some(vec![0.2, 0.5, 0.3]),
            base_year: Some(2025),
            utilization_first_year: Some(0.7),
            utilization_second_year: Some(0.8),
            utilization_steady_state: Some(0.95),
            inflation: Some(0.02),
            debt_rate: Some(0.035),
            equity_hurdle_rate: Some(0.10),
            debt_share: Some(0.6),
            owner_cost: Some(0.1),
            corporate_tax_rate: Some(0.27),
            credit_fraction: Some(0.1),
            feed_price: Some(712.9),
            fuel_price: Some(712.9),
            electricity_price: Some(16.92),
            carbon_tax_rate: Some(0.),
            capex: Some(1_080_000_000.),
            opex: Some(33_678_301.89),
            primary_share: Some(0.3),
            capacity: Some(250_000.),
            process_yield: Some(PlantEfficiency::High.default_yield()),
            feed_energy_content: Some(25.),
            feed_carbon_content: Some(0.85),
            heat_requirement: Some(3200.),
            electricity_requirement: Some(600.),
            natural_gas_energy_content: Some(53.6),
            natural_gas_carbon_content: Some(50.3),
            heat_efficiency: Some(0.8),
            electricity_efficiency: Some(0.5),
            sector_code: Some(format!("{DEFAULT_LOCATION}_{DEFAULT_SECTOR}")),
        }
    }

    fn has_complete_process_data(&self) -> bool {
        self.feed_energy_content.is_some()
            && self.feed_carbon_content.is_some()
            && self.heat_requirement.is_some()
            && self.electricity_requirement.is_some()
    }
}

/// Resolves a request into a complete configuration. Each value comes from the request if
/// present, then from the matching project reference row, then from the defaults.
pub fn resolve(
    request: &AnalysisRequest,
    project_data: &ProjectDataTable,
) -> anyhow::Result<ProjectConfiguration> {
    let location = request.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let product = request.product.as_deref().unwrap_or(DEFAULT_PRODUCT);
    let plant_size = request.plant_size.unwrap_or(PlantSize::Large);
    let plant_efficiency = request.plant_efficiency.unwrap_or(PlantEfficiency::High);

    let reference = project_data.lookup(
        location,
        product,
        &plant_size.to_string(),
        &plant_efficiency.to_string(),
    );
    if reference.is_none() {
        if !request.has_complete_process_data() {
            bail!(
                "No project data found for {product} in {location}; provide complete process data (feed_energy_content, feed_carbon_content, heat_requirement, electricity_requirement) or a known location/product"
            );
        }
        warn!(location, product, "no project data found, using request values and defaults");
    }
    let reference = reference.cloned().unwrap_or_else(|| ProjectDataRow {
        country: location.into(),
        product: product.into(),
        ..Default::default()
    });

    let defaults = AnalysisRequest::defaults();
    let pick = |requested: Option<f64>, referenced: Option<f64>, default: Option<f64>| {
        requested.or(referenced).or(default).unwrap_or_default()
    };

    let construction_periods = request
        .construction_periods
        .or(defaults.construction_periods)
        .unwrap_or_default();
    let operating_periods = request
        .operating_periods
        .or(defaults.operating_periods)
        .unwrap_or_default();
    let base_year = request
        .base_year
        .or(reference.base_year)
        .or(defaults.base_year)
        .unwrap_or_default();

    let configuration = ProjectConfiguration {
        timeline: ProjectTimeline::new(construction_periods, operating_periods, base_year),
        utilization: UtilizationRamp {
            first_year: pick(request.utilization_first_year, None, defaults.utilization_first_year),
            second_year: pick(
                request.utilization_second_year,
                None,
                defaults.utilization_second_year,
            ),
            steady_state: pick(
                request.utilization_steady_state,
                None,
                defaults.utilization_steady_state,
            ),
        },
        process: ProcessParameters {
            capacity: pick(request.capacity, reference.capacity, defaults.capacity),
            process_yield: pick(
                request.process_yield,
                reference.process_yield,
                Some(plant_efficiency.default_yield()),
            ),
            feed_energy_content: pick(
                request.feed_energy_content,
                reference.feed_energy_content,
                defaults.feed_energy_content,
            ),
            feed_carbon_content: pick(
                request.feed_carbon_content,
                reference.feed_carbon_content,
                defaults.feed_carbon_content,
            ),
            heat_requirement: pick(
                request.heat_requirement,
                reference.heat_requirement,
                defaults.heat_requirement,
            ),
            electricity_requirement: pick(
                request.electricity_requirement,
                reference.electricity_requirement,
                defaults.electricity_requirement,
            ),
            natural_gas_energy_content: pick(
                request.natural_gas_energy_content,
                None,
                defaults.natural_gas_energy_content,
            ),
            natural_gas_carbon_content: pick(
                request.natural_gas_carbon_content,
                None,
                defaults.natural_gas_carbon_content,
            ),
            heat_efficiency: pick(request.heat_efficiency, None, defaults.heat_efficiency),
            electricity_efficiency: pick(
                request.electricity_efficiency,
                None,
                defaults.electricity_efficiency,
            ),
        },
        financial: FinancialParameters {
            inflation: pick(request.inflation, None, defaults.inflation),
            debt_rate: pick(request.debt_rate, None, defaults.debt_rate),
            equity_hurdle_rate: pick(request.equity_hurdle_rate, None, defaults.equity_hurdle_rate),
            funding_mode: request.funding_mode.unwrap_or(FundingMode::Equity),
            debt_share: pick(request.debt_share, None, defaults.debt_share),
            owner_cost: pick(request.owner_cost, None, defaults.owner_cost),
            corporate_tax_rate: pick(
                request.corporate_tax_rate,
                reference.corporate_tax_rate,
                defaults.corporate_tax_rate,
            ),
            credit_fraction: pick(request.credit_fraction, None, defaults.credit_fraction),
            capex_spread: request
                .capex_spread
                .clone()
                .or(defaults.capex_spread)
                .unwrap_or_default(),
            carbon_tax_rate: pick(
                request.carbon_tax_rate,
                reference.carbon_price,
                defaults.carbon_tax_rate,
            ),
            carbon_valuation: request.carbon_valued.unwrap_or(CarbonValuation::No),
            feed_price: pick(request.feed_price, reference.feed_price, defaults.feed_price),
            fuel_price: pick(request.fuel_price, reference.fuel_price, defaults.fuel_price),
            electricity_price: pick(
                request.electricity_price,
                reference.electricity_price,
                defaults.electricity_price,
            ),
            opex_mode: request.opex_mode.unwrap_or(OpexMode::Inflated),
            capex: pick(request.capex, reference.capex, defaults.capex),
            opex: pick(request.opex, reference.opex, defaults.opex),
            plant_mode: request.plant_mode.unwrap_or(PlantMode::Green),
        },
        macro_parameters: MacroParameters {
            sector_code: request
                .sector_code
                .clone()
                .unwrap_or_else(|| format!("{location}_{DEFAULT_SECTOR}")),
            primary_share: pick(request.primary_share, None, defaults.primary_share),
        },
    };
    debug!(?configuration, "resolved analysis request");

    Ok(configuration)
}
