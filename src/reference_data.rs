use crate::core::multipliers::{ImpactCoefficients, ImpactType, MultiplierRow, MultiplierTable};
use indexmap::IndexSet;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, info};

/// This module loads the reference tables: per-country project data and sectorwise multipliers.
#[derive(Clone, Debug, Default)]
pub struct ProjectDataTable {
    rows: Vec<ProjectDataRow>,
}

/// Published technical and cost data for a product made in a country.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProjectDataRow {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Main_Prod")]
    pub product: String,
    #[serde(rename = "Plant_Size", default)]
    pub plant_size: Option<String>,
    #[serde(rename = "Plant_Effy", default)]
    pub plant_efficiency: Option<String>,
    #[serde(rename = "Base_Yr", default)]
    pub base_year: Option<i32>,
    #[serde(rename = "Cap", default)]
    pub capacity: Option<f64>,
    #[serde(rename = "Yld", default)]
    pub process_yield: Option<f64>,
    #[serde(rename = "feedEcontnt", default)]
    pub feed_energy_content: Option<f64>,
    #[serde(rename = "feedCcontnt", default)]
    pub feed_carbon_content: Option<f64>,
    #[serde(rename = "Heat_req", default)]
    pub heat_requirement: Option<f64>,
    #[serde(rename = "Elect_req", default)]
    pub electricity_requirement: Option<f64>,
    #[serde(rename = "Feed_Price", default)]
    pub feed_price: Option<f64>,
    #[serde(rename = "Fuel_Price", default)]
    pub fuel_price: Option<f64>,
    #[serde(rename = "Elect_Price", default)]
    pub electricity_price: Option<f64>,
    #[serde(rename = "CO2price", default)]
    pub carbon_price: Option<f64>,
    #[serde(rename = "corpTAX", default)]
    pub corporate_tax_rate: Option<f64>,
    #[serde(rename = "CAPEX", default)]
    pub capex: Option<f64>,
    #[serde(rename = "OPEX", default)]
    pub opex: Option<f64>,
}

impl ProjectDataTable {
    pub fn from_csv(csv: impl Read) -> anyhow::Result<Self> {
        let rows = csv::Reader::from_reader(csv)
            .deserialize::<ProjectDataRow>()
            .collect::<Result<Vec<_>, _>>()?;
        info!(rows = rows.len(), "loaded project reference data");

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the reference row for a product in a country. Where several rows match, one that
    /// also matches the plant size and efficiency wins; otherwise the first match is used.
    pub fn lookup(
        &self,
        country: &str,
        product: &str,
        plant_size: &str,
        plant_efficiency: &str,
    ) -> Option<&ProjectDataRow> {
        let mut candidates = self
            .rows
            .iter()
            .filter(|row| row.country == country && row.product == product)
            .peekable();
        let first = *candidates.peek()?;

        Some(
            candidates
                .find(|row| {
                    row.plant_size.as_deref() == Some(plant_size)
                        && row.plant_efficiency.as_deref() == Some(plant_efficiency)
                })
                .unwrap_or(first),
        )
    }

    /// Distinct countries, in file order.
    pub fn locations(&self) -> Vec<&str> {
        self.distinct(|row| row.country.as_str())
    }

    /// Distinct products, in file order.
    pub fn products(&self) -> Vec<&str> {
        self.distinct(|row| row.product.as_str())
    }

    fn distinct<'a>(&'a self, key: impl Fn(&'a ProjectDataRow) -> &'a str) -> Vec<&'a str> {
        self.rows
            .iter()
            .map(key)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct MultiplierCsvRow {
    #[serde(rename = "Sector")]
    sector: String,
    #[serde(rename = "Multiplier Type")]
    multiplier_type: String,
    #[serde(rename = "Direct Impact")]
    direct: f64,
    #[serde(rename = "Indirect Impact")]
    indirect: f64,
    #[serde(rename = "Total Impact")]
    total: f64,
}

/// Reads a sectorwise multiplier table. Rows describing impact types the model does not use are
/// skipped.
pub fn multipliers_from_csv(csv: impl Read) -> anyhow::Result<MultiplierTable> {
    let mut rows = vec![];
    let mut skipped = 0usize;
    for row in csv::Reader::from_reader(csv).deserialize::<MultiplierCsvRow>() {
        let row = row?;
        match ImpactType::from_str(row.multiplier_type.trim()) {
            Ok(impact_type) => rows.push(MultiplierRow {
                sector: row.sector,
                impact_type,
                coefficients: ImpactCoefficients {
                    direct: row.direct,
                    indirect: row.indirect,
                    total: row.total,
                },
            }),
            Err(_) => skipped += 1,
        }
    }
    debug!(skipped, "skipped multiplier rows of unused types");

    let table = MultiplierTable::new(rows);
    info!(rows = table.len(), "loaded sector multipliers");
    Ok(table)
}

/// Both reference tables, loaded once and shared by every analysis.
#[derive(Clone, Debug, Default)]
pub struct ReferenceData {
    pub project_data: ProjectDataTable,
    pub multipliers: MultiplierTable,
}

impl ReferenceData {
    pub fn new(project_data: ProjectDataTable, multipliers: MultiplierTable) -> Self {
        Self {
            project_data,
            multipliers,
        }
    }
}
