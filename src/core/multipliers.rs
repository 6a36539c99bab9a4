use crate::errors::CalculationError;
use indexmap::IndexMap;
use strum::{Display, EnumString};

/// The kinds of macroeconomic effect a sector multiplier can describe, labelled as they appear
/// in published multiplier tables.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
pub enum ImpactType {
    #[strum(serialize = "Value-Added Share (USD per million USD output)")]
    ValueAdded,
    #[strum(serialize = "Employment Elasticity (Jobs per million USD output)")]
    Employment,
    #[strum(serialize = "Compensation (USD per million USD output)")]
    Compensation,
    #[strum(serialize = "Tax Revenue Share (USD per million USD output)")]
    TaxRevenue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImpactCoefficients {
    pub direct: f64,
    pub indirect: f64,
    pub total: f64,
}

impl ImpactCoefficients {
    pub fn apply(&self, value: f64) -> ImpactValues {
        ImpactValues {
            direct: self.direct * value,
            indirect: self.indirect * value,
            total: self.total * value,
        }
    }
}

/// Direct, indirect and total effect of one amount of spending.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImpactValues {
    pub direct: f64,
    pub indirect: f64,
    pub total: f64,
}

impl std::ops::Add for ImpactValues {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            direct: self.direct + rhs.direct,
            indirect: self.indirect + rhs.indirect,
            total: self.total + rhs.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiplierRow {
    pub sector: String,
    pub impact_type: ImpactType,
    pub coefficients: ImpactCoefficients,
}

/// Sector multipliers grouped by impact type. Built once and only ever read afterwards, so a
/// single table can back any number of concurrent analyses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiplierTable {
    rows: IndexMap<ImpactType, Vec<(String, ImpactCoefficients)>>,
}

impl MultiplierTable {
    pub fn new(rows: impl IntoIterator<Item = MultiplierRow>) -> Self {
        let mut grouped: IndexMap<ImpactType, Vec<(String, ImpactCoefficients)>> =
            IndexMap::new();
        for row in rows {
            grouped
                .entry(row.impact_type)
                .or_default()
                .push((row.sector, row.coefficients));
        }
        Self { rows: grouped }
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the single row whose sector label ends with `sector_code`.
    pub fn lookup(
        &self,
        sector_code: &str,
        impact_type: ImpactType,
    ) -> Result<ImpactCoefficients, CalculationError> {
        let matches = self
            .rows
            .get(&impact_type)
            .into_iter()
            .flatten()
            .filter(|(sector, _)| sector.ends_with(sector_code))
            .map(|(_, coefficients)| *coefficients)
            .collect::<Vec<_>>();

        match matches.as_slice() {
            [coefficients] => Ok(*coefficients),
            _ => Err(CalculationError::MissingMultiplier {
                sector_code: sector_code.to_owned(),
                impact_type,
                matches: matches.len(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::str::FromStr;

    fn row(sector: &str, impact_type: ImpactType, direct: f64, indirect: f64) -> MultiplierRow {
        MultiplierRow {
            sector: sector.into(),
            impact_type,
            coefficients: ImpactCoefficients {
                direct,
                indirect,
                total: direct + indirect,
            },
        }
    }

    /// One USA chemicals row per impact type, plus a construction sector and a second country.
    #[fixture]
    pub(crate) fn multiplier_table() -> MultiplierTable {
        MultiplierTable::new([
            row("USA_C20", ImpactType::ValueAdded, 0.25, 0.5),
            row("USA_C20", ImpactType::Employment, 2., 3.),
            row("USA_C20", ImpactType::Compensation, 0.125, 0.25),
            row("USA_C20", ImpactType::TaxRevenue, 0.0625, 0.0625),
            row("USA_F", ImpactType::ValueAdded, 0.375, 0.5),
            row("DEU_C20", ImpactType::ValueAdded, 0.3, 0.4),
        ])
    }

    #[rstest]
    fn should_parse_impact_type_labels() {
        assert_eq!(
            ImpactType::from_str("Employment Elasticity (Jobs per million USD output)"),
            Ok(ImpactType::Employment)
        );
        assert_eq!(
            ImpactType::TaxRevenue.to_string(),
            "Tax Revenue Share (USD per million USD output)"
        );
        assert!(ImpactType::from_str("Imports (USD per million USD output)").is_err());
    }

    #[rstest]
    fn should_find_single_matching_row(multiplier_table: MultiplierTable) {
        assert_eq!(
            multiplier_table.lookup("USA_C20", ImpactType::Employment),
            Ok(ImpactCoefficients {
                direct: 2.,
                indirect: 3.,
                total: 5.
            })
        );
        assert_eq!(multiplier_table.len(), 6);
    }

    #[rstest]
    fn should_match_on_sector_suffix(multiplier_table: MultiplierTable) {
        assert_eq!(
            multiplier_table
                .lookup("F", ImpactType::ValueAdded)
                .map(|coefficients| coefficients.direct),
            Ok(0.375)
        );
    }

    #[rstest]
    fn should_reject_ambiguous_sector(multiplier_table: MultiplierTable) {
        assert_eq!(
            multiplier_table.lookup("C20", ImpactType::ValueAdded),
            Err(CalculationError::MissingMultiplier {
                sector_code: "C20".into(),
                impact_type: ImpactType::ValueAdded,
                matches: 2,
            })
        );
    }

    #[rstest]
    fn should_reject_absent_sector(multiplier_table: MultiplierTable) {
        assert!(matches!(
            multiplier_table.lookup("DEU_C20", ImpactType::Employment),
            Err(CalculationError::MissingMultiplier { matches: 0, .. })
        ));
    }

    #[rstest]
    fn should_apply_coefficients_to_spending() {
        let coefficients = ImpactCoefficients {
            direct: 0.5,
            indirect: 0.25,
            total: 0.75,
        };
        let combined = coefficients.apply(100.) + coefficients.apply(20.);
        assert_eq!(
            combined,
            ImpactValues {
                direct: 60.,
                indirect: 30.,
                total: 90.
            }
        );
    }
}
