use crate::core::multipliers::{ImpactCoefficients, ImpactType, ImpactValues, MultiplierTable};
use crate::errors::CalculationError;
use crate::project_timeline::ProjectTimeline;

/// This module spreads the project's spending over three channels and converts each channel into
/// macroeconomic effects using the sector multipliers.
#[derive(Clone, Debug, PartialEq)]
pub struct SpendingChannels {
    /// Process share of construction investment, then fixed opex once operating.
    pub primary: Vec<f64>,
    /// Remaining construction investment; nothing once operating.
    pub construction: Vec<f64>,
    pub financing: Vec<f64>,
}

impl SpendingChannels {
    /// Arguments
    /// * `timeline` - the project timeline
    /// * `yearly_investment` - investment/cost for each year
    /// * `opex` - fixed operating cost per operating year
    /// * `bank_charges` - final bank charges for each year
    /// * `primary_share` - share of construction investment going to the primary channel
    pub fn new(
        timeline: &ProjectTimeline,
        yearly_investment: &[f64],
        opex: f64,
        bank_charges: &[f64],
        primary_share: f64,
    ) -> Self {
        let (primary, construction) = timeline
            .iter()
            .map(|it| {
                if it.is_construction() {
                    let investment = yearly_investment[it.index];
                    (primary_share * investment, (1. - primary_share) * investment)
                } else {
                    (opex, 0.)
                }
            })
            .unzip();

        Self {
            primary,
            construction,
            financing: bank_charges.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImpactSeries {
    pub direct: Vec<f64>,
    pub indirect: Vec<f64>,
    pub total: Vec<f64>,
}

impl FromIterator<ImpactValues> for ImpactSeries {
    fn from_iter<T: IntoIterator<Item = ImpactValues>>(iter: T) -> Self {
        let mut series = Self::default();
        for values in iter {
            series.direct.push(values.direct);
            series.indirect.push(values.indirect);
            series.total.push(values.total);
        }
        series
    }
}

/// Effect of all three channels together, and of the primary channel on its own.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelImpact {
    pub all_channels: ImpactSeries,
    pub primary_channel: ImpactSeries,
}

impl ChannelImpact {
    fn new(coefficients: &ImpactCoefficients, channels: &SpendingChannels) -> Self {
        let all_channels = (0..channels.primary.len())
            .map(|i| {
                coefficients.apply(channels.primary[i])
                    + coefficients.apply(channels.construction[i])
                    + coefficients.apply(channels.financing[i])
            })
            .collect();
        let primary_channel = channels
            .primary
            .iter()
            .map(|spending| coefficients.apply(*spending))
            .collect();

        Self {
            all_channels,
            primary_channel,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacroImpact {
    pub value_added: ChannelImpact,
    pub employment: ChannelImpact,
    pub compensation: ChannelImpact,
    /// Tax revenue follows sales rather than spending channels.
    pub tax_revenue: ImpactSeries,
}

/// Arguments
/// * `timeline` - the project timeline
/// * `channels` - spending split by channel
/// * `multipliers` - sector multiplier table
/// * `sector_code` - sector whose multipliers apply
/// * `yearly_investment` - investment/cost for each year
/// * `production` - product output for each year
/// * `real_price` - constant-dollar breakeven price
pub fn propagate(
    timeline: &ProjectTimeline,
    channels: &SpendingChannels,
    multipliers: &MultiplierTable,
    sector_code: &str,
    yearly_investment: &[f64],
    production: &[f64],
    real_price: f64,
) -> Result<MacroImpact, CalculationError> {
    let value_added = multipliers.lookup(sector_code, ImpactType::ValueAdded)?;
    let employment = multipliers.lookup(sector_code, ImpactType::Employment)?;
    let compensation = multipliers.lookup(sector_code, ImpactType::Compensation)?;
    let tax_revenue = multipliers.lookup(sector_code, ImpactType::TaxRevenue)?;

    let tax_revenue = timeline
        .iter()
        .map(|it| {
            if it.is_construction() {
                ImpactValues::default()
            } else {
                let i = it.index;
                tax_revenue.apply(yearly_investment[i] + real_price * production[i])
            }
        })
        .collect();

    Ok(MacroImpact {
        value_added: ChannelImpact::new(&value_added, channels),
        employment: ChannelImpact::new(&employment, channels),
        compensation: ChannelImpact::new(&compensation, channels),
        tax_revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::multipliers::tests::multiplier_table;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn timeline() -> ProjectTimeline {
        ProjectTimeline::new(2, 2, 2025)
    }

    #[fixture]
    fn channels(timeline: ProjectTimeline) -> SpendingChannels {
        SpendingChannels::new(
            &timeline,
            &[400., 600., 900., 950.],
            500.,
            &[20., 50., 10., 0.],
            0.25,
        )
    }

    #[rstest]
    fn should_split_spending_into_channels(channels: SpendingChannels) {
        assert_eq!(channels.primary, vec![100., 150., 500., 500.]);
        assert_eq!(channels.construction, vec![300., 450., 0., 0.]);
        assert_eq!(channels.financing, vec![20., 50., 10., 0.]);
    }

    #[rstest]
    fn should_combine_all_channels(
        timeline: ProjectTimeline,
        channels: SpendingChannels,
        multiplier_table: MultiplierTable,
    ) {
        let impact = propagate(
            &timeline,
            &channels,
            &multiplier_table,
            "USA_C20",
            &[400., 600., 900., 950.],
            &[0., 0., 100., 100.],
            2.,
        )
        .unwrap();

        // value added: direct 0.25, indirect 0.5
        let value_added = &impact.value_added;
        assert_eq!(value_added.all_channels.direct, vec![105., 162.5, 127.5, 125.]);
        assert_eq!(value_added.all_channels.indirect, vec![210., 325., 255., 250.]);
        assert_eq!(value_added.primary_channel.direct, vec![25., 37.5, 125., 125.]);
        for i in 0..4 {
            assert_relative_eq!(
                value_added.all_channels.total[i],
                value_added.all_channels.direct[i] + value_added.all_channels.indirect[i]
            );
        }

        assert_eq!(impact.employment.primary_channel.direct, vec![200., 300., 1000., 1000.]);
        assert_eq!(impact.compensation.all_channels.indirect[1], 162.5);
    }

    #[rstest]
    fn should_base_tax_revenue_on_operating_sales(
        timeline: ProjectTimeline,
        channels: SpendingChannels,
        multiplier_table: MultiplierTable,
    ) {
        let impact = propagate(
            &timeline,
            &channels,
            &multiplier_table,
            "USA_C20",
            &[400., 600., 900., 950.],
            &[0., 0., 100., 100.],
            2.,
        )
        .unwrap();

        // 0.0625 * (900 + 2 * 100) and 0.0625 * (950 + 2 * 100)
        assert_eq!(impact.tax_revenue.direct, vec![0., 0., 68.75, 71.875]);
        assert_eq!(impact.tax_revenue.total, vec![0., 0., 137.5, 143.75]);
    }

    #[rstest]
    fn should_fail_before_propagating_when_multiplier_missing(
        timeline: ProjectTimeline,
        channels: SpendingChannels,
        multiplier_table: MultiplierTable,
    ) {
        let result = propagate(
            &timeline,
            &channels,
            &multiplier_table,
            "DEU_C20",
            &[400., 600., 900., 950.],
            &[0., 0., 100., 100.],
            2.,
        );
        assert_eq!(
            result,
            Err(CalculationError::MissingMultiplier {
                sector_code: "DEU_C20".into(),
                impact_type: ImpactType::Employment,
                matches: 0,
            })
        );
    }
}
