use crate::core::parameters::{FinancialParameters, FundingMode, PlantMode};
use crate::project_timeline::ProjectTimeline;

/// This module provides the interest ("bank charge") accrual for each funding mode.
///
/// Debt and Mixed funding accrue interest on the cumulative investment up to the year after
/// construction ends, then flat interest on the financed construction balance. Once prices
/// are known, a revolving adjustment replaces post-construction charges with interest on any
/// cumulative cash shortfall.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinancingTerms {
    funding_mode: FundingMode,
    debt_share: f64,
    debt_rate: f64,
    discount_rate: f64,
}

impl FinancingTerms {
    pub fn new(financial: &FinancialParameters) -> Self {
        let debt_share = match financial.funding_mode {
            FundingMode::Debt => 1.,
            FundingMode::Equity => 0.,
            FundingMode::Mixed => financial.debt_share,
        };
        let discount_rate = match financial.funding_mode {
            FundingMode::Debt => financial.debt_rate,
            FundingMode::Equity => financial.equity_hurdle_rate,
            FundingMode::Mixed => {
                debt_share * financial.debt_rate + (1. - debt_share) * financial.equity_hurdle_rate
            }
        };

        Self {
            funding_mode: financial.funding_mode,
            debt_share,
            debt_rate: financial.debt_rate,
            discount_rate,
        }
    }

    pub fn debt_share(&self) -> f64 {
        self.debt_share
    }

    /// Rate used to discount every cash flow in the price solver.
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    fn carries_debt(&self) -> bool {
        matches!(self.funding_mode, FundingMode::Debt | FundingMode::Mixed)
    }

    /// Interest charged each year before any revenue is known.
    ///
    /// Brownfield projects start from a clean schedule: no construction balance is financed.
    pub fn initial_bank_charges(
        &self,
        timeline: &ProjectTimeline,
        plant_mode: PlantMode,
        yearly_investment: &[f64],
    ) -> Vec<f64> {
        let total_periods = timeline.total_periods();
        if !self.carries_debt() || plant_mode == PlantMode::Brown {
            return vec![0.; total_periods];
        }

        let construction_periods = timeline.construction_periods();
        let financed = |last_index: usize| {
            yearly_investment[..=last_index]
                .iter()
                .map(|investment| self.debt_share * investment)
                .sum::<f64>()
        };

        (0..total_periods)
            .map(|i| {
                if i <= construction_periods + 1 {
                    self.debt_rate * financed(i)
                } else {
                    self.debt_rate * financed(construction_periods)
                }
            })
            .collect()
    }

    /// Replaces each post-construction charge with interest on the cumulative shortfall between
    /// net revenue and charges paid so far. Runs once, in year order, over charges that are
    /// updated in place; net revenue is not refreshed afterwards.
    pub fn apply_revolving_adjustment(
        &self,
        timeline: &ProjectTimeline,
        net_revenue: &[f64],
        bank_charges: &mut [f64],
    ) {
        if !self.carries_debt() {
            return;
        }

        for i in (timeline.construction_periods() + 1)..timeline.total_periods() {
            let shortfall =
                net_revenue[..i].iter().sum::<f64>() - bank_charges[..i - 1].iter().sum::<f64>();
            bank_charges[i] = if shortfall < 0. {
                self.debt_rate * shortfall.abs()
            } else {
                0.
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameters::tests::configuration;
    use crate::core::parameters::ProjectConfiguration;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn timeline() -> ProjectTimeline {
        ProjectTimeline::new(2, 4, 2025)
    }

    #[fixture]
    fn yearly_investment() -> Vec<f64> {
        vec![400., 600., 100., 100., 100., 100.]
    }

    fn terms_for(
        mut configuration: ProjectConfiguration,
        funding_mode: FundingMode,
    ) -> FinancingTerms {
        configuration.financial.funding_mode = funding_mode;
        configuration.financial.debt_rate = 0.05;
        configuration.financial.equity_hurdle_rate = 0.1;
        configuration.financial.debt_share = 0.6;
        FinancingTerms::new(&configuration.financial)
    }

    #[rstest]
    #[case(FundingMode::Debt, 1., 0.05)]
    #[case(FundingMode::Equity, 0., 0.1)]
    #[case(FundingMode::Mixed, 0.6, 0.07)]
    fn should_select_debt_share_and_discount_rate(
        configuration: ProjectConfiguration,
        #[case] funding_mode: FundingMode,
        #[case] debt_share: f64,
        #[case] discount_rate: f64,
    ) {
        let terms = terms_for(configuration, funding_mode);
        assert_eq!(terms.debt_share(), debt_share);
        assert_relative_eq!(terms.discount_rate(), discount_rate, max_relative = 1e-12);
    }

    #[rstest]
    fn should_not_charge_interest_for_equity(
        configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
        yearly_investment: Vec<f64>,
    ) {
        let terms = terms_for(configuration, FundingMode::Equity);
        let mut charges =
            terms.initial_bank_charges(&timeline, PlantMode::Green, &yearly_investment);
        assert_eq!(charges, vec![0.; 6]);

        terms.apply_revolving_adjustment(&timeline, &[-1000.; 6], &mut charges);
        assert_eq!(charges, vec![0.; 6]);
    }

    #[rstest]
    fn should_accrue_debt_interest_in_two_phases(
        configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
        yearly_investment: Vec<f64>,
    ) {
        let terms = terms_for(configuration, FundingMode::Debt);
        let charges = terms.initial_bank_charges(&timeline, PlantMode::Green, &yearly_investment);
        // cumulative through year 3 (construction + 1), then flat on years 0..=2
        let expected = [20., 50., 55., 60., 55., 55.];
        for (charge, expected) in charges.iter().zip(expected) {
            assert_relative_eq!(*charge, expected, max_relative = 1e-12);
        }
    }

    #[rstest]
    fn should_scale_mixed_interest_by_debt_share(
        configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
        yearly_investment: Vec<f64>,
    ) {
        let debt = terms_for(configuration.clone(), FundingMode::Debt)
            .initial_bank_charges(&timeline, PlantMode::Green, &yearly_investment);
        let mixed = terms_for(configuration, FundingMode::Mixed).initial_bank_charges(
            &timeline,
            PlantMode::Green,
            &yearly_investment,
        );
        for (mixed, debt) in mixed.iter().zip(debt) {
            assert_relative_eq!(*mixed, 0.6 * debt, max_relative = 1e-12);
        }
    }

    #[rstest]
    fn should_not_charge_interest_at_zero_debt_rate(
        mut configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
        yearly_investment: Vec<f64>,
    ) {
        configuration.financial.funding_mode = FundingMode::Debt;
        configuration.financial.debt_rate = 0.;
        let terms = FinancingTerms::new(&configuration.financial);
        let mut charges =
            terms.initial_bank_charges(&timeline, PlantMode::Green, &yearly_investment);
        terms.apply_revolving_adjustment(&timeline, &[-500.; 6], &mut charges);
        assert!(charges.iter().all(|charge| *charge == 0.));
    }

    #[rstest]
    fn should_start_brownfield_from_clean_schedule(
        configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
        yearly_investment: Vec<f64>,
    ) {
        let terms = terms_for(configuration, FundingMode::Debt);
        let charges = terms.initial_bank_charges(&timeline, PlantMode::Brown, &yearly_investment);
        assert_eq!(charges, vec![0.; 6]);
    }

    #[rstest]
    fn should_charge_interest_on_cumulative_shortfall(
        configuration: ProjectConfiguration,
        timeline: ProjectTimeline,
    ) {
        let terms = terms_for(configuration, FundingMode::Debt);
        let mut charges = vec![20., 50., 55., 60., 55., 55.];
        let net_revenue = [-400., -600., 300., 400., 500., 600.];
        terms.apply_revolving_adjustment(&timeline, &net_revenue, &mut charges);

        // year 3: (-400 - 600 + 300) - (20 + 50) = -770
        // year 4: (-700 + 400) - (20 + 50 + 55) = -425
        // year 5: (-300 + 500) - (20 + 50 + 55 + 38.5) = 36.5, so no charge
        let expected = [20., 50., 55., 38.5, 21.25, 0.];
        for (charge, expected) in charges.iter().zip(expected) {
            assert_relative_eq!(*charge, expected, max_relative = 1e-12);
        }
    }
}
