use crate::compare_floats::is_usable_divisor;
use crate::core::units::{compounding_factor, discount_divisor};
use crate::errors::CalculationError;

/// This module provides the two-pass discounted cash flow solver for the breakeven prices.
///
/// The first pass discovers a tax-adjusted nominal price path from which the implied net revenue
/// is taken. The second pass uses the tax actually payable on that net revenue to produce the
/// four reported prices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountBasis {
    pub discount_rate: f64,
    pub inflation: f64,
}

impl DiscountBasis {
    fn discount(&self, value: f64, index: usize) -> f64 {
        value / discount_divisor(self.discount_rate, index)
    }

    fn escalate(&self, value: f64, index: usize) -> f64 {
        value * compounding_factor(self.inflation, index)
    }

    /// Σ production/(1+r)^i and Σ production·(1+inflation)^i/(1+r)^i over the given weights.
    fn denominators(&self, weighted_production: impl Iterator<Item = f64>) -> (f64, f64) {
        weighted_production
            .enumerate()
            .fold((0., 0.), |(real, nominal), (i, production)| {
                (
                    real + self.discount(production, i),
                    nominal + self.discount(self.escalate(production, i), i),
                )
            })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceDiscovery {
    pub real_price_star: f64,
    pub nominal_price_star0: f64,
    pub nominal_price_path: Vec<f64>,
    pub revenue: Vec<f64>,
    pub net_revenue: Vec<f64>,
}

/// First pass: prices that recover the after-tax cost stream, ignoring depreciation.
///
/// Arguments
/// * `production` - product output for each year
/// * `yearly_investment` - investment/cost for each year
/// * `bank_charges` - initial bank charges for each year
/// * `tax_rates` - corporate tax rate for each year
/// * `basis` - discount rate and inflation
pub fn discover_prices(
    production: &[f64],
    yearly_investment: &[f64],
    bank_charges: &[f64],
    tax_rates: &[f64],
    basis: DiscountBasis,
) -> Result<PriceDiscovery, CalculationError> {
    let cashflow = (0..production.len())
        .map(|i| {
            basis.discount(
                (yearly_investment[i] + bank_charges[i]) * (1. - tax_rates[i]),
                i,
            )
        })
        .sum::<f64>();
    let (real_denominator, nominal_denominator) = basis.denominators(
        production
            .iter()
            .zip(tax_rates)
            .map(|(production, tax_rate)| production * (1. - tax_rate)),
    );
    check_denominator("after-tax discounted production", real_denominator)?;
    check_denominator("after-tax discounted nominal production", nominal_denominator)?;

    let real_price_star = cashflow / real_denominator;
    let nominal_price_star0 = cashflow / nominal_denominator;
    let nominal_price_path = (0..production.len())
        .map(|i| nominal_price_star0 * compounding_factor(basis.inflation, i))
        .collect::<Vec<_>>();
    let revenue = nominal_price_path
        .iter()
        .zip(production)
        .map(|(price, production)| price * production)
        .collect::<Vec<_>>();
    let net_revenue = revenue
        .iter()
        .zip(yearly_investment)
        .map(|(revenue, investment)| revenue - investment)
        .collect();

    Ok(PriceDiscovery {
        real_price_star,
        nominal_price_star0,
        nominal_price_path,
        revenue,
        net_revenue,
    })
}

/// The four reported breakeven prices. Nominal prices are given for year zero; the price in year
/// `i` is the year-zero price escalated by `(1 + inflation)^i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakevenPrices {
    pub real: f64,
    pub nominal0: f64,
    pub real_credit_adjusted: f64,
    pub nominal_credit_adjusted0: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakevenSolution {
    pub prices: BreakevenPrices,
    /// Discounted cost recovered each year, without and with the tax credit.
    pub discounted_cashflow: Vec<f64>,
    pub discounted_credit_cashflow: Vec<f64>,
}

/// Second pass: prices that recover investment, bank charges and tax payable.
///
/// Arguments
/// * `production` - product output for each year
/// * `yearly_investment` - investment/cost for each year
/// * `bank_charges` - bank charges after the revolving adjustment
/// * `net_revenue` - net revenue from the first pass
/// * `tax` - tax payable for each year
/// * `credit_fraction` - share of tax payable refunded as a credit
/// * `basis` - discount rate and inflation
pub fn solve_breakeven_prices(
    production: &[f64],
    yearly_investment: &[f64],
    bank_charges: &[f64],
    net_revenue: &[f64],
    tax: &[f64],
    credit_fraction: f64,
    basis: DiscountBasis,
) -> Result<BreakevenSolution, CalculationError> {
    let mut discounted_cashflow = Vec::with_capacity(production.len());
    let mut discounted_credit_cashflow = Vec::with_capacity(production.len());

    for i in 0..production.len() {
        let cost = yearly_investment[i] + bank_charges[i];
        let (numerator, credit_numerator) = if net_revenue[i] <= 0. {
            (cost, cost)
        } else {
            (cost + tax[i], cost + tax[i] * (1. - credit_fraction))
        };
        discounted_cashflow.push(basis.discount(numerator, i));
        discounted_credit_cashflow.push(basis.discount(credit_numerator, i));
    }

    let (real_denominator, nominal_denominator) =
        basis.denominators(production.iter().copied());
    check_denominator("discounted production", real_denominator)?;
    check_denominator("discounted nominal production", nominal_denominator)?;

    let cashflow = discounted_cashflow.iter().sum::<f64>();
    let credit_cashflow = discounted_credit_cashflow.iter().sum::<f64>();

    Ok(BreakevenSolution {
        prices: BreakevenPrices {
            real: cashflow / real_denominator,
            nominal0: cashflow / nominal_denominator,
            real_credit_adjusted: credit_cashflow / real_denominator,
            nominal_credit_adjusted0: credit_cashflow / nominal_denominator,
        },
        discounted_cashflow,
        discounted_credit_cashflow,
    })
}

fn check_denominator(name: &str, sum: f64) -> Result<(), CalculationError> {
    if is_usable_divisor(sum) {
        Ok(())
    } else {
        Err(CalculationError::DegenerateModel(format!(
            "sum of {name} is {sum}, so no breakeven price exists"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn basis() -> DiscountBasis {
        DiscountBasis {
            discount_rate: 0.1,
            inflation: 0.02,
        }
    }

    #[rstest]
    fn should_recover_opex_per_unit_without_tax() {
        let basis = DiscountBasis {
            discount_rate: 0.1,
            inflation: 0.,
        };
        let production = [0., 100., 100.];
        let investment = [0., 100., 100.];
        let discovery =
            discover_prices(&production, &investment, &[0.; 3], &[0.; 3], basis).unwrap();
        assert_relative_eq!(discovery.real_price_star, 1.);
        assert_relative_eq!(discovery.nominal_price_star0, 1.);
        for net_revenue in &discovery.net_revenue {
            assert_relative_eq!(*net_revenue, 0., epsilon = 1e-9);
        }

        let solution = solve_breakeven_prices(
            &production,
            &investment,
            &[0.; 3],
            &discovery.net_revenue,
            &[0.; 3],
            0.,
            basis,
        )
        .unwrap();
        assert_relative_eq!(solution.prices.real, 1.);
        assert_relative_eq!(solution.prices.nominal0, 1.);
        assert_relative_eq!(solution.prices.real_credit_adjusted, 1.);
        assert_relative_eq!(solution.prices.nominal_credit_adjusted0, 1.);
    }

    #[rstest]
    fn should_escalate_nominal_price_path_exactly(basis: DiscountBasis) {
        let production = [0., 50., 80., 100.];
        let investment = [1000., 200., 200., 200.];
        let tax_rates = [0., 0.25, 0.25, 0.25];
        let discovery =
            discover_prices(&production, &investment, &[0.; 4], &tax_rates, basis).unwrap();

        for (i, price) in discovery.nominal_price_path.iter().enumerate() {
            assert_eq!(
                *price,
                discovery.nominal_price_star0 * compounding_factor(0.02, i)
            );
        }
        assert_eq!(discovery.revenue[0], 0.);
        assert_eq!(discovery.net_revenue[0], -1000.);
        assert!(discovery.real_price_star > discovery.nominal_price_star0);
    }

    #[rstest]
    fn should_discount_cost_stream_in_first_pass() {
        let basis = DiscountBasis {
            discount_rate: 0.1,
            inflation: 0.,
        };
        // cost 110 in year 1 discounts to 100; after-tax production 0.5 * 100 discounts to 50/1.1
        let discovery =
            discover_prices(&[0., 100.], &[0., 110.], &[0., 0.], &[0., 0.5], basis).unwrap();
        assert_relative_eq!(discovery.real_price_star, 1.1, max_relative = 1e-12);
    }

    #[rstest]
    fn should_only_add_tax_when_net_revenue_positive() {
        let basis = DiscountBasis {
            discount_rate: 0.,
            inflation: 0.,
        };
        let production = [0., 100., 100.];
        let investment = [300., 100., 100.];
        let bank_charges = [0., 10., 10.];
        let net_revenue = [-300., -5., 50.];
        let tax = [0., 40., 20.];

        let solution = solve_breakeven_prices(
            &production,
            &investment,
            &bank_charges,
            &net_revenue,
            &tax,
            0.5,
            basis,
        )
        .unwrap();

        assert_eq!(solution.discounted_cashflow, vec![300., 110., 130.]);
        assert_eq!(solution.discounted_credit_cashflow, vec![300., 110., 120.]);
        assert_relative_eq!(solution.prices.real, 2.7);
        assert_relative_eq!(solution.prices.real_credit_adjusted, 2.65);
        assert_relative_eq!(solution.prices.nominal0, 2.7);
    }

    #[rstest]
    fn should_never_price_credit_above_full_tax(basis: DiscountBasis) {
        let production = [0., 100., 100., 100.];
        let solution = solve_breakeven_prices(
            &production,
            &[500., 50., 50., 50.],
            &[0.; 4],
            &[-500., 100., 100., 100.],
            &[0., 25., 25., 25.],
            0.1,
            basis,
        )
        .unwrap();
        assert!(solution.prices.real_credit_adjusted < solution.prices.real);
        assert!(solution.prices.nominal_credit_adjusted0 < solution.prices.nominal0);
        assert!(solution.prices.nominal0 < solution.prices.real);
    }

    #[rstest]
    fn should_fail_without_production(basis: DiscountBasis) {
        assert!(matches!(
            discover_prices(&[0.; 3], &[100.; 3], &[0.; 3], &[0.; 3], basis),
            Err(CalculationError::DegenerateModel(_))
        ));
        assert!(matches!(
            solve_breakeven_prices(&[0.; 3], &[100.; 3], &[0.; 3], &[0.; 3], &[0.; 3], 0., basis),
            Err(CalculationError::DegenerateModel(_))
        ));
    }

    #[rstest]
    fn should_fail_when_all_production_is_taxed_away(basis: DiscountBasis) {
        assert!(matches!(
            discover_prices(&[0., 100.], &[100., 100.], &[0.; 2], &[0., 1.], basis),
            Err(CalculationError::DegenerateModel(_))
        ));
    }
}
