use crate::core::parameters::PlantMode;
use crate::project_timeline::ProjectTimeline;

/// Corporate tax rate for each year; nothing is taxed while the plant is being built.
pub fn corporate_tax_rates(timeline: &ProjectTimeline, corporate_tax_rate: f64) -> Vec<f64> {
    timeline
        .iter()
        .map(|it| {
            if it.is_construction() {
                0.
            } else {
                corporate_tax_rate
            }
        })
        .collect()
}

/// Tracks how much of the depreciable construction investment has been written off against
/// positive net revenue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepreciationWaterfall {
    depreciable_pool: f64,
    depreciated_so_far: f64,
}

impl DepreciationWaterfall {
    /// Arguments
    /// * `construction_investment` - investment in each construction year
    /// * `owner_cost` - fraction of investment that is not depreciable
    pub fn new(construction_investment: &[f64], owner_cost: f64) -> Self {
        Self {
            depreciable_pool: (1. - owner_cost) * construction_investment.iter().sum::<f64>(),
            depreciated_so_far: 0.,
        }
    }

    pub fn depreciable_pool(&self) -> f64 {
        self.depreciable_pool
    }

    pub fn depreciated_so_far(&self) -> f64 {
        self.depreciated_so_far
    }

    /// Tax payable for one year, consuming the remaining depreciation first.
    pub fn tax_for_year(&mut self, net_revenue: f64, tax_rate: f64) -> f64 {
        if net_revenue <= 0. {
            return 0.;
        }

        let pool = self.depreciable_pool;
        if self.depreciated_so_far < pool {
            let after = self.depreciated_so_far + net_revenue;
            if after < pool {
                self.depreciated_so_far = after;
                0.
            } else if after > pool {
                let taxable = net_revenue + self.depreciated_so_far - pool;
                self.depreciated_so_far = pool;
                taxable * tax_rate
            } else {
                self.depreciated_so_far = pool;
                0.
            }
        } else {
            net_revenue * tax_rate
        }
    }
}

/// Arguments
/// * `timeline` - the project timeline
/// * `plant_mode` - only new builds carry a depreciation allowance
/// * `net_revenue` - revenue less investment for each year
/// * `tax_rates` - corporate tax rate for each year
/// * `yearly_investment` - investment for each year; construction years are depreciable
/// * `owner_cost` - non-depreciable fraction of construction investment
pub fn tax_payable(
    timeline: &ProjectTimeline,
    plant_mode: PlantMode,
    net_revenue: &[f64],
    tax_rates: &[f64],
    yearly_investment: &[f64],
    owner_cost: f64,
) -> Vec<f64> {
    match plant_mode {
        PlantMode::Green => {
            let mut waterfall = DepreciationWaterfall::new(
                &yearly_investment[..timeline.construction_periods()],
                owner_cost,
            );
            net_revenue
                .iter()
                .zip(tax_rates)
                .map(|(net_revenue, tax_rate)| waterfall.tax_for_year(*net_revenue, *tax_rate))
                .collect()
        }
        PlantMode::Brown => net_revenue
            .iter()
            .zip(tax_rates)
            .map(|(net_revenue, tax_rate)| {
                if *net_revenue > 0. {
                    net_revenue * tax_rate
                } else {
                    0.
                }
            })
            .collect(),
    }
}
