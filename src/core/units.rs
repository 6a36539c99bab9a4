/// Macro impact figures are reported in millions.
pub const REPORTING_DIVISOR: f64 = 1_000_000.;
pub const KILOGRAMS_PER_TONNE: f64 = 1_000.;

/// Growth factor `(1 + rate)^index` applied to a value in year `index`.
pub fn compounding_factor(rate: f64, index: usize) -> f64 {
    (1. + rate).powi(index as i32)
}

/// Divisor `(1 + rate)^index` used to bring a year-`index` value back to year zero.
pub fn discount_divisor(rate: f64, index: usize) -> f64 {
    compounding_factor(rate, index)
}

/// Running total of a series, e.g. for cumulative cash flows.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0., |running, value| {
            *running += value;
            Some(*running)
        })
        .collect()
}
