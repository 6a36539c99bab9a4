pub mod analytics;
pub mod breakeven;
pub mod cost_stream;
pub mod financing;
pub mod macro_impact;
pub mod multipliers;
pub mod parameters;
pub mod process_yield;
pub mod tax_waterfall;
pub mod units;
