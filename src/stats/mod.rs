//! Stats module - rankings, summaries and data-quality checks

mod calculator;

pub use calculator::{
    ContinentSummary, CountRegression, DashboardViews, ExcessDeaths, StatsCalculator, Trendline,
    DEFAULT_MORTALITY_THRESHOLD, DEFAULT_TOP_N,
};
