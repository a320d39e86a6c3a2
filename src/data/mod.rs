//! Data module - CSV loading and aggregation

mod continents;
mod loader;
pub mod models;
mod processor;

pub use continents::Continent;
pub use loader::{DataLoader, LoaderError};
pub use models::DashboardData;
pub use processor::{DataProcessor, ProcessorError, SnapshotCutoff};

use crate::stats::StatsCalculator;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Any failure that leaves the dashboard without data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data unavailable: {0}")]
    Load(#[from] LoaderError),
    #[error("Data unavailable: {0}")]
    Process(#[from] ProcessorError),
}

/// Load a dataset and build every derived table in one pass.
pub fn load_dashboard(path: &Path, cutoff: SnapshotCutoff) -> Result<DashboardData, DataError> {
    let observations = DataLoader::new(path).load()?;
    let data = DataProcessor::build(&observations, cutoff)?;

    // Province/state rows are summed into their country
    let regions: HashSet<(&str, &str)> = observations
        .iter()
        .filter(|o| o.region != models::UNKNOWN_REGION)
        .map(|o| (o.country.as_str(), o.region.as_str()))
        .collect();

    info!(
        observations = observations.len(),
        regions = regions.len(),
        countries = data.countries.len(),
        days = data.global.len(),
        latest = %data.latest_date,
        "Dashboard data ready"
    );

    let regressions = StatsCalculator::find_count_regressions(&data.country_days);
    if !regressions.is_empty() {
        warn!(
            count = regressions.len(),
            "Confirmed counts decrease between consecutive dates"
        );
        for r in regressions.iter().take(5) {
            warn!(
                country = %r.country,
                from = %r.previous_date,
                to = %r.date,
                "{} -> {}",
                r.previous_confirmed,
                r.confirmed
            );
        }
    }

    let excess = StatsCalculator::find_excess_deaths(&data.country_days);
    if !excess.is_empty() {
        warn!(count = excess.len(), "Rows report more deaths than confirmed cases");
    }

    Ok(data)
}
