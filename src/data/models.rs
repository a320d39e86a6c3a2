//! Table Types Module
//! Row types for the raw observations and the four derived tables.

use crate::data::Continent;
use chrono::NaiveDate;
use serde::Serialize;

/// Region name used when a row has no province/state.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Largest count accepted from input or produced by a sum. Keeps deltas within `i64`.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// Cumulative case counts for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl Counts {
    pub fn new(confirmed: u64, deaths: u64, recovered: u64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
        }
    }

    /// Add another set of counts to this one, saturating at [`MAX_COUNT`].
    pub fn add(&mut self, other: &Counts) {
        let sum = |a: u64, b: u64| a.saturating_add(b).min(MAX_COUNT);
        self.confirmed = sum(self.confirmed, other.confirmed);
        self.deaths = sum(self.deaths, other.deaths);
        self.recovered = sum(self.recovered, other.recovered);
    }

    /// Sum of both, or `None` when any metric would exceed [`MAX_COUNT`].
    pub fn checked_add(&self, other: &Counts) -> Option<Counts> {
        let sum = |a: u64, b: u64| a.checked_add(b).filter(|v| *v <= MAX_COUNT);
        Some(Counts {
            confirmed: sum(self.confirmed, other.confirmed)?,
            deaths: sum(self.deaths, other.deaths)?,
            recovered: sum(self.recovered, other.recovered)?,
        })
    }

    /// Signed difference `self - previous` for each metric.
    pub fn delta_from(&self, previous: &Counts) -> Deltas {
        let diff = |a: u64, b: u64| signed(a).saturating_sub(signed(b));
        Deltas {
            confirmed: diff(self.confirmed, previous.confirmed),
            deaths: diff(self.deaths, previous.deaths),
            recovered: diff(self.recovered, previous.recovered),
        }
    }

    /// Deaths per 100 confirmed, rounded to 2 decimals.
    /// `None` when there are no confirmed cases.
    pub fn mortality_rate(&self) -> Option<f64> {
        if self.confirmed == 0 {
            return None;
        }
        let rate = self.deaths as f64 / self.confirmed as f64 * 100.0;
        Some(round2(rate))
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Day-over-day change. Negative values are kept as reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Deltas {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

/// One raw input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub region: String,
    pub country: String,
    pub date: NaiveDate,
    pub counts: Counts,
}

/// Sum over all regions of a country on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDay {
    pub country: String,
    pub continent: Continent,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
}

/// Sum over all countries on one date, with the change from the previous date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
    pub daily: Deltas,
}

/// A country's row at the snapshot cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySnapshot {
    pub country: String,
    pub continent: Continent,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
    pub mortality_rate: Option<f64>,
}

/// Sum over the countries of one continent on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentDay {
    pub continent: Continent,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
}

/// All derived tables for one load. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub latest_date: NaiveDate,
    pub countries: Vec<String>,
    pub country_days: Vec<CountryDay>,
    pub global: Vec<GlobalDay>,
    pub latest: Vec<CountrySnapshot>,
    pub continents: Vec<ContinentDay>,
}

impl DashboardData {
    /// Most recent global row.
    pub fn latest_global(&self) -> Option<&GlobalDay> {
        self.global.last()
    }
}

/// Round to 2 decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mortality_rate_undefined_without_cases() {
        assert_eq!(Counts::new(0, 0, 0).mortality_rate(), None);
        assert_eq!(Counts::new(0, 3, 0).mortality_rate(), None);
    }

    #[test]
    fn test_mortality_rate_rounded() {
        assert_eq!(Counts::new(3, 1, 0).mortality_rate(), Some(33.33));
        assert_eq!(Counts::new(200, 3, 0).mortality_rate(), Some(1.5));
        assert_eq!(Counts::new(10, 0, 0).mortality_rate(), Some(0.0));
    }

    #[test]
    fn test_delta_keeps_negative_values() {
        let previous = Counts::new(6, 1, 0);
        let current = Counts::new(2, 0, 0);
        let delta = current.delta_from(&previous);
        assert_eq!(delta.confirmed, -4);
        assert_eq!(delta.deaths, -1);
        assert_eq!(delta.recovered, 0);
    }

    #[test]
    fn test_counts_add() {
        let mut total = Counts::new(1, 2, 3);
        total.add(&Counts::new(10, 20, 30));
        assert_eq!(total, Counts::new(11, 22, 33));

        total.add(&Counts::new(MAX_COUNT, 0, 0));
        assert_eq!(total.confirmed, MAX_COUNT);
    }

    #[test]
    fn test_checked_add_rejects_out_of_range() {
        let big = Counts::new(MAX_COUNT - 1, 0, 0);
        assert_eq!(
            big.checked_add(&Counts::new(1, 2, 3)),
            Some(Counts::new(MAX_COUNT, 2, 3))
        );
        assert_eq!(big.checked_add(&Counts::new(2, 0, 0)), None);

        let huge = Counts::new(10_000_000_000_000_000_000, 0, 0);
        assert_eq!(huge.checked_add(&huge), None);
    }

    #[test]
    fn test_delta_at_count_bounds() {
        let top = Counts::new(MAX_COUNT, 0, 0);
        let bottom = Counts::default();
        assert_eq!(top.delta_from(&bottom).confirmed, i64::MAX);
        assert_eq!(bottom.delta_from(&top).confirmed, -i64::MAX);
    }
}
