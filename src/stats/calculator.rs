//! Statistics Calculator Module
//! Derived views over the aggregated tables: rankings, continent summaries,
//! mortality trends, the cases-vs-deaths trendline and data-quality checks.

use crate::data::models::{
    round2, ContinentDay, CountryDay, CountrySnapshot, Counts, DashboardData, GlobalDay,
};
use crate::data::Continent;
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// Number of countries shown in ranking charts.
pub const DEFAULT_TOP_N: usize = 10;

/// Countries need more confirmed cases than this to enter mortality rankings.
pub const DEFAULT_MORTALITY_THRESHOLD: u64 = 1000;

/// A continent's totals at the latest continent date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentSummary {
    pub continent: Continent,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
    pub mortality_rate: Option<f64>,
    /// Percent of all confirmed cases on that date.
    pub share: f64,
}

/// Least-squares fit of `ln(deaths) = intercept + slope * ln(confirmed)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub points: usize,
}

impl Trendline {
    /// Fitted deaths for a confirmed count.
    pub fn predict(&self, confirmed: f64) -> f64 {
        (self.intercept + self.slope * confirmed.ln()).exp()
    }
}

/// Confirmed count dropped between two consecutive dates of one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRegression {
    pub country: String,
    pub previous_date: NaiveDate,
    pub date: NaiveDate,
    pub previous_confirmed: u64,
    pub confirmed: u64,
}

/// A row reporting more deaths than confirmed cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcessDeaths {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
}

/// Ranking and summary views, computed once per load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub top_confirmed: Vec<CountrySnapshot>,
    pub highest_mortality: Vec<CountrySnapshot>,
    pub continents_latest: Vec<ContinentSummary>,
    pub global_mortality: Vec<(NaiveDate, Option<f64>)>,
    /// Snapshot rows above the mortality threshold, for the cases-vs-deaths scatter.
    pub cases_vs_deaths: Vec<CountrySnapshot>,
    pub trendline: Option<Trendline>,
}

/// Stateless calculations over [`DashboardData`] tables.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Build every ranking and summary view used by the pages and the report.
    pub fn build_views(data: &DashboardData, top_n: usize, min_confirmed: u64) -> DashboardViews {
        DashboardViews {
            top_confirmed: Self::top_by_confirmed(&data.latest, top_n)
                .into_iter()
                .cloned()
                .collect(),
            highest_mortality: Self::highest_mortality(&data.latest, min_confirmed, top_n)
                .into_iter()
                .cloned()
                .collect(),
            continents_latest: Self::continent_latest(&data.continents),
            global_mortality: Self::global_mortality_series(&data.global),
            cases_vs_deaths: Self::above_threshold(&data.latest, min_confirmed)
                .into_iter()
                .cloned()
                .collect(),
            trendline: Self::log_log_trendline(&data.latest, min_confirmed),
        }
    }

    /// Top `n` snapshot rows by confirmed cases, largest first.
    pub fn top_by_confirmed(latest: &[CountrySnapshot], n: usize) -> Vec<&CountrySnapshot> {
        let mut rows: Vec<&CountrySnapshot> = latest.iter().collect();
        rows.sort_by(|a, b| {
            b.counts
                .confirmed
                .cmp(&a.counts.confirmed)
                .then_with(|| a.country.cmp(&b.country))
        });
        rows.truncate(n);
        rows
    }

    /// Snapshot rows with strictly more than `min_confirmed` cases.
    pub fn above_threshold(latest: &[CountrySnapshot], min_confirmed: u64) -> Vec<&CountrySnapshot> {
        latest
            .iter()
            .filter(|row| row.counts.confirmed > min_confirmed)
            .collect()
    }

    /// Top `n` rows above the case threshold by mortality rate, highest first.
    pub fn highest_mortality(
        latest: &[CountrySnapshot],
        min_confirmed: u64,
        n: usize,
    ) -> Vec<&CountrySnapshot> {
        let mut rows = Self::above_threshold(latest, min_confirmed);
        rows.sort_by(|a, b| {
            let a_rate = a.mortality_rate.unwrap_or(f64::NEG_INFINITY);
            let b_rate = b.mortality_rate.unwrap_or(f64::NEG_INFINITY);
            b_rate
                .partial_cmp(&a_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.country.cmp(&b.country))
        });
        rows.truncate(n);
        rows
    }

    /// Continent rows at the latest continent date with mortality and case share.
    pub fn continent_latest(continents: &[ContinentDay]) -> Vec<ContinentSummary> {
        let Some(latest) = continents.iter().map(|r| r.date).max() else {
            return Vec::new();
        };

        let rows: Vec<&ContinentDay> = continents.iter().filter(|r| r.date == latest).collect();
        let mut total = Counts::default();
        for row in &rows {
            total.add(&row.counts);
        }

        rows.into_iter()
            .map(|row| ContinentSummary {
                continent: row.continent,
                date: row.date,
                counts: row.counts,
                mortality_rate: row.counts.mortality_rate(),
                share: if total.confirmed == 0 {
                    0.0
                } else {
                    round2(row.counts.confirmed as f64 / total.confirmed as f64 * 100.0)
                },
            })
            .collect()
    }

    /// Global mortality rate per date. `None` on dates with no confirmed cases.
    pub fn global_mortality_series(global: &[GlobalDay]) -> Vec<(NaiveDate, Option<f64>)> {
        global
            .iter()
            .map(|day| (day.date, day.counts.mortality_rate()))
            .collect()
    }

    /// All rows of one country, oldest first.
    pub fn country_series<'a>(data: &'a DashboardData, country: &str) -> Vec<&'a CountryDay> {
        data.country_days
            .iter()
            .filter(|row| row.country == country)
            .collect()
    }

    /// The country's own most recent row, regardless of the snapshot cutoff.
    pub fn country_latest(data: &DashboardData, country: &str) -> Option<CountrySnapshot> {
        Self::country_series(data, country)
            .into_iter()
            .max_by_key(|row| row.date)
            .map(|row| CountrySnapshot {
                country: row.country.clone(),
                continent: row.continent,
                date: row.date,
                counts: row.counts,
                mortality_rate: row.counts.mortality_rate(),
            })
    }

    /// Fit deaths against confirmed cases on log scales.
    ///
    /// Uses rows with more than `min_confirmed` cases and at least one death.
    /// Returns `None` with fewer than two such rows or no spread in cases.
    pub fn log_log_trendline(latest: &[CountrySnapshot], min_confirmed: u64) -> Option<Trendline> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = latest
            .iter()
            .filter(|row| row.counts.confirmed > min_confirmed && row.counts.deaths > 0)
            .map(|row| {
                (
                    (row.counts.confirmed as f64).ln(),
                    (row.counts.deaths as f64).ln(),
                )
            })
            .unzip();

        if xs.len() < 2 {
            return None;
        }

        let variance = xs.iter().variance();
        if variance.is_nan() || variance <= 0.0 {
            return None;
        }

        let slope = xs.iter().covariance(ys.iter()) / variance;
        let intercept = ys.iter().mean() - slope * xs.iter().mean();

        Some(Trendline {
            slope,
            intercept,
            points: xs.len(),
        })
    }

    /// Consecutive rows of a country where confirmed decreases.
    ///
    /// Expects rows sorted by country, then date, as produced by the processor.
    pub fn find_count_regressions(country_days: &[CountryDay]) -> Vec<CountRegression> {
        country_days
            .windows(2)
            .filter(|pair| pair[0].country == pair[1].country)
            .filter(|pair| pair[1].counts.confirmed < pair[0].counts.confirmed)
            .map(|pair| CountRegression {
                country: pair[1].country.clone(),
                previous_date: pair[0].date,
                date: pair[1].date,
                previous_confirmed: pair[0].counts.confirmed,
                confirmed: pair[1].counts.confirmed,
            })
            .collect()
    }

    /// Rows whose mortality rate would exceed 100%.
    pub fn find_excess_deaths(country_days: &[CountryDay]) -> Vec<ExcessDeaths> {
        country_days
            .iter()
            .filter(|row| row.counts.deaths > row.counts.confirmed)
            .map(|row| ExcessDeaths {
                country: row.country.clone(),
                date: row.date,
                confirmed: row.counts.confirmed,
                deaths: row.counts.deaths,
            })
            .collect()
    }
}
