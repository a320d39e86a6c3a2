//! Data Processor Module
//! Aggregates observations into the country, global, snapshot and continent tables.

use crate::data::models::{
    ContinentDay, CountryDay, CountrySnapshot, Counts, DashboardData, GlobalDay, Observation,
};
use crate::data::Continent;
use chrono::NaiveDate;
use clap::ValueEnum;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

const COUNTRY: &str = "country";
const CONTINENT: &str = "continent";
const DATE: &str = "date";
const CONFIRMED: &str = "confirmed";
const DEATHS: &str = "deaths";
const RECOVERED: &str = "recovered";

/// Dates travel through frames as ISO strings, which sort chronologically.
const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("No observations to aggregate")]
    Empty,
    #[error("Unexpected value in aggregated column {0}")]
    Corrupt(&'static str),
    #[error("Counts for {0} exceed the supported range")]
    CountOverflow(String),
}

/// Which date a country's snapshot row is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, serde::Serialize)]
pub enum SnapshotCutoff {
    /// Only rows at the latest date of the whole dataset.
    #[default]
    #[value(name = "global")]
    #[serde(rename = "global")]
    GlobalMaxDate,
    /// Each country's own latest row.
    #[value(name = "per-country")]
    #[serde(rename = "per-country")]
    PerCountryMaxDate,
}

/// Builds the derived tables. Every stage is a pure function of its input.
pub struct DataProcessor;

impl DataProcessor {
    /// Run the whole pipeline over one load's observations.
    pub fn build(
        observations: &[Observation],
        cutoff: SnapshotCutoff,
    ) -> Result<DashboardData, ProcessorError> {
        let country_days = Self::country_days(observations)?;
        let latest_date = country_days
            .iter()
            .map(|row| row.date)
            .max()
            .ok_or(ProcessorError::Empty)?;

        let global = Self::global_series(&country_days)?;
        let latest = Self::latest_snapshot(&country_days, cutoff);
        let continents = Self::continent_series(&country_days)?;

        let mut countries: Vec<String> = country_days.iter().map(|r| r.country.clone()).collect();
        countries.dedup();

        Ok(DashboardData {
            latest_date,
            countries,
            country_days,
            global,
            latest,
            continents,
        })
    }

    /// Sum observations per (country, date). Sorted by country, then date.
    pub fn country_days(observations: &[Observation]) -> Result<Vec<CountryDay>, ProcessorError> {
        if observations.is_empty() {
            return Err(ProcessorError::Empty);
        }

        let countries: Vec<String> = observations.iter().map(|o| o.country.clone()).collect();
        let dates: Vec<String> = observations.iter().map(|o| date_key(o.date)).collect();
        check_sums(
            countries
                .iter()
                .zip(&dates)
                .map(|(country, date)| format!("{country} on {date}"))
                .zip(observations.iter().map(|o| &o.counts)),
        )?;
        let frame = counts_frame(
            vec![
                Column::new(COUNTRY.into(), countries),
                Column::new(DATE.into(), dates),
            ],
            observations.iter().map(|o| &o.counts),
        )?;

        let grouped = sum_by(frame, &[COUNTRY, DATE], &[COUNTRY, DATE])?;

        let countries = string_values(&grouped, COUNTRY)?;
        let dates = date_values(&grouped)?;
        let counts = counts_values(&grouped)?;

        let rows = countries
            .into_iter()
            .zip(dates)
            .zip(counts)
            .map(|((country, date), counts)| CountryDay {
                continent: Continent::for_country(&country),
                country,
                date,
                counts,
            })
            .collect();
        Ok(rows)
    }

    /// Sum per date with first differences. Sorted by date.
    pub fn global_series(country_days: &[CountryDay]) -> Result<Vec<GlobalDay>, ProcessorError> {
        if country_days.is_empty() {
            return Ok(Vec::new());
        }

        let dates: Vec<String> = country_days.iter().map(|r| date_key(r.date)).collect();
        check_sums(
            dates
                .iter()
                .cloned()
                .zip(country_days.iter().map(|r| &r.counts)),
        )?;
        let frame = counts_frame(
            vec![Column::new(DATE.into(), dates)],
            country_days.iter().map(|r| &r.counts),
        )?;
        let grouped = sum_by(frame, &[DATE], &[DATE])?;

        let dates = date_values(&grouped)?;
        let counts = counts_values(&grouped)?;

        let mut series = Vec::with_capacity(dates.len());
        let mut previous: Option<Counts> = None;
        for (date, counts) in dates.into_iter().zip(counts) {
            let daily = previous
                .map(|prev| counts.delta_from(&prev))
                .unwrap_or_default();
            series.push(GlobalDay {
                date,
                counts,
                daily,
            });
            previous = Some(counts);
        }
        Ok(series)
    }

    /// One row per country at the cutoff, with mortality. Sorted by country.
    ///
    /// Under [`SnapshotCutoff::GlobalMaxDate`] a country with no row on the
    /// dataset's latest date is left out; nothing is carried forward.
    pub fn latest_snapshot(
        country_days: &[CountryDay],
        cutoff: SnapshotCutoff,
    ) -> Vec<CountrySnapshot> {
        let Some(max_date) = country_days.iter().map(|r| r.date).max() else {
            return Vec::new();
        };

        let mut by_country: BTreeMap<&str, &CountryDay> = BTreeMap::new();
        for row in country_days {
            if cutoff == SnapshotCutoff::GlobalMaxDate && row.date != max_date {
                continue;
            }
            by_country
                .entry(row.country.as_str())
                .and_modify(|kept| {
                    if row.date > kept.date {
                        *kept = row;
                    }
                })
                .or_insert(row);
        }

        by_country
            .into_values()
            .map(|row| CountrySnapshot {
                country: row.country.clone(),
                continent: row.continent,
                date: row.date,
                counts: row.counts,
                mortality_rate: row.counts.mortality_rate(),
            })
            .collect()
    }

    /// Sum per (continent, date). Sorted by date, then continent.
    pub fn continent_series(
        country_days: &[CountryDay],
    ) -> Result<Vec<ContinentDay>, ProcessorError> {
        if country_days.is_empty() {
            return Ok(Vec::new());
        }

        let continents: Vec<&str> = country_days.iter().map(|r| r.continent.label()).collect();
        let dates: Vec<String> = country_days.iter().map(|r| date_key(r.date)).collect();
        check_sums(
            continents
                .iter()
                .zip(&dates)
                .map(|(continent, date)| format!("{continent} on {date}"))
                .zip(country_days.iter().map(|r| &r.counts)),
        )?;
        let frame = counts_frame(
            vec![
                Column::new(CONTINENT.into(), continents),
                Column::new(DATE.into(), dates),
            ],
            country_days.iter().map(|r| &r.counts),
        )?;
        let grouped = sum_by(frame, &[CONTINENT, DATE], &[DATE, CONTINENT])?;

        let continents = string_values(&grouped, CONTINENT)?
            .into_iter()
            .map(|label| {
                label
                    .parse::<Continent>()
                    .map_err(|_| ProcessorError::Corrupt(CONTINENT))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let dates = date_values(&grouped)?;
        let counts = counts_values(&grouped)?;

        let rows = continents
            .into_iter()
            .zip(dates)
            .zip(counts)
            .map(|((continent, date), counts)| ContinentDay {
                continent,
                date,
                counts,
            })
            .collect();
        Ok(rows)
    }
}

/// Polars sums UInt64 without overflow checks, so every group total is verified first.
fn check_sums<'a>(
    rows: impl Iterator<Item = (String, &'a Counts)>,
) -> Result<(), ProcessorError> {
    let mut totals: HashMap<String, Counts> = HashMap::new();
    for (key, counts) in rows {
        let total = totals.entry(key.clone()).or_default();
        match total.checked_add(counts) {
            Some(sum) => *total = sum,
            None => return Err(ProcessorError::CountOverflow(key)),
        }
    }
    Ok(())
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Key columns followed by the three count columns.
fn counts_frame<'a>(
    mut columns: Vec<Column>,
    counts: impl Iterator<Item = &'a Counts> + Clone,
) -> PolarsResult<DataFrame> {
    let confirmed: Vec<u64> = counts.clone().map(|c| c.confirmed).collect();
    let deaths: Vec<u64> = counts.clone().map(|c| c.deaths).collect();
    let recovered: Vec<u64> = counts.map(|c| c.recovered).collect();
    columns.push(Column::new(CONFIRMED.into(), confirmed));
    columns.push(Column::new(DEATHS.into(), deaths));
    columns.push(Column::new(RECOVERED.into(), recovered));
    DataFrame::new(columns)
}

fn sum_by(frame: DataFrame, keys: &[&str], sort_keys: &[&str]) -> PolarsResult<DataFrame> {
    let group_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    frame
        .lazy()
        .group_by(group_exprs)
        .agg([
            col(CONFIRMED).sum(),
            col(DEATHS).sum(),
            col(RECOVERED).sum(),
        ])
        .sort(sort_keys.to_vec(), SortMultipleOptions::default())
        .collect()
}

fn string_values(df: &DataFrame, name: &'static str) -> Result<Vec<String>, ProcessorError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string).ok_or(ProcessorError::Corrupt(name)))
        .collect::<Result<Vec<_>, _>>();
    values
}

fn u64_values(df: &DataFrame, name: &'static str) -> Result<Vec<u64>, ProcessorError> {
    let column = df.column(name)?.cast(&DataType::UInt64)?;
    let values = column
        .u64()?
        .into_iter()
        .map(|v| v.ok_or(ProcessorError::Corrupt(name)))
        .collect::<Result<Vec<_>, _>>();
    values
}

fn date_values(df: &DataFrame) -> Result<Vec<NaiveDate>, ProcessorError> {
    string_values(df, DATE)?
        .iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, DATE_KEY_FORMAT).map_err(|_| ProcessorError::Corrupt(DATE))
        })
        .collect()
}

fn counts_values(df: &DataFrame) -> Result<Vec<Counts>, ProcessorError> {
    let confirmed = u64_values(df, CONFIRMED)?;
    let deaths = u64_values(df, DEATHS)?;
    let recovered = u64_values(df, RECOVERED)?;
    Ok(confirmed
        .into_iter()
        .zip(deaths)
        .zip(recovered)
        .map(|((c, d), r)| Counts::new(c, d, r))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{Deltas, MAX_COUNT, UNKNOWN_REGION};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(region: &str, country: &str, day: NaiveDate, c: u64, d: u64, r: u64) -> Observation {
        Observation {
            region: region.to_string(),
            country: country.to_string(),
            date: day,
            counts: Counts::new(c, d, r),
        }
    }

    /// The three-row scenario: US on two dates, China only on the first.
    fn scenario() -> Vec<Observation> {
        vec![
            obs(UNKNOWN_REGION, "US", date(2020, 1, 22), 1, 0, 0),
            obs(UNKNOWN_REGION, "US", date(2020, 1, 23), 2, 0, 0),
            obs(UNKNOWN_REGION, "China", date(2020, 1, 22), 5, 1, 0),
        ]
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs("Hubei", "Mainland China", date(2020, 3, 1), 100, 5, 10),
            obs("Guangdong", "Mainland China", date(2020, 3, 1), 50, 1, 5),
            obs("Hubei", "Mainland China", date(2020, 3, 2), 120, 6, 20),
            obs("Guangdong", "Mainland China", date(2020, 3, 2), 55, 1, 9),
            obs("Lombardy", "Italy", date(2020, 3, 1), 30, 2, 0),
            obs("Lombardy", "Italy", date(2020, 3, 2), 60, 4, 1),
            obs(UNKNOWN_REGION, "France", date(2020, 3, 2), 20, 0, 0),
            obs(UNKNOWN_REGION, "Atlantis", date(2020, 3, 1), 3, 0, 0),
            obs(UNKNOWN_REGION, "Atlantis", date(2020, 3, 2), 4, 1, 0),
            obs(UNKNOWN_REGION, "Diamond Princess", date(2020, 3, 2), 7, 0, 0),
        ]
    }

    #[test]
    fn test_country_days_sum_regions() {
        let rows = DataProcessor::country_days(&sample()).unwrap();
        let china: Vec<_> = rows.iter().filter(|r| r.country == "Mainland China").collect();

        assert_eq!(china.len(), 2);
        assert_eq!(china[0].date, date(2020, 3, 1));
        assert_eq!(china[0].counts, Counts::new(150, 6, 15));
        assert_eq!(china[1].counts, Counts::new(175, 7, 29));
        assert_eq!(china[0].continent, Continent::Asia);
    }

    #[test]
    fn test_country_days_unique_keys_and_order() {
        let rows = DataProcessor::country_days(&sample()).unwrap();
        let keys: Vec<(String, NaiveDate)> =
            rows.iter().map(|r| (r.country.clone(), r.date)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_country_days_empty_input() {
        assert!(matches!(
            DataProcessor::country_days(&[]),
            Err(ProcessorError::Empty)
        ));
    }

    #[test]
    fn test_scenario_global_series() {
        let data = DataProcessor::build(&scenario(), SnapshotCutoff::GlobalMaxDate).unwrap();

        assert_eq!(data.global.len(), 2);
        assert_eq!(data.global[0].date, date(2020, 1, 22));
        assert_eq!(data.global[0].counts, Counts::new(6, 1, 0));
        assert_eq!(data.global[0].daily, Deltas::default());
        assert_eq!(data.global[1].counts, Counts::new(2, 0, 0));
        assert_eq!(data.global[1].daily.confirmed, -4);
        assert_eq!(data.global[1].daily.deaths, -1);
    }

    #[test]
    fn test_scenario_global_cutoff_excludes_missing_country() {
        let data = DataProcessor::build(&scenario(), SnapshotCutoff::GlobalMaxDate).unwrap();

        assert_eq!(data.latest_date, date(2020, 1, 23));
        assert_eq!(data.latest.len(), 1);
        assert_eq!(data.latest[0].country, "US");
        assert_eq!(data.latest[0].date, date(2020, 1, 23));
    }

    #[test]
    fn test_scenario_per_country_cutoff_keeps_own_latest() {
        let data = DataProcessor::build(&scenario(), SnapshotCutoff::PerCountryMaxDate).unwrap();

        assert_eq!(data.latest.len(), 2);
        let china = data.latest.iter().find(|r| r.country == "China").unwrap();
        assert_eq!(china.date, date(2020, 1, 22));
        assert_eq!(china.counts, Counts::new(5, 1, 0));
        assert_eq!(china.mortality_rate, Some(20.0));
    }

    #[test]
    fn test_deltas_sum_back_to_cumulative() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();
        let first = data.global[0].counts;
        let mut running = (
            first.confirmed as i64,
            first.deaths as i64,
            first.recovered as i64,
        );
        for day in &data.global[1..] {
            running.0 += day.daily.confirmed;
            running.1 += day.daily.deaths;
            running.2 += day.daily.recovered;
            assert_eq!(running.0, day.counts.confirmed as i64);
            assert_eq!(running.1, day.counts.deaths as i64);
            assert_eq!(running.2, day.counts.recovered as i64);
        }
    }

    #[test]
    fn test_snapshot_rows_at_global_max_date() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();

        assert!(data.latest.len() <= data.countries.len());
        assert!(data.latest.iter().all(|r| r.date == data.latest_date));
        for row in &data.latest {
            if row.counts.confirmed > 0 {
                let rate = row.mortality_rate.unwrap();
                assert!((0.0..=100.0).contains(&rate));
            }
        }
    }

    #[test]
    fn test_snapshot_undefined_mortality_for_zero_cases() {
        let rows = DataProcessor::country_days(&[obs(
            UNKNOWN_REGION,
            "Fiji",
            date(2020, 3, 1),
            0,
            0,
            0,
        )])
        .unwrap();
        let snapshot = DataProcessor::latest_snapshot(&rows, SnapshotCutoff::GlobalMaxDate);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].mortality_rate, None);
    }

    #[test]
    fn test_continent_totals_match_members() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();

        for row in &data.continents {
            let mut expected = Counts::default();
            for day in data
                .country_days
                .iter()
                .filter(|d| d.continent == row.continent && d.date == row.date)
            {
                expected.add(&day.counts);
            }
            assert_eq!(row.counts, expected, "{} {}", row.continent, row.date);
        }
    }

    #[test]
    fn test_continent_series_keeps_unmapped_and_others() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();

        let unmapped: Vec<_> = data
            .continents
            .iter()
            .filter(|r| r.continent == Continent::Unmapped)
            .collect();
        assert_eq!(unmapped.len(), 2);
        assert_eq!(unmapped[1].counts, Counts::new(4, 1, 0));

        assert!(data
            .continents
            .iter()
            .any(|r| r.continent == Continent::Others && r.counts.confirmed == 7));
    }

    #[test]
    fn test_continent_series_sorted_by_date() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();
        assert!(data
            .continents
            .windows(2)
            .all(|w| (w[0].date, w[0].continent.label()) <= (w[1].date, w[1].continent.label())));
    }

    #[test]
    fn test_countries_are_distinct_and_sorted() {
        let data = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();
        assert_eq!(
            data.countries,
            vec!["Atlantis", "Diamond Princess", "France", "Italy", "Mainland China"]
        );
    }

    #[test]
    fn test_rebuild_is_identical() {
        let first = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();
        let second = DataProcessor::build(&sample(), SnapshotCutoff::GlobalMaxDate).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_overflowing_country_group_is_an_error() {
        let observations = vec![
            obs("Lombardy", "Italy", date(2020, 3, 1), 10_000_000_000_000_000_000, 0, 0),
            obs("Veneto", "Italy", date(2020, 3, 1), 10_000_000_000_000_000_000, 0, 0),
        ];

        let err = DataProcessor::country_days(&observations).unwrap_err();
        match err {
            ProcessorError::CountOverflow(key) => assert_eq!(key, "Italy on 2020-03-01"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflowing_global_total_is_an_error() {
        let observations = vec![
            obs(UNKNOWN_REGION, "Italy", date(2020, 3, 1), MAX_COUNT, 0, 0),
            obs(UNKNOWN_REGION, "France", date(2020, 3, 1), 1, 0, 0),
        ];

        assert!(DataProcessor::country_days(&observations).is_ok());
        let err = DataProcessor::build(&observations, SnapshotCutoff::GlobalMaxDate).unwrap_err();
        assert!(matches!(err, ProcessorError::CountOverflow(_)));
        assert!(err.to_string().contains("exceed the supported range"));
    }

    #[test]
    fn test_counts_at_bound_aggregate() {
        let observations = vec![
            obs(UNKNOWN_REGION, "Italy", date(2020, 3, 1), MAX_COUNT - 1, 0, 0),
            obs(UNKNOWN_REGION, "Italy", date(2020, 3, 2), 1, 0, 0),
        ];

        let data = DataProcessor::build(&observations, SnapshotCutoff::GlobalMaxDate).unwrap();
        assert_eq!(data.global[0].counts.confirmed, MAX_COUNT - 1);
        assert_eq!(data.global[1].daily.confirmed, 2 - i64::MAX);
    }
}
