//! Headless JSON report of the derived views.

use crate::data::models::{CountrySnapshot, DashboardData, GlobalDay};
use crate::data::{Continent, SnapshotCutoff};
use crate::stats::{
    ContinentSummary, CountRegression, DashboardViews, ExcessDeaths, StatsCalculator, Trendline,
};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Rows flagged during the load. Reported as-is, never corrected.
#[derive(Debug, Serialize)]
pub struct QualityChecks {
    pub count_regressions: Vec<CountRegression>,
    pub excess_deaths: Vec<ExcessDeaths>,
}

#[derive(Debug, Serialize)]
pub struct DashboardReport<'a> {
    pub source: String,
    pub snapshot_cutoff: SnapshotCutoff,
    pub latest_date: NaiveDate,
    pub countries: usize,
    pub days: usize,
    pub global_latest: Option<&'a GlobalDay>,
    pub top_confirmed: &'a [CountrySnapshot],
    pub highest_mortality: &'a [CountrySnapshot],
    pub continents: &'a [ContinentSummary],
    pub trendline: Option<Trendline>,
    /// Countries with no entry in the continent table.
    pub unmapped_countries: Vec<&'a str>,
    pub quality: QualityChecks,
}

impl<'a> DashboardReport<'a> {
    pub fn new(
        source: &Path,
        cutoff: SnapshotCutoff,
        data: &'a DashboardData,
        views: &'a DashboardViews,
    ) -> Self {
        Self {
            source: source.display().to_string(),
            snapshot_cutoff: cutoff,
            latest_date: data.latest_date,
            countries: data.countries.len(),
            days: data.global.len(),
            global_latest: data.latest_global(),
            top_confirmed: &views.top_confirmed,
            highest_mortality: &views.highest_mortality,
            continents: &views.continents_latest,
            trendline: views.trendline,
            unmapped_countries: data
                .countries
                .iter()
                .map(String::as_str)
                .filter(|c| Continent::for_country(c) == Continent::Unmapped)
                .collect(),
            quality: QualityChecks {
                count_regressions: StatsCalculator::find_count_regressions(&data.country_days),
                excess_deaths: StatsCalculator::find_excess_deaths(&data.country_days),
            },
        }
    }

    /// Pretty JSON to `path`, or stdout when `path` is `None`.
    pub fn write(&self, path: Option<&Path>) -> anyhow::Result<()> {
        match path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create report file {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer)?;
                writer.flush()?;
                info!(path = %path.display(), "Report written");
            }
            None => {
                let stdout = std::io::stdout();
                let mut writer = stdout.lock();
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{Counts, Observation, UNKNOWN_REGION};
    use crate::data::DataProcessor;

    fn obs(country: &str, day: u32, confirmed: u64, deaths: u64) -> Observation {
        Observation {
            region: UNKNOWN_REGION.to_string(),
            country: country.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            counts: Counts::new(confirmed, deaths, 0),
        }
    }

    fn sample() -> DashboardData {
        let observations = vec![
            obs("Italy", 1, 1500, 40),
            obs("Italy", 2, 1400, 45),
            obs("Atlantis", 1, 3, 5),
            obs("Atlantis", 2, 4, 5),
        ];
        DataProcessor::build(&observations, SnapshotCutoff::GlobalMaxDate).unwrap()
    }

    #[test]
    fn test_report_fields() {
        let data = sample();
        let views = StatsCalculator::build_views(&data, 10, 1000);
        let report = DashboardReport::new(
            Path::new("covid_19_data.csv"),
            SnapshotCutoff::GlobalMaxDate,
            &data,
            &views,
        );

        assert_eq!(report.countries, 2);
        assert_eq!(report.days, 2);
        assert_eq!(report.unmapped_countries, vec!["Atlantis"]);
        assert_eq!(report.quality.count_regressions.len(), 1);
        assert_eq!(report.quality.count_regressions[0].country, "Italy");
        assert_eq!(report.quality.excess_deaths.len(), 2);
        assert_eq!(report.highest_mortality.len(), 1);
    }

    #[test]
    fn test_report_json_shape() {
        let data = sample();
        let views = StatsCalculator::build_views(&data, 10, 1000);
        let report = DashboardReport::new(
            Path::new("covid_19_data.csv"),
            SnapshotCutoff::PerCountryMaxDate,
            &data,
            &views,
        );
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["snapshot_cutoff"], "per-country");
        assert_eq!(value["latest_date"], "2020-03-02");
        assert_eq!(value["global_latest"]["confirmed"], 1404);
        assert_eq!(value["global_latest"]["daily"]["confirmed"], -99);
        assert_eq!(value["top_confirmed"][0]["country"], "Italy");
    }

    #[test]
    fn test_write_to_file() {
        let data = sample();
        let views = StatsCalculator::build_views(&data, 10, 1000);
        let report = DashboardReport::new(
            Path::new("covid_19_data.csv"),
            SnapshotCutoff::GlobalMaxDate,
            &data,
            &views,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write(Some(&path)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["countries"], 2);
        assert_eq!(written["source"], "covid_19_data.csv");
    }
}
