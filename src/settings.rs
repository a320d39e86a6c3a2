//! Command line settings.

use crate::data::SnapshotCutoff;
use crate::gui::Page;
use crate::stats::{DEFAULT_MORTALITY_THRESHOLD, DEFAULT_TOP_N};
use clap::Parser;
use std::path::PathBuf;

/// COVID-19 case, death and recovery dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "covid-dashboard",
    about = "COVID-19 global dashboard: trends by country and continent",
    version
)]
pub struct Settings {
    /// Observation CSV to load
    #[arg(long, env = "COVID_DASHBOARD_DATA", default_value = "covid_19_data.csv")]
    pub data: PathBuf,

    /// Page shown at start-up
    #[arg(long, value_enum, default_value_t = Page::GlobalOverview)]
    pub page: Page,

    /// Country selected on the country page
    #[arg(long)]
    pub country: Option<String>,

    /// Date each country's snapshot row is taken from
    #[arg(long, value_enum, default_value_t = SnapshotCutoff::GlobalMaxDate)]
    pub snapshot_cutoff: SnapshotCutoff,

    /// Countries shown in ranking charts (1-50)
    #[arg(long, default_value_t = DEFAULT_TOP_N as u32, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top_n: u32,

    /// Minimum confirmed cases (exclusive) for mortality rankings
    #[arg(long, default_value_t = DEFAULT_MORTALITY_THRESHOLD)]
    pub mortality_threshold: u64,

    /// Print a JSON summary to stdout instead of opening the window
    #[arg(long)]
    pub report: bool,

    /// Write the JSON summary to this file instead of opening the window
    #[arg(long)]
    pub report_file: Option<PathBuf>,

    /// Render PNG charts into this directory instead of opening the window
    #[arg(long)]
    pub export_charts: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// True when the run should not open a window.
    pub fn is_headless(&self) -> bool {
        self.report || self.report_file.is_some() || self.export_charts.is_some()
    }

    pub fn top_n(&self) -> usize {
        self.top_n as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("covid-dashboard").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]);
        assert_eq!(settings.page, Page::GlobalOverview);
        assert_eq!(settings.snapshot_cutoff, SnapshotCutoff::GlobalMaxDate);
        assert_eq!(settings.top_n(), 10);
        assert_eq!(settings.mortality_threshold, 1000);
        assert_eq!(settings.effective_log_level(), "INFO");
        assert!(!settings.is_headless());
    }

    #[test]
    fn test_value_enums() {
        let settings = parse(&[
            "--page",
            "mortality",
            "--snapshot-cutoff",
            "per-country",
            "--country",
            "Italy",
        ]);
        assert_eq!(settings.page, Page::MortalityAnalysis);
        assert_eq!(settings.snapshot_cutoff, SnapshotCutoff::PerCountryMaxDate);
        assert_eq!(settings.country.as_deref(), Some("Italy"));
    }

    #[test]
    fn test_headless_modes() {
        assert!(parse(&["--report"]).is_headless());
        assert!(parse(&["--report-file", "out.json"]).is_headless());
        assert!(parse(&["--export-charts", "charts"]).is_headless());
    }

    #[test]
    fn test_debug_overrides_level() {
        let settings = parse(&["--log-level", "ERROR", "--debug"]);
        assert_eq!(settings.effective_log_level(), "DEBUG");
    }

    #[test]
    fn test_top_n_range() {
        let args = ["covid-dashboard", "--top-n", "0"];
        assert!(Settings::try_parse_from(args).is_err());
        let args = ["covid-dashboard", "--top-n", "51"];
        assert!(Settings::try_parse_from(args).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let args = ["covid-dashboard", "--log-level", "TRACE"];
        assert!(Settings::try_parse_from(args).is_err());
    }
}
