//! CSV Data Loader Module
//! Reads the observation CSV with Polars and validates every row.

use crate::data::models::{Counts, Observation, MAX_COUNT, UNKNOWN_REGION};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const DATE_COL: &str = "ObservationDate";
pub const REGION_COL: &str = "Province/State";
pub const COUNTRY_COL: &str = "Country/Region";
pub const CONFIRMED_COL: &str = "Confirmed";
pub const DEATHS_COL: &str = "Deaths";
pub const RECOVERED_COL: &str = "Recovered";

/// Accepted `ObservationDate` layouts. Two-digit years are handled separately.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Row {row}: missing value in column {column}")]
    MissingValue { row: usize, column: &'static str },
    #[error("Row {row}: invalid count {value:?} in column {column}")]
    InvalidCount {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Row {row}: unparseable date {value:?}")]
    InvalidDate { row: usize, value: String },
    #[error("No data rows in {0}")]
    NoData(PathBuf),
}

/// Loads observations from a CSV file. Any malformed row rejects the whole file.
pub struct DataLoader {
    file_path: PathBuf,
}

impl DataLoader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Read and validate every row of the file.
    pub fn load(&self) -> Result<Vec<Observation>, LoaderError> {
        let path = self.file_path.as_path();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "Reading dataset");

        // Everything is read as text; counts and dates are validated below
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let observations = Self::parse_observations(&df)?;
        if observations.is_empty() {
            return Err(LoaderError::NoData(path.to_path_buf()));
        }

        debug!(rows = observations.len(), "Parsed observations");
        Ok(observations)
    }

    /// Convert a raw frame into observations.
    ///
    /// Row numbers in errors count data rows from 1, header excluded.
    pub fn parse_observations(df: &DataFrame) -> Result<Vec<Observation>, LoaderError> {
        let dates = string_column(df, DATE_COL)?;
        let countries = string_column(df, COUNTRY_COL)?;
        let confirmed = string_column(df, CONFIRMED_COL)?;
        let deaths = string_column(df, DEATHS_COL)?;
        let recovered = string_column(df, RECOVERED_COL)?;
        let regions = match df.column(REGION_COL) {
            Ok(column) => Some(column.cast(&DataType::String)?.str()?.clone()),
            Err(_) => None,
        };

        let mut observations = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = i + 1;

            let region = regions
                .as_ref()
                .and_then(|r| non_empty(r.get(i)))
                .unwrap_or(UNKNOWN_REGION)
                .to_string();
            let country = required(&countries, i, row, COUNTRY_COL)?.to_string();

            let raw_date = required(&dates, i, row, DATE_COL)?;
            let date = parse_date(raw_date).ok_or_else(|| LoaderError::InvalidDate {
                row,
                value: raw_date.to_string(),
            })?;

            let counts = Counts::new(
                count_at(&confirmed, i, row, CONFIRMED_COL)?,
                count_at(&deaths, i, row, DEATHS_COL)?,
                count_at(&recovered, i, row, RECOVERED_COL)?,
            );

            observations.push(Observation {
                region,
                country,
                date,
                counts,
            });
        }

        Ok(observations)
    }
}

fn string_column(df: &DataFrame, name: &'static str) -> Result<StringChunked, LoaderError> {
    let column = df
        .column(name)
        .map_err(|_| LoaderError::MissingColumn(name))?;
    Ok(column.cast(&DataType::String)?.str()?.clone())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(
    column: &'a StringChunked,
    i: usize,
    row: usize,
    name: &'static str,
) -> Result<&'a str, LoaderError> {
    non_empty(column.get(i)).ok_or(LoaderError::MissingValue { row, column: name })
}

fn count_at(
    column: &StringChunked,
    i: usize,
    row: usize,
    name: &'static str,
) -> Result<u64, LoaderError> {
    let raw = required(column, i, row, name)?;
    parse_count(raw).ok_or_else(|| LoaderError::InvalidCount {
        row,
        column: name,
        value: raw.to_string(),
    })
}

/// Parse a non-negative integer count up to [`MAX_COUNT`].
/// Integer-valued decimals like `"12.0"` are accepted.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return (value <= MAX_COUNT).then_some(value);
    }
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_COUNT as f64 {
        return None;
    }
    let count = value as u64;
    (count <= MAX_COUNT).then_some(count)
}

/// Parse `MM/DD/YYYY`, `YYYY-MM-DD` or `MM/DD/YY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let two_digit_year = raw.contains('/') && raw.rsplit('/').next().is_some_and(|y| y.len() == 2);
    if two_digit_year {
        return NaiveDate::parse_from_str(raw, "%m/%d/%y").ok();
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "SNo,ObservationDate,Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(file, "{body}").expect("write csv");
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_csv(&format!(
            "{HEADER}\n\
             1,01/22/2020,Hubei,Mainland China,1/22/2020 17:00,444.0,17.0,28.0\n\
             2,01/22/2020,,US,1/22/2020 17:00,1.0,0.0,0.0\n"
        ));
        let observations = DataLoader::new(file.path()).load().expect("load");

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].region, "Hubei");
        assert_eq!(observations[0].country, "Mainland China");
        assert_eq!(observations[0].date, date(2020, 1, 22));
        assert_eq!(observations[0].counts, Counts::new(444, 17, 28));
        assert_eq!(observations[1].region, UNKNOWN_REGION);
        assert_eq!(observations[1].counts, Counts::new(1, 0, 0));
    }

    #[test]
    fn test_region_column_is_optional() {
        let file = write_csv(
            "ObservationDate,Country/Region,Confirmed,Deaths,Recovered\n\
             2020-03-01,Italy,1694,34,83\n",
        );
        let observations = DataLoader::new(file.path()).load().expect("load");
        assert_eq!(observations[0].region, UNKNOWN_REGION);
        assert_eq!(observations[0].date, date(2020, 3, 1));
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn test_missing_required_column() {
        let file = write_csv("ObservationDate,Country/Region,Confirmed,Deaths\n01/22/2020,US,1,0\n");
        let err = DataLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(RECOVERED_COL)));
    }

    #[test]
    fn test_missing_count_rejects_load() {
        let file = write_csv(&format!(
            "{HEADER}\n\
             1,01/22/2020,,US,x,1,0,0\n\
             2,01/23/2020,,US,x,,0,0\n"
        ));
        let err = DataLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingValue {
                row: 2,
                column: CONFIRMED_COL
            }
        ));
    }

    #[test]
    fn test_non_numeric_count_rejects_load() {
        let file = write_csv(&format!("{HEADER}\n1,01/22/2020,,US,x,1,abc,0\n"));
        let err = DataLoader::new(file.path()).load().unwrap_err();
        match err {
            LoaderError::InvalidCount { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, DEATHS_COL);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_date_rejects_load() {
        let file = write_csv(&format!("{HEADER}\n1,22nd Jan,,US,x,1,0,0\n"));
        let err = DataLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_header_only_is_no_data() {
        let file = write_csv(&format!("{HEADER}\n"));
        let err = DataLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::NoData(_)));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7.0 "), Some(7));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("1.5"), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("inf"), None);
        assert_eq!(parse_count("many"), None);
    }

    #[test]
    fn test_parse_count_upper_bound() {
        assert_eq!(parse_count("9223372036854775807"), Some(MAX_COUNT));
        assert_eq!(parse_count("9223372036854775808"), None);
        assert_eq!(parse_count("10000000000000000000"), None);
        assert_eq!(parse_count("1e19"), None);
        assert_eq!(parse_count("18446744073709551615"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("01/22/2020"), Some(date(2020, 1, 22)));
        assert_eq!(parse_date("1/2/2020"), Some(date(2020, 1, 2)));
        assert_eq!(parse_date("2020-05-29"), Some(date(2020, 5, 29)));
        assert_eq!(parse_date("01/22/20"), Some(date(2020, 1, 22)));
        assert_eq!(parse_date("13/45/2020"), None);
        assert_eq!(parse_date(""), None);
    }
}
