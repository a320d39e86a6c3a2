//! Static Chart Renderer
//! Writes the time-series charts to PNG files with plotters.
//!
//! Charts:
//! 1. Global trends: cumulative confirmed, deaths, recovered
//! 2. Daily changes: new cases and new deaths per day
//! 3. Continent trends: confirmed cases per continent

use crate::data::models::DashboardData;
use crate::data::Continent;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const CHART_SIZE: (u32, u32) = (1400, 800);

const SERIES_COLORS: [RGBColor; 8] = [
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(96, 125, 139),
];
const CONFIRMED: RGBColor = RGBColor(52, 152, 219);
const DEATHS: RGBColor = RGBColor(231, 76, 60);
const RECOVERED: RGBColor = RGBColor(46, 204, 113);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("No data to render")]
    Empty,
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// One named line of a time-series chart, values aligned with the chart's dates.
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub color: RGBColor,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every exportable chart into `dir`. Returns the written paths.
    pub fn export_all(data: &DashboardData, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let dates: Vec<NaiveDate> = data.global.iter().map(|d| d.date).collect();
        let mut written = Vec::new();

        let path = dir.join("global_trends.png");
        let series = vec![
            Series {
                name: "Total Cases".into(),
                values: data.global.iter().map(|d| d.counts.confirmed as f64).collect(),
                color: CONFIRMED,
            },
            Series {
                name: "Total Deaths".into(),
                values: data.global.iter().map(|d| d.counts.deaths as f64).collect(),
                color: DEATHS,
            },
            Series {
                name: "Total Recovered".into(),
                values: data.global.iter().map(|d| d.counts.recovered as f64).collect(),
                color: RECOVERED,
            },
        ];
        Self::render_time_series(&path, "Global COVID-19 Trends", &dates, &series)?;
        written.push(path);

        let path = dir.join("daily_changes.png");
        let series = vec![
            Series {
                name: "Daily New Cases".into(),
                values: data.global.iter().map(|d| d.daily.confirmed as f64).collect(),
                color: CONFIRMED,
            },
            Series {
                name: "Daily Deaths".into(),
                values: data.global.iter().map(|d| d.daily.deaths as f64).collect(),
                color: DEATHS,
            },
        ];
        Self::render_time_series(&path, "Daily New Cases and Deaths", &dates, &series)?;
        written.push(path);

        let path = dir.join("continent_trends.png");
        let series = Self::continent_series(data, &dates);
        Self::render_time_series(&path, "Cases by Continent Over Time", &dates, &series)?;
        written.push(path);

        info!(dir = %dir.display(), charts = written.len(), "Exported charts");
        Ok(written)
    }

    /// Confirmed per continent aligned to `dates`; dates without a row count as zero.
    pub fn continent_series(data: &DashboardData, dates: &[NaiveDate]) -> Vec<Series> {
        let index: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let mut by_continent: BTreeMap<Continent, Vec<f64>> = BTreeMap::new();
        for row in &data.continents {
            let Some(&i) = index.get(&row.date) else {
                continue;
            };
            by_continent
                .entry(row.continent)
                .or_insert_with(|| vec![0.0; dates.len()])[i] = row.counts.confirmed as f64;
        }

        by_continent
            .into_iter()
            .map(|(continent, values)| {
                let idx = Continent::ALL
                    .iter()
                    .position(|c| *c == continent)
                    .unwrap_or(0);
                Series {
                    name: continent.to_string(),
                    values,
                    color: SERIES_COLORS[idx % SERIES_COLORS.len()],
                }
            })
            .collect()
    }

    /// Y range covering every value, always including zero.
    pub fn value_bounds(series: &[Series]) -> (f64, f64) {
        let values = series.iter().flat_map(|s| s.values.iter().copied());
        let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let pad = ((max - min) * 0.05).max(1.0);
        (if min < 0.0 { min - pad } else { 0.0 }, max + pad)
    }

    /// Draw one line chart with a date x-axis.
    pub fn render_time_series(
        path: &Path,
        title: &str,
        dates: &[NaiveDate],
        series: &[Series],
    ) -> Result<(), RenderError> {
        if dates.is_empty() {
            return Err(RenderError::Empty);
        }

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (y_min, y_max) = Self::value_bounds(series);
        let x_max = (dates.len() as i32 - 1).max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0..x_max, y_min..y_max)
            .map_err(draw_err)?;

        let x_label = |x: &i32| {
            dates
                .get(*x as usize)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        let y_label = |y: &f64| format!("{:.0}", y);

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .x_desc("Date")
            .y_desc("Count")
            .draw()
            .map_err(draw_err)?;

        for s in series {
            let color = s.color;
            chart
                .draw_series(LineSeries::new(
                    s.values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
                    color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{ContinentDay, Counts};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 2, d).unwrap()
    }

    fn series(values: Vec<f64>) -> Series {
        Series {
            name: "s".into(),
            values,
            color: CONFIRMED,
        }
    }

    #[test]
    fn test_value_bounds_include_zero() {
        let (lo, hi) = StaticChartRenderer::value_bounds(&[series(vec![10.0, 200.0])]);
        assert_eq!(lo, 0.0);
        assert!(hi > 200.0);
    }

    #[test]
    fn test_value_bounds_negative_values() {
        let (lo, hi) = StaticChartRenderer::value_bounds(&[series(vec![-50.0, 100.0])]);
        assert!(lo < -50.0);
        assert!(hi > 100.0);
    }

    #[test]
    fn test_value_bounds_all_zero() {
        let (lo, hi) = StaticChartRenderer::value_bounds(&[series(vec![0.0, 0.0])]);
        assert_eq!(lo, 0.0);
        assert!(hi >= 1.0);
    }

    #[test]
    fn test_continent_series_fills_missing_dates() {
        let data = DashboardData {
            latest_date: date(2),
            countries: Vec::new(),
            country_days: Vec::new(),
            global: Vec::new(),
            latest: Vec::new(),
            continents: vec![
                ContinentDay {
                    continent: Continent::Asia,
                    date: date(1),
                    counts: Counts::new(5, 0, 0),
                },
                ContinentDay {
                    continent: Continent::Asia,
                    date: date(2),
                    counts: Counts::new(8, 0, 0),
                },
                ContinentDay {
                    continent: Continent::Europe,
                    date: date(2),
                    counts: Counts::new(3, 0, 0),
                },
            ],
        };
        let series = StaticChartRenderer::continent_series(&data, &[date(1), date(2)]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Asia");
        assert_eq!(series[0].values, vec![5.0, 8.0]);
        assert_eq!(series[1].name, "Europe");
        assert_eq!(series[1].values, vec![0.0, 3.0]);
    }

    #[test]
    fn test_render_rejects_empty_dates() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticChartRenderer::render_time_series(&dir.path().join("x.png"), "t", &[], &[])
            .unwrap_err();
        assert!(matches!(err, RenderError::Empty));
    }
}
