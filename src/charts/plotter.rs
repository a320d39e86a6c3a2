//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot.

use crate::data::models::{ContinentDay, CountryDay, CountrySnapshot, GlobalDay};
use crate::data::Continent;
use crate::stats::{ContinentSummary, Trendline};
use chrono::{Datelike, NaiveDate};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points};
use std::collections::BTreeMap;

pub const CONFIRMED_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const DEATHS_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const RECOVERED_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

const CHART_HEIGHT: f32 = 320.0;

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Stable colour per continent.
    pub fn continent_color(continent: Continent) -> Color32 {
        let idx = Continent::ALL
            .iter()
            .position(|c| *c == continent)
            .unwrap_or(0);
        PALETTE[idx % PALETTE.len()]
    }

    /// Red shade for a value relative to the largest value in the chart.
    pub fn intensity_color(value: f64, max: f64) -> Color32 {
        let t = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
        let fade = (235.0 * (1.0 - t)) as u8;
        Color32::from_rgb(200 + (55.0 * t) as u8, fade, fade)
    }

    /// Plot x coordinate of a date.
    pub fn date_x(date: NaiveDate) -> f64 {
        date.num_days_from_ce() as f64
    }

    fn date_label(x: f64) -> String {
        NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    fn show_time_plot(ui: &mut egui::Ui, id: &str, y_label: &str, add: impl FnOnce(&mut PlotUi)) {
        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label(y_label)
            .x_axis_formatter(|mark, _range| Self::date_label(mark.value))
            .show(ui, add);
    }

    fn show_category_plot(
        ui: &mut egui::Ui,
        id: &str,
        labels: Vec<String>,
        y_label: &str,
        add: impl FnOnce(&mut PlotUi),
    ) {
        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .allow_drag(false)
            .include_y(0.0)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, add);
    }

    fn line(points: Vec<[f64; 2]>, name: &str, color: Color32) -> Line {
        Line::new(PlotPoints::from(points))
            .name(name)
            .color(color)
            .width(2.0)
    }

    /// Cumulative confirmed, deaths and recovered.
    pub fn draw_global_trends(ui: &mut egui::Ui, global: &[GlobalDay]) {
        let series = |f: fn(&GlobalDay) -> u64| -> Vec<[f64; 2]> {
            global
                .iter()
                .map(|d| [Self::date_x(d.date), f(d) as f64])
                .collect()
        };
        let confirmed = series(|d| d.counts.confirmed);
        let deaths = series(|d| d.counts.deaths);
        let recovered = series(|d| d.counts.recovered);

        Self::show_time_plot(ui, "global_trends", "Count", |plot_ui| {
            plot_ui.line(Self::line(confirmed, "Total Cases", CONFIRMED_COLOR));
            plot_ui.line(Self::line(deaths, "Total Deaths", DEATHS_COLOR));
            plot_ui.line(Self::line(recovered, "Total Recovered", RECOVERED_COLOR));
        });
    }

    /// Daily new cases as a filled area with daily deaths on top.
    pub fn draw_daily_changes(ui: &mut egui::Ui, global: &[GlobalDay]) {
        let new_cases: Vec<[f64; 2]> = global
            .iter()
            .map(|d| [Self::date_x(d.date), d.daily.confirmed as f64])
            .collect();
        let new_deaths: Vec<[f64; 2]> = global
            .iter()
            .map(|d| [Self::date_x(d.date), d.daily.deaths as f64])
            .collect();

        Self::show_time_plot(ui, "daily_changes", "Count", |plot_ui| {
            plot_ui.line(Self::line(new_cases, "Daily New Cases", CONFIRMED_COLOR).fill(0.0_f32));
            plot_ui.line(Self::line(new_deaths, "Daily Deaths", DEATHS_COLOR));
        });
    }

    /// Confirmed, deaths and recovered for one country.
    pub fn draw_country_trends(ui: &mut egui::Ui, country: &str, rows: &[CountryDay]) {
        let series = |f: fn(&CountryDay) -> u64| -> Vec<[f64; 2]> {
            rows.iter()
                .map(|d| [Self::date_x(d.date), f(d) as f64])
                .collect()
        };
        let confirmed = series(|d| d.counts.confirmed);
        let deaths = series(|d| d.counts.deaths);
        let recovered = series(|d| d.counts.recovered);

        let id = format!("country_trends_{country}");
        Self::show_time_plot(ui, &id, "Count", |plot_ui| {
            plot_ui.line(Self::line(confirmed, "Confirmed Cases", CONFIRMED_COLOR));
            plot_ui.line(Self::line(deaths, "Deaths", DEATHS_COLOR));
            plot_ui.line(Self::line(recovered, "Recovered", RECOVERED_COLOR));
        });
    }

    /// Bars of confirmed cases, shaded by deaths.
    pub fn draw_top_confirmed(ui: &mut egui::Ui, rows: &[CountrySnapshot]) {
        let labels: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
        let max_deaths = rows.iter().map(|r| r.counts.deaths).max().unwrap_or(0) as f64;
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64, r.counts.confirmed as f64)
                    .name(format!("{} ({} deaths)", r.country, r.counts.deaths))
                    .fill(Self::intensity_color(r.counts.deaths as f64, max_deaths))
                    .width(0.7)
            })
            .collect();

        Self::show_category_plot(ui, "top_confirmed", labels, "Confirmed Cases", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Confirmed"));
        });
    }

    /// Confirmed cases per continent over time.
    pub fn draw_continent_trends(ui: &mut egui::Ui, continents: &[ContinentDay]) {
        let mut by_continent: BTreeMap<Continent, Vec<[f64; 2]>> = BTreeMap::new();
        for row in continents {
            by_continent
                .entry(row.continent)
                .or_default()
                .push([Self::date_x(row.date), row.counts.confirmed as f64]);
        }

        Self::show_time_plot(ui, "continent_trends", "Confirmed Cases", |plot_ui| {
            for (continent, points) in by_continent {
                plot_ui.line(Self::line(
                    points,
                    continent.label(),
                    Self::continent_color(continent),
                ));
            }
        });
    }

    /// Share of confirmed cases per continent, in percent.
    pub fn draw_continent_share(ui: &mut egui::Ui, summary: &[ContinentSummary]) {
        let labels: Vec<String> = summary.iter().map(|s| s.continent.to_string()).collect();
        let bars: Vec<Bar> = summary
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64, s.share)
                    .name(format!("{}: {:.2}%", s.continent, s.share))
                    .fill(Self::continent_color(s.continent))
                    .width(0.7)
            })
            .collect();

        Self::show_category_plot(ui, "continent_share", labels, "Share of Cases (%)", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Share"));
        });
    }

    /// Mortality rate per continent. Continents without cases are skipped.
    pub fn draw_continent_mortality(ui: &mut egui::Ui, summary: &[ContinentSummary]) {
        let rated: Vec<(&ContinentSummary, f64)> = summary
            .iter()
            .filter_map(|s| s.mortality_rate.map(|rate| (s, rate)))
            .collect();
        let labels: Vec<String> = rated.iter().map(|(s, _)| s.continent.to_string()).collect();
        let max = rated.iter().map(|(_, r)| *r).fold(0.0, f64::max);
        let bars: Vec<Bar> = rated
            .iter()
            .enumerate()
            .map(|(i, (s, rate))| {
                Bar::new(i as f64, *rate)
                    .name(format!("{}: {:.2}%", s.continent, rate))
                    .fill(Self::intensity_color(*rate, max))
                    .width(0.7)
            })
            .collect();

        Self::show_category_plot(ui, "continent_mortality", labels, "Mortality Rate (%)", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Mortality Rate"));
        });
    }

    /// Mortality rate bars for a ranked list of countries.
    pub fn draw_mortality_ranking(ui: &mut egui::Ui, rows: &[CountrySnapshot]) {
        let labels: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
        let max = rows
            .iter()
            .filter_map(|r| r.mortality_rate)
            .fold(0.0, f64::max);
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                let rate = r.mortality_rate?;
                Some(
                    Bar::new(i as f64, rate)
                        .name(format!("{}: {:.2}%", r.country, rate))
                        .fill(Self::intensity_color(rate, max))
                        .width(0.7),
                )
            })
            .collect();

        Self::show_category_plot(ui, "mortality_ranking", labels, "Mortality Rate (%)", |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Mortality Rate"));
        });
    }

    /// Global mortality rate over time. Dates without cases leave a gap.
    pub fn draw_global_mortality(ui: &mut egui::Ui, series: &[(NaiveDate, Option<f64>)]) {
        let points: Vec<[f64; 2]> = series
            .iter()
            .filter_map(|(date, rate)| rate.map(|r| [Self::date_x(*date), r]))
            .collect();

        Self::show_time_plot(ui, "global_mortality", "Mortality Rate (%)", |plot_ui| {
            plot_ui.line(Self::line(points, "Mortality Rate", DEATHS_COLOR));
        });
    }

    /// Cases vs deaths on log10 axes, one colour per continent, with the fitted trendline.
    pub fn draw_cases_vs_deaths(
        ui: &mut egui::Ui,
        rows: &[CountrySnapshot],
        trendline: Option<&Trendline>,
    ) {
        let mut by_continent: BTreeMap<Continent, Vec<[f64; 2]>> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.counts.deaths > 0) {
            by_continent.entry(row.continent).or_default().push([
                (row.counts.confirmed as f64).log10(),
                (row.counts.deaths as f64).log10(),
            ]);
        }

        let fit: Option<Vec<[f64; 2]>> = trendline.and_then(|t| {
            let min = rows.iter().map(|r| r.counts.confirmed).min()? as f64;
            let max = rows.iter().map(|r| r.counts.confirmed).max()? as f64;
            let steps = 20;
            Some(
                (0..=steps)
                    .map(|i| {
                        let x = min * (max / min).powf(i as f64 / steps as f64);
                        [x.log10(), t.predict(x).log10()]
                    })
                    .collect(),
            )
        });

        let log_label = |v: f64| format!("{:.0}", 10f64.powf(v));
        Plot::new("cases_vs_deaths")
            .height(CHART_HEIGHT + 80.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Confirmed Cases (log)")
            .y_axis_label("Deaths (log)")
            .x_axis_formatter(move |mark, _range| log_label(mark.value))
            .y_axis_formatter(move |mark, _range| log_label(mark.value))
            .show(ui, |plot_ui| {
                for (continent, points) in by_continent {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .radius(4.0)
                            .color(Self::continent_color(continent))
                            .name(continent.label()),
                    );
                }
                if let Some(points) = fit {
                    plot_ui.line(Self::line(points, "OLS trendline", Color32::GRAY));
                }
            });
    }
}
