//! Chart Viewer Widget
//! Central scrollable panel showing the selected dashboard page.

use crate::charts::ChartPlotter;
use crate::data::models::{CountryDay, DashboardData};
use crate::gui::Page;
use crate::stats::{DashboardViews, StatsCalculator};
use egui::{Color32, ComboBox, Grid, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;
const METRIC_WIDTH: f32 = 220.0;
const TABLE_HEIGHT: f32 = 360.0;

const POSITIVE: Color32 = Color32::from_rgb(40, 167, 69);
const NEGATIVE: Color32 = Color32::from_rgb(220, 53, 69);

/// Page bodies plus the only state they own: the selected country.
pub struct PageView {
    selected_country: Option<String>,
    /// Rows of `selected_country`, rebuilt when the selection changes.
    country_rows: Vec<CountryDay>,
    rows_for: Option<String>,
}

impl PageView {
    pub fn new(selected_country: Option<String>) -> Self {
        Self {
            selected_country,
            country_rows: Vec::new(),
            rows_for: None,
        }
    }

    /// Forget cached rows after a reload. Keeps the selection if the new data has it.
    pub fn reset(&mut self, data: &DashboardData) {
        self.country_rows.clear();
        self.rows_for = None;
        if let Some(country) = &self.selected_country {
            if !data.countries.contains(country) {
                self.selected_country = None;
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        page: Page,
        data: &DashboardData,
        views: &DashboardViews,
    ) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(page.label()).size(24.0).strong());
                ui.label(
                    RichText::new(format!("Data through {}", data.latest_date))
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(SECTION_SPACING);

                match page {
                    Page::GlobalOverview => Self::show_global(ui, data),
                    Page::CountryAnalysis => self.show_country(ui, data, views),
                    Page::ContinentalTrends => Self::show_continental(ui, data, views),
                    Page::MortalityAnalysis => Self::show_mortality(ui, views),
                }
            });
    }

    /// Centered error screen used instead of any page when loading failed.
    pub fn show_unavailable(ui: &mut egui::Ui, reason: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new("⚠ Data unavailable").size(24.0).color(NEGATIVE));
            ui.add_space(10.0);
            ui.label(RichText::new(reason).size(13.0));
            ui.add_space(10.0);
            ui.label(
                "Please make sure the 'covid_19_data.csv' file is in the working directory, \
                 or pick another file with Browse.",
            );
            ui.label(
                RichText::new(
                    "The dataset is available at \
                     https://www.kaggle.com/datasets/sheshngupta/covid19-global-dashboard",
                )
                .color(Color32::GRAY),
            );
        });
    }

    fn show_global(ui: &mut egui::Ui, data: &DashboardData) {
        if let Some(today) = data.latest_global() {
            ui.horizontal(|ui| {
                metric(
                    ui,
                    "Total Confirmed",
                    &format_count(today.counts.confirmed),
                    Some(today.daily.confirmed),
                );
                metric(
                    ui,
                    "Total Deaths",
                    &format_count(today.counts.deaths),
                    Some(today.daily.deaths),
                );
                metric(
                    ui,
                    "Total Recovered",
                    &format_count(today.counts.recovered),
                    Some(today.daily.recovered),
                );
            });
        }
        ui.add_space(SECTION_SPACING);

        section(ui, "Global COVID-19 Trends");
        ChartPlotter::draw_global_trends(ui, &data.global);
        ui.add_space(SECTION_SPACING);

        section(ui, "Daily New Cases and Deaths");
        ChartPlotter::draw_daily_changes(ui, &data.global);
    }

    fn show_country(&mut self, ui: &mut egui::Ui, data: &DashboardData, views: &DashboardViews) {
        if self.selected_country.is_none() {
            self.selected_country = data.countries.first().cloned();
        }

        ui.horizontal(|ui| {
            ui.label("Select a country:");
            let selected = self.selected_country.clone().unwrap_or_default();
            ComboBox::from_id_salt("country_select")
                .width(260.0)
                .selected_text(&selected)
                .show_ui(ui, |ui| {
                    for country in &data.countries {
                        if ui.selectable_label(selected == *country, country).clicked() {
                            self.selected_country = Some(country.clone());
                        }
                    }
                });
        });
        ui.add_space(SECTION_SPACING);

        let Some(country) = self.selected_country.clone() else {
            return;
        };

        if self.rows_for.as_deref() != Some(country.as_str()) {
            self.country_rows = StatsCalculator::country_series(data, &country)
                .into_iter()
                .cloned()
                .collect();
            self.rows_for = Some(country.clone());
        }

        if let Some(latest) = StatsCalculator::country_latest(data, &country) {
            ui.label(
                RichText::new(format!("As of {}", latest.date))
                    .size(12.0)
                    .color(Color32::GRAY),
            );
            ui.horizontal(|ui| {
                metric(ui, "Confirmed Cases", &format_count(latest.counts.confirmed), None);
                metric(ui, "Deaths", &format_count(latest.counts.deaths), None);
                metric(ui, "Recovered", &format_count(latest.counts.recovered), None);
                metric(ui, "Mortality Rate", &format_rate(latest.mortality_rate), None);
            });
        }
        ui.add_space(SECTION_SPACING);

        section(ui, &format!("COVID-19 Trends in {}", country));
        ChartPlotter::draw_country_trends(ui, &country, &self.country_rows);
        ui.add_space(SECTION_SPACING);

        section(
            ui,
            &format!("Top {} Countries by Confirmed Cases", views.top_confirmed.len()),
        );
        ChartPlotter::draw_top_confirmed(ui, &views.top_confirmed);
        ui.add_space(SECTION_SPACING);

        section(ui, "Latest Snapshot by Country");
        snapshot_table(ui, data);
    }

    fn show_continental(ui: &mut egui::Ui, data: &DashboardData, views: &DashboardViews) {
        section(ui, "COVID-19 Cases by Continent Over Time");
        ChartPlotter::draw_continent_trends(ui, &data.continents);
        ui.add_space(SECTION_SPACING);

        ui.columns(2, |cols| {
            section(&mut cols[0], "Distribution of Cases by Continent");
            ChartPlotter::draw_continent_share(&mut cols[0], &views.continents_latest);
            section(&mut cols[1], "Mortality Rate by Continent");
            ChartPlotter::draw_continent_mortality(&mut cols[1], &views.continents_latest);
        });
    }

    fn show_mortality(ui: &mut egui::Ui, views: &DashboardViews) {
        section(
            ui,
            &format!("Top {} Countries by Mortality Rate", views.highest_mortality.len()),
        );
        if views.highest_mortality.is_empty() {
            ui.label(RichText::new("No country is above the case threshold").color(Color32::GRAY));
        } else {
            ChartPlotter::draw_mortality_ranking(ui, &views.highest_mortality);
        }
        ui.add_space(SECTION_SPACING);

        section(ui, "Global Mortality Rate Over Time");
        ChartPlotter::draw_global_mortality(ui, &views.global_mortality);
        ui.add_space(SECTION_SPACING);

        section(ui, "Confirmed Cases vs Deaths (log scale)");
        if let Some(fit) = &views.trendline {
            ui.label(
                RichText::new(format!(
                    "ln(deaths) = {:.3} × ln(confirmed) {:+.3}   (n = {})",
                    fit.slope, fit.intercept, fit.points
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        }
        ChartPlotter::draw_cases_vs_deaths(ui, &views.cases_vs_deaths, views.trendline.as_ref());
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).size(16.0).strong());
    ui.add_space(5.0);
}

fn metric(ui: &mut egui::Ui, label: &str, value: &str, delta: Option<i64>) {
    egui::Frame::none()
        .rounding(8.0)
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(METRIC_WIDTH);
            ui.vertical(|ui| {
                ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(22.0).strong());
                if let Some(delta) = delta {
                    let color = if delta < 0 { NEGATIVE } else { POSITIVE };
                    ui.label(RichText::new(format_delta(delta)).size(12.0).color(color));
                }
            });
        });
}

fn snapshot_table(ui: &mut egui::Ui, data: &DashboardData) {
    ScrollArea::vertical()
        .id_salt("snapshot_table")
        .max_height(TABLE_HEIGHT)
        .show(ui, |ui| {
            Grid::new("snapshot_grid")
                .striped(true)
                .num_columns(6)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    for header in [
                        "Country",
                        "Continent",
                        "Confirmed",
                        "Deaths",
                        "Recovered",
                        "Mortality",
                    ] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for row in &data.latest {
                        ui.label(&row.country);
                        ui.label(row.continent.label());
                        ui.label(format_count(row.counts.confirmed));
                        ui.label(format_count(row.counts.deaths));
                        ui.label(format_count(row.counts.recovered));
                        ui.label(format_rate(row.mortality_rate));
                        ui.end_row();
                    }
                });
        });
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Signed delta with separators: `+1,234`, `-56`, `0`.
pub fn format_delta(value: i64) -> String {
    let abs = format_count(value.unsigned_abs());
    match value {
        v if v > 0 => format!("+{}", abs),
        v if v < 0 => format!("-{}", abs),
        _ => abs,
    }
}

pub fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}%", r))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(1234), "+1,234");
        assert_eq!(format_delta(-4), "-4");
        assert_eq!(format_delta(0), "0");
        assert_eq!(format_delta(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Some(3.5)), "3.50%");
        assert_eq!(format_rate(None), "n/a");
    }
}
