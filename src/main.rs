//! COVID-19 Global Dashboard
//!
//! Loads the daily case/death/recovery observations and shows global, country,
//! continent and mortality views in an interactive window, or writes them out
//! headless as a JSON report and PNG charts.

mod bootstrap;
mod charts;
mod data;
mod gui;
mod report;
mod settings;
mod stats;

use anyhow::Context;
use charts::StaticChartRenderer;
use clap::Parser;
use eframe::egui;
use gui::DashboardApp;
use report::DashboardReport;
use settings::Settings;
use stats::StatsCalculator;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(settings.effective_log_level())?;

    if settings.is_headless() {
        return run_headless(&settings);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("COVID-19 Global Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19 Global Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run window: {e}"))
}

/// Report and/or PNG export without opening a window.
fn run_headless(settings: &Settings) -> anyhow::Result<()> {
    let data = data::load_dashboard(&settings.data, settings.snapshot_cutoff)
        .with_context(|| format!("loading {}", settings.data.display()))?;

    if settings.report || settings.report_file.is_some() {
        let views =
            StatsCalculator::build_views(&data, settings.top_n(), settings.mortality_threshold);
        DashboardReport::new(&settings.data, settings.snapshot_cutoff, &data, &views)
            .write(settings.report_file.as_deref())?;
    }

    if let Some(dir) = &settings.export_charts {
        let written = StaticChartRenderer::export_all(&data, dir)?;
        for path in &written {
            info!(path = %path.display(), "Chart written");
        }
    }

    Ok(())
}
