//! COVID-19 Dashboard Main Application
//! Main window with control panel and page viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{self, DashboardData, SnapshotCutoff};
use crate::gui::{ControlPanel, ControlPanelAction, PageView};
use crate::settings::Settings;
use crate::stats::{DashboardViews, StatsCalculator};
use egui::SidePanel;
use std::path::PathBuf;
use tracing::{error, info};

/// Everything one load produces. Replaced as a whole; never partially updated.
enum DataState {
    Ready {
        data: DashboardData,
        views: DashboardViews,
    },
    Failed(String),
}

/// Main application window.
pub struct DashboardApp {
    control_panel: ControlPanel,
    page_view: PageView,
    state: DataState,

    cutoff: SnapshotCutoff,
    top_n: usize,
    mortality_threshold: u64,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        Self::from_settings(settings)
    }

    fn from_settings(settings: Settings) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(settings.page, settings.data.clone()),
            page_view: PageView::new(settings.country.clone()),
            state: DataState::Failed("No data loaded".to_string()),
            cutoff: settings.snapshot_cutoff,
            top_n: settings.top_n(),
            mortality_threshold: settings.mortality_threshold,
        };
        app.load(settings.data);
        app
    }

    /// Load `path` synchronously and swap in the new tables, or the failure.
    fn load(&mut self, path: PathBuf) {
        self.control_panel.data_path = path.clone();

        match data::load_dashboard(&path, self.cutoff) {
            Ok(data) => {
                let views = StatsCalculator::build_views(&data, self.top_n, self.mortality_threshold);
                self.page_view.reset(&data);
                self.control_panel.set_status(format!(
                    "Loaded {} countries, {} days (through {})",
                    data.countries.len(),
                    data.global.len(),
                    data.latest_date
                ));
                self.control_panel.has_data = true;
                self.state = DataState::Ready { data, views };
            }
            Err(e) => {
                error!(path = %path.display(), "{e}");
                self.control_panel.set_status(e.to_string());
                self.control_panel.has_data = false;
                self.state = DataState::Failed(e.to_string());
            }
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.load(path);
        }
    }

    /// Handle PNG export into a user-picked folder
    fn handle_export_charts(&mut self) {
        let DataState::Ready { data, .. } = &self.state else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_all(data, &dir) {
            Ok(paths) => {
                info!(dir = %dir.display(), "PNG export finished");
                self.control_panel
                    .set_status(format!("Exported {} charts to {}", paths.len(), dir.display()));
            }
            Err(e) => {
                error!("{e}");
                self.control_panel.set_status(format!("Export Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - selected page
        let page = self.control_panel.page;
        egui::CentralPanel::default().show(ctx, |ui| match &self.state {
            DataState::Ready { data, views } => self.page_view.show(ui, page, data, views),
            DataState::Failed(reason) => PageView::show_unavailable(ui, reason),
        });
    }
}
