//! Control Panel Widget
//! Left side panel with page navigation, data source and export controls.

use clap::ValueEnum;
use egui::{Color32, RichText};
use std::path::{Path, PathBuf};

/// Dashboard pages, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Page {
    #[default]
    #[value(name = "global")]
    GlobalOverview,
    #[value(name = "country")]
    CountryAnalysis,
    #[value(name = "continental")]
    ContinentalTrends,
    #[value(name = "mortality")]
    MortalityAnalysis,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::GlobalOverview,
        Page::CountryAnalysis,
        Page::ContinentalTrends,
        Page::MortalityAnalysis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::GlobalOverview => "Global Overview",
            Page::CountryAnalysis => "Country Analysis",
            Page::ContinentalTrends => "Continental Trends",
            Page::MortalityAnalysis => "Mortality Analysis",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Page::GlobalOverview => "🌍",
            Page::CountryAnalysis => "📍",
            Page::ContinentalTrends => "🗺",
            Page::MortalityAnalysis => "📉",
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub page: Page,
    pub data_path: PathBuf,
    pub status: String,
    pub has_data: bool,
}

impl ControlPanel {
    pub fn new(page: Page, data_path: PathBuf) -> Self {
        Self {
            page,
            data_path,
            status: "Ready".to_string(),
            has_data: false,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🦠 COVID-19 Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Global cases, deaths and recoveries")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Navigation =====
        ui.label(RichText::new("🧭 Navigation").size(14.0).strong());
        ui.add_space(5.0);
        for page in Page::ALL {
            ui.radio_value(
                &mut self.page,
                page,
                format!("{} {}", page.icon(), page.label()),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let color = if self.has_data {
                        Color32::WHITE
                    } else {
                        Color32::GRAY
                    };
                    ui.label(
                        RichText::new(file_label(&self.data_path))
                            .size(12.0)
                            .color(color),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_data, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        let status_color = if self.status.contains("unavailable") || self.status.contains("Error")
        {
            Color32::from_rgb(220, 53, 69)
        } else if self.has_data {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "No file selected".to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ExportCharts,
}
