use eframe::egui;

use customer_dashboard::config::DashboardConfig;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CustomerDashboardApp {
    pub state: AppState,
}

impl CustomerDashboardApp {
    /// Create the app, loading the configured start-up file if there is one.
    pub fn new(config: DashboardConfig) -> Self {
        let initial_file = config.initial_file.clone();
        let mut state = AppState::new(config);
        if let Some(path) = initial_file {
            panels::load_into(&mut state, &path);
        }
        Self { state }
    }
}

impl eframe::App for CustomerDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
