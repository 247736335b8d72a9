mod app;
mod color;
mod state;
mod ui;

use app::CustomerDashboardApp;
use customer_dashboard::config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Customer Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CustomerDashboardApp::new(config)))),
    )
}
