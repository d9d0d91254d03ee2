mod app;
mod color;
mod state;
mod ui;

use app::SalesDashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional: a CSV to open on startup.
    let initial_file = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Performance Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::with_initial_file(initial_file)))),
    )
}
