mod app;
mod config;
mod data;
mod error;
mod gui;
mod log;
mod pipeline;

use std::path::Path;

use app::DashboardApp;
use config::{DashboardConfig, CONFIG_FILE};

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!(
        "Starting Tensile Strength Analysis Dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Tensile Strength Analysis")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Tensile Strength Analysis",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
