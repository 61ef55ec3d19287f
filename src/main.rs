use drumsight::{DrumsightApp, Settings, spawn_engine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let loaded = Settings::discover(settings_path.as_deref());
    let settings = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    if let Err(e) = &loaded {
        tracing::warn!("{}, using default settings", e);
    }

    let engine = spawn_engine(&settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Drumsight"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Drumsight",
        options,
        Box::new(move |_cc| Ok(Box::new(DrumsightApp::new(engine, &settings)))),
    ) {
        tracing::error!("{}", e);
    }
}
