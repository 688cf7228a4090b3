use windchime::{ChimeApp, ChimePatch, spawn_engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let engine = spawn_engine(ChimePatch::default());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_title("Wind Chime Melody Maker"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "Wind Chime Melody Maker",
        options,
        Box::new(|_cc| Ok(Box::new(ChimeApp::new(engine)))),
    );
}
