use eframe::{egui, NativeOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wireplan::{AppSettings, WireplanApp};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wireplan=info")))
        .init();

    let settings = AppSettings::load_or_default();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_resizable(true)
            .with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wireplan",
        options,
        Box::new(|cc| Ok(Box::new(WireplanApp::new(cc, settings)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start UI: {err}"))
}
