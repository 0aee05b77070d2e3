use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use clap::Parser;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use qr_core::QrcodeEncoder;
use tracing_subscriber::EnvFilter;
use ui::QrStudioApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop QR code generator")]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = config::SETTINGS_FILE)]
    config: PathBuf,
    /// Text to encode on startup instead of the configured example.
    #[arg(long)]
    text: Option<String>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let loaded = config::load_settings(&args.config);
    let mut settings = loaded.settings;
    if let Some(text) = args.text {
        settings.initial_text = text;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    for warning in &loaded.warnings {
        tracing::warn!("{warning}");
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, Arc::new(QrcodeEncoder));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("QR Studio")
            .with_inner_size([1000.0, 680.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "QR Studio",
        options,
        Box::new(move |_cc| Ok(Box::new(QrStudioApp::bootstrap(cmd_tx, ui_rx, &settings)))),
    )
}
