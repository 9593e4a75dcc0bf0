mod app;
mod canvas;

use app::StickerEditorApp;
use clap::Parser;
use sticker_studio::StudioConfig;
use sticker_studio::config::GlobalOptions;

#[derive(Parser, Debug)]
#[command(name = "sticker-editor", about = "Interactive sticker editor")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.global.resolve().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load settings, using defaults");
        StudioConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sticker Editor",
        options,
        Box::new(|cc| Ok(Box::new(StickerEditorApp::new(cc, config)))),
    )
}
