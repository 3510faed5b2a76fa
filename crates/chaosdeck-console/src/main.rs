//! Chaosdeck: operator console for a distributed fault-injection harness.

mod app;
mod format;
mod panels;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chaosdeck",
    about = "Operator console for the chaos execution service"
)]
struct Args {
    /// Base URL of the execution service.
    #[arg(long, env = "CHAOSDECK_URL", default_value = "http://127.0.0.1:8000")]
    url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(url = %args.url, "starting console");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Chaosdeck",
        options,
        Box::new(move |cc| Ok(Box::new(app::ChaosApp::new(cc, &args.url)))),
    )
}
