//! Main application entry point.

use clap::Parser;
use inkboard_app::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of input events.
    script: PathBuf,
    /// Board configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document store directory; the result is saved there under its id.
    #[arg(long)]
    store: Option<PathBuf>,
    /// Continue from a stored document instead of an empty board.
    #[arg(long, requires = "store")]
    open: Option<String>,
    /// Where to export the resulting document as JSON.
    #[arg(long)]
    out_json: Option<PathBuf>,
    /// Where to write a PNG render.
    #[arg(long)]
    out_png: Option<PathBuf>,
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Starting Inkboard");

    let config = AppConfig {
        script: args.script,
        config: args.config,
        store: args.store,
        open: args.open,
        out_json: args.out_json,
        out_png: args.out_png,
        width: args.width,
        height: args.height,
    };
    match inkboard_app::run(&config) {
        Ok(report) => {
            log::info!(
                "Replayed {} events into document {}: {} elements, history depth {}",
                report.events,
                report.document_id,
                report.elements,
                report.history_depth
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
