//! Inkboard Application
//!
//! Headless shell around the board: replays recorded input, saves the
//! resulting document and exports a PNG.

mod script;

pub use script::{AppConfig, AppError, ReplayReport, parse_script, replay, run};
