//! Input script replay and export.

use inkboard_core::{
    Board, BoardConfig, BoardError, ConfigError, FileStorage, InputEvent, Storage, StorageError,
};
use inkboard_render::{FontTextMeasure, RenderError, render_png};
use kurbo::Size;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shell errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Failed to serialize document: {0}")]
    Serialize(serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("Event {index} failed: {source}")]
    Event { index: usize, source: BoardError },
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Shell settings, usually filled from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub script: PathBuf,
    pub config: Option<PathBuf>,
    /// Document store directory; the result is saved there under its id.
    pub store: Option<PathBuf>,
    /// Id of a stored document to continue from.
    pub open: Option<String>,
    pub out_json: Option<PathBuf>,
    pub out_png: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub document_id: String,
    pub events: usize,
    pub elements: usize,
    pub history_depth: usize,
}

pub fn parse_script(json: &str) -> Result<Vec<InputEvent>, AppError> {
    Ok(serde_json::from_str(json)?)
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    fs::write(path, bytes).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Feed `events` to `board` in order, stopping at the first failure.
pub fn replay(board: &mut Board, events: Vec<InputEvent>) -> Result<usize, AppError> {
    let count = events.len();
    for (index, event) in events.into_iter().enumerate() {
        log::trace!("Event {}: {:?}", index, event);
        board
            .handle_event(event)
            .map_err(|source| AppError::Event { index, source })?;
    }
    Ok(count)
}

/// Load config and script, replay, and write the requested outputs.
pub fn run(config: &AppConfig) -> Result<ReplayReport, AppError> {
    let board_config = match &config.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    let events = parse_script(&read(&config.script)?)?;
    log::info!(
        "Replaying {} events from {}",
        events.len(),
        config.script.display()
    );

    let storage = config.store.as_ref().map(FileStorage::new).transpose()?;
    let board = match (&config.open, &storage) {
        (Some(id), Some(storage)) => {
            log::info!("Opening document {} from {}", id, storage.base_path().display());
            Board::from_document(storage.load(id)?, board_config)
        }
        (Some(id), None) => return Err(StorageError::NotFound(id.clone()).into()),
        (None, _) => Board::new(board_config),
    };
    let mut board = board.with_text_measure(FontTextMeasure);
    board.set_viewport(Size::new(f64::from(config.width), f64::from(config.height)));
    let count = replay(&mut board, events)?;

    let document = board.to_document();
    let document_id = match &storage {
        Some(storage) => storage.save_document(&document)?,
        None => document.id.to_string(),
    };
    if let Some(path) = &config.out_json {
        let json = document.to_json().map_err(AppError::Serialize)?;
        write(path, json.as_bytes())?;
        log::info!("Saved document to: {}", path.display());
    }
    if let Some(path) = &config.out_png {
        let png = render_png(&board, config.width, config.height)?;
        write(path, &png)?;
        log::info!("Exported PNG to: {}", path.display());
    }

    Ok(ReplayReport {
        document_id,
        events: count,
        elements: board.scene().len(),
        history_depth: board.history_depth(),
    })
}
