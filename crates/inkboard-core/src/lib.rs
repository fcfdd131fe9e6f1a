//! Inkboard Core Library
//!
//! Element model, interaction state machine, geometry, history and view
//! transform for the Inkboard drawing surface. Rendering lives in
//! `inkboard-render`.

pub mod board;
pub mod camera;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod properties;
pub mod scene;
pub mod storage;
pub mod sync;
pub mod text;
pub mod tools;

pub use board::Board;
pub use camera::Camera;
pub use config::{BoardConfig, ConfigError};
pub use document::Document;
pub use element::{
    Drawable, Element, ElementBody, ElementFactory, ElementId, ElementKind, ElementStyle,
    SerializableColor, StyleOverrides, create_element,
};
pub use error::{BoardError, BoardResult};
pub use geometry::{CursorStyle, ElementHit, Handle, HitPosition, HitTolerances};
pub use history::History;
pub use input::{InputEvent, KeyboardState, Modifiers, PointerButton};
pub use properties::PropertiesView;
pub use scene::Scene;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use sync::{LoopbackHub, LoopbackRelay, Relay, RelayMessage, SyncError};
pub use text::{ApproxTextMeasure, TextMeasure};
pub use tools::{Action, Tool};
