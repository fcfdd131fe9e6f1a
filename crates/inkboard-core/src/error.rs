//! Error taxonomy for board operations.

use crate::element::ElementId;
use thiserror::Error;

/// Errors raised by the element factory, the board and the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A tool or element kind that has no element representation reached
    /// the factory or the renderer.
    #[error("Unknown element kind: {0}")]
    UnknownKind(String),
    /// A field required by the element's kind is missing.
    #[error("Malformed element: {0}")]
    MalformedElement(String),
    /// The addressed element no longer exists in the scene.
    #[error("Stale element reference: {0}")]
    StaleReference(ElementId),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;
