//! Tool and action state for the board.

use crate::element::ElementKind;
use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Selection,
    Pan,
    Rectangle,
    Circle,
    Line,
    Pencil,
    Text,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Selection,
        Tool::Pan,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Line,
        Tool::Pencil,
        Tool::Text,
        Tool::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Selection => "selection",
            Tool::Pan => "pan",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Line => "line",
            Tool::Pencil => "pencil",
            Tool::Text => "text",
            Tool::Eraser => "eraser",
        }
    }

    /// The element kind this tool creates, if it is a drawing tool.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            Tool::Rectangle => Some(ElementKind::Rectangle),
            Tool::Circle => Some(ElementKind::Circle),
            Tool::Line => Some(ElementKind::Line),
            Tool::Pencil => Some(ElementKind::Freehand),
            Tool::Text => Some(ElementKind::Text),
            Tool::Selection | Tool::Pan | Tool::Eraser => None,
        }
    }

    pub fn is_drawing(self) -> bool {
        self.element_kind().is_some()
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| BoardError::UnknownKind(s.to_string()))
    }
}

/// What the current gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    None,
    Drawing,
    Moving,
    Resizing,
    Panning,
    Writing,
}
