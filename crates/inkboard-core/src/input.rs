//! Input events forwarded by the host surface.

use crate::element::{ElementId, StyleOverrides};
use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn platform(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Events consumed by [`crate::Board::handle_event`].
///
/// Pointer coordinates are client (screen) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Wheel {
        dx: f64,
        dy: f64,
    },
    KeyDown {
        key: String,
    },
    KeyUp {
        key: String,
    },
    /// The text editor lost focus with this content.
    TextCommitted {
        text: String,
    },
    SelectTool {
        tool: Tool,
    },
    UpdateProperties {
        id: ElementId,
        #[serde(default)]
        style: StyleOverrides,
    },
    Zoom {
        delta: f64,
    },
    ResetZoom,
    Undo,
    Redo,
    Resize {
        width: f64,
        height: f64,
    },
}

/// Keyboard commands recognised by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

/// Map a key press to a shortcut.
///
/// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo.
pub fn shortcut_for(key: &str, modifiers: Modifiers) -> Option<Shortcut> {
    if !modifiers.platform() {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "z" if modifiers.shift => Some(Shortcut::Redo),
        "z" => Some(Shortcut::Undo),
        "y" => Some(Shortcut::Redo),
        _ => None,
    }
}

/// Tracks held keys between events.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.pressed.insert(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.pressed.remove(key);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    /// Space held turns any pointer drag into a pan.
    pub fn space_held(&self) -> bool {
        self.is_pressed(" ") || self.is_pressed("Space")
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift: self.is_pressed("Shift"),
            ctrl: self.is_pressed("Control"),
            alt: self.is_pressed("Alt"),
            meta: self.is_pressed("Meta"),
        }
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        let cmd_shift = Modifiers {
            meta: true,
            shift: true,
            ..Modifiers::default()
        };
        assert_eq!(shortcut_for("z", ctrl), Some(Shortcut::Undo));
        assert_eq!(shortcut_for("Z", cmd_shift), Some(Shortcut::Redo));
        assert_eq!(shortcut_for("y", ctrl), Some(Shortcut::Redo));
        assert_eq!(shortcut_for("z", Modifiers::default()), None);
        assert_eq!(shortcut_for("x", ctrl), None);
    }

    #[test]
    fn test_keyboard_state() {
        let mut keys = KeyboardState::new();
        keys.press(" ");
        keys.press("Control");
        assert!(keys.space_held());
        assert!(keys.modifiers().platform());
        keys.release(" ");
        assert!(!keys.space_held());
    }

    #[test]
    fn test_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"event":"pointer_down","x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                x: 1.0,
                y: 2.0,
                button: PointerButton::Primary
            }
        );
        let event: InputEvent =
            serde_json::from_str(r#"{"event":"select_tool","tool":"pencil"}"#).unwrap();
        assert_eq!(event, InputEvent::SelectTool { tool: Tool::Pencil });
    }
}
