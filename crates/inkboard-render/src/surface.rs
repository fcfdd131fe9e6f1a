//! 2D drawing surface abstraction.
//!
//! The shape of a canvas context: a state stack holding the global alpha
//! and the current transform, filled and stroked paths, and filled text.

use crate::font::FontTextMeasure;
use inkboard_core::element::SerializableColor;
use inkboard_core::text::TextMeasure;
use kurbo::{Affine, BezPath, Point};
use peniko::Color;

/// Saved surface state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pub alpha: f64,
    pub transform: Affine,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            transform: Affine::IDENTITY,
        }
    }
}

/// Something the render pipeline can draw on.
pub trait Surface {
    /// Push the current state.
    fn save(&mut self);

    /// Pop the most recently saved state. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn global_alpha(&self) -> f64;

    /// Alpha multiplied into every subsequent draw, clamped to [0, 1].
    fn set_global_alpha(&mut self, alpha: f64);

    fn transform(&self) -> Affine;

    /// World-to-surface transform for subsequent draws.
    fn set_transform(&mut self, transform: Affine);

    fn fill_path(&mut self, path: &BezPath, color: Color);

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color);

    /// Draw `text` with its top-left corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color);

    fn measure_text(&self, text: &str, font_size: f64) -> f64;

    /// Fill the whole surface, ignoring alpha and transform.
    fn clear(&mut self, color: Color);
}

/// Current state plus the saved ones, shared by the surfaces in this crate.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateStack {
    current: SurfaceState,
    saved: Vec<SurfaceState>,
}

impl StateStack {
    pub(crate) fn current(&self) -> SurfaceState {
        self.current
    }

    pub(crate) fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub(crate) fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => log::warn!("restore() without matching save()"),
        }
    }

    pub(crate) fn set_alpha(&mut self, alpha: f64) {
        self.current.alpha = alpha.clamp(0.0, 1.0);
    }

    pub(crate) fn set_transform(&mut self, transform: Affine) {
        self.current.transform = transform;
    }

    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: SerializableColor,
    },
    FillPath {
        path: BezPath,
        color: SerializableColor,
        state: SurfaceState,
    },
    StrokePath {
        path: BezPath,
        width: f64,
        color: SerializableColor,
        state: SurfaceState,
    },
    FillText {
        text: String,
        origin: Point,
        font_size: f64,
        color: SerializableColor,
        state: SurfaceState,
    },
}

impl DrawCommand {
    /// State the command was drawn with; `None` for clears.
    pub fn state(&self) -> Option<SurfaceState> {
        match self {
            DrawCommand::Clear { .. } => None,
            DrawCommand::FillPath { state, .. }
            | DrawCommand::StrokePath { state, .. }
            | DrawCommand::FillText { state, .. } => Some(*state),
        }
    }
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    state: StateStack,
    measure: FontTextMeasure,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of outstanding `save()` calls.
    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn global_alpha(&self) -> f64 {
        self.state.current().alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.set_alpha(alpha);
    }

    fn transform(&self) -> Affine {
        self.state.current().transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.set_transform(transform);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color: color.into(),
            state: self.state.current(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            width,
            color: color.into(),
            state: self.state.current(),
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            font_size,
            color: color.into(),
            state: self.state.current(),
        });
    }

    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.measure.measure_text(text, font_size)
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear {
            color: color.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_restore_round_trips_state() {
        let mut surface = RecordingSurface::new();
        surface.save();
        surface.set_global_alpha(0.25);
        surface.set_transform(Affine::scale(2.0));
        assert!((surface.global_alpha() - 0.25).abs() < f64::EPSILON);
        surface.restore();
        assert!((surface.global_alpha() - 1.0).abs() < f64::EPSILON);
        assert_eq!(surface.transform(), Affine::IDENTITY);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut surface = RecordingSurface::new();
        surface.set_global_alpha(0.5);
        surface.restore();
        assert!((surface.global_alpha() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let mut surface = RecordingSurface::new();
        surface.set_global_alpha(3.0);
        assert!((surface.global_alpha() - 1.0).abs() < f64::EPSILON);
        surface.set_global_alpha(-1.0);
        assert!(surface.global_alpha().abs() < f64::EPSILON);
    }

    #[test]
    fn test_commands_capture_state() {
        let mut surface = RecordingSurface::new();
        surface.set_global_alpha(0.5);
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        surface.stroke_path(&path, 2.0, Color::from_rgba8(255, 0, 0, 255));
        let commands = surface.take_commands();
        assert_eq!(commands.len(), 1);
        let state = commands[0].state().unwrap();
        assert!((state.alpha - 0.5).abs() < f64::EPSILON);
        let red = SerializableColor::new(255, 0, 0, 255);
        assert!(matches!(
            &commands[0],
            DrawCommand::StrokePath { color, .. } if *color == red
        ));
        assert!(surface.commands().is_empty());
    }
}
