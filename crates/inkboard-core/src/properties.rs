//! Side-panel access to element styles.

use crate::board::Board;
use crate::element::{ElementId, ElementKind, StyleOverrides};
use crate::error::BoardResult;
use crate::sync::RelayMessage;
use serde::{Deserialize, Serialize};

/// Stroke width range offered by the panel.
pub const STROKE_WIDTH_RANGE: (f64, f64) = (1.0, 50.0);
/// Font size range offered by the panel.
pub const FONT_SIZE_RANGE: (f64, f64) = (8.0, 144.0);

/// Clamp panel values to the ranges the panel allows.
pub fn clamp_overrides(overrides: &StyleOverrides) -> StyleOverrides {
    StyleOverrides {
        stroke_color: overrides.stroke_color,
        fill_color: overrides.fill_color,
        stroke_width: overrides
            .stroke_width
            .map(|w| w.clamp(STROKE_WIDTH_RANGE.0, STROKE_WIDTH_RANGE.1)),
        opacity: overrides.opacity.map(|o| o.clamp(0.0, 1.0)),
        font_size: overrides
            .font_size
            .map(|s| s.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1)),
    }
}

/// What the properties panel shows for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertiesView {
    pub id: ElementId,
    pub kind: ElementKind,
    /// `#rrggbb` or `#rrggbbaa`.
    pub stroke_color: String,
    /// Hex color, or `transparent`.
    pub fill_color: String,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Only set for text elements.
    pub font_size: Option<f64>,
}

impl Board {
    /// Merge `overrides` into the style of element `id` as one undoable
    /// step, and keep it selected.
    ///
    /// A stale id is tolerated: the scene is left unchanged and `Ok(())` is
    /// returned.
    pub fn update_element_properties(
        &mut self,
        id: ElementId,
        overrides: &StyleOverrides,
    ) -> BoardResult<()> {
        let element = match self.element(id) {
            Ok(element) => element,
            Err(e) => {
                log::warn!("Ignoring property update: {}", e);
                return Ok(());
            }
        };
        let mut updated = element.clone();
        updated.style.apply(&clamp_overrides(overrides));
        updated.rebuild_drawable(self.factory().generator());

        let mut scene = self.scene().clone();
        scene.replace(updated.clone());
        self.commit(scene, false, RelayMessage::ElementPatch { element: updated });
        self.select(id);
        log::debug!("Updated properties of element {}", id);
        Ok(())
    }

    /// Panel values for element `id`.
    pub fn properties_for(&self, id: ElementId) -> Option<PropertiesView> {
        let element = self.scene().get(id)?;
        let style = &element.style;
        Some(PropertiesView {
            id,
            kind: element.kind(),
            stroke_color: style.stroke_color.to_hex(),
            fill_color: style
                .fill_color
                .map_or_else(|| "transparent".to_string(), |c| c.to_hex()),
            stroke_width: style.stroke_width,
            opacity: style.opacity,
            font_size: (element.kind() == ElementKind::Text).then_some(style.font_size),
        })
    }
}
