//! Per-element style properties.

use crate::error::{BoardError, BoardResult};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Default stroke width for new elements.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
/// Default font size for text elements.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS-style color: `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn parse(input: &str) -> BoardResult<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("transparent") {
            return Ok(Self::transparent());
        }
        let invalid = || BoardError::MalformedElement(format!("invalid color '{input}'"));
        let hex = input.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?, 255))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties carried by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke color (also the fill color of freehand strokes and text).
    pub stroke_color: SerializableColor,
    /// Fill color (None = transparent).
    pub fill_color: Option<SerializableColor>,
    /// Stroke width; freehand strokes use it as outline thickness.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Font size in world units.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Seed for the hand-drawn effect, stable across transforms.
    #[serde(default)]
    pub seed: u32,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            fill_color: None,
            stroke_width: DEFAULT_STROKE_WIDTH,
            opacity: 1.0,
            font_size: DEFAULT_FONT_SIZE,
            seed: 0,
        }
    }
}

impl ElementStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Into::into)
    }

    /// Resolve a style for a new or rebuilt element.
    ///
    /// Each field comes from the explicit override, then the existing
    /// element's current value, then `defaults`.
    pub fn resolve(
        overrides: &StyleOverrides,
        existing: Option<&ElementStyle>,
        defaults: &ElementStyle,
        seed: u32,
    ) -> Self {
        let base = existing.unwrap_or(defaults);
        let mut style = Self {
            stroke_color: base.stroke_color,
            fill_color: base.fill_color,
            stroke_width: base.stroke_width,
            opacity: base.opacity,
            font_size: base.font_size,
            seed: existing.map_or(seed, |s| s.seed),
        };
        style.apply(overrides);
        style
    }

    /// Merge the set fields of `overrides` into this style.
    pub fn apply(&mut self, overrides: &StyleOverrides) {
        if let Some(color) = overrides.stroke_color {
            self.stroke_color = color;
        }
        if let Some(fill) = overrides.fill_color {
            self.fill_color = fill.filter(|c| c.a > 0);
        }
        if let Some(width) = overrides.stroke_width {
            self.stroke_width = width;
        }
        if let Some(opacity) = overrides.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(size) = overrides.font_size {
            self.font_size = size;
        }
    }
}

/// Optional style fields supplied by a tool or the properties panel.
///
/// `fill_color: Some(None)` explicitly sets the fill to transparent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub stroke_color: Option<SerializableColor>,
    pub fill_color: Option<Option<SerializableColor>>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub font_size: Option<f64>,
}

impl StyleOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_stroke_color(mut self, color: SerializableColor) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn with_fill_color(mut self, color: Option<SerializableColor>) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Check whether no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
