//! CPU raster surface backed by tiny-skia.

use crate::font::{self, FontTextMeasure};
use crate::renderer::RenderError;
use crate::surface::{StateStack, Surface};
use inkboard_core::element::SerializableColor;
use inkboard_core::text::TextMeasure;
use kurbo::{Affine, BezPath, PathEl, Point};
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Raster surface with PNG export.
///
/// Text is filled as glyph outlines from the system font.
pub struct PixmapSurface {
    pixmap: Pixmap,
    state: StateStack,
    measure: FontTextMeasure,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            state: StateStack::default(),
            measure: FontTextMeasure,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<SerializableColor> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            SerializableColor::new(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let c = SerializableColor::from(color);
        let alpha = (f64::from(c.a) * self.state.current().alpha).round() as u8;
        let mut paint = Paint::default();
        paint.set_color_rgba8(c.r, c.g, c.b, alpha);
        paint.anti_alias = true;
        paint
    }

    fn skia_transform(&self) -> Transform {
        to_skia_transform(self.state.current().transform)
    }
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path; `None` for paths tiny-skia rejects (empty or
/// degenerate).
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

impl Surface for PixmapSurface {
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
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.skia_transform();
        self.pixmap
            .fill_path(&skia_path, &paint, FillRule::Winding, transform, None);
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let transform = self.skia_transform();
        self.pixmap
            .stroke_path(&skia_path, &paint, &stroke, transform, None);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color) {
        let Some(font) = font::board_font() else {
            log::debug!("No font, skipping text {:?} at {:?}", text, origin);
            return;
        };
        let glyphs = font::text_path(font, text, origin, font_size);
        self.fill_path(&glyphs, color);
    }

    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.measure.measure_text(text, font_size)
    }

    fn clear(&mut self, color: Color) {
        let c = SerializableColor::from(color);
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }
}
