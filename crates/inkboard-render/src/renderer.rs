//! Element and scene drawing.

use crate::freehand::{self, FreehandOptions};
use crate::pixmap::PixmapSurface;
use crate::surface::Surface;
use inkboard_core::element::{Element, ElementBody, ElementId};
use inkboard_core::error::BoardError;
use inkboard_core::text::TextMeasure;
use inkboard_core::{Board, Camera, Scene};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Context for a single render frame.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// The elements to draw, bottom to top.
    pub scene: &'a Scene,
    /// World-to-screen view.
    pub camera: Camera,
    /// Background color.
    pub background_color: Color,
    /// Element whose text editor is open (skipped).
    pub editing_element: Option<ElementId>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, camera: Camera) -> Self {
        Self {
            scene,
            camera,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            editing_element: None,
        }
    }

    /// Frame for the board's live scene, view and text editor.
    pub fn from_board(board: &'a Board) -> Self {
        Self::new(board.scene(), board.camera().clone())
            .with_editing_element(board.editing_element().map(|e| e.id))
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the element being edited (will be skipped in draw_scene).
    pub fn with_editing_element(mut self, id: Option<ElementId>) -> Self {
        self.editing_element = id;
        self
    }

    /// Render into a surface of a different size than the board's viewport.
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.camera.set_viewport(viewport);
        self
    }
}

/// Draw one element in world coordinates.
///
/// The element's opacity applies to this element only: surface state is
/// restored afterwards, also on error.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, element: &Element) -> RenderResult<()> {
    surface.save();
    surface.set_global_alpha(element.style.opacity);
    let result = draw_body(surface, element);
    surface.restore();
    result
}

fn draw_body<S: Surface + ?Sized>(surface: &mut S, element: &Element) -> RenderResult<()> {
    let style = &element.style;
    match &element.body {
        ElementBody::Line { .. } | ElementBody::Rectangle { .. } | ElementBody::Circle { .. } => {
            let drawable = element.drawable().ok_or_else(|| {
                BoardError::MalformedElement(format!(
                    "{} element {} has no drawable",
                    element.kind(),
                    element.id
                ))
            })?;
            if let (Some(fill), Some(color)) = (&drawable.fill, style.fill()) {
                surface.fill_path(fill, color);
            }
            for stroke in &drawable.strokes {
                surface.stroke_path(stroke, style.stroke_width, style.stroke());
            }
        }
        ElementBody::Freehand { points } => {
            if points.is_empty() {
                return Err(BoardError::MalformedElement(format!(
                    "freehand element {} has no points",
                    element.id
                ))
                .into());
            }
            let options = FreehandOptions::for_stroke_width(style.stroke_width);
            let outline = freehand::outline(points, &options);
            surface.fill_path(&freehand::path_from_outline(&outline), style.stroke());
        }
        ElementBody::Text { text } => {
            surface.fill_text(text, element.start(), style.font_size, style.stroke());
        }
    }
    Ok(())
}

/// Clear the surface and draw every element under the camera transform.
pub fn draw_scene<S: Surface + ?Sized>(
    surface: &mut S,
    ctx: &RenderContext<'_>,
) -> RenderResult<()> {
    surface.clear(ctx.background_color);
    surface.save();
    surface.set_transform(ctx.camera.transform());
    let result = ctx
        .scene
        .iter()
        .filter(|element| Some(element.id) != ctx.editing_element)
        .try_for_each(|element| draw(surface, element));
    surface.restore();
    if let Err(e) = &result {
        log::error!("Scene render aborted: {}", e);
    }
    result
}

/// Rasterize the board's current view to PNG bytes.
pub fn render_png(board: &Board, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut surface = PixmapSurface::new(width, height)?;
    let ctx = RenderContext::from_board(board)
        .with_viewport(Size::new(f64::from(width), f64::from(height)));
    draw_scene(&mut surface, &ctx)?;
    log::info!(
        "Rendered {} elements to a {}x{} image",
        ctx.scene.len(),
        width,
        height
    );
    surface.encode_png()
}

/// Text measurement backed by a surface, for committing text elements.
#[derive(Debug, Clone, Default)]
pub struct SurfaceTextMeasure<S>(pub S);

impl<S: Surface> TextMeasure for SurfaceTextMeasure<S> {
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.0.measure_text(text, font_size)
    }
}
