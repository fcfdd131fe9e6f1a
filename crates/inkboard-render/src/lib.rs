//! Inkboard Render Library
//!
//! Draws board elements onto a [`Surface`]. [`RecordingSurface`] captures
//! draw calls, [`PixmapSurface`] rasterizes them with tiny-skia and
//! fills text from a system font.

pub mod font;
pub mod freehand;
mod pixmap;
mod renderer;
mod surface;

pub use font::FontTextMeasure;
pub use freehand::{FreehandOptions, outline, path_from_outline};
pub use pixmap::PixmapSurface;
pub use renderer::{
    RenderContext, RenderError, RenderResult, SurfaceTextMeasure, draw, draw_scene, render_png,
};
pub use surface::{DrawCommand, RecordingSurface, Surface, SurfaceState};
