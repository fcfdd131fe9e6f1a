//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default minimum zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Default maximum zoom level.
pub const MAX_ZOOM: f64 = 20.0;

/// Camera manages the view transform for the canvas.
///
/// Zoom is anchored at the viewport center: the scale offset recenters the
/// scaled scene so that zooming does not drift towards the origin. The pan
/// offset is expressed in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current pan offset.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub scale: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Size of the host canvas in screen pixels.
    pub viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            viewport: Size::new(800.0, 600.0),
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera for a viewport with custom zoom limits.
    pub fn with_limits(viewport: Size, min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            viewport,
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Translation that keeps the viewport center fixed while scaling.
    pub fn scale_offset(&self) -> Vec2 {
        let Size { width, height } = self.viewport;
        Vec2::new(
            (width * self.scale - width) / 2.0,
            (height * self.scale - height) / 2.0,
        )
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        let translation = self.offset * self.scale - self.scale_offset();
        Affine::translate(translation) * Affine::scale(self.scale)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        let so = self.scale_offset();
        Point::new(
            (screen_point.x - self.offset.x * self.scale + so.x) / self.scale,
            (screen_point.y - self.offset.y * self.scale + so.y) / self.scale,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a world-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Pan from a scroll wheel: content follows the wheel.
    pub fn pan_by_wheel(&mut self, dx: f64, dy: f64) {
        self.offset -= Vec2::new(dx, dy);
    }

    /// Add `delta` to the scale, clamped to the zoom limits.
    pub fn zoom(&mut self, delta: f64) {
        self.set_scale(self.scale + delta);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(self.min_zoom, self.max_zoom);
    }

    /// Back to 100%. The pan offset is kept.
    pub fn reset_zoom(&mut self) {
        self.scale = 1.0;
    }

    /// Zoom level for display, rounded to a whole percent.
    pub fn zoom_percent(&self) -> i32 {
        (self.scale * 100.0).round() as i32
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(camera.scale_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_screen_to_world_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let world = camera.screen_to_world(screen);
        assert!((world.x - screen.x).abs() < f64::EPSILON);
        assert!((world.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_anchors_at_center() {
        let mut camera = Camera::new();
        camera.set_scale(2.0);
        let center = Point::new(400.0, 300.0);
        let world = camera.screen_to_world(center);
        assert!((world.x - 400.0).abs() < 1e-10);
        assert!((world.y - 300.0).abs() < 1e-10);
        let corner = camera.screen_to_world(Point::ZERO);
        assert!((corner.x - 200.0).abs() < 1e-10);
        assert!((corner.y - 150.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.set_scale(1.5);

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.zoom(-0.5);
        }
        assert!((camera.scale - MIN_ZOOM).abs() < f64::EPSILON);

        for _ in 0..100 {
            camera.zoom(1.0);
        }
        assert!((camera.scale - MAX_ZOOM).abs() < f64::EPSILON);

        camera.reset_zoom();
        assert_eq!(camera.zoom_percent(), 100);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        camera.pan_by_wheel(5.0, 5.0);
        assert!((camera.offset.x - 5.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 15.0).abs() < f64::EPSILON);
    }
}
