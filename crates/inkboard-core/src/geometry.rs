//! Hit testing, resize handles and coordinate normalization.

use crate::element::{Element, ElementBody, ElementKind, circle_geometry};
use crate::scene::Scene;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Named resize control point on an element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Right,
    Bottom,
    Left,
    /// First endpoint of a line.
    Start,
    /// Second endpoint of a line.
    End,
}

impl Handle {
    pub fn name(self) -> &'static str {
        match self {
            Handle::TopLeft => "top-left",
            Handle::TopRight => "top-right",
            Handle::BottomLeft => "bottom-left",
            Handle::BottomRight => "bottom-right",
            Handle::Top => "top",
            Handle::Right => "right",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
            Handle::Start => "start",
            Handle::End => "end",
        }
    }
}

/// Where a point falls relative to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitPosition {
    /// On the element's body: dragging moves it.
    Inside,
    /// On a resize handle: dragging resizes it.
    Handle(Handle),
}

/// Hit-test distances in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTolerances {
    /// Per-axis distance to a corner or endpoint, and band width of edges.
    pub handle: f64,
    /// Slack in `|ap| + |pb| - |ab|` for a point to count as on a line.
    pub line: f64,
    /// Distance from a freehand stroke's polyline.
    pub freehand: f64,
}

impl Default for HitTolerances {
    fn default() -> Self {
        Self {
            handle: 5.0,
            line: 1.0,
            freehand: 5.0,
        }
    }
}

/// Result of hit-testing a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHit<'a> {
    pub element: &'a Element,
    pub position: HitPosition,
}

/// Cursor shapes the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Default,
    Move,
    NwseResize,
    NeswResize,
    NsResize,
    EwResize,
    Crosshair,
    Grabbing,
}

impl CursorStyle {
    /// CSS cursor name.
    pub fn as_css(self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Move => "move",
            CursorStyle::NwseResize => "nwse-resize",
            CursorStyle::NeswResize => "nesw-resize",
            CursorStyle::NsResize => "ns-resize",
            CursorStyle::EwResize => "ew-resize",
            CursorStyle::Crosshair => "crosshair",
            CursorStyle::Grabbing => "grabbing",
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
///
/// A single point is treated as a degenerate segment.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

fn near(point: Point, target: Point, tolerance: f64) -> bool {
    (point.x - target.x).abs() < tolerance && (point.y - target.y).abs() < tolerance
}

/// Whether `p` lies on segment a→b, measured by how much the detour through
/// `p` lengthens the segment.
fn on_line(a: Point, b: Point, p: Point, slack: f64) -> bool {
    (a.distance(p) + p.distance(b) - a.distance(b)).abs() < slack
}

fn corner_handle(point: Point, bounds: Rect, tolerance: f64) -> Option<Handle> {
    [
        (Point::new(bounds.x0, bounds.y0), Handle::TopLeft),
        (Point::new(bounds.x1, bounds.y0), Handle::TopRight),
        (Point::new(bounds.x0, bounds.y1), Handle::BottomLeft),
        (Point::new(bounds.x1, bounds.y1), Handle::BottomRight),
    ]
    .into_iter()
    .find(|(corner, _)| near(point, *corner, tolerance))
    .map(|(_, handle)| handle)
}

/// Edge bands run along the inside of the box; boxes too small to keep a
/// movable interior get no edge handles on that axis.
fn edge_handle(point: Point, bounds: Rect, tolerance: f64) -> Option<Handle> {
    let rect = bounds.abs();
    if !rect.contains(point) && !on_rect_boundary(point, rect) {
        return None;
    }
    let horizontal_room = rect.width() > tolerance * 4.0;
    let vertical_room = rect.height() > tolerance * 4.0;
    let flip_x = bounds.x0 > bounds.x1;
    let flip_y = bounds.y0 > bounds.y1;

    if vertical_room && point.y - rect.y0 < tolerance {
        return Some(if flip_y { Handle::Bottom } else { Handle::Top });
    }
    if vertical_room && rect.y1 - point.y < tolerance {
        return Some(if flip_y { Handle::Top } else { Handle::Bottom });
    }
    if horizontal_room && point.x - rect.x0 < tolerance {
        return Some(if flip_x { Handle::Right } else { Handle::Left });
    }
    if horizontal_room && rect.x1 - point.x < tolerance {
        return Some(if flip_x { Handle::Left } else { Handle::Right });
    }
    None
}

/// `Rect::contains` is half-open; the box edges count as inside here.
fn on_rect_boundary(point: Point, rect: Rect) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Where `point` falls on `element`, if anywhere.
pub fn position_within_element(
    point: Point,
    element: &Element,
    tolerances: &HitTolerances,
) -> Option<HitPosition> {
    let bounds = element.bounds;
    match &element.body {
        ElementBody::Line { .. } => {
            let (start, end) = (element.start(), element.end());
            if near(point, start, tolerances.handle) {
                Some(HitPosition::Handle(Handle::Start))
            } else if near(point, end, tolerances.handle) {
                Some(HitPosition::Handle(Handle::End))
            } else if on_line(start, end, point, tolerances.line) {
                Some(HitPosition::Inside)
            } else {
                None
            }
        }
        ElementBody::Rectangle { .. } => corner_handle(point, bounds, tolerances.handle)
            .or_else(|| edge_handle(point, bounds, tolerances.handle))
            .map(HitPosition::Handle)
            .or_else(|| on_rect_boundary(point, bounds.abs()).then_some(HitPosition::Inside)),
        ElementBody::Circle { .. } => {
            let (center, radius) = circle_geometry(element.start(), element.end());
            corner_handle(point, bounds, tolerances.handle)
                .map(HitPosition::Handle)
                .or_else(|| (point.distance(center) <= radius).then_some(HitPosition::Inside))
        }
        ElementBody::Freehand { points } => {
            (point_to_polyline_dist(point, points) <= tolerances.freehand)
                .then_some(HitPosition::Inside)
        }
        ElementBody::Text { .. } => {
            on_rect_boundary(point, bounds.abs()).then_some(HitPosition::Inside)
        }
    }
}

/// The topmost element under `point`.
pub fn element_at<'a>(
    point: Point,
    scene: &'a Scene,
    tolerances: &HitTolerances,
) -> Option<ElementHit<'a>> {
    scene.iter().rev().find_map(|element| {
        position_within_element(point, element, tolerances)
            .map(|position| ElementHit { element, position })
    })
}

/// New corners after dragging `handle` to `point`.
///
/// The corner(s) opposite the handle stay fixed. The result may be
/// inverted; see [`adjust_element_coordinates`].
pub fn resized_coordinates(point: Point, handle: Handle, bounds: Rect) -> Rect {
    let Rect { x0, y0, x1, y1 } = bounds;
    match handle {
        Handle::TopLeft | Handle::Start => Rect::new(point.x, point.y, x1, y1),
        Handle::TopRight => Rect::new(x0, point.y, point.x, y1),
        Handle::BottomLeft => Rect::new(point.x, y0, x1, point.y),
        Handle::BottomRight | Handle::End => Rect::new(x0, y0, point.x, point.y),
        Handle::Top => Rect::new(x0, point.y, x1, y1),
        Handle::Right => Rect::new(x0, y0, point.x, y1),
        Handle::Bottom => Rect::new(x0, y0, x1, point.y),
        Handle::Left => Rect::new(point.x, y0, x1, y1),
    }
}

/// Whether elements of `kind` are normalized when a gesture ends.
pub fn needs_normalization(kind: ElementKind) -> bool {
    matches!(
        kind,
        ElementKind::Line | ElementKind::Rectangle | ElementKind::Circle
    )
}

/// Normalized corners for an element at the end of a gesture.
///
/// Rectangles get `x1 <= x2` and `y1 <= y2`. Lines and circles keep their
/// endpoints paired and swap them so the first one is leftmost (topmost on
/// ties), which leaves the drawn geometry unchanged.
pub fn adjust_element_coordinates(element: &Element) -> Rect {
    let Rect { x0, y0, x1, y1 } = element.bounds;
    match element.kind() {
        ElementKind::Rectangle => Rect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)),
        ElementKind::Line | ElementKind::Circle => {
            if x0 < x1 || (x0 == x1 && y0 <= y1) {
                element.bounds
            } else {
                Rect::new(x1, y1, x0, y0)
            }
        }
        ElementKind::Freehand | ElementKind::Text => element.bounds,
    }
}

/// Cursor to show over a hit position.
pub fn cursor_for_position(position: Option<HitPosition>) -> CursorStyle {
    match position {
        Some(HitPosition::Handle(handle)) => match handle {
            Handle::TopLeft | Handle::BottomRight | Handle::Start | Handle::End => {
                CursorStyle::NwseResize
            }
            Handle::TopRight | Handle::BottomLeft => CursorStyle::NeswResize,
            Handle::Top | Handle::Bottom => CursorStyle::NsResize,
            Handle::Left | Handle::Right => CursorStyle::EwResize,
        },
        Some(HitPosition::Inside) => CursorStyle::Move,
        None => CursorStyle::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, StyleOverrides, create_element};

    fn element(kind: ElementKind, id: u64, a: (f64, f64), b: (f64, f64)) -> Element {
        create_element(
            id,
            Point::new(a.0, a.1),
            Point::new(b.0, b.1),
            kind,
            &StyleOverrides::none(),
        )
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-10);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-10);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_rectangle_center_is_inside() {
        let rect = element(ElementKind::Rectangle, 0, (10.0, 10.0), (100.0, 50.0));
        let scene = Scene::from_elements([rect]);
        let hit = element_at(Point::new(55.0, 30.0), &scene, &HitTolerances::default()).unwrap();
        assert_eq!(hit.element.id, 0);
        assert_eq!(hit.position, HitPosition::Inside);
    }

    #[test]
    fn test_rectangle_miss_outside() {
        let rect = element(ElementKind::Rectangle, 0, (10.0, 10.0), (100.0, 50.0));
        let scene = Scene::from_elements([rect]);
        let tolerances = HitTolerances::default();
        assert!(element_at(Point::new(102.0, 30.0), &scene, &tolerances).is_none());
        assert!(element_at(Point::new(55.0, 8.0), &scene, &tolerances).is_none());
    }

    #[test]
    fn test_rectangle_handles() {
        let rect = element(ElementKind::Rectangle, 0, (0.0, 0.0), (100.0, 100.0));
        let t = HitTolerances::default();
        assert_eq!(
            position_within_element(Point::new(1.0, 2.0), &rect, &t),
            Some(HitPosition::Handle(Handle::TopLeft))
        );
        assert_eq!(
            position_within_element(Point::new(103.0, 98.0), &rect, &t),
            Some(HitPosition::Handle(Handle::BottomRight))
        );
        assert_eq!(
            position_within_element(Point::new(99.0, 50.0), &rect, &t),
            Some(HitPosition::Handle(Handle::Right))
        );
        assert_eq!(
            position_within_element(Point::new(50.0, 1.0), &rect, &t),
            Some(HitPosition::Handle(Handle::Top))
        );
    }

    #[test]
    fn test_small_rectangle_has_no_edges() {
        let rect = element(ElementKind::Rectangle, 0, (0.0, 0.0), (12.0, 12.0));
        assert_eq!(
            position_within_element(Point::new(6.0, 1.0), &rect, &HitTolerances::default()),
            Some(HitPosition::Inside)
        );
    }

    #[test]
    fn test_topmost_element_wins() {
        let scene = Scene::from_elements([
            element(ElementKind::Rectangle, 0, (0.0, 0.0), (100.0, 100.0)),
            element(ElementKind::Rectangle, 1, (20.0, 20.0), (80.0, 80.0)),
        ]);
        let hit = element_at(Point::new(50.0, 50.0), &scene, &HitTolerances::default()).unwrap();
        assert_eq!(hit.element.id, 1);
    }

    #[test]
    fn test_line_hits() {
        let line = element(ElementKind::Line, 0, (0.0, 0.0), (100.0, 0.0));
        let t = HitTolerances::default();
        assert_eq!(
            position_within_element(Point::new(50.0, 0.0), &line, &t),
            Some(HitPosition::Inside)
        );
        assert_eq!(
            position_within_element(Point::new(2.0, 1.0), &line, &t),
            Some(HitPosition::Handle(Handle::Start))
        );
        assert_eq!(
            position_within_element(Point::new(99.0, -2.0), &line, &t),
            Some(HitPosition::Handle(Handle::End))
        );
        assert_eq!(position_within_element(Point::new(50.0, 20.0), &line, &t), None);
    }

    #[test]
    fn test_circle_hits() {
        let circle = element(ElementKind::Circle, 0, (0.0, 0.0), (40.0, 0.0));
        let t = HitTolerances::default();
        assert_eq!(
            position_within_element(Point::new(20.0, 15.0), &circle, &t),
            Some(HitPosition::Inside)
        );
        assert_eq!(position_within_element(Point::new(20.0, 25.0), &circle, &t), None);
    }

    #[test]
    fn test_freehand_hits() {
        let mut stroke = element(ElementKind::Freehand, 0, (0.0, 0.0), (0.0, 0.0));
        stroke.push_point(Point::new(50.0, 0.0)).unwrap();
        stroke.push_point(Point::new(50.0, 50.0)).unwrap();
        let t = HitTolerances::default();
        assert_eq!(
            position_within_element(Point::new(52.0, 25.0), &stroke, &t),
            Some(HitPosition::Inside)
        );
        assert_eq!(position_within_element(Point::new(25.0, 25.0), &stroke, &t), None);
    }

    #[test]
    fn test_text_hits_bounds() {
        let text = element(ElementKind::Text, 0, (0.0, 0.0), (60.0, 24.0));
        let t = HitTolerances::default();
        assert_eq!(
            position_within_element(Point::new(30.0, 12.0), &text, &t),
            Some(HitPosition::Inside)
        );
        assert_eq!(position_within_element(Point::new(70.0, 12.0), &text, &t), None);
    }

    #[test]
    fn test_resized_coordinates() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let p = Point::new(20.0, 30.0);
        let cases = [
            (Handle::TopLeft, Rect::new(20.0, 30.0, 10.0, 10.0)),
            (Handle::TopRight, Rect::new(0.0, 30.0, 20.0, 10.0)),
            (Handle::BottomLeft, Rect::new(20.0, 0.0, 10.0, 30.0)),
            (Handle::End, Rect::new(0.0, 0.0, 20.0, 30.0)),
            (Handle::Right, Rect::new(0.0, 0.0, 20.0, 10.0)),
            (Handle::Top, Rect::new(0.0, 30.0, 10.0, 10.0)),
        ];
        for (handle, expected) in cases {
            assert_eq!(resized_coordinates(p, handle, bounds), expected, "{handle:?}");
        }
    }

    #[test]
    fn test_resize_can_invert() {
        let bounds = Rect::new(10.0, 10.0, 50.0, 50.0);
        let inverted = resized_coordinates(Point::new(0.0, 30.0), Handle::Right, bounds);
        assert!(inverted.x1 < inverted.x0);
    }

    #[test]
    fn test_normalize_rectangle() {
        let forward = element(ElementKind::Rectangle, 0, (10.0, 10.0), (100.0, 50.0));
        assert_eq!(adjust_element_coordinates(&forward), Rect::new(10.0, 10.0, 100.0, 50.0));
        let inverted = element(ElementKind::Rectangle, 0, (100.0, 50.0), (10.0, 10.0));
        assert_eq!(adjust_element_coordinates(&inverted), Rect::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_normalize_line_swaps_endpoints() {
        let line = element(ElementKind::Line, 0, (100.0, 0.0), (0.0, 40.0));
        assert_eq!(adjust_element_coordinates(&line), Rect::new(0.0, 40.0, 100.0, 0.0));
        let vertical = element(ElementKind::Line, 0, (5.0, 50.0), (5.0, 10.0));
        assert_eq!(adjust_element_coordinates(&vertical), Rect::new(5.0, 10.0, 5.0, 50.0));
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(cursor_for_position(Some(HitPosition::Inside)), CursorStyle::Move);
        assert_eq!(
            cursor_for_position(Some(HitPosition::Handle(Handle::TopRight))),
            CursorStyle::NeswResize
        );
        assert_eq!(
            cursor_for_position(Some(HitPosition::Handle(Handle::Start))),
            CursorStyle::NwseResize
        );
        assert_eq!(
            cursor_for_position(Some(HitPosition::Handle(Handle::Left))).as_css(),
            "ew-resize"
        );
        assert_eq!(cursor_for_position(None), CursorStyle::Default);
    }
}
