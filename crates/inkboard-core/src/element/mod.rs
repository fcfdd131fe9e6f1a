//! Drawing elements: the persisted objects of a scene.

mod factory;
pub mod rough;
mod style;

pub use factory::{ElementFactory, create_element};
pub use rough::{Drawable, Generator};
pub use style::{
    DEFAULT_FONT_SIZE, DEFAULT_STROKE_WIDTH, ElementStyle, SerializableColor, StyleOverrides,
};

use crate::error::BoardError;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable element handle within a session.
pub type ElementId = u64;

/// Persisted element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Line,
    Rectangle,
    Circle,
    Freehand,
    Text,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Line,
        ElementKind::Rectangle,
        ElementKind::Circle,
        ElementKind::Freehand,
        ElementKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Line => "line",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Freehand => "freehand",
            ElementKind::Text => "text",
        }
    }

    /// Whether the kind carries a cached [`Drawable`].
    pub fn has_drawable(self) -> bool {
        matches!(
            self,
            ElementKind::Line | ElementKind::Rectangle | ElementKind::Circle
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ElementKind::Line),
            "rectangle" => Ok(ElementKind::Rectangle),
            "circle" => Ok(ElementKind::Circle),
            "pencil" | "freehand" => Ok(ElementKind::Freehand),
            "text" => Ok(ElementKind::Text),
            other => Err(BoardError::UnknownKind(other.to_string())),
        }
    }
}

/// Kind-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementBody {
    Line {
        #[serde(skip)]
        drawable: Option<Drawable>,
    },
    Rectangle {
        #[serde(skip)]
        drawable: Option<Drawable>,
    },
    Circle {
        #[serde(skip)]
        drawable: Option<Drawable>,
    },
    Freehand {
        points: Vec<Point>,
    },
    Text {
        text: String,
    },
}

impl ElementBody {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementBody::Line { .. } => ElementKind::Line,
            ElementBody::Rectangle { .. } => ElementKind::Rectangle,
            ElementBody::Circle { .. } => ElementKind::Circle,
            ElementBody::Freehand { .. } => ElementKind::Freehand,
            ElementBody::Text { .. } => ElementKind::Text,
        }
    }
}

/// One drawable primitive on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// `(x0, y0)` is the first corner, `(x1, y1)` the second one. Not
    /// normalized while a gesture is in progress; advisory for freehand.
    pub bounds: Rect,
    pub style: ElementStyle,
    #[serde(flatten)]
    pub body: ElementBody,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    /// First corner `(x1, y1)`.
    pub fn start(&self) -> Point {
        Point::new(self.bounds.x0, self.bounds.y0)
    }

    /// Second corner `(x2, y2)`.
    pub fn end(&self) -> Point {
        Point::new(self.bounds.x1, self.bounds.y1)
    }

    /// Freehand points, if this is a freehand element.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.body {
            ElementBody::Freehand { points } => Some(points),
            _ => None,
        }
    }

    /// Text payload, if this is a text element.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ElementBody::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Cached sketch descriptor for line, rectangle and circle elements.
    pub fn drawable(&self) -> Option<&Drawable> {
        match &self.body {
            ElementBody::Line { drawable }
            | ElementBody::Rectangle { drawable }
            | ElementBody::Circle { drawable } => drawable.as_ref(),
            _ => None,
        }
    }

    /// Append a point to a freehand stroke and grow the advisory bounds.
    pub fn push_point(&mut self, point: Point) -> Result<(), BoardError> {
        match &mut self.body {
            ElementBody::Freehand { points } => {
                points.push(point);
                self.bounds = points_bounds(points);
                Ok(())
            }
            _ => Err(BoardError::MalformedElement(format!(
                "element {} is a {}, not a freehand stroke",
                self.id,
                self.kind()
            ))),
        }
    }

    /// Replace all freehand points.
    pub(crate) fn set_points(&mut self, new_points: Vec<Point>) {
        if let ElementBody::Freehand { points } = &mut self.body {
            self.bounds = points_bounds(&new_points);
            *points = new_points;
        }
    }

    /// Shift the element by `delta` in world space.
    pub fn translate(&mut self, delta: Vec2) {
        self.bounds = self.bounds + delta;
        if let ElementBody::Freehand { points } = &mut self.body {
            for point in points {
                *point += delta;
            }
        }
    }

    /// Regenerate the cached descriptor from geometry and style.
    pub fn rebuild_drawable(&mut self, generator: &Generator) {
        let (start, end) = (self.start(), self.end());
        let filled = self.style.fill_color.is_some();
        let seed = self.style.seed;
        match &mut self.body {
            ElementBody::Line { drawable } => {
                *drawable = Some(generator.line(start, end, seed));
            }
            ElementBody::Rectangle { drawable } => {
                *drawable = Some(generator.rectangle(self.bounds, filled, seed));
            }
            ElementBody::Circle { drawable } => {
                let (center, radius) = circle_geometry(start, end);
                *drawable = Some(generator.circle(center, radius * 2.0, filled, seed));
            }
            ElementBody::Freehand { .. } | ElementBody::Text { .. } => {}
        }
    }
}

/// Center and radius of the circle spanned by a drag from `start` to `end`.
///
/// The drag is the circle's diameter: the center is its midpoint and the
/// radius half its length.
pub fn circle_geometry(start: Point, end: Point) -> (Point, f64) {
    (start.midpoint(end), start.distance(end) / 2.0)
}

fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("pencil".parse::<ElementKind>().unwrap(), ElementKind::Freehand);
        assert_eq!("circle".parse::<ElementKind>().unwrap(), ElementKind::Circle);
        assert_eq!(
            "eraser".parse::<ElementKind>(),
            Err(BoardError::UnknownKind("eraser".to_string()))
        );
    }

    #[test]
    fn test_circle_geometry() {
        let (center, radius) = circle_geometry(Point::new(0.0, 0.0), Point::new(40.0, 0.0));
        assert!((center.x - 20.0).abs() < f64::EPSILON);
        assert!(center.y.abs() < f64::EPSILON);
        assert!((radius - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate_freehand() {
        let mut element = create_element(
            0,
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            ElementKind::Freehand,
            &StyleOverrides::none(),
        );
        element.push_point(Point::new(10.0, 5.0)).unwrap();
        element.translate(Vec2::new(1.0, 1.0));
        assert_eq!(
            element.points().unwrap(),
            &[Point::new(1.0, 1.0), Point::new(11.0, 6.0)]
        );
        assert_eq!(element.bounds, Rect::new(1.0, 1.0, 11.0, 6.0));
    }

    #[test]
    fn test_push_point_rejects_shapes() {
        let mut element = create_element(
            0,
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            ElementKind::Rectangle,
            &StyleOverrides::none(),
        );
        assert!(matches!(
            element.push_point(Point::ZERO),
            Err(BoardError::MalformedElement(_))
        ));
    }
}
