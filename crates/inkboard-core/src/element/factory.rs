//! Construction of typed elements from a tool kind and a drag box.

use super::rough::{Generator, seed_for_id};
use super::{Element, ElementBody, ElementId, ElementKind, ElementStyle, StyleOverrides};
use crate::error::{BoardError, BoardResult};
use crate::tools::Tool;
use kurbo::{Point, Rect};

/// Builds elements with a fixed sketch generator and default style.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    generator: Generator,
    defaults: ElementStyle,
}

impl Default for ElementFactory {
    fn default() -> Self {
        Self::new(Generator::default())
    }
}

impl ElementFactory {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            defaults: ElementStyle::default(),
        }
    }

    /// Use `defaults` for fields neither overridden nor inherited.
    pub fn with_default_style(mut self, defaults: ElementStyle) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn default_style(&self) -> &ElementStyle {
        &self.defaults
    }

    /// Create a new element spanning `start`..`end`.
    ///
    /// Freehand strokes start with the single point `start`; text starts
    /// empty.
    pub fn create(
        &self,
        id: ElementId,
        start: Point,
        end: Point,
        kind: ElementKind,
        overrides: &StyleOverrides,
    ) -> Element {
        let style = ElementStyle::resolve(overrides, None, &self.defaults, seed_for_id(id));
        let body = match kind {
            ElementKind::Line => ElementBody::Line { drawable: None },
            ElementKind::Rectangle => ElementBody::Rectangle { drawable: None },
            ElementKind::Circle => ElementBody::Circle { drawable: None },
            ElementKind::Freehand => ElementBody::Freehand {
                points: vec![start],
            },
            ElementKind::Text => ElementBody::Text {
                text: String::new(),
            },
        };
        let mut element = Element {
            id,
            bounds: Rect::new(start.x, start.y, end.x, end.y),
            style,
            body,
        };
        element.rebuild_drawable(&self.generator);
        element
    }

    /// Create the element a drawing tool produces.
    ///
    /// Tools without an element kind (selection, pan, eraser) fail with
    /// [`BoardError::UnknownKind`].
    pub fn create_for_tool(
        &self,
        id: ElementId,
        start: Point,
        end: Point,
        tool: Tool,
        overrides: &StyleOverrides,
    ) -> BoardResult<Element> {
        let kind = tool
            .element_kind()
            .ok_or_else(|| BoardError::UnknownKind(tool.name().to_string()))?;
        Ok(self.create(id, start, end, kind, overrides))
    }

    /// Create an element from a kind name such as `"rectangle"` or `"pencil"`.
    pub fn create_named(
        &self,
        id: ElementId,
        start: Point,
        end: Point,
        kind: &str,
        overrides: &StyleOverrides,
    ) -> BoardResult<Element> {
        Ok(self.create(id, start, end, kind.parse()?, overrides))
    }

    /// Rebuild `existing` with new corners.
    ///
    /// Keeps the id, kind, seed, freehand points and text; style fields fall
    /// back from `overrides` to the existing values.
    pub fn update(
        &self,
        existing: &Element,
        start: Point,
        end: Point,
        overrides: &StyleOverrides,
    ) -> Element {
        let style = ElementStyle::resolve(
            overrides,
            Some(&existing.style),
            &self.defaults,
            existing.style.seed,
        );
        let mut element = Element {
            id: existing.id,
            bounds: Rect::new(start.x, start.y, end.x, end.y),
            style,
            body: existing.body.clone(),
        };
        element.rebuild_drawable(&self.generator);
        element
    }

    /// Regenerate the cached descriptor of an element loaded from storage or
    /// received from a peer.
    pub fn restore(&self, mut element: Element) -> Element {
        element.rebuild_drawable(&self.generator);
        element
    }
}

/// Create an element with the default factory.
pub fn create_element(
    id: ElementId,
    start: Point,
    end: Point,
    kind: ElementKind,
    overrides: &StyleOverrides,
) -> Element {
    ElementFactory::default().create(id, start, end, kind, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{SerializableColor, circle_geometry};

    fn factory() -> ElementFactory {
        ElementFactory::default()
    }

    #[test]
    fn test_shapes_get_drawables() {
        for kind in [ElementKind::Line, ElementKind::Rectangle, ElementKind::Circle] {
            let element = factory().create(
                0,
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                kind,
                &StyleOverrides::none(),
            );
            assert!(element.drawable().is_some(), "{kind} has no drawable");
        }
    }

    #[test]
    fn test_circle_from_drag() {
        let element = factory().create(
            3,
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            ElementKind::Circle,
            &StyleOverrides::none(),
        );
        let (center, radius) = circle_geometry(element.start(), element.end());
        assert_eq!(center, Point::new(20.0, 0.0));
        assert!((radius - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_freehand_starts_with_one_point() {
        let element = factory().create(
            1,
            Point::new(5.0, 6.0),
            Point::new(5.0, 6.0),
            ElementKind::Freehand,
            &StyleOverrides::none(),
        );
        assert_eq!(element.points().unwrap(), &[Point::new(5.0, 6.0)]);
        assert!(element.drawable().is_none());
    }

    #[test]
    fn test_text_defaults() {
        let element = factory().create(
            2,
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            ElementKind::Text,
            &StyleOverrides::none(),
        );
        assert_eq!(element.text(), Some(""));
        assert!((element.style.font_size - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_drawing_tools_are_unknown_kinds() {
        for tool in [Tool::Selection, Tool::Pan, Tool::Eraser] {
            let result = factory().create_for_tool(
                0,
                Point::ZERO,
                Point::ZERO,
                tool,
                &StyleOverrides::none(),
            );
            assert!(matches!(result, Err(BoardError::UnknownKind(_))));
        }
        assert!(factory()
            .create_named(0, Point::ZERO, Point::ZERO, "hexagon", &StyleOverrides::none())
            .is_err());
    }

    #[test]
    fn test_update_inherits_style() {
        let overrides = StyleOverrides::none()
            .with_stroke_color(SerializableColor::new(255, 0, 0, 255))
            .with_stroke_width(3.0);
        let original = factory().create(
            0,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            ElementKind::Rectangle,
            &overrides,
        );
        let updated = factory().update(
            &original,
            Point::new(0.0, 0.0),
            Point::new(20.0, 20.0),
            &StyleOverrides::none().with_opacity(0.5),
        );
        assert_eq!(updated.style.stroke_color, SerializableColor::new(255, 0, 0, 255));
        assert!((updated.style.stroke_width - 3.0).abs() < f64::EPSILON);
        assert!((updated.style.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(updated.style.seed, original.style.seed);
        assert_ne!(updated.drawable(), original.drawable());
    }
}
