//! Hand-drawn shape descriptors.
//!
//! Mimics the rough.js look: each outline is stroked twice with different
//! random offsets, endpoints overshoot slightly and straight segments bow
//! away from the chord. Randomness comes from the element's persisted seed,
//! so a descriptor can always be regenerated from the element fields.

use kurbo::{BezPath, ParamCurve, PathSeg, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Roughness applied by the default generator.
pub const DEFAULT_ROUGHNESS: f64 = 0.5;

/// Number of stroke passes per outline.
const STROKE_PASSES: u32 = 2;

/// Render-ready descriptor for line, rectangle and circle elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    /// Outline passes, stroked with the element's stroke color and width.
    pub strokes: Vec<BezPath>,
    /// Interior, filled with the element's fill color.
    pub fill: Option<BezPath>,
}

/// Seeded offset stream for one stroke pass.
///
/// A MINSTD Lehmer generator, the same family rough.js draws from.
struct Jitter {
    state: u64,
}

impl Jitter {
    const MODULUS: u64 = 0x7FFF_FFFF;

    fn new(seed: u32, pass: u32) -> Self {
        let mixed = u64::from(seed ^ pass.wrapping_mul(0x9E37_79B9)) % Self::MODULUS;
        Self {
            state: mixed.max(1),
        }
    }

    /// Next value in `(0, 1)`.
    fn unit(&mut self) -> f64 {
        self.state = self.state * 48_271 % Self::MODULUS;
        self.state as f64 / Self::MODULUS as f64
    }

    /// Uniform offset in `[-magnitude, magnitude]`.
    fn shift(&mut self, magnitude: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * magnitude
    }

    fn nudge(&mut self, point: Point, magnitude: f64) -> Point {
        point + Vec2::new(self.shift(magnitude), self.shift(magnitude))
    }
}

/// Derive a well-mixed seed from an element id (splitmix32 finaliser).
pub fn seed_for_id(id: u64) -> u32 {
    let mut x = (id as u32) ^ ((id >> 32) as u32);
    x = x.wrapping_add(1).wrapping_mul(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    x
}

/// Produces [`Drawable`]s for the sketch-style shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generator {
    roughness: f64,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(DEFAULT_ROUGHNESS)
    }
}

impl Generator {
    pub fn new(roughness: f64) -> Self {
        Self {
            roughness: roughness.max(0.0),
        }
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    /// A straight line from `a` to `b`.
    pub fn line(&self, a: Point, b: Point, seed: u32) -> Drawable {
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        self.sketch(&path, false, seed)
    }

    /// An axis-aligned rectangle spanning `rect` (which may be inverted).
    pub fn rectangle(&self, rect: Rect, filled: bool, seed: u32) -> Drawable {
        let mut path = BezPath::new();
        path.move_to(Point::new(rect.x0, rect.y0));
        path.line_to(Point::new(rect.x1, rect.y0));
        path.line_to(Point::new(rect.x1, rect.y1));
        path.line_to(Point::new(rect.x0, rect.y1));
        path.close_path();
        self.sketch(&path, filled, seed)
    }

    /// A circle with the given center and diameter.
    pub fn circle(&self, center: Point, diameter: f64, filled: bool, seed: u32) -> Drawable {
        let path = kurbo::Circle::new(center, diameter.abs() / 2.0).to_path(0.1);
        self.sketch(&path, filled, seed)
    }

    fn sketch(&self, path: &BezPath, filled: bool, seed: u32) -> Drawable {
        let strokes = (0..STROKE_PASSES)
            .map(|pass| trace(path, self.roughness, Jitter::new(seed, pass)))
            .collect();
        let fill = filled.then(|| trace(path, self.roughness * 0.3, Jitter::new(seed, 0)));
        Drawable { strokes, fill }
    }
}

/// One hand-drawn pass over `path`.
///
/// Segment ends wander by up to twice the roughness, so corners overshoot.
/// Straight segments turn into quadratics bowing off the chord in
/// proportion to their length; curve control points wander less than ends.
fn trace(path: &BezPath, roughness: f64, mut jitter: Jitter) -> BezPath {
    if roughness <= 0.0 {
        return path.clone();
    }
    let wander = roughness * 2.0;
    let mut traced = BezPath::new();
    let mut pen: Option<Point> = None;

    for segment in path.segments() {
        if pen != Some(segment.start()) {
            traced.move_to(jitter.nudge(segment.start(), wander));
        }
        match segment {
            PathSeg::Line(line) => {
                let chord = line.p1 - line.p0;
                let length = chord.hypot();
                let normal = if length > 1e-3 {
                    chord.turn_90() / length
                } else {
                    Vec2::ZERO
                };
                let bow = jitter.shift(roughness * roughness * length / 200.0);
                let control = line.p0.midpoint(line.p1) + normal * bow;
                traced.quad_to(control, jitter.nudge(line.p1, wander));
            }
            PathSeg::Quad(quad) => {
                traced.quad_to(
                    jitter.nudge(quad.p1, wander * 0.7),
                    jitter.nudge(quad.p2, wander),
                );
            }
            PathSeg::Cubic(cubic) => {
                traced.curve_to(
                    jitter.nudge(cubic.p1, wander * 0.5),
                    jitter.nudge(cubic.p2, wander * 0.5),
                    jitter.nudge(cubic.p3, wander),
                );
            }
        }
        pen = Some(segment.end());
    }
    traced
}
