//! Freehand stroke to filled outline conversion.
//!
//! Follows the perfect-freehand approach: input points are streamlined
//! towards the previous point, each point gets a perpendicular offset on
//! both sides at the stroke radius, sharp turns and stroke ends get round
//! caps, and the outline is left side + end cap + reversed right side +
//! start cap.

use kurbo::{BezPath, Point, Vec2};
use std::f64::consts::PI;

/// Slightly more than half a turn so caps overlap the stroke body.
const FIXED_PI: f64 = PI + 0.0001;
const RATE_OF_PRESSURE_CHANGE: f64 = 0.275;
/// Pressure assumed when the input device reports none.
const DEFAULT_PRESSURE: f64 = 0.5;

/// Outline parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreehandOptions {
    /// Stroke diameter.
    pub size: f64,
    /// How much speed narrows the stroke (0 = constant width).
    pub thinning: f64,
    /// How far apart consecutive outline points must be, as a fraction of
    /// `size`.
    pub smoothing: f64,
    /// How strongly each point is pulled towards the previous one.
    pub streamline: f64,
    /// Whether the stroke is finished: the last input point is used as is.
    pub last: bool,
}

impl Default for FreehandOptions {
    fn default() -> Self {
        Self {
            size: 16.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            last: false,
        }
    }
}

impl FreehandOptions {
    /// Options used for pencil elements: constant width equal to the
    /// element's stroke width.
    pub fn for_stroke_width(width: f64) -> Self {
        Self {
            size: width,
            thinning: 0.0,
            smoothing: 1.0,
            streamline: 0.5,
            last: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StrokePoint {
    point: Point,
    pressure: f64,
    /// Unit vector from this point back to the previous one.
    vector: Vec2,
    distance: f64,
    running_length: f64,
}

fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}

fn rotate_around(p: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = p - center;
    Point::new(
        d.x * cos - d.y * sin + center.x,
        d.x * sin + d.y * cos + center.y,
    )
}

fn stroke_radius(size: f64, thinning: f64, pressure: f64) -> f64 {
    size * (0.5 - thinning * (0.5 - pressure))
}

/// Streamline the raw input into stroke points with running lengths.
fn stroke_points(points: &[Point], options: &FreehandOptions) -> Vec<StrokePoint> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let t = 0.15 + (1.0 - options.streamline) * 0.85;

    let mut pts: Vec<Point> = points.to_vec();
    if pts.len() == 1 {
        pts.push(first + Vec2::new(1.0, 1.0));
    } else if pts.len() == 2 {
        let last = pts[1];
        pts = std::iter::once(first)
            .chain((1..5).map(|i| first.lerp(last, f64::from(i) / 4.0)))
            .collect();
    }

    let mut result = vec![StrokePoint {
        point: first,
        pressure: DEFAULT_PRESSURE,
        vector: Vec2::new(1.0, 1.0),
        distance: 0.0,
        running_length: 0.0,
    }];
    let mut reached_min_length = false;
    let mut running_length = 0.0;
    let max = pts.len() - 1;

    for (i, &input) in pts.iter().enumerate().skip(1) {
        let prev = result[result.len() - 1];
        let point = if options.last && i == max {
            input
        } else {
            prev.point.lerp(input, t)
        };
        if point == prev.point {
            continue;
        }
        let distance = point.distance(prev.point);
        running_length += distance;
        if i < max && !reached_min_length {
            if running_length < options.size {
                continue;
            }
            reached_min_length = true;
        }
        result.push(StrokePoint {
            point,
            pressure: DEFAULT_PRESSURE,
            vector: unit(prev.point - point),
            distance,
            running_length,
        });
    }

    result[0].vector = result.get(1).map_or(Vec2::ZERO, |p| p.vector);
    result
}

/// Outline polygon of a stroke through `points`.
///
/// Returns an empty outline for no points or a non-positive size. A single
/// point yields a dot.
pub fn outline(points: &[Point], options: &FreehandOptions) -> Vec<Point> {
    let size = options.size;
    if points.is_empty() || size <= 0.0 {
        return Vec::new();
    }
    let stroke = stroke_points(points, options);
    let len = stroke.len();
    let total_length = stroke[len - 1].running_length;
    let min_distance = (size * options.smoothing).powi(2);

    let mut left: Vec<Point> = Vec::new();
    let mut right: Vec<Point> = Vec::new();

    let mut prev_pressure = stroke.iter().take(10).fold(stroke[0].pressure, |acc, p| {
        let pressure = simulated_pressure(acc, p.distance, size);
        (acc + pressure) / 2.0
    });
    let mut radius = stroke_radius(size, options.thinning, stroke[len - 1].pressure);
    let mut first_radius = None;
    let mut prev_vector = stroke[0].vector;
    let mut pl = stroke[0].point;
    let mut pr = pl;
    let mut tl = pl;
    let mut tr = pr;
    let mut prev_sharp = false;

    for i in 0..len {
        let StrokePoint {
            point,
            vector,
            distance,
            running_length,
            ..
        } = stroke[i];

        if i < len - 1 && total_length - running_length < 3.0 {
            continue;
        }

        let mut pressure = stroke[i].pressure;
        if options.thinning != 0.0 {
            pressure = simulated_pressure(prev_pressure, distance, size);
            radius = stroke_radius(size, options.thinning, pressure);
        } else {
            radius = size / 2.0;
        }
        radius = radius.max(0.01);
        first_radius.get_or_insert(radius);

        let next_vector = if i < len - 1 {
            stroke[i + 1].vector
        } else {
            vector
        };
        let next_dpr = if i < len - 1 {
            vector.dot(next_vector)
        } else {
            1.0
        };
        let prev_dpr = vector.dot(prev_vector);
        let sharp = prev_dpr < 0.0 && !prev_sharp;
        let next_sharp = next_dpr < 0.0;

        if sharp || next_sharp {
            let offset = perpendicular(prev_vector) * radius;
            let step = 1.0 / 13.0;
            let mut t = 0.0;
            while t <= 1.0 {
                tl = rotate_around(point - offset, point, FIXED_PI * t);
                left.push(tl);
                tr = rotate_around(point + offset, point, FIXED_PI * -t);
                right.push(tr);
                t += step;
            }
            pl = tl;
            pr = tr;
            if next_sharp {
                prev_sharp = true;
            }
            continue;
        }
        prev_sharp = false;

        if i == len - 1 {
            let offset = perpendicular(vector) * radius;
            left.push(point - offset);
            right.push(point + offset);
            continue;
        }

        let offset = perpendicular(next_vector.lerp(vector, next_dpr)) * radius;
        tl = point - offset;
        if i <= 1 || (pl - tl).hypot2() > min_distance {
            left.push(tl);
            pl = tl;
        }
        tr = point + offset;
        if i <= 1 || (pr - tr).hypot2() > min_distance {
            right.push(tr);
            pr = tr;
        }
        prev_pressure = pressure;
        prev_vector = vector;
    }

    let first_point = stroke[0].point;
    let last_point = if len > 1 {
        stroke[len - 1].point
    } else {
        first_point + Vec2::new(1.0, 1.0)
    };

    if len == 1 {
        let r = first_radius.unwrap_or(radius);
        let start = first_point + unit(perpendicular(first_point - last_point)) * -r;
        return (1..=13)
            .map(|i| rotate_around(start, first_point, FIXED_PI * 2.0 * f64::from(i) / 13.0))
            .collect();
    }

    let start_cap: Vec<Point> = match right.first() {
        Some(&anchor) => (1..=13)
            .map(|i| rotate_around(anchor, first_point, FIXED_PI * f64::from(i) / 13.0))
            .collect(),
        None => Vec::new(),
    };

    let direction = perpendicular(-stroke[len - 1].vector);
    let end_start = last_point + direction * radius;
    let end_cap = (1..29).map(|i| {
        rotate_around(end_start, last_point, FIXED_PI * 3.0 * f64::from(i) / 29.0)
    });

    left.extend(end_cap);
    left.extend(right.into_iter().rev());
    left.extend(start_cap);
    left
}

fn simulated_pressure(previous: f64, distance: f64, size: f64) -> f64 {
    let speed = (distance / size).min(1.0);
    let rest = (1.0 - speed).min(1.0);
    (previous + (rest - previous) * (speed * RATE_OF_PRESSURE_CHANGE)).min(1.0)
}

/// Smooth closed path through an outline: a quadratic curve through every
/// point, ending at the midpoint to the next one.
pub fn path_from_outline(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = outline.first() else {
        return path;
    };
    path.move_to(first);
    for (i, &p) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        path.quad_to(p, p.midpoint(next));
    }
    path.close_path();
    path
}
