//! System font lookup and glyph layout.
//!
//! Text is laid out with rusttype against the first sans-serif face fontdb
//! finds on the system. Glyphs come out as kurbo paths in world
//! coordinates, so surfaces fill them under their own transform.

use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};
use inkboard_core::text::{ApproxTextMeasure, TextMeasure};
use kurbo::{BezPath, Point};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use std::sync::OnceLock;

const PREFERRED_FAMILIES: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} system font faces", db.faces().count());
        db
    })
}

fn find(db: &Database, family: Family<'_>) -> Option<ID> {
    db.query(&Query {
        families: &[family],
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    })
}

fn load_font(db: &Database) -> Option<Font<'static>> {
    let id = PREFERRED_FAMILIES
        .iter()
        .find_map(|&name| find(db, Family::Name(name)))
        .or_else(|| find(db, Family::SansSerif))
        .or_else(|| db.faces().next().map(|face| face.id))?;

    db.with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index))
        .flatten()
}

/// The board font, or `None` when the system has no usable face.
pub fn board_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let font = load_font(db());
        if font.is_none() {
            log::warn!("No system font found, text will not be rasterized");
        }
        font
    })
    .as_ref()
}

struct GlyphPath<'a>(&'a mut BezPath);

impl OutlineBuilder for GlyphPath<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((f64::from(x), f64::from(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((f64::from(x), f64::from(y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to((f64::from(x1), f64::from(y1)), (f64::from(x), f64::from(y)));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.curve_to(
            (f64::from(x1), f64::from(y1)),
            (f64::from(x2), f64::from(y2)),
            (f64::from(x), f64::from(y)),
        );
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

fn line_height(font: &Font<'_>, scale: Scale) -> f64 {
    let v = font.v_metrics(scale);
    f64::from(v.ascent - v.descent + v.line_gap)
}

/// Outline of `text` with its top-left corner at `origin`.
///
/// Lines stack downwards; the first baseline sits one ascent below `origin`.
pub fn text_path(font: &Font<'_>, text: &str, origin: Point, font_size: f64) -> BezPath {
    let scale = Scale::uniform(font_size as f32);
    let ascent = f64::from(font.v_metrics(scale).ascent);
    let step = line_height(font, scale);
    let mut path = BezPath::new();
    for (row, line) in text.lines().enumerate() {
        let baseline = origin.y + ascent + step * row as f64;
        let start = rt_point(origin.x as f32, baseline as f32);
        for glyph in font.layout(line, scale, start) {
            glyph.build_outline(&mut GlyphPath(&mut path));
        }
    }
    path
}

/// Advance width of the widest line of `text`.
pub fn text_width(font: &Font<'_>, text: &str, font_size: f64) -> f64 {
    let scale = Scale::uniform(font_size as f32);
    text.lines()
        .map(|line| {
            font.layout(line, scale, rt_point(0.0, 0.0))
                .last()
                .map(|glyph| {
                    let advance = glyph.unpositioned().h_metrics().advance_width;
                    f64::from(glyph.position().x + advance)
                })
                .unwrap_or(0.0)
        })
        .fold(0.0, f64::max)
}

/// Text metrics from the board font, with the average-width estimate when
/// no font is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontTextMeasure;

impl TextMeasure for FontTextMeasure {
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        match board_font() {
            Some(font) => text_width(font, text, font_size),
            None => ApproxTextMeasure::default().measure_text(text, font_size),
        }
    }
}
