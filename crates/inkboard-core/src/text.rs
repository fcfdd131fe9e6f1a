//! Text measurement used when committing text elements.

/// Measures the advance width of a string at a font size.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font_size: f64) -> f64;
}

/// Average-character-width estimate for hosts without a font backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub char_width_factor: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            char_width_factor: 0.55,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    /// Width of the widest line.
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        let widest = text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        widest as f64 * font_size * self.char_width_factor
    }
}
