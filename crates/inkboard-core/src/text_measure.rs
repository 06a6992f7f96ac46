//! Text width measurement.

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    /// Width in logical pixels of `text` set in `font_family` at `font_size`.
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64;
}

/// Deterministic measurer based on average glyph widths.
///
/// Good enough for hit boxes when no font data is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMeasure;

impl ApproximateMeasure {
    /// Average advance per character, as a fraction of the font size.
    pub fn width_factor(font_family: &str) -> f64 {
        let family = font_family.to_ascii_lowercase();
        if family.contains("mono") || family.contains("courier") {
            0.6
        } else if family.contains("times")
            || family.contains("georgia")
            || (family.contains("serif") && !family.contains("sans"))
        {
            0.5
        } else if family.contains("verdana") {
            0.58
        } else {
            0.55
        }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * Self::width_factor(font_family)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64 {
        (**self).measure(text, font_family, font_size)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for Box<T> {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64 {
        (**self).measure(text, font_family, font_size)
    }
}
