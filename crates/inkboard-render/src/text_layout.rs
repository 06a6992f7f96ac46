//! Text shaping with Parley.

use crate::renderer::{RenderResult, RendererError};
use inkboard_core::{ApproximateMeasure, TextMeasure};
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::Brush;
use std::cell::RefCell;
use std::path::Path;

/// Font collection plus reusable layout scratch space.
pub struct TextLayouter {
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
}

impl Default for TextLayouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayouter {
    /// Layouter over the system font collection.
    pub fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Register font data. Returns the number of families it added.
    pub fn register_font(&mut self, data: Vec<u8>) -> usize {
        let families = self
            .font_cx
            .collection
            .register_fonts(peniko::Blob::from(data), None);
        families.len()
    }

    /// Register a font file from disk.
    pub fn register_font_file(&mut self, path: impl AsRef<Path>) -> RenderResult<usize> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RendererError::Font(format!("{}: {e}", path.display())))?;
        match self.register_font(data) {
            0 => Err(RendererError::Font(format!(
                "{}: no usable font faces",
                path.display()
            ))),
            n => Ok(n),
        }
    }

    /// Lay out one line of text. `font_family` is a CSS-style family name;
    /// unknown names fall back to sans-serif.
    pub fn layout(
        &mut self,
        text: &str,
        font_family: &str,
        font_size: f64,
        brush: Brush,
    ) -> Layout<Brush> {
        let stack = format!("{font_family}, sans-serif");
        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, true);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::from(
            stack.as_str(),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }

    /// Advance width of `text`, or `None` if no font could shape it.
    pub fn width(&mut self, text: &str, font_family: &str, font_size: f64) -> Option<f64> {
        if text.is_empty() {
            return Some(0.0);
        }
        let layout = self.layout(text, font_family, font_size, Brush::default());
        let width = layout.width() as f64;
        (width > 0.0).then_some(width)
    }
}

/// [`TextMeasure`] backed by real font metrics.
///
/// Falls back to [`ApproximateMeasure`] when no installed font covers the text.
#[derive(Default)]
pub struct LayoutMeasure {
    layouter: RefCell<TextLayouter>,
}

impl LayoutMeasure {
    pub fn new(layouter: TextLayouter) -> Self {
        Self {
            layouter: RefCell::new(layouter),
        }
    }
}

impl TextMeasure for LayoutMeasure {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64 {
        let shaped = self
            .layouter
            .borrow_mut()
            .width(text, font_family, font_size);
        shaped.unwrap_or_else(|| {
            log::debug!("no font for {font_family:?}, approximating text width");
            ApproximateMeasure.measure(text, font_family, font_size)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_zero_width() {
        let measure = LayoutMeasure::default();
        assert_eq!(measure.measure("", "Arial", 16.0), 0.0);
    }

    #[test]
    fn test_width_grows_with_content() {
        let measure = LayoutMeasure::default();
        let short = measure.measure("Hi", "Arial", 16.0);
        let long = measure.measure("Hi there, board", "Arial", 16.0);
        assert!(short > 0.0);
        assert!(long > short);
    }

    #[test]
    fn test_width_scales_with_size() {
        let measure = LayoutMeasure::default();
        let small = measure.measure("Inkboard", "Arial", 12.0);
        let large = measure.measure("Inkboard", "Arial", 24.0);
        assert!(large > small * 1.5);
    }

    #[test]
    fn test_missing_font_file() {
        let mut layouter = TextLayouter::new();
        let err = layouter
            .register_font_file("/nonexistent/font.ttf")
            .unwrap_err();
        assert!(matches!(err, RendererError::Font(_)));
    }

    #[test]
    fn test_garbage_font_data_registers_nothing() {
        let mut layouter = TextLayouter::new();
        assert_eq!(layouter.register_font(b"not a font".to_vec()), 0);
    }
}
