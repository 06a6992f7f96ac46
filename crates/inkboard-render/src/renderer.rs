//! Renderer trait abstraction.

use inkboard_core::Frame;
use inkboard_core::shapes::{Shape, ShapeId};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Font error: {0}")]
    Font(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Default stroke width when a shape has none.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Dash pattern of the selection outline.
pub const SELECTION_DASH: [f64; 2] = [4.0, 4.0];

/// Colors used when a shape carries none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Stroke color for outlines.
    pub accent: Color,
    /// Fill color for text.
    pub text: Color,
    /// Dashed selection outline.
    pub selection: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Color::from_rgba8(0x60, 0xa5, 0xfa, 255),
            text: Color::from_rgba8(0x0f, 0x17, 0x2a, 255),
            selection: Color::from_rgba8(59, 130, 246, 230),
        }
    }
}

/// Context for a single render frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Committed shapes, drawn in order.
    pub shapes: &'a [Shape],
    /// Shape being drawn, painted last.
    pub transient: Option<&'a Shape>,
    pub selection: Option<ShapeId>,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub palette: Palette,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(shapes: &'a [Shape], viewport_size: Size) -> Self {
        Self {
            shapes,
            transient: None,
            selection: None,
            viewport_size,
            scale_factor: 1.0,
            palette: Palette::default(),
        }
    }

    /// Context for a whiteboard frame.
    pub fn from_frame(frame: Frame<'a>, viewport_size: Size) -> Self {
        Self::new(frame.shapes, viewport_size)
            .with_transient(frame.transient)
            .with_selection(frame.selection)
    }

    pub fn with_transient(mut self, transient: Option<&'a Shape>) -> Self {
        self.transient = transient;
        self
    }

    pub fn with_selection(mut self, selection: Option<ShapeId>) -> Self {
        self.selection = selection;
        self
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Effective device pixel ratio, never below 1.
    pub fn dpr(&self) -> f64 {
        if self.scale_factor.is_finite() {
            self.scale_factor.max(1.0)
        } else {
            1.0
        }
    }

    /// Backing store size in physical pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        backing_size(self.viewport_size, self.scale_factor)
    }

    /// Shapes in paint order: committed, then the transient one.
    pub fn paint_order(&self) -> impl Iterator<Item = &'a Shape> + 'a {
        self.shapes.iter().chain(self.transient)
    }
}

/// `floor(logical * max(1, ratio))` per axis.
pub fn backing_size(logical: Size, ratio: f64) -> (u32, u32) {
    let dpr = if ratio.is_finite() { ratio.max(1.0) } else { 1.0 };
    let px = |v: f64| (v.max(0.0) * dpr).floor() as u32;
    (px(logical.width), px(logical.height))
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the drawing commands for a frame.
    ///
    /// Called once per frame; any previous frame is discarded.
    fn build_scene(&mut self, ctx: &RenderContext);
}
