//! Vello-based renderer implementation.

use crate::display_list::{DrawOp, build_display_list};
use crate::renderer::{RenderContext, Renderer};
use crate::text_layout::TextLayouter;
use kurbo::{Affine, BezPath, Point, Stroke};
use parley::layout::PositionedLayoutItem;
use peniko::{Brush, Color, Fill};
use vello::Scene;

/// Builds a Vello [`Scene`] for the active page.
///
/// The scene is encoded in device pixels: every command is drawn under a
/// `scale(dpr)` transform so shape geometry stays logical.
pub struct VelloRenderer {
    scene: Scene,
    text: TextLayouter,
    /// Number of text runs that produced no glyphs in the last frame.
    missing_text: usize,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer over the system fonts.
    pub fn new() -> Self {
        Self::with_layouter(TextLayouter::new())
    }

    pub fn with_layouter(text: TextLayouter) -> Self {
        Self {
            scene: Scene::new(),
            text,
            missing_text: 0,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Color the target is cleared to before the scene is drawn.
    pub fn base_color(&self) -> Color {
        Color::TRANSPARENT
    }

    pub fn layouter_mut(&mut self) -> &mut TextLayouter {
        &mut self.text
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        color: Color,
        width: f64,
        dash: Option<[f64; 2]>,
        transform: Affine,
    ) {
        let mut stroke = Stroke::new(width);
        if let Some(pattern) = dash {
            stroke = stroke.with_dashes(0.0, pattern);
        }
        self.scene.stroke(&stroke, transform, color, None, path);
    }

    /// Fill one line of text with its baseline at `origin`.
    fn render_text(
        &mut self,
        content: &str,
        font_family: &str,
        font_size: f64,
        origin: Point,
        color: Color,
        transform: Affine,
    ) {
        if content.is_empty() {
            return;
        }
        let brush = Brush::Solid(color);
        let layout = self
            .text
            .layout(content, font_family, font_size, brush.clone());

        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(0.0);
        let text_transform =
            transform * Affine::translate((origin.x, origin.y - first_baseline as f64));

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();
                glyph_count += glyphs.len();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(run.font())
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run.font_size())
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        if glyph_count == 0 {
            self.missing_text += 1;
            log::debug!("no glyphs for {content:?} in {font_family:?}");
        }
    }

    /// Text runs skipped in the last frame for lack of a usable font.
    pub fn missing_text(&self) -> usize {
        self.missing_text
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.missing_text = 0;
        let transform = Affine::scale(ctx.dpr());

        for op in build_display_list(ctx) {
            match op {
                DrawOp::Stroke {
                    path,
                    color,
                    width,
                    dash,
                } => self.stroke_path(&path, color, width, dash, transform),
                DrawOp::Text {
                    content,
                    font_family,
                    font_size,
                    origin,
                    color,
                } => self.render_text(&content, &font_family, font_size, origin, color, transform),
            }
        }
    }
}
