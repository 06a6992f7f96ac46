//! Inkboard Render Library
//!
//! Turns a whiteboard frame into draw commands. The default implementation
//! builds a Vello scene and shapes text with Parley.

mod display_list;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod text_layout;
#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use display_list::{DrawOp, build_display_list};
pub use renderer::{
    DEFAULT_STROKE_WIDTH, Palette, RenderContext, RenderResult, Renderer, RendererError,
    SELECTION_DASH, backing_size,
};

#[cfg(feature = "vello-renderer")]
pub use text_layout::{LayoutMeasure, TextLayouter};
#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
