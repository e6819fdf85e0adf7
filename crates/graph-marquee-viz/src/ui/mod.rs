//! UI components for the graph visualization.
//!
//! This module contains rendering functions for overlays and widgets.

mod overlays;

pub use overlays::{
    draw_mode_indicator, draw_sidebar_toggle, CanvasTransform, PainterSurface,
};
