//! Capabilities the overlay consumes from its host.
//!
//! The overlay never owns the graph, the container or the hover state; it reaches them
//! only through these traits.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RgbaColor;
use crate::geometry::{Bounds, Point};
use crate::keys::NodeKey;

/// The graph rendering/layout engine the overlay is bolted onto.
pub trait GraphEngine {
    /// Convert a container-local screen point into engine canvas space.
    fn screen_to_canvas(&self, point: Point) -> Point;

    /// Canvas position of a node, if it exists.
    fn node_position(&self, key: &NodeKey) -> Option<Point>;

    /// Every node currently known to the engine.
    fn node_keys(&self) -> Vec<NodeKey>;

    /// Replace the current selection with `keys`.
    fn select_nodes(&mut self, keys: &[NodeKey]);

    /// Ask the engine to repaint on its next opportunity.
    fn request_redraw(&mut self);
}

/// Read access to "the node currently under the pointer".
pub trait HoverSource {
    fn current_hover(&self) -> Option<NodeKey>;
}

/// Downstream handler for edge-joint removal requests.
pub trait NodeRemover {
    fn remove_node(&mut self, key: &NodeKey);
}

impl<F> NodeRemover for F
where
    F: FnMut(&NodeKey),
{
    fn remove_node(&mut self, key: &NodeKey) {
        self(key)
    }
}

/// Stroke description for the marquee outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashedStroke {
    pub color: RgbaColor,
    pub width: f32,
    pub dash_length: f32,
    pub gap_length: f32,
}

/// Paint target handed to after-render hooks. Coordinates are in canvas space.
pub trait DrawingSurface {
    fn stroke_dashed_rect(&mut self, bounds: Bounds, stroke: DashedStroke);
    fn fill_rect(&mut self, bounds: Bounds, color: RgbaColor);
}

/// The element pointer positions are made relative to.
pub trait Container {
    /// Offset of the container in page space.
    fn origin(&self) -> Point;

    /// Toggle the native context menu so the right button can be used for gestures.
    fn set_context_menu_suppressed(&self, suppressed: bool);
}

impl HoverSource for Option<NodeKey> {
    fn current_hover(&self) -> Option<NodeKey> {
        self.clone()
    }
}

/// Hover value maintained by the host and read by the overlay.
#[derive(Debug, Clone, Default)]
pub struct SharedHover(Rc<RefCell<Option<NodeKey>>>);

impl SharedHover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the hovered node. Returns true when it changed.
    pub fn set(&self, key: Option<NodeKey>) -> bool {
        let mut current = self.0.borrow_mut();
        if *current == key {
            return false;
        }
        *current = key;
        true
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

impl HoverSource for SharedHover {
    fn current_hover(&self) -> Option<NodeKey> {
        self.0.borrow().clone()
    }
}
