//! The drag-select state machine.
//!
//! Two states: idle and dragging. A press of the trigger button arms the marquee, moves
//! extend it, and the matching release either commits a selection (if the pointer moved)
//! or treats the gesture as a click that may remove the edge joint under the pointer.

use tracing::{debug, trace};

use crate::config::OverlayConfig;
use crate::engine::{DrawingSurface, GraphEngine, HoverSource, NodeRemover};
use crate::event::PointerEvent;
use crate::geometry::{Bounds, Point, SelectionRect};
use crate::keys::NodeKey;

/// Result of handling a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOutcome {
    /// A drag was released and these nodes replaced the selection.
    Selected(Vec<NodeKey>),
    /// A click on an edge joint requested its removal.
    Removed(NodeKey),
    /// The drag was dropped because the button was released out of our sight.
    Abandoned,
    /// Nothing happened.
    Ignored,
}

/// Selection overlay for one container/engine pair.
#[derive(Debug, Clone)]
pub struct DragSelectOverlay {
    config: OverlayConfig,
    rect: SelectionRect,
    dragging: bool,
    drag_happened: bool,
    down_node: Option<NodeKey>,
}

impl DragSelectOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            rect: SelectionRect::default(),
            dragging: false,
            drag_happened: false,
            down_node: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Whether a marquee is armed.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the pointer moved since the marquee was armed.
    pub fn drag_happened(&self) -> bool {
        self.drag_happened
    }

    /// Last rectangle, in container-local pixels. Stale once idle.
    pub fn rect(&self) -> SelectionRect {
        self.rect
    }

    /// Node that was hovered when the trigger button went down.
    pub fn down_node(&self) -> Option<&NodeKey> {
        self.down_node.as_ref()
    }

    /// Handle a button press. Returns true when the marquee was armed.
    pub fn on_pointer_down<H>(&mut self, event: &PointerEvent, origin: Point, hover: &H) -> bool
    where
        H: HoverSource + ?Sized,
    {
        if !event.is_button(self.config.trigger_button) {
            return false;
        }

        let local = event.position.offset_by(origin);
        self.rect = SelectionRect::anchored(local);
        self.dragging = true;
        self.drag_happened = false;
        self.down_node = hover.current_hover();
        debug!(x = local.x, y = local.y, down_node = ?self.down_node, "marquee armed");
        true
    }

    /// Handle pointer motion. Only does anything while armed.
    pub fn on_pointer_move<E>(
        &mut self,
        event: &PointerEvent,
        origin: Point,
        engine: &mut E,
    ) -> Option<OverlayOutcome>
    where
        E: GraphEngine + ?Sized,
    {
        if !self.dragging {
            return None;
        }

        if event.button.is_none() {
            // Release happened somewhere we never heard about.
            self.dragging = false;
            self.drag_happened = false;
            self.down_node = None;
            engine.request_redraw();
            debug!("marquee abandoned, no button held");
            return Some(OverlayOutcome::Abandoned);
        }

        let local = event.position.offset_by(origin);
        self.rect.extend_to(local);
        self.drag_happened = true;
        engine.request_redraw();
        trace!(x = local.x, y = local.y, "marquee extended");
        None
    }

    /// Handle a button release.
    pub fn on_pointer_up<E, H, R>(
        &mut self,
        event: &PointerEvent,
        engine: &mut E,
        hover: &H,
        remover: &mut R,
    ) -> OverlayOutcome
    where
        E: GraphEngine + ?Sized,
        H: HoverSource + ?Sized,
        R: NodeRemover + ?Sized,
    {
        if !event.is_button(self.config.trigger_button) {
            return OverlayOutcome::Ignored;
        }

        let outcome = if self.dragging && self.drag_happened {
            engine.request_redraw();
            let selected = select_in_rect(engine, &self.rect);
            self.drag_happened = false;
            debug!(
                count = selected.len(),
                zero_area = self.rect.is_empty(),
                "marquee committed"
            );
            OverlayOutcome::Selected(selected)
        } else {
            match hover.current_hover() {
                Some(up_node)
                    if self.down_node.as_ref() == Some(&up_node)
                        && up_node.is_edge_joint(&self.config.edge_joint_marker) =>
                {
                    debug!(node = %up_node, "removing edge joint");
                    remover.remove_node(&up_node);
                    OverlayOutcome::Removed(up_node)
                }
                _ => OverlayOutcome::Ignored,
            }
        };

        self.down_node = None;
        self.dragging = false;
        outcome
    }

    /// Paint the marquee after the engine has drawn. No-op while idle.
    pub fn on_after_render<E, S>(&self, engine: &E, surface: &mut S)
    where
        E: GraphEngine + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        if !self.dragging {
            return;
        }

        let bounds = canvas_bounds(engine, &self.rect);
        surface.stroke_dashed_rect(bounds, self.config.style.stroke());
        surface.fill_rect(bounds, self.config.style.fill_color);
    }
}

impl Default for DragSelectOverlay {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

/// Normalized canvas-space bounds of a container-local rectangle.
pub fn canvas_bounds<E>(engine: &E, rect: &SelectionRect) -> Bounds
where
    E: GraphEngine + ?Sized,
{
    let start = engine.screen_to_canvas(rect.start());
    let end = engine.screen_to_canvas(rect.end());
    Bounds::from_corners(start, end)
}

/// Select every node whose canvas position lies inside `rect` (closed bounds) and
/// hand the result to the engine, replacing the previous selection.
pub fn select_in_rect<E>(engine: &mut E, rect: &SelectionRect) -> Vec<NodeKey>
where
    E: GraphEngine + ?Sized,
{
    let bounds = canvas_bounds(engine, rect);
    let selected: Vec<NodeKey> = engine
        .node_keys()
        .into_iter()
        .filter(|key| {
            engine
                .node_position(key)
                .is_some_and(|pos| bounds.contains(pos))
        })
        .collect();
    engine.select_nodes(&selected);
    selected
}
