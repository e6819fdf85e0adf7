//! Marquee (drag-rectangle) multi-select for node-link graph views.
//!
//! A [`DragSelectOverlay`] turns right-button pointer gestures over a graph container into
//! two actions: dragging selects every node inside the rectangle, and a plain click on an
//! edge-joint node asks for that joint to be removed. The graph engine, the container and
//! the hover tracking stay with the host and are reached through the traits in [`engine`].
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use graph_marquee_core::{
//!     Container, DragSelectOverlay, EventHub, MemoryGraph, NodeKey, Point, PointerButton,
//!     PointerEvent, SharedHover,
//! };
//!
//! struct Fixed;
//! impl Container for Fixed {
//!     fn origin(&self) -> Point { Point::ZERO }
//!     fn set_context_menu_suppressed(&self, _: bool) {}
//! }
//!
//! let mut graph = MemoryGraph::new();
//! graph.add_node("a", Point::new(60.0, 60.0)).unwrap();
//! graph.add_node("b", Point::new(200.0, 200.0)).unwrap();
//! let graph = Rc::new(RefCell::new(graph));
//!
//! let hub = EventHub::new();
//! let _handle = DragSelectOverlay::default().attach(
//!     &hub,
//!     Rc::new(Fixed),
//!     Rc::clone(&graph),
//!     Rc::new(SharedHover::new()),
//!     Box::new(|_: &NodeKey| {}),
//! );
//!
//! let right = PointerButton::Secondary;
//! hub.dispatch(&PointerEvent::down(Point::new(50.0, 50.0), right));
//! hub.dispatch(&PointerEvent::moved(Point::new(150.0, 150.0), Some(right)));
//! hub.dispatch(&PointerEvent::up(Point::new(150.0, 150.0), right));
//!
//! assert_eq!(graph.borrow().selection(), &[NodeKey::from("a")]);
//! ```

mod binding;
pub mod config;
pub mod engine;
mod error;
pub mod event;
pub mod geometry;
mod hub;
pub mod joint;
mod keys;
pub mod memory;
pub mod network;
mod overlay;

pub use binding::OverlayHandle;
pub use config::{OverlayConfig, RectStyle, RgbaColor};
pub use engine::{
    Container, DashedStroke, DrawingSurface, GraphEngine, HoverSource, NodeRemover, SharedHover,
};
pub use error::{OverlayError, OverlayResult};
pub use event::{PointerButton, PointerEvent, PointerEventKind};
pub use geometry::{correct_range, Bounds, Point, SelectionRect};
pub use hub::{EventHub, HookId, ListenerId, WeakEventHub};
pub use joint::{EdgeJointRegistry, JointConnection, JointRemoval, JointSplit};
pub use keys::{EdgeKey, NodeKey, EDGE_JOINT_MARKER};
pub use memory::{MemoryGraph, Viewport};
pub use network::{NetworkEdge, NetworkGraph, NetworkNode};
pub use overlay::{canvas_bounds, select_in_rect, DragSelectOverlay, OverlayOutcome};
