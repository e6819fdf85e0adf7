//! End-to-end gesture tests: events go through an `EventHub` into an attached overlay
//! driving a `MemoryGraph`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use graph_marquee_core::{
    Bounds, Container, DashedStroke, DragSelectOverlay, DrawingSurface, EventHub, GraphEngine,
    MemoryGraph, NodeKey, OverlayConfig, OverlayHandle, OverlayOutcome, Point, PointerButton,
    PointerEvent, RgbaColor, SharedHover, Viewport,
};

// ============================================================================
// Test host
// ============================================================================

/// Log to the test output; `RUST_LOG=graph_marquee_core=debug` shows gesture transitions.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct TestContainer {
    origin: Cell<Point>,
    menu_suppressed: Cell<bool>,
}

impl Container for TestContainer {
    fn origin(&self) -> Point {
        self.origin.get()
    }

    fn set_context_menu_suppressed(&self, suppressed: bool) {
        self.menu_suppressed.set(suppressed);
    }
}

#[derive(Default)]
struct RecordingSurface {
    strokes: Vec<Bounds>,
    fills: Vec<Bounds>,
}

impl DrawingSurface for RecordingSurface {
    fn stroke_dashed_rect(&mut self, bounds: Bounds, _: DashedStroke) {
        self.strokes.push(bounds);
    }

    fn fill_rect(&mut self, bounds: Bounds, _: RgbaColor) {
        self.fills.push(bounds);
    }
}

struct Host {
    hub: EventHub,
    container: Rc<TestContainer>,
    graph: Rc<RefCell<MemoryGraph>>,
    hover: SharedHover,
    removed: Rc<RefCell<Vec<NodeKey>>>,
    handle: OverlayHandle,
}

impl Host {
    fn new(graph: MemoryGraph) -> Self {
        Self::with_config(graph, OverlayConfig::default())
    }

    fn with_config(graph: MemoryGraph, config: OverlayConfig) -> Self {
        init_tracing();
        let hub = EventHub::new();
        let container = Rc::new(TestContainer::default());
        let graph = Rc::new(RefCell::new(graph));
        let hover = SharedHover::new();
        let removed = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&removed);
        let target = Rc::clone(&graph);
        let handle = DragSelectOverlay::new(config).attach(
            &hub,
            container.clone(),
            Rc::clone(&graph),
            Rc::new(hover.clone()),
            Box::new(move |key: &NodeKey| {
                log.borrow_mut().push(key.clone());
                target.borrow_mut().remove_edge_joint(key);
            }),
        );

        Self {
            hub,
            container,
            graph,
            hover,
            removed,
            handle,
        }
    }

    fn press(&self, x: f32, y: f32) {
        self.hub
            .dispatch(&PointerEvent::down(Point::new(x, y), PointerButton::Secondary));
    }

    fn drag_to(&self, x: f32, y: f32) {
        self.hub.dispatch(&PointerEvent::moved(
            Point::new(x, y),
            Some(PointerButton::Secondary),
        ));
    }

    fn release(&self, x: f32, y: f32) {
        self.hub
            .dispatch(&PointerEvent::up(Point::new(x, y), PointerButton::Secondary));
    }

    fn selection(&self) -> Vec<NodeKey> {
        self.graph.borrow().selection().to_vec()
    }
}

fn keys(names: &[&str]) -> Vec<NodeKey> {
    names.iter().map(|n| NodeKey::from(*n)).collect()
}

fn two_nodes() -> MemoryGraph {
    let mut g = MemoryGraph::new();
    g.add_node("near", Point::new(60.0, 60.0)).unwrap();
    g.add_node("far", Point::new(200.0, 200.0)).unwrap();
    g
}

fn grid() -> MemoryGraph {
    let mut g = MemoryGraph::new();
    for x in 0..5 {
        for y in 0..5 {
            g.add_node(format!("n{x}{y}"), Point::new(x as f32 * 25.0, y as f32 * 25.0))
                .unwrap();
        }
    }
    g
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn drag_selects_only_nodes_inside() {
    let host = Host::new(two_nodes());

    host.press(50.0, 50.0);
    host.drag_to(150.0, 150.0);
    host.release(150.0, 150.0);

    assert_eq!(host.selection(), keys(&["near"]));
    assert_eq!(
        host.handle.last_outcome(),
        Some(OverlayOutcome::Selected(keys(&["near"])))
    );
    assert!(!host.handle.is_dragging());
}

#[test]
fn selection_is_invariant_to_drag_direction() {
    let corners = [
        ((10.0, 10.0), (60.0, 40.0)),
        ((60.0, 40.0), (10.0, 10.0)),
        ((10.0, 40.0), (60.0, 10.0)),
        ((60.0, 10.0), (10.0, 40.0)),
    ];
    let mut results = Vec::new();

    for ((x0, y0), (x1, y1)) in corners {
        let host = Host::new(grid());
        host.press(x0, y0);
        host.drag_to(x1, y1);
        host.release(x1, y1);
        results.push(host.selection());
    }

    assert_eq!(results[0], keys(&["n11", "n21"]));
    assert!(results.iter().all(|r| *r == results[0]));
}

#[test]
fn closed_bounds_include_edges_and_exclude_outside() {
    let host = Host::new(grid());

    host.press(25.0, 25.0);
    host.drag_to(50.0, 50.0);
    host.release(50.0, 50.0);

    assert_eq!(host.selection(), keys(&["n11", "n12", "n21", "n22"]));
}

#[test]
fn new_selection_replaces_the_old_one() {
    let host = Host::new(grid());

    host.press(-5.0, -5.0);
    host.drag_to(5.0, 5.0);
    host.release(5.0, 5.0);
    assert_eq!(host.selection(), keys(&["n00"]));

    host.press(95.0, 95.0);
    host.drag_to(105.0, 105.0);
    host.release(105.0, 105.0);
    assert_eq!(host.selection(), keys(&["n44"]));
}

#[test]
fn zero_area_drag_yields_empty_selection() {
    let host = Host::new(two_nodes());
    host.graph.borrow_mut().select_nodes(&keys(&["far"]));

    host.press(10.0, 10.0);
    host.drag_to(10.0, 10.0);
    host.release(10.0, 10.0);

    assert!(host.selection().is_empty());
    assert_eq!(host.handle.last_outcome(), Some(OverlayOutcome::Selected(Vec::new())));
}

#[test]
fn zero_area_drag_selects_a_node_exactly_on_the_point() {
    let host = Host::new(two_nodes());

    host.press(60.0, 60.0);
    host.drag_to(60.0, 60.0);
    host.release(60.0, 60.0);

    assert_eq!(host.selection(), keys(&["near"]));
    assert_eq!(
        host.handle.last_outcome(),
        Some(OverlayOutcome::Selected(keys(&["near"])))
    );
}

#[test]
fn container_offset_and_viewport_are_applied() {
    let mut graph = two_nodes();
    graph.set_viewport(Viewport {
        pan: Point::new(0.0, 0.0),
        zoom: 2.0,
    });
    let host = Host::new(graph);
    host.container.origin.set(Point::new(100.0, 100.0));

    // Container-local (100,100)..(300,300) maps to canvas (50,50)..(150,150).
    host.press(200.0, 200.0);
    host.drag_to(400.0, 400.0);
    host.release(400.0, 400.0);

    assert_eq!(host.selection(), keys(&["near"]));
}

// ============================================================================
// Edge-joint removal
// ============================================================================

fn jointed() -> (MemoryGraph, NodeKey) {
    let mut g = two_nodes();
    g.add_edge("rel", &"near".into(), &"far".into()).unwrap();
    let split = g
        .split_edge(&"rel".into(), Point::new(130.0, 100.0))
        .unwrap();
    (g, split.joint)
}

#[test]
fn click_on_joint_removes_it_exactly_once() {
    let (graph, joint) = jointed();
    let host = Host::new(graph);
    host.hover.set(Some(joint.clone()));

    host.press(130.0, 100.0);
    host.release(130.0, 100.0);

    assert_eq!(*host.removed.borrow(), vec![joint.clone()]);
    assert_eq!(host.handle.last_outcome(), Some(OverlayOutcome::Removed(joint.clone())));

    let graph = host.graph.borrow();
    assert!(!graph.contains_node(&joint));
    assert!(graph.has_edge(&"rel".into()));
    assert!(graph.selection().is_empty());
}

#[test]
fn click_on_plain_node_or_empty_space_does_nothing() {
    for hovered in [Some(NodeKey::from("near")), None] {
        let host = Host::new(two_nodes());
        host.hover.set(hovered);

        host.press(60.0, 60.0);
        host.release(60.0, 60.0);

        assert!(host.removed.borrow().is_empty());
        assert!(host.selection().is_empty());
        assert_eq!(host.graph.borrow().redraw_count(), 0);
        assert_eq!(host.handle.last_outcome(), None);
    }
}

#[test]
fn dragging_over_a_joint_selects_instead_of_removing() {
    let (graph, joint) = jointed();
    let host = Host::new(graph);
    host.hover.set(Some(joint.clone()));

    host.press(120.0, 90.0);
    host.drag_to(140.0, 110.0);
    host.release(140.0, 110.0);

    assert!(host.removed.borrow().is_empty());
    assert_eq!(host.selection(), vec![joint]);
}

#[test]
fn custom_marker_is_respected() {
    let mut graph = MemoryGraph::with_joint_marker("bend");
    graph.add_node("a", Point::ZERO).unwrap();
    graph.add_node("b", Point::new(10.0, 0.0)).unwrap();
    graph.add_edge("ab", &"a".into(), &"b".into()).unwrap();
    let joint = graph.split_edge(&"ab".into(), Point::new(5.0, 5.0)).unwrap().joint;

    let mut config = OverlayConfig::default();
    config.set("edge_joint_marker", "bend").unwrap();
    let host = Host::with_config(graph, config);
    host.hover.set(Some(joint.clone()));

    host.press(5.0, 5.0);
    host.release(5.0, 5.0);

    assert_eq!(*host.removed.borrow(), vec![joint]);
}

// ============================================================================
// Recovery, painting and teardown
// ============================================================================

#[test]
fn move_without_button_abandons_the_drag() {
    let host = Host::new(two_nodes());

    host.press(0.0, 0.0);
    host.drag_to(300.0, 300.0);
    host.hub
        .dispatch(&PointerEvent::moved(Point::new(310.0, 310.0), None));

    assert!(!host.handle.is_dragging());
    assert_eq!(host.handle.last_outcome(), Some(OverlayOutcome::Abandoned));

    // A late release is just a click on empty space.
    host.release(310.0, 310.0);
    assert!(host.selection().is_empty());
}

#[test]
fn marquee_is_painted_only_while_dragging() {
    let host = Host::new(two_nodes());
    let mut surface = RecordingSurface::default();

    host.hub.run_render_hooks(&mut surface);
    assert!(surface.strokes.is_empty());

    host.press(80.0, 10.0);
    host.drag_to(20.0, 70.0);
    host.hub.run_render_hooks(&mut surface);

    let expected = Bounds::from_corners(Point::new(20.0, 10.0), Point::new(80.0, 70.0));
    assert_eq!(surface.strokes, vec![expected]);
    assert_eq!(surface.fills, vec![expected]);

    host.release(20.0, 70.0);
    host.hub.run_render_hooks(&mut surface);
    assert_eq!(surface.strokes.len(), 1);
}

#[test]
fn dispose_removes_listeners_and_restores_context_menu() {
    let mut host = Host::new(two_nodes());
    assert!(host.container.menu_suppressed.get());
    assert_eq!(host.hub.listener_count(), 3);
    assert_eq!(host.hub.hook_count(), 1);

    host.handle.dispose();
    host.handle.dispose();

    assert!(!host.handle.is_attached());
    assert!(!host.container.menu_suppressed.get());
    assert_eq!(host.hub.listener_count(), 0);
    assert_eq!(host.hub.hook_count(), 0);

    host.press(50.0, 50.0);
    host.drag_to(150.0, 150.0);
    host.release(150.0, 150.0);
    assert!(host.selection().is_empty());
}

#[test]
fn overlays_on_separate_hubs_do_not_interfere() {
    let left = Host::new(two_nodes());
    let right = Host::new(two_nodes());

    left.press(50.0, 50.0);
    left.drag_to(150.0, 150.0);

    assert!(left.handle.is_dragging());
    assert!(!right.handle.is_dragging());
}

#[test]
fn dropping_the_handle_detaches() {
    let hub = EventHub::new();
    let container = Rc::new(TestContainer::default());
    {
        let _handle = DragSelectOverlay::default().attach(
            &hub,
            container.clone(),
            Rc::new(RefCell::new(MemoryGraph::new())),
            Rc::new(SharedHover::new()),
            Box::new(|_: &NodeKey| {}),
        );
        assert_eq!(hub.listener_count(), 3);
    }
    assert_eq!(hub.listener_count(), 0);
    assert!(!container.menu_suppressed.get());
}
