//! Wiring a [`DragSelectOverlay`] into a host: the `attach` entry point and its disposer.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use crate::engine::{Container, GraphEngine, HoverSource, NodeRemover};
use crate::event::PointerEventKind;
use crate::hub::{EventHub, HookId, ListenerId, WeakEventHub};
use crate::keys::NodeKey;
use crate::overlay::{DragSelectOverlay, OverlayOutcome};

#[derive(Debug, Default)]
struct Shared {
    overlay: DragSelectOverlay,
    last_outcome: Option<OverlayOutcome>,
}

impl Shared {
    fn record(&mut self, outcome: Option<OverlayOutcome>) {
        if let Some(outcome) = outcome.filter(|o| *o != OverlayOutcome::Ignored) {
            self.last_outcome = Some(outcome);
        }
    }
}

impl DragSelectOverlay {
    /// Attach this overlay to a host.
    ///
    /// Suppresses the container's context menu, registers down/move/up listeners and an
    /// after-render hook on `hub`, and returns a handle that undoes all of it when disposed
    /// or dropped.
    pub fn attach<E>(
        self,
        hub: &EventHub,
        container: Rc<dyn Container>,
        engine: Rc<RefCell<E>>,
        hover: Rc<dyn HoverSource>,
        mut remover: Box<dyn NodeRemover>,
    ) -> OverlayHandle
    where
        E: GraphEngine + 'static,
    {
        let shared = Rc::new(RefCell::new(Shared {
            overlay: self,
            last_outcome: None,
        }));

        container.set_context_menu_suppressed(true);

        let down = {
            let shared = Rc::clone(&shared);
            let container = Rc::clone(&container);
            let hover = Rc::clone(&hover);
            hub.add_pointer_listener(PointerEventKind::Down, move |event| {
                let hovered = hover.current_hover();
                shared
                    .borrow_mut()
                    .overlay
                    .on_pointer_down(event, container.origin(), &hovered);
            })
        };

        let moved = {
            let shared = Rc::clone(&shared);
            let container = Rc::clone(&container);
            let engine = Rc::clone(&engine);
            hub.add_pointer_listener(PointerEventKind::Move, move |event| {
                let mut shared = shared.borrow_mut();
                if !shared.overlay.is_dragging() {
                    return;
                }
                let outcome = shared.overlay.on_pointer_move(
                    event,
                    container.origin(),
                    &mut *engine.borrow_mut(),
                );
                shared.record(outcome);
            })
        };

        let up = {
            let shared = Rc::clone(&shared);
            let engine = Rc::clone(&engine);
            hub.add_pointer_listener(PointerEventKind::Up, move |event| {
                let hovered = hover.current_hover();
                let mut pending: Option<NodeKey> = None;
                {
                    let mut shared = shared.borrow_mut();
                    let outcome = shared.overlay.on_pointer_up(
                        event,
                        &mut *engine.borrow_mut(),
                        &hovered,
                        &mut |key: &NodeKey| pending = Some(key.clone()),
                    );
                    shared.record(Some(outcome));
                }
                // Engine borrow is released so the remover may edit the graph.
                if let Some(key) = pending {
                    remover.remove_node(&key);
                }
            })
        };

        let hook = {
            let shared = Rc::clone(&shared);
            hub.add_render_hook(move |surface| {
                shared
                    .borrow()
                    .overlay
                    .on_after_render(&*engine.borrow(), surface);
            })
        };

        info!("drag-select overlay attached");

        OverlayHandle {
            hub: hub.downgrade(),
            container,
            shared,
            listeners: vec![down, moved, up],
            hook: Some(hook),
        }
    }
}

/// Disposer for an attached overlay. Dropping it detaches the overlay.
#[must_use = "dropping the handle detaches the overlay"]
pub struct OverlayHandle {
    hub: WeakEventHub,
    container: Rc<dyn Container>,
    shared: Rc<RefCell<Shared>>,
    listeners: Vec<ListenerId>,
    hook: Option<HookId>,
}

impl OverlayHandle {
    pub fn is_attached(&self) -> bool {
        self.hook.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.borrow().overlay.is_dragging()
    }

    /// Most recent selection, removal or abandonment.
    pub fn last_outcome(&self) -> Option<OverlayOutcome> {
        self.shared.borrow().last_outcome.clone()
    }

    /// Take the most recent outcome, leaving `None` behind.
    pub fn take_outcome(&self) -> Option<OverlayOutcome> {
        self.shared.borrow_mut().last_outcome.take()
    }

    /// Snapshot of the overlay state.
    pub fn overlay(&self) -> DragSelectOverlay {
        self.shared.borrow().overlay.clone()
    }

    /// Remove every listener and hook and restore the context menu. Idempotent.
    pub fn dispose(&mut self) {
        let Some(hook) = self.hook.take() else {
            return;
        };

        if let Some(hub) = self.hub.upgrade() {
            for id in self.listeners.drain(..) {
                hub.remove_pointer_listener(id);
            }
            hub.remove_render_hook(hook);
        }
        self.listeners.clear();
        self.container.set_context_menu_suppressed(false);
        info!("drag-select overlay detached");
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for OverlayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayHandle")
            .field("attached", &self.is_attached())
            .field("listeners", &self.listeners)
            .finish()
    }
}
