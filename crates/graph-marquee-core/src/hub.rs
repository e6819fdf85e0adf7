//! Single-threaded registry of pointer listeners and after-render hooks.
//!
//! The host owns an [`EventHub`], feeds it pointer events in delivery order and runs its
//! render hooks after each paint. Listeners can be removed at any time, including from
//! inside a dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::engine::DrawingSurface;
use crate::event::{PointerEvent, PointerEventKind};

type PointerListener = Rc<RefCell<dyn FnMut(&PointerEvent)>>;
type RenderHook = Rc<RefCell<dyn FnMut(&mut dyn DrawingSurface)>>;

/// Handle to a registered pointer listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Handle to a registered render hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(ListenerId, PointerEventKind, PointerListener)>,
    hooks: Vec<(HookId, RenderHook)>,
}

impl HubInner {
    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cloneable handle to a shared listener registry.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Rc<RefCell<HubInner>>,
}

/// Non-owning reference to an [`EventHub`].
#[derive(Clone, Default)]
pub struct WeakEventHub {
    inner: Weak<RefCell<HubInner>>,
}

impl WeakEventHub {
    pub fn upgrade(&self) -> Option<EventHub> {
        self.inner.upgrade().map(|inner| EventHub { inner })
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakEventHub {
        WeakEventHub {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn add_pointer_listener(
        &self,
        kind: PointerEventKind,
        listener: impl FnMut(&PointerEvent) + 'static,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.mint());
        inner
            .listeners
            .push((id, kind, Rc::new(RefCell::new(listener))));
        id
    }

    /// Returns false if the listener was already gone.
    pub fn remove_pointer_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _, _)| *lid != id);
        inner.listeners.len() != before
    }

    pub fn add_render_hook(&self, hook: impl FnMut(&mut dyn DrawingSurface) + 'static) -> HookId {
        let mut inner = self.inner.borrow_mut();
        let id = HookId(inner.mint());
        inner.hooks.push((id, Rc::new(RefCell::new(hook))));
        id
    }

    /// Returns false if the hook was already gone.
    pub fn remove_render_hook(&self, id: HookId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.hooks.len();
        inner.hooks.retain(|(hid, _)| *hid != id);
        inner.hooks.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn hook_count(&self) -> usize {
        self.inner.borrow().hooks.len()
    }

    fn is_listening(&self, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .listeners
            .iter()
            .any(|(lid, _, _)| *lid == id)
    }

    fn is_hooked(&self, id: HookId) -> bool {
        self.inner.borrow().hooks.iter().any(|(hid, _)| *hid == id)
    }

    /// Deliver an event to every listener of its kind, in registration order.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        let snapshot: Vec<(ListenerId, PointerListener)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(id, _, listener)| (*id, Rc::clone(listener)))
            .collect();

        let mut invoked = 0;
        for (id, listener) in snapshot {
            if !self.is_listening(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    (&mut *listener)(event);
                    invoked += 1;
                }
                Err(_) => warn!(?id, "skipping re-entrant pointer listener"),
            }
        }
        invoked
    }

    /// Run every render hook against `surface`, in registration order.
    pub fn run_render_hooks(&self, surface: &mut dyn DrawingSurface) {
        let snapshot: Vec<(HookId, RenderHook)> = self
            .inner
            .borrow()
            .hooks
            .iter()
            .map(|(id, hook)| (*id, Rc::clone(hook)))
            .collect();

        for (id, hook) in snapshot {
            if !self.is_hooked(id) {
                continue;
            }
            match hook.try_borrow_mut() {
                Ok(mut hook) => (&mut *hook)(surface),
                Err(_) => warn!(?id, "skipping re-entrant render hook"),
            }
        }
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .field("hooks", &self.hook_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RgbaColor;
    use crate::engine::DashedStroke;
    use crate::event::PointerButton;
    use crate::geometry::{Bounds, Point};

    struct NullSurface;

    impl DrawingSurface for NullSurface {
        fn stroke_dashed_rect(&mut self, _: Bounds, _: DashedStroke) {}
        fn fill_rect(&mut self, _: Bounds, _: RgbaColor) {}
    }

    #[test]
    fn dispatch_routes_by_kind() {
        let hub = EventHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        hub.add_pointer_listener(PointerEventKind::Down, move |e| log.borrow_mut().push(e.kind));
        let log = Rc::clone(&seen);
        hub.add_pointer_listener(PointerEventKind::Up, move |e| log.borrow_mut().push(e.kind));

        let down = PointerEvent::down(Point::ZERO, PointerButton::Secondary);
        let moved = PointerEvent::moved(Point::ZERO, None);
        assert_eq!(hub.dispatch(&down), 1);
        assert_eq!(hub.dispatch(&moved), 0);

        assert_eq!(*seen.borrow(), vec![PointerEventKind::Down]);
    }

    #[test]
    fn removal_is_reported_once() {
        let hub = EventHub::new();
        let id = hub.add_pointer_listener(PointerEventKind::Move, |_| {});
        let hook = hub.add_render_hook(|_| {});

        assert!(hub.remove_pointer_listener(id));
        assert!(!hub.remove_pointer_listener(id));
        assert!(hub.remove_render_hook(hook));
        assert!(!hub.remove_render_hook(hook));
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.hook_count(), 0);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let hub = EventHub::new();
        let calls = Rc::new(RefCell::new(0));
        let second: Rc<RefCell<Option<ListenerId>>> = Rc::default();

        let remover_hub = hub.clone();
        let target = Rc::clone(&second);
        hub.add_pointer_listener(PointerEventKind::Move, move |_| {
            if let Some(id) = *target.borrow() {
                remover_hub.remove_pointer_listener(id);
            }
        });
        let counter = Rc::clone(&calls);
        let id = hub.add_pointer_listener(PointerEventKind::Move, move |_| {
            *counter.borrow_mut() += 1;
        });
        *second.borrow_mut() = Some(id);

        assert_eq!(hub.dispatch(&PointerEvent::moved(Point::ZERO, None)), 1);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn render_hooks_run_in_order() {
        let hub = EventHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            hub.add_render_hook(move |_| order.borrow_mut().push(n));
        }

        hub.run_render_hooks(&mut NullSurface);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn weak_handle_does_not_keep_hub_alive() {
        let hub = EventHub::new();
        let weak = hub.downgrade();
        assert!(weak.upgrade().is_some());
        drop(hub);
        assert!(weak.upgrade().is_none());
    }
}
