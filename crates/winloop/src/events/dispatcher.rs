//! Listener registry and dispatch
//!
//! Listeners are stored in a slot map and indexed per event kind in
//! registration order. The runtime delivers an event to every matching
//! listener, even after one of them cancelled the default effect or failed.
//!
//! A callback is taken out of its slot while it runs, so listeners can add
//! and remove listeners (themselves included) through their [`Context`].
//! Removal is immediate: a listener removed by an earlier sibling is not
//! called for the event being delivered. A listener added during delivery
//! first sees the next event.

use std::collections::HashMap;

use crate::error::CallbackResult;
use crate::events::{Event, EventKind, Scope};
use crate::foundation::collections::{ListenerId, SlotMap, WindowId};
use crate::platform::Platform;
use crate::runtime::Context;

/// Boxed listener callback
pub type Listener<P> = Box<dyn FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult>;

struct Registration<P: Platform> {
    kind: EventKind,
    scope: Scope,
    /// `None` while the callback runs
    callback: Option<Listener<P>>,
}

/// Event dispatcher with per-kind registration
pub struct Dispatcher<P: Platform> {
    listeners: SlotMap<ListenerId, Registration<P>>,
    by_kind: HashMap<EventKind, Vec<ListenerId>>,
}

impl<P: Platform> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> Dispatcher<P> {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            by_kind: HashMap::new(),
        }
    }

    /// Register a listener; it runs after every listener registered before it
    pub fn register<F>(&mut self, kind: EventKind, scope: Scope, callback: F) -> ListenerId
    where
        F: FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult + 'static,
    {
        let id = self.listeners.insert(Registration {
            kind,
            scope,
            callback: Some(Box::new(callback)),
        });
        self.by_kind.entry(kind).or_default().push(id);
        log::trace!("Registered listener {id:?} for '{kind}' ({scope:?})");
        id
    }

    /// Remove a listener; returns `false` if it was already gone
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some(registration) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_kind.get_mut(&registration.kind) {
            ids.retain(|other| *other != id);
        }
        true
    }

    /// Remove every listener scoped to `window`
    pub fn unregister_window(&mut self, window: WindowId) -> usize {
        let scoped: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, registration)| registration.scope == Scope::Window(window))
            .map(|(id, _)| id)
            .collect();
        for id in &scoped {
            self.unregister(*id);
        }
        scoped.len()
    }

    /// Whether a listener is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of listeners for one kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.by_kind.clear();
    }

    /// Listeners for `event` in registration order, filtered by scope
    pub(crate) fn matching(&self, event: &Event) -> Vec<ListenerId> {
        let Some(ids) = self.by_kind.get(&event.kind()) else {
            return Vec::new();
        };
        ids.iter()
            .copied()
            .filter(|id| {
                self.listeners
                    .get(*id)
                    .is_some_and(|registration| registration.scope.matches(event.window()))
            })
            .collect()
    }

    /// Borrow a callback for one call; `None` if it was removed or is running
    pub(crate) fn take_callback(&mut self, id: ListenerId) -> Option<Listener<P>> {
        self.listeners.get_mut(id)?.callback.take()
    }

    /// Put a callback back; dropped if its listener was removed while it ran
    pub(crate) fn restore_callback(&mut self, id: ListenerId, callback: Listener<P>) {
        if let Some(registration) = self.listeners.get_mut(id) {
            registration.callback = Some(callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;

    fn noop(_: &mut Event, _: &mut Context<'_, HeadlessPlatform>) -> CallbackResult {
        Ok(())
    }

    #[test]
    fn test_register_and_unregister() {
        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        let first = dispatcher.register(EventKind::Resize, Scope::Global, noop);
        let second = dispatcher.register(EventKind::Resize, Scope::Global, noop);
        dispatcher.register(EventKind::Close, Scope::Global, noop);
        assert_eq!(dispatcher.listener_count(EventKind::Resize), 2);
        assert_eq!(dispatcher.len(), 3);

        assert!(dispatcher.unregister(first));
        assert!(!dispatcher.unregister(first));
        assert!(dispatcher.contains(second));
        assert_eq!(dispatcher.listener_count(EventKind::Resize), 1);
    }

    #[test]
    fn test_unregister_window_scope() {
        let mut windows: SlotMap<WindowId, ()> = SlotMap::with_key();
        let a = windows.insert(());
        let b = windows.insert(());

        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        dispatcher.register(EventKind::Resize, Scope::Window(a), noop);
        dispatcher.register(EventKind::Close, Scope::Window(a), noop);
        let kept = dispatcher.register(EventKind::Resize, Scope::Window(b), noop);
        let global = dispatcher.register(EventKind::Resize, Scope::Global, noop);

        assert_eq!(dispatcher.unregister_window(a), 2);
        assert!(dispatcher.contains(kept) && dispatcher.contains(global));
        assert_eq!(dispatcher.listener_count(EventKind::Close), 0);
    }

    #[test]
    fn test_take_and_restore_callback() {
        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        let id = dispatcher.register(EventKind::Click, Scope::Global, noop);

        let callback = dispatcher.take_callback(id).unwrap();
        assert!(dispatcher.take_callback(id).is_none());
        dispatcher.restore_callback(id, callback);
        assert!(dispatcher.take_callback(id).is_some());
    }

    #[test]
    fn test_restore_after_unregister_drops_callback() {
        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        let id = dispatcher.register(EventKind::Click, Scope::Global, noop);

        let callback = dispatcher.take_callback(id).unwrap();
        assert!(dispatcher.unregister(id));
        dispatcher.restore_callback(id, callback);
        assert!(!dispatcher.contains(id));
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_matching_filters_scope() {
        let mut windows: SlotMap<WindowId, ()> = SlotMap::with_key();
        let a = windows.insert(());
        let b = windows.insert(());

        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        let global = dispatcher.register(EventKind::Refresh, Scope::Global, noop);
        dispatcher.register(EventKind::Refresh, Scope::Window(b), noop);
        let scoped = dispatcher.register(EventKind::Refresh, Scope::Window(a), noop);
        dispatcher.register(EventKind::Resize, Scope::Global, noop);

        let event = Event::new(EventKind::Refresh, a, crate::events::EventData::None);
        assert_eq!(dispatcher.matching(&event), vec![global, scoped]);
    }

    #[test]
    fn test_clear() {
        let mut dispatcher = Dispatcher::<HeadlessPlatform>::new();
        dispatcher.register(EventKind::Click, Scope::Global, noop);
        dispatcher.clear();
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.listener_count(EventKind::Click), 0);
    }
}
