//! Window registry
//!
//! Owns every [`WindowState`]. Windows are keyed by [`WindowId`] and also
//! indexed by their backend [`NativeId`] so raw events can be routed.
//! Creation order is kept for deterministic draw order.

use std::collections::HashMap;

use crate::error::{RuntimeError, RuntimeResult};
use crate::foundation::collections::{SlotMap, WindowId};
use crate::platform::NativeId;
use crate::window::{WindowFlags, WindowState};

/// Registry of open and pending-close windows
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: SlotMap<WindowId, WindowState>,
    by_native: HashMap<NativeId, WindowId>,
    order: Vec<WindowId>,
    pending_close: Vec<WindowId>,
}

impl WindowRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window built from its freshly assigned key
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(WindowId) -> WindowState) -> WindowId {
        let id = self.windows.insert_with_key(build);
        let native = self.windows[id].native;
        self.by_native.insert(native, id);
        self.order.push(id);
        id
    }

    /// Look up a window, closed or not
    pub fn get(&self, id: WindowId) -> Option<&WindowState> {
        self.windows.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowState> {
        self.windows.get_mut(id)
    }

    /// Look up a window that accepts mutations
    pub fn live(&self, id: WindowId) -> RuntimeResult<&WindowState> {
        self.windows
            .get(id)
            .filter(|state| !state.is_closed())
            .ok_or(RuntimeError::WindowClosed(id))
    }

    pub(crate) fn live_mut(&mut self, id: WindowId) -> RuntimeResult<&mut WindowState> {
        self.windows
            .get_mut(id)
            .filter(|state| !state.is_closed())
            .ok_or(RuntimeError::WindowClosed(id))
    }

    /// Route a backend handle to its window
    pub fn lookup_native(&self, native: NativeId) -> Option<WindowId> {
        self.by_native.get(&native).copied()
    }

    /// Closed flag; windows no longer in the registry count as closed
    pub fn is_closed(&self, id: WindowId) -> bool {
        self.windows.get(id).map_or(true, WindowState::is_closed)
    }

    /// Set the closed flag; returns `false` if it was already set or the window is gone
    pub(crate) fn mark_closed(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(id) {
            Some(state) if !state.is_closed() => {
                state.flags.insert(WindowFlags::CLOSED);
                self.pending_close.push(id);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_pending_close(&mut self) -> Vec<WindowId> {
        std::mem::take(&mut self.pending_close)
    }

    /// Drop a window from the registry
    pub(crate) fn remove(&mut self, id: WindowId) -> Option<WindowState> {
        let state = self.windows.remove(id)?;
        self.by_native.remove(&state.native);
        self.order.retain(|other| *other != id);
        Some(state)
    }

    /// Windows in the registry, including those pending close
    pub fn active_count(&self) -> usize {
        self.windows.len()
    }

    /// Window keys in creation order
    pub fn ids(&self) -> Vec<WindowId> {
        self.order.clone()
    }

    /// Open windows whose parent is `id`
    pub fn children_of(&self, id: WindowId) -> Vec<WindowId> {
        self.order
            .iter()
            .copied()
            .filter(|child| self.windows.get(*child).is_some_and(|state| state.parent == Some(id)))
            .collect()
    }

    /// Clear the focus flag everywhere except `focused`
    pub(crate) fn set_exclusive_focus(&mut self, focused: WindowId) {
        for (id, state) in &mut self.windows {
            state.flags.set(WindowFlags::FOCUSED, id == focused);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::InputConfig;
    use crate::foundation::math::{ContentScale, Position, Size};
    use crate::platform::NativeWindow;
    use crate::window::WindowConfig;

    fn insert(registry: &mut WindowRegistry, native: u64, parent: Option<WindowId>) -> WindowId {
        let mut config = WindowConfig::new(format!("window {native}"));
        config.parent = parent;
        let created = NativeWindow {
            id: NativeId(native),
            size: config.size(),
            framebuffer_size: config.size(),
            position: Position::default(),
            content_scale: ContentScale::default(),
            focused: false,
            maximized: false,
        };
        registry.insert_with(|id| WindowState::new(id, &config, &created, &InputConfig::default()))
    }

    #[test]
    fn test_native_lookup_and_removal() {
        let mut registry = WindowRegistry::new();
        let id = insert(&mut registry, 7, None);
        assert_eq!(registry.lookup_native(NativeId(7)), Some(id));
        assert_eq!(registry.get(id).unwrap().size(), Size::new(800, 600));

        registry.remove(id);
        assert_eq!(registry.lookup_native(NativeId(7)), None);
        assert!(registry.is_closed(id));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_mark_closed_is_idempotent() {
        let mut registry = WindowRegistry::new();
        let id = insert(&mut registry, 1, None);
        assert!(registry.mark_closed(id));
        assert!(!registry.mark_closed(id));
        assert_eq!(registry.take_pending_close(), vec![id]);
        // Pending-close windows still count until finalized
        assert_eq!(registry.active_count(), 1);
        assert!(matches!(registry.live(id), Err(RuntimeError::WindowClosed(_))));
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn test_creation_order_and_children() {
        let mut registry = WindowRegistry::new();
        let parent = insert(&mut registry, 1, None);
        let child = insert(&mut registry, 2, Some(parent));
        let other = insert(&mut registry, 3, None);
        assert_eq!(registry.ids(), vec![parent, child, other]);
        assert_eq!(registry.children_of(parent), vec![child]);
        assert!(registry.children_of(other).is_empty());
    }

    #[test]
    fn test_exclusive_focus() {
        let mut registry = WindowRegistry::new();
        let a = insert(&mut registry, 1, None);
        let b = insert(&mut registry, 2, None);
        registry.set_exclusive_focus(a);
        registry.set_exclusive_focus(b);
        assert!(!registry.get(a).unwrap().is_focused());
        assert!(registry.get(b).unwrap().is_focused());
    }
}
