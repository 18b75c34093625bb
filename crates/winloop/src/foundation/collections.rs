//! Stable keys for registry-owned objects
//!
//! Windows, listeners and timers are stored in slot maps. Applications only
//! ever hold the key, so a removed entry turns into a lookup miss instead of
//! a dangling reference.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Application-side reference to a window in the registry
    pub struct WindowId;

    /// Subscription handle returned when a listener is registered
    pub struct ListenerId;

    /// Handle for a scheduled timeout or interval
    pub struct TimerId;
}
