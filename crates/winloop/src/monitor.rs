//! Monitor registry
//!
//! Read-only view of the connected displays. Every query asks the platform
//! again; snapshots are never cached, so hot-plugged displays show up on the
//! next call.

use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};
use crate::foundation::math::{ContentScale, Position, Rect, Size};
use crate::platform::Platform;

/// Position of a monitor in the platform's enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub u32);

/// Immutable snapshot of one display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Identity within this snapshot
    pub id: MonitorId,
    /// Human-readable name, when the platform provides one
    pub name: Option<String>,
    /// Virtual-desktop position of the monitor
    pub position: Position,
    /// Usable area excluding taskbars and menu bars
    pub work_area: Rect,
    /// Logical-to-physical pixel ratio
    pub content_scale: ContentScale,
    /// Current video mode resolution
    pub video_size: Option<Size>,
    /// Current video mode refresh rate in Hz
    pub refresh_rate: Option<u32>,
    /// Whether this is the platform's primary monitor
    pub primary: bool,
}

/// Enumerate connected monitors
pub fn list_monitors<P: Platform + ?Sized>(platform: &mut P) -> Vec<Monitor> {
    let monitors = platform.monitors();
    log::trace!("Enumerated {} monitor(s)", monitors.len());
    monitors
}

/// The primary monitor, or [`RuntimeError::NoDisplay`] in a headless environment
pub fn primary_monitor<P: Platform + ?Sized>(platform: &mut P) -> RuntimeResult<Monitor> {
    platform.primary_monitor().ok_or_else(|| {
        log::warn!("Primary monitor requested but no display is attached");
        RuntimeError::NoDisplay
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;

    #[test]
    fn test_primary_monitor_without_display() {
        let mut platform = HeadlessPlatform::without_displays();
        assert!(list_monitors(&mut platform).is_empty());
        assert!(matches!(primary_monitor(&mut platform), Err(RuntimeError::NoDisplay)));
    }

    #[test]
    fn test_primary_monitor_is_flagged() {
        let mut platform = HeadlessPlatform::new();
        let primary = primary_monitor(&mut platform).unwrap();
        assert!(primary.primary);
        assert_eq!(list_monitors(&mut platform)[0], primary);
    }

    #[test]
    fn test_snapshots_follow_hotplug() {
        let mut platform = HeadlessPlatform::new();
        let before = list_monitors(&mut platform).len();
        platform.attach_monitor(Rect::new(1920, 0, 1280, 1024), ContentScale::new(1.0, 1.0));
        assert_eq!(list_monitors(&mut platform).len(), before + 1);
    }
}
