//! Geometry types
//!
//! Window and monitor geometry in the platform's logical coordinate space.
//! Pointer coordinates are `f64` points (sub-pixel on high-DPI platforms),
//! window geometry is integral like the underlying windowing system.

use serde::{Deserialize, Serialize};

pub use nalgebra::Point2;

/// Pointer position in window-logical coordinates
pub type Point = Point2<f64>;

/// Screen position of a window's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal screen coordinate
    pub x: i32,
    /// Vertical screen coordinate
    pub y: i32,
}

impl Position {
    /// Create a new position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Logical size of a window's client area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in logical pixels
    pub width: u32,
    /// Height in logical pixels
    pub height: u32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero (minimized windows report this)
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle, used for monitor work areas and hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner
    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Extent of the rectangle
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check whether a point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, point: &Point) -> bool {
        let left = f64::from(self.x);
        let top = f64::from(self.y);
        point.x >= left
            && point.x <= left + f64::from(self.width)
            && point.y >= top
            && point.y <= top + f64::from(self.height)
    }

    /// Position that centres `inner` inside this rectangle
    pub fn centered(&self, inner: Size) -> Position {
        let dx = (i64::from(self.width) - i64::from(inner.width)) / 2;
        let dy = (i64::from(self.height) - i64::from(inner.height)) / 2;
        Position::new(
            self.x.saturating_add(i32::try_from(dx).unwrap_or(0)),
            self.y.saturating_add(i32::try_from(dy).unwrap_or(0)),
        )
    }
}

/// Ratio between logical and physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentScale {
    /// Horizontal scale factor
    pub x: f32,
    /// Vertical scale factor
    pub y: f32,
}

impl ContentScale {
    /// Create a new content scale
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for ContentScale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Minimum and maximum client-area size; `None` means unconstrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SizeLimits {
    /// Minimum width
    pub min_width: Option<u32>,
    /// Minimum height
    pub min_height: Option<u32>,
    /// Maximum width
    pub max_width: Option<u32>,
    /// Maximum height
    pub max_height: Option<u32>,
}

impl SizeLimits {
    /// Limits with all four bounds set
    pub const fn new(min_width: u32, min_height: u32, max_width: u32, max_height: u32) -> Self {
        Self {
            min_width: Some(min_width),
            min_height: Some(min_height),
            max_width: Some(max_width),
            max_height: Some(max_height),
        }
    }

    /// Reject limits whose minimum exceeds their maximum
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_width, self.max_width) {
            if min > max {
                return Err(format!("min width {min} exceeds max width {max}"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_height, self.max_height) {
            if min > max {
                return Err(format!("min height {min} exceeds max height {max}"));
            }
        }
        Ok(())
    }

    /// Clamp a size into these limits
    pub fn clamp(&self, size: Size) -> Size {
        let clamp_axis = |value: u32, min: Option<u32>, max: Option<u32>| {
            let value = min.map_or(value, |min| value.max(min));
            max.map_or(value, |max| value.min(max))
        };
        Size::new(
            clamp_axis(size.width, self.min_width, self.max_width),
            clamp_axis(size.height, self.min_height, self.max_height),
        )
    }
}

/// Euclidean distance between two pointer positions
pub fn distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rect_contains_is_edge_inclusive() {
        let rect = Rect::new(40, 180, 100, 40);
        assert!(rect.contains(&Point::new(40.0, 180.0)));
        assert!(rect.contains(&Point::new(140.0, 220.0)));
        assert!(!rect.contains(&Point::new(140.5, 200.0)));
        assert!(!rect.contains(&Point::new(39.9, 200.0)));
    }

    #[test]
    fn test_rect_centered() {
        let work_area = Rect::new(0, 25, 1920, 1055);
        assert_eq!(work_area.centered(Size::new(800, 600)), Position::new(560, 252));
    }

    #[test]
    fn test_size_limits_clamp() {
        let limits = SizeLimits::new(900, 500, 3000, 3000);
        assert_eq!(limits.clamp(Size::new(640, 480)), Size::new(900, 500));
        assert_eq!(limits.clamp(Size::new(4000, 1000)), Size::new(3000, 1000));
        assert_eq!(SizeLimits::default().clamp(Size::new(1, 1)), Size::new(1, 1));
    }

    #[test]
    fn test_size_limits_validate() {
        assert!(SizeLimits::new(10, 10, 20, 20).validate().is_ok());
        assert!(SizeLimits::new(30, 10, 20, 20).validate().is_err());
        let partial = SizeLimits { min_height: Some(50), max_height: Some(40), ..Default::default() };
        assert!(partial.validate().is_err());
    }

    #[test]
    fn test_distance() {
        assert_relative_eq!(distance(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0)), 5.0);
    }
}
