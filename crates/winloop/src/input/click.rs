//! Click and double-click synthesis
//!
//! The platform only reports button transitions. A click is a release of the
//! button that was pressed in the same window; a double click is a second
//! click of the same button close enough in time and space to the first.

use std::time::{Duration, Instant};

use crate::core::config::InputConfig;
use crate::foundation::math::{distance, Point};
use crate::input::MouseButton;

/// What a button release produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Release without a matching armed press
    None,
    /// Single click
    Click,
    /// Click that completes a double click; a `click` is still reported first
    DoubleClick,
}

#[derive(Debug, Clone, Copy)]
struct LastClick {
    button: MouseButton,
    position: Point,
    at: Instant,
}

/// Per-window click state machine
#[derive(Debug, Clone)]
pub struct ClickTracker {
    armed: Option<MouseButton>,
    last_click: Option<LastClick>,
    interval: Duration,
    max_distance: f64,
}

impl ClickTracker {
    /// Create a tracker using the configured thresholds
    pub fn new(config: &InputConfig) -> Self {
        Self {
            armed: None,
            last_click: None,
            interval: Duration::from_millis(config.double_click_ms),
            max_distance: config.double_click_distance,
        }
    }

    /// A press whose default effect was not cancelled
    pub fn press(&mut self, button: MouseButton) {
        self.armed = Some(button);
    }

    /// Drop any armed press, e.g. after a cancelled press or focus loss
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// A release whose default effect was not cancelled
    pub fn release(&mut self, button: MouseButton, position: Point, now: Instant) -> ClickOutcome {
        if self.armed != Some(button) {
            return ClickOutcome::None;
        }
        self.armed = None;

        let is_double = self.last_click.is_some_and(|last| {
            last.button == button
                && now.saturating_duration_since(last.at) <= self.interval
                && distance(&last.position, &position) <= self.max_distance
        });

        if is_double {
            // A third click starts a new sequence instead of another double
            self.last_click = None;
            ClickOutcome::DoubleClick
        } else {
            self.last_click = Some(LastClick { button, position, at: now });
            ClickOutcome::Click
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ClickTracker {
        ClickTracker::new(&InputConfig::default())
    }

    #[test]
    fn test_release_without_press_is_not_a_click() {
        let mut clicks = tracker();
        assert_eq!(clicks.release(MouseButton::Left, Point::origin(), Instant::now()), ClickOutcome::None);
    }

    #[test]
    fn test_release_of_other_button_is_not_a_click() {
        let mut clicks = tracker();
        clicks.press(MouseButton::Left);
        assert_eq!(clicks.release(MouseButton::Right, Point::origin(), Instant::now()), ClickOutcome::None);
    }

    #[test]
    fn test_double_click_within_thresholds() {
        let mut clicks = tracker();
        let start = Instant::now();
        clicks.press(MouseButton::Left);
        assert_eq!(clicks.release(MouseButton::Left, Point::new(10.0, 10.0), start), ClickOutcome::Click);
        clicks.press(MouseButton::Left);
        let second = start + Duration::from_millis(200);
        assert_eq!(clicks.release(MouseButton::Left, Point::new(11.0, 12.0), second), ClickOutcome::DoubleClick);

        // Third click opens a new sequence
        clicks.press(MouseButton::Left);
        let third = start + Duration::from_millis(300);
        assert_eq!(clicks.release(MouseButton::Left, Point::new(11.0, 12.0), third), ClickOutcome::Click);
    }

    #[test]
    fn test_slow_or_distant_second_click_is_single() {
        let mut clicks = tracker();
        let start = Instant::now();
        clicks.press(MouseButton::Left);
        clicks.release(MouseButton::Left, Point::new(10.0, 10.0), start);
        clicks.press(MouseButton::Left);
        let late = start + Duration::from_millis(800);
        assert_eq!(clicks.release(MouseButton::Left, Point::new(10.0, 10.0), late), ClickOutcome::Click);

        clicks.press(MouseButton::Left);
        let soon = late + Duration::from_millis(100);
        assert_eq!(clicks.release(MouseButton::Left, Point::new(40.0, 10.0), soon), ClickOutcome::Click);
    }

    #[test]
    fn test_disarm_suppresses_click() {
        let mut clicks = tracker();
        clicks.press(MouseButton::Left);
        clicks.disarm();
        assert_eq!(clicks.release(MouseButton::Left, Point::origin(), Instant::now()), ClickOutcome::None);
    }
}
