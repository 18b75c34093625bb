//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    start: Instant,
    last_frame: Instant,
    delta_time: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_time: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per tick)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last tick
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instant the current tick started
    pub fn last_frame(&self) -> Instant {
        self.last_frame
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        let total = self.total_time().as_secs_f32();
        if total > 0.0 {
            self.frame_count as f32 / total
        } else {
            0.0
        }
    }
}

/// Fixed frame budget derived from a target FPS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    budget: Duration,
}

impl FramePacer {
    /// Create a pacer for `fps` frames per second; `None` for zero
    pub fn new(fps: u32) -> Option<Self> {
        (fps > 0).then(|| Self {
            budget: Duration::from_nanos(1_000_000_000 / u64::from(fps)),
        })
    }

    /// Frame budget
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left in the current frame, given when it started
    pub fn remaining(&self, frame_start: Instant, now: Instant) -> Duration {
        self.budget.saturating_sub(now.saturating_duration_since(frame_start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn test_pacer_rejects_zero_fps() {
        assert!(FramePacer::new(0).is_none());
        let pacer = FramePacer::new(50).unwrap();
        assert_eq!(pacer.budget(), Duration::from_millis(20));
    }

    #[test]
    fn test_pacer_remaining_saturates() {
        let pacer = FramePacer::new(100).unwrap();
        let start = Instant::now();
        let late = start + Duration::from_millis(50);
        assert_eq!(pacer.remaining(start, late), Duration::ZERO);
        let early = start + Duration::from_millis(4);
        assert_eq!(pacer.remaining(start, early), Duration::from_millis(6));
    }
}
