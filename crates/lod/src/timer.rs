use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
}

/// Snapshot of a [`FrameTimer`] window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingSummary {
    pub samples: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl FrameTimer {
    /// Keep the most recent `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn summary(&self) -> TimingSummary {
        let samples = self.window.len();
        if samples == 0 {
            return TimingSummary::default();
        }
        let total: Duration = self.window.iter().sum();
        TimingSummary {
            samples,
            mean: total / samples as u32,
            min: self.window.iter().copied().min().unwrap_or_default(),
            max: self.window.iter().copied().max().unwrap_or_default(),
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
