//! Simulated work performed while completing a transition.
//!
//! The transition table asks a `WorkSimulator` how long the
//! `Processing -> Completed` step should take; the processor then sleeps for
//! that long before committing. Tests inject `FixedWork` or `NoWork` to make
//! timing deterministic.

use rand::Rng;
use std::time::Duration;

/// Source of simulated work durations.
pub trait WorkSimulator: Send + Sync {
    /// Duration of the next unit of work.
    fn duration(&self) -> Duration;
}

/// Uniformly distributed work between `min` and `max` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomWork {
    min: Duration,
    max: Duration,
}

impl RandomWork {
    /// Create a uniform simulator. Bounds are swapped if given out of order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for RandomWork {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(500))
    }
}

impl WorkSimulator for RandomWork {
    fn duration(&self) -> Duration {
        rand::rng().random_range(self.min..=self.max)
    }
}

/// Always the same duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWork(pub Duration);

impl WorkSimulator for FixedWork {
    fn duration(&self) -> Duration {
        self.0
    }
}

/// No work at all; transitions commit immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoWork;

impl WorkSimulator for NoWork {
    fn duration(&self) -> Duration {
        Duration::ZERO
    }
}
