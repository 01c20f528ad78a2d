use std::ops::Range;

use rand::Rng;

/// Accumulator that fires every `interval` seconds of fed time.
///
/// Carries the remainder across firings so long host frames do not drift the
/// cadence.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: f32,
    acc: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(1e-3),
            acc: 0.0,
        }
    }

    /// Feed elapsed time; returns `true` when the interval elapsed.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.acc += dt.max(0.0);
        if self.acc >= self.interval {
            self.acc -= self.interval;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.acc = 0.0;
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }
}

/// Accumulator that fires after a delay drawn uniformly from `range`, then
/// re-arms with a fresh draw.
#[derive(Debug, Clone)]
pub struct RandomizedTimer {
    range: Range<f32>,
    acc: f32,
    next: f32,
}

impl RandomizedTimer {
    pub fn new<R: Rng + ?Sized>(range: Range<f32>, rng: &mut R) -> Self {
        let range = if range.start < range.end {
            range
        } else {
            let v = range.start.max(1e-3);
            v..(v + 1e-3)
        };
        let next = rng.random_range(range.clone());
        Self {
            range,
            acc: 0.0,
            next,
        }
    }

    /// Feed elapsed time; returns `true` when the randomized delay elapsed.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.tick_scaled(dt, 1.0, rng)
    }

    /// As [`tick`](Self::tick), with the pending delay scaled by `scale`.
    /// A scale below 1.0 fires sooner without touching the armed draw.
    pub fn tick_scaled<R: Rng + ?Sized>(&mut self, dt: f32, scale: f32, rng: &mut R) -> bool {
        self.acc += dt.max(0.0);
        if self.acc >= self.next * scale.max(0.1) {
            self.acc = 0.0;
            self.next = rng.random_range(self.range.clone());
            true
        } else {
            false
        }
    }

    /// Delay currently armed, unscaled.
    pub fn pending(&self) -> f32 {
        self.next
    }
}
