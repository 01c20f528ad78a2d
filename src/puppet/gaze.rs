use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::config::GazeConfig;
use crate::core::timer::RandomizedTimer;

use super::state::BehaviorState;

/// Per-update exponential smoothing factor toward the target direction.
pub const SMOOTHING: f32 = 0.05;

/// Conversational mode the gaze pattern is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GazeMode {
    #[default]
    Idle,
    Listening,
    Talking,
    Thinking,
}

impl GazeMode {
    pub fn from_state(state: BehaviorState, listening: bool) -> GazeMode {
        match state {
            BehaviorState::Thinking => GazeMode::Thinking,
            BehaviorState::Talking => GazeMode::Talking,
            _ if listening => GazeMode::Listening,
            _ => GazeMode::Idle,
        }
    }

    /// Blink-interval contraction: thinking blinks noticeably faster.
    fn blink_scale(self) -> f32 {
        match self {
            GazeMode::Thinking => 0.6,
            _ => 1.0,
        }
    }
}

/// Smooth 2D look-direction offset plus blink timing.
///
/// Targets are time-based sinusoids per mode, not a random walk; randomness
/// only enters through micro-saccade nudges and the blink/dart intervals.
/// Applying the blink (closing eyelids) is the renderer's job.
#[derive(Debug)]
pub struct GazeController {
    current: Vec2,
    target: Vec2,
    time: f32,
    blink: RandomizedTimer,
    dart: RandomizedTimer,
    blink_pending: bool,
    rng: SmallRng,
}

impl GazeController {
    pub fn new(cfg: &GazeConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let blink = RandomizedTimer::new(cfg.blink_min..cfg.blink_max, &mut rng);
        let dart = RandomizedTimer::new(cfg.dart_min..cfg.dart_max, &mut rng);
        Self {
            current: Vec2::ZERO,
            target: Vec2::ZERO,
            time: 0.0,
            blink,
            dart,
            blink_pending: false,
            rng,
        }
    }

    pub fn update(&mut self, dt: f32, mode: GazeMode) {
        let dt = dt.max(0.0);
        self.time += dt;
        let t = self.time;

        self.target = match mode {
            GazeMode::Thinking => {
                // Up and away, drifting slowly.
                Vec2::new(0.4 + (t * 0.3).sin() * 0.1, 0.5 + (t * 0.2).cos() * 0.1)
            }
            GazeMode::Listening => {
                // Near-center contact with small jitter.
                Vec2::new((t * 0.5).sin() * 0.05, (t * 0.3).cos() * 0.05)
            }
            GazeMode::Talking => {
                // Horizontal sweep with a secondary vertical sinusoid.
                Vec2::new((t * 0.4).sin() * 0.1, (t * 0.25).sin() * 0.08)
            }
            GazeMode::Idle => {
                // Two frequencies layered for a wandering look.
                Vec2::new(
                    (t * 0.2).sin() * 0.3 + (t * 1.2).sin() * 0.1,
                    (t * 0.15).cos() * 0.2,
                )
            }
        };

        // Quick micro-saccades on their own randomized cadence.
        if self.dart.tick(dt, &mut self.rng) {
            self.target += Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 0.15,
                (self.rng.random::<f32>() - 0.5) * 0.1,
            );
        }

        self.current += (self.target - self.current) * SMOOTHING;

        if self.blink.tick_scaled(dt, mode.blink_scale(), &mut self.rng) {
            self.blink_pending = true;
        }
    }

    /// Point the eyes at a specific offset (e.g. cursor tracking); the next
    /// `update` resumes the mode pattern from there.
    pub fn look_at(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.target = Vec2::new(x, y);
        }
    }

    /// True once per elapsed blink interval; the flag is consumed by the
    /// call, so poll exactly once per rendered frame.
    pub fn should_blink(&mut self) -> bool {
        std::mem::take(&mut self.blink_pending)
    }

    pub fn direction(&self) -> Vec2 {
        self.current
    }

    pub fn target_direction(&self) -> Vec2 {
        self.target
    }
}
