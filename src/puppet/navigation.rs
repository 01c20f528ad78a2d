use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::math::wrap_pi;

/// A target closer than this to the current position is a no-op; arrival is
/// declared once the remaining distance drops below it.
pub const ARRIVAL_RADIUS: f32 = 0.1;

/// Rectangular stage the avatar may walk on (y is always 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: -2.0,
            max_x: 2.0,
            min_z: -2.0,
            max_z: 2.0,
        }
    }
}

impl Bounds {
    /// Normalize so min <= max on both axes.
    fn normalized(mut self) -> Self {
        if self.min_x > self.max_x {
            std::mem::swap(&mut self.min_x, &mut self.max_x);
        }
        if self.min_z > self.max_z {
            std::mem::swap(&mut self.min_z, &mut self.max_z);
        }
        self
    }

    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            0.0,
            p.z.clamp(self.min_z, self.max_z),
        )
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let x = if self.min_x < self.max_x {
            rng.random_range(self.min_x..self.max_x)
        } else {
            self.min_x
        };
        let z = if self.min_z < self.max_z {
            rng.random_range(self.min_z..self.max_z)
        } else {
            self.min_z
        };
        Vec3::new(x, 0.0, z)
    }
}

/// Outcome of one navigator frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavProgress {
    pub moving: bool,
    /// True exactly on the frame the target was reached.
    pub arrived: bool,
}

/// Straight-line walker for the avatar root: clamped targets, shortest-turn
/// facing, strictly decreasing distance to target while moving.
#[derive(Debug)]
pub struct Navigator {
    position: Vec3,
    target: Vec3,
    yaw: f32,
    target_yaw: f32,
    speed: f32,
    rotation_speed: f32,
    bounds: Bounds,
    moving: bool,
}

impl Navigator {
    pub fn new(speed: f32, rotation_speed: f32, bounds: Bounds) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            yaw: 0.0,
            target_yaw: 0.0,
            speed: speed.max(1e-3),
            rotation_speed: rotation_speed.max(1e-3),
            bounds: bounds.normalized(),
            moving: false,
        }
    }

    /// Request a walk to `target` (clamped into bounds, y pinned to 0).
    ///
    /// Returns `false` without side effects for a non-finite target or one
    /// already within the arrival radius.
    pub fn move_to(&mut self, target: Vec3) -> bool {
        if !target.is_finite() {
            warn!(?target, "rejecting non-finite movement target");
            return false;
        }
        let clamped = self.bounds.clamp(target);
        if self.position.distance(clamped) < ARRIVAL_RADIUS {
            return false;
        }

        let dir = clamped - self.position;
        self.target = clamped;
        self.target_yaw = dir.x.atan2(dir.z);
        self.moving = true;
        debug!(x = clamped.x, z = clamped.z, "movement target set");
        true
    }

    /// Walk to a uniformly sampled point inside the bounds.
    pub fn move_to_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let target = self.bounds.sample(rng);
        self.move_to(target)
    }

    /// Advance rotation and position by one frame.
    pub fn update(&mut self, dt: f32) -> NavProgress {
        if !self.moving {
            return NavProgress::default();
        }
        let dt = dt.max(0.0);

        let dyaw = wrap_pi(self.target_yaw - self.yaw);
        let step = dyaw.signum() * dyaw.abs().min(self.rotation_speed * dt);
        self.yaw = wrap_pi(self.yaw + step);

        let to_target = self.target - self.position;
        let dist = to_target.length();
        if dist > f32::EPSILON {
            let move_dist = dist.min(self.speed * dt);
            self.position += to_target / dist * move_dist;
        }

        if self.position.distance(self.target) < ARRIVAL_RADIUS {
            self.moving = false;
            debug!(x = self.position.x, z = self.position.z, "reached target");
            NavProgress {
                moving: false,
                arrived: true,
            }
        } else {
            NavProgress {
                moving: true,
                arrived: false,
            }
        }
    }

    /// Cancel any in-flight walk; the target snaps to the current position.
    /// Returns whether a walk was actually cancelled.
    pub fn stop(&mut self) -> bool {
        let was_moving = self.moving;
        self.target = self.position;
        self.moving = false;
        was_moving
    }

    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() || speed <= 0.0 {
            warn!(speed, "ignoring invalid movement speed");
            return;
        }
        self.speed = speed;
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds.normalized();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}
