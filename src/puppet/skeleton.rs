use std::collections::HashMap;

use glam::{EulerRot, Quat, Vec3};
use tracing::warn;

use super::bone::Bone;

/// Who wrote a bone's target last, and for explicit commands, until when that
/// claim blocks the procedural pass. Inspectable so ownership conflicts show
/// up in tests instead of depending on call order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Owner {
    Free,
    Procedural,
    Explicit { until: f64 },
}

#[derive(Debug, Clone)]
pub struct BoneTrack {
    pub current: Quat,
    pub target: Quat,
    pub speed: f32,
    pub owner: Owner,
}

impl BoneTrack {
    fn new(speed: f32) -> Self {
        Self {
            current: Quat::IDENTITY,
            target: Quat::IDENTITY,
            speed,
            owner: Owner::Free,
        }
    }
}

/// Owns the authoritative rotation of every addressed bone and converges it
/// toward whatever target was last accepted, via per-frame slerp steps of
/// `min(dt * speed, 1)`. Convergence time is roughly `5 / speed` seconds and
/// is frame-rate independent.
#[derive(Debug)]
pub struct SkeletonBlender {
    tracks: HashMap<Bone, BoneTrack>,
    /// Internal clock, advanced by `update`; drives explicit-claim expiry.
    now: f64,
    default_speed: f32,
    explicit_hold: f32,
}

impl SkeletonBlender {
    pub fn new(default_speed: f32, explicit_hold: f32) -> Self {
        Self {
            tracks: HashMap::new(),
            now: 0.0,
            default_speed: default_speed.max(1e-3),
            explicit_hold: explicit_hold.max(0.0),
        }
    }

    /// Explicit command: claim the bone and retarget it. The claim blocks
    /// procedural writes for the configured hold window.
    pub fn set_target(&mut self, bone: Bone, rotation: Quat, speed: f32) {
        let hold = self.explicit_hold;
        self.set_target_held(bone, rotation, speed, hold);
    }

    /// As [`set_target`](Self::set_target) with an explicit hold window
    /// (gestures pass their own duration).
    pub fn set_target_held(&mut self, bone: Bone, rotation: Quat, speed: f32, hold: f32) {
        if !rotation.is_finite() {
            warn!(bone = bone.as_str(), "ignoring non-finite bone rotation");
            return;
        }
        if !speed.is_finite() || speed <= 0.0 {
            warn!(bone = bone.as_str(), speed, "ignoring invalid blend speed");
            return;
        }
        let until = self.now + hold.max(0.0) as f64;
        let track = self
            .tracks
            .entry(bone)
            .or_insert_with(|| BoneTrack::new(speed));
        track.target = rotation.normalize();
        track.speed = speed;
        track.owner = Owner::Explicit { until };
    }

    /// String-facing variant for external callers (pose suggestions arrive as
    /// bone-name/Euler pairs). Unknown names are rejected with a warning.
    pub fn set_target_named(&mut self, name: &str, euler: Vec3, speed: f32) {
        let Some(bone) = Bone::parse(name) else {
            warn!(name, "bone not supported");
            return;
        };
        let rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
        self.set_target(bone, rotation, speed);
    }

    /// Procedural write path. Refused while an unexpired explicit claim holds
    /// the bone; this check is what keeps the two writers exclusive per frame.
    pub fn try_set_procedural(&mut self, bone: Bone, rotation: Quat, speed: f32) -> bool {
        if !rotation.is_finite() || !speed.is_finite() || speed <= 0.0 {
            return false;
        }
        let now = self.now;
        let track = self
            .tracks
            .entry(bone)
            .or_insert_with(|| BoneTrack::new(speed));
        if matches!(track.owner, Owner::Explicit { until } if until > now) {
            return false;
        }
        track.target = rotation.normalize();
        track.speed = speed;
        track.owner = Owner::Procedural;
        true
    }

    /// Whether an unexpired explicit claim holds the bone right now.
    pub fn is_explicitly_owned(&self, bone: Bone) -> bool {
        matches!(
            self.tracks.get(&bone).map(|t| t.owner),
            Some(Owner::Explicit { until }) if until > self.now
        )
    }

    pub fn owner(&self, bone: Bone) -> Option<Owner> {
        self.tracks.get(&bone).map(|t| t.owner)
    }

    /// Advance every track toward its target and the ownership clock.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.now += dt as f64;
        for track in self.tracks.values_mut() {
            let step = (dt * track.speed).min(1.0);
            track.current = track.current.slerp(track.target, step);
        }
    }

    /// Current rotation, or `None` for a bone nothing has addressed yet —
    /// callers treat `None` as "no override, fully procedural".
    pub fn bone_rotation(&self, bone: Bone) -> Option<Quat> {
        self.tracks.get(&bone).map(|t| t.current)
    }

    pub fn target_rotation(&self, bone: Bone) -> Option<Quat> {
        self.tracks.get(&bone).map(|t| t.target)
    }

    /// Retarget the bone to identity and release ownership. No snap; the
    /// current rotation still converges through `update`.
    pub fn reset_bone(&mut self, bone: Bone) {
        if let Some(track) = self.tracks.get_mut(&bone) {
            track.target = Quat::IDENTITY;
            track.owner = Owner::Free;
        }
    }

    pub fn reset_all(&mut self) {
        for track in self.tracks.values_mut() {
            track.target = Quat::IDENTITY;
            track.owner = Owner::Free;
        }
    }

    pub fn default_speed(&self) -> f32 {
        self.default_speed
    }

    pub fn tracked_bones(&self) -> usize {
        self.tracks.len()
    }

    pub fn clock(&self) -> f64 {
        self.now
    }
}
