//! Composition root. One `AvatarRig` per avatar instance: every component is
//! an explicit field, time and randomness are injected, and the renderer
//! talks to this type only.

use crossbeam_channel::Receiver;
use glam::{Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::warn;

use crate::config::AvatarConfig;

use super::bone::Bone;
use super::director::Director;
use super::events::{AvatarEvent, EventHub};
use super::gaze::{GazeController, GazeMode};
use super::gesture::Gesture;
use super::motion::ProceduralMotion;
use super::navigation::{Bounds, Navigator};
use super::skeleton::SkeletonBlender;
use super::state::{BehaviorState, DecisionContext, Expression};
use super::viseme::{self, VisemeTrack};

pub struct AvatarRig {
    skeleton: SkeletonBlender,
    motion: ProceduralMotion,
    nav: Navigator,
    gaze: GazeController,
    director: Director,
    hub: EventHub,
    cfg: AvatarConfig,
    rng: SmallRng,
    listening: bool,
    expression: Expression,
    /// Frame-accumulated clock, seconds. Drives gesture expiry.
    time: f64,
    /// Scratch buffer reused across ticks.
    pending: Vec<AvatarEvent>,
}

impl AvatarRig {
    /// Build a rig from config and a session seed. The seed fans out to every
    /// randomized component, so two rigs with the same seed and inputs
    /// behave identically.
    pub fn new(cfg: &AvatarConfig, seed: u64) -> Self {
        let mut seeder = SmallRng::seed_from_u64(seed);
        let director_seed = seeder.random::<u64>();
        let gaze_seed = seeder.random::<u64>();
        let motion_seed = seeder.random_range(0.0..1000.0);

        Self {
            skeleton: SkeletonBlender::new(
                cfg.skeleton.default_blend_speed,
                cfg.skeleton.explicit_hold,
            ),
            motion: ProceduralMotion::new(cfg.motion.base_intensity, motion_seed),
            nav: Navigator::new(
                cfg.navigation.speed,
                cfg.navigation.rotation_speed,
                cfg.navigation.bounds,
            ),
            gaze: GazeController::new(&cfg.gaze, gaze_seed),
            director: Director::new(cfg.behavior.clone(), director_seed),
            hub: EventHub::new(),
            cfg: cfg.clone(),
            rng: seeder,
            listening: false,
            expression: Expression::Neutral,
            time: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn with_defaults(seed: u64) -> Self {
        Self::new(&AvatarConfig::default(), seed)
    }

    /// Subscribe to transition events (action, movement, gesture,
    /// expression). Fired on changes only, never per frame.
    pub fn subscribe(&mut self) -> Receiver<AvatarEvent> {
        self.hub.subscribe()
    }

    /// Per-frame tick. Ordering matters: gesture expiry and the procedural
    /// pass run before the blender update so ownership decisions reflect
    /// everything issued up to this frame, and the procedural generator never
    /// stomps an explicit command from the same tick.
    pub fn frame(&mut self, dt: f32, mic_level: f32) {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "ignoring invalid frame delta");
            return;
        }
        self.time += dt as f64;

        let mut events = std::mem::take(&mut self.pending);
        self.director
            .expire_gesture(self.time, &mut self.skeleton, &mut events);

        self.motion.set_mic_level(mic_level);
        self.motion.advance(dt);
        self.motion.apply(&mut self.skeleton, self.director.state());

        self.skeleton.update(dt);

        let progress = self.nav.update(dt);
        if progress.arrived {
            events.push(AvatarEvent::MovementFinished {
                position: self.nav.position(),
            });
        }

        let mode = GazeMode::from_state(self.director.state(), self.listening);
        self.gaze.update(dt, mode);

        for event in events.drain(..) {
            self.hub.emit(event);
        }
        self.pending = events;
    }

    /// Coarse decision tick; the host calls this every few seconds with a
    /// fresh context snapshot.
    pub fn decide(&mut self, ctx: &DecisionContext) {
        let mut events = std::mem::take(&mut self.pending);
        self.director
            .decide(ctx, &mut self.skeleton, &mut self.nav, &mut events);

        let expression = ctx.emotion.expression();
        if expression != self.expression {
            self.expression = expression;
            events.push(AvatarEvent::ExpressionChanged { expression });
        }

        for event in events.drain(..) {
            self.hub.emit(event);
        }
        self.pending = events;
    }

    /// External explicit bone control (e.g. an LLM-suggested pose). Unknown
    /// bone names are rejected with a warning; the claim outranks procedural
    /// motion until it decays.
    pub fn set_bone_target(&mut self, name: &str, euler: Vec3, speed: f32) {
        self.skeleton.set_target_named(name, euler, speed);
    }

    /// Force a gesture right now, bypassing keyword matching.
    pub fn play_gesture(&mut self, gesture: Gesture) {
        let mut events = std::mem::take(&mut self.pending);
        self.director
            .trigger_gesture(gesture, self.time, &mut self.skeleton, &mut events);
        for event in events.drain(..) {
            self.hub.emit(event);
        }
        self.pending = events;
    }

    /// Build the lip-sync timeline for an utterance using the configured
    /// pacing. Pure; the caller owns playback timing.
    pub fn speak(&self, text: &str, duration: Option<f32>) -> VisemeTrack {
        viseme::schedule(
            text,
            duration,
            self.cfg.viseme.seconds_per_word,
            self.cfg.viseme.word_gap,
        )
    }

    /// Mark that the user is talking, which pulls idle gaze to eye contact.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn randomize_motion_seed(&mut self) {
        self.motion.randomize_seed(&mut self.rng);
    }

    /// Cancel in-flight movement immediately.
    pub fn stop_movement(&mut self) {
        if self.nav.stop() {
            let position = self.nav.position();
            self.hub.emit(AvatarEvent::MovementStopped { position });
        }
    }

    pub fn set_movement_bounds(&mut self, bounds: Bounds) {
        self.nav.set_bounds(bounds);
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.nav.set_speed(speed);
    }

    // Renderer-facing queries, one call each per rendered frame.

    pub fn state(&self) -> BehaviorState {
        self.director.state()
    }

    pub fn bone_rotation(&self, bone: Bone) -> Option<Quat> {
        self.skeleton.bone_rotation(bone)
    }

    pub fn position(&self) -> Vec3 {
        self.nav.position()
    }

    pub fn yaw(&self) -> f32 {
        self.nav.yaw()
    }

    pub fn is_moving(&self) -> bool {
        self.nav.is_moving()
    }

    pub fn gaze_direction(&self) -> Vec2 {
        self.gaze.direction()
    }

    pub fn should_blink(&mut self) -> bool {
        self.gaze.should_blink()
    }

    pub fn active_gesture(&self) -> Option<Gesture> {
        self.director.active_gesture()
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn clock(&self) -> f64 {
        self.time
    }

    pub fn skeleton(&self) -> &SkeletonBlender {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut SkeletonBlender {
        &mut self.skeleton
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn director(&self) -> &Director {
        &self.director
    }
}
