//! The goal/decision loop: at a coarse cadence, inspect the conversational
//! context, pick a goal, and execute it against the skeleton and navigator.
//!
//! Failures never escape a tick. A handler error puts that goal kind on a
//! cooldown and drops the avatar back to idle, so a persistently failing goal
//! cannot spin the loop while other kinds stay selectable.

use std::collections::HashMap;

use glam::{EulerRot, Quat, Vec3};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, info, warn};

use crate::config::BehaviorConfig;

use super::events::AvatarEvent;
use super::gesture::{self, Gesture};
use super::navigation::Navigator;
use super::skeleton::SkeletonBlender;
use super::state::{BehaviorState, DecisionContext, Emotion};

/// Blend speed for gesture poses; snappier than the procedural baseline.
const GESTURE_BLEND_SPEED: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalKind {
    Talk,
    Move,
    LookAround,
    Think,
    ExcitedIdle,
    SadIdle,
    Idle,
}

/// One execution step of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    SetState(BehaviorState),
    /// Walk somewhere according to the emotion's movement profile.
    Walk,
    /// Roll for a keyword gesture from the last message.
    SuggestGesture,
}

/// A candidate behavior for one decision tick. Discarded after execution;
/// only its kind persists, in the cooldown table, when execution fails.
#[derive(Debug, Clone)]
pub struct Goal {
    pub kind: GoalKind,
    pub priority: u8,
    /// Generation order; breaks priority ties deterministically.
    pub seq: u64,
    pub description: &'static str,
    pub actions: Vec<ActionId>,
}

/// Pick the highest-priority candidate whose kind is not cooling down.
/// Ties go to the earliest generated. `None` means a no-op tick.
pub fn select_goal<'a>(
    candidates: &'a [Goal],
    cooldowns: &HashMap<GoalKind, f64>,
    now: f64,
) -> Option<&'a Goal> {
    let mut best: Option<&Goal> = None;
    for goal in candidates {
        if matches!(cooldowns.get(&goal.kind), Some(&until) if until > now) {
            continue;
        }
        let better = match best {
            None => true,
            Some(b) => {
                goal.priority > b.priority || (goal.priority == b.priority && goal.seq < b.seq)
            }
        };
        if better {
            best = Some(goal);
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    gesture: Gesture,
    expires_at: f64,
}

#[derive(Debug)]
pub struct Director {
    state: BehaviorState,
    gesture: Option<ActiveGesture>,
    cooldowns: HashMap<GoalKind, f64>,
    last_movement_at: f64,
    next_seq: u64,
    cfg: BehaviorConfig,
    rng: SmallRng,
}

impl Director {
    pub fn new(cfg: BehaviorConfig, seed: u64) -> Self {
        Self {
            state: BehaviorState::Idle,
            gesture: None,
            cooldowns: HashMap::new(),
            last_movement_at: 0.0,
            next_seq: 0,
            cfg,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn active_gesture(&self) -> Option<Gesture> {
        self.gesture.map(|g| g.gesture)
    }

    pub fn cooldown_until(&self, kind: GoalKind) -> Option<f64> {
        self.cooldowns.get(&kind).copied()
    }

    pub fn is_on_cooldown(&self, kind: GoalKind, now: f64) -> bool {
        matches!(self.cooldowns.get(&kind), Some(&until) if until > now)
    }

    /// One decision tick. Only writes targets and flags; the per-frame tick
    /// consumes them later, so no read-back ordering issues arise.
    pub fn decide(
        &mut self,
        ctx: &DecisionContext,
        skeleton: &mut SkeletonBlender,
        nav: &mut Navigator,
        events: &mut Vec<AvatarEvent>,
    ) {
        // Spatial movement runs on its own, slower cadence, gated by chance
        // and the same cooldown table as every other goal kind. The elapsed
        // window is consumed whether or not the coin flip passes.
        if !ctx.is_talking && ctx.now - self.last_movement_at > self.cfg.movement_interval as f64 {
            self.last_movement_at = ctx.now;
            if self.rng.random::<f32>() < self.cfg.movement_chance
                && !self.is_on_cooldown(GoalKind::Move, ctx.now)
            {
                let goal = self.make_goal(GoalKind::Move);
                if self.run_goal(goal, ctx, skeleton, nav, events) {
                    // The walk owns this tick; idle candidates would only
                    // overwrite the state it just set.
                    return;
                }
            }
        }

        let candidates = self.generate_candidates(ctx);
        let Some(goal) = select_goal(&candidates, &self.cooldowns, ctx.now) else {
            debug!("no selectable goal; holding current state");
            return;
        };
        let goal = goal.clone();
        self.run_goal(goal, ctx, skeleton, nav, events);
    }

    /// Candidate set for this tick. Talking short-circuits everything else;
    /// otherwise a single weighted roll picks one idle behavior, with plain
    /// idle always present as the floor.
    fn generate_candidates(&mut self, ctx: &DecisionContext) -> Vec<Goal> {
        let mut goals = Vec::new();
        if ctx.is_talking {
            goals.push(self.make_goal(GoalKind::Talk));
            return goals;
        }

        let roll = self.rng.random::<f32>();
        if ctx.emotion == Emotion::Happy && roll > 0.8 {
            goals.push(self.make_goal(GoalKind::ExcitedIdle));
        } else if ctx.emotion == Emotion::Sad && roll > 0.8 {
            goals.push(self.make_goal(GoalKind::SadIdle));
        } else if roll > 0.95 {
            goals.push(self.make_goal(GoalKind::LookAround));
        } else if roll > 0.9 {
            goals.push(self.make_goal(GoalKind::Think));
        }
        goals.push(self.make_goal(GoalKind::Idle));
        goals
    }

    pub fn make_goal(&mut self, kind: GoalKind) -> Goal {
        let seq = self.next_seq;
        self.next_seq += 1;
        let (priority, description, actions) = match kind {
            GoalKind::Talk => (
                10,
                "animate speech",
                vec![
                    ActionId::SetState(BehaviorState::Talking),
                    ActionId::SuggestGesture,
                ],
            ),
            GoalKind::Move => (8, "wander the stage", vec![ActionId::Walk]),
            GoalKind::ExcitedIdle => (
                7,
                "bounce with energy",
                vec![ActionId::SetState(BehaviorState::ExcitedIdle)],
            ),
            GoalKind::SadIdle => (
                7,
                "droop quietly",
                vec![ActionId::SetState(BehaviorState::SadIdle)],
            ),
            GoalKind::LookAround => (
                6,
                "scan the room",
                vec![ActionId::SetState(BehaviorState::LookingAround)],
            ),
            GoalKind::Think => (
                5,
                "pause and ponder",
                vec![ActionId::SetState(BehaviorState::Thinking)],
            ),
            GoalKind::Idle => (
                1,
                "breathe and sway",
                vec![ActionId::SetState(BehaviorState::Idle)],
            ),
        };
        Goal {
            kind,
            priority,
            seq,
            description,
            actions,
        }
    }

    /// Execute a goal, converting any handler error into a cooldown for that
    /// kind plus a fallback to idle. Never propagates; returns whether the
    /// goal ran cleanly.
    pub fn run_goal(
        &mut self,
        goal: Goal,
        ctx: &DecisionContext,
        skeleton: &mut SkeletonBlender,
        nav: &mut Navigator,
        events: &mut Vec<AvatarEvent>,
    ) -> bool {
        info!(goal = goal.description, "executing goal");
        match self.execute(&goal, ctx, skeleton, nav, events) {
            Ok(()) => true,
            Err(err) => {
                warn!(kind = ?goal.kind, %err, "goal failed; cooling down");
                self.cooldowns
                    .insert(goal.kind, ctx.now + self.cfg.goal_cooldown as f64);
                self.set_state(BehaviorState::Idle, events);
                false
            }
        }
    }

    fn execute(
        &mut self,
        goal: &Goal,
        ctx: &DecisionContext,
        skeleton: &mut SkeletonBlender,
        nav: &mut Navigator,
        events: &mut Vec<AvatarEvent>,
    ) -> Result<(), String> {
        for action in &goal.actions {
            match *action {
                ActionId::SetState(state) => self.set_state(state, events),
                ActionId::Walk => self.walk(ctx, nav, events)?,
                ActionId::SuggestGesture => self.maybe_gesture(ctx, skeleton, events),
            }
        }
        Ok(())
    }

    /// Emotion-specific movement profile, then a navigator request. A
    /// rejected target is the error that feeds the cooldown table.
    fn walk(
        &mut self,
        ctx: &DecisionContext,
        nav: &mut Navigator,
        events: &mut Vec<AvatarEvent>,
    ) -> Result<(), String> {
        let (speed, state) = match ctx.emotion {
            Emotion::Happy => (0.7, BehaviorState::Walking),
            Emotion::Sad => (0.3, BehaviorState::WalkingSlow),
            _ => (0.5, BehaviorState::Walking),
        };
        nav.set_speed(speed);

        let moved = if ctx.emotion == Emotion::Sad {
            // Short hop: a small offset from where we stand, still clamped.
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let reach = self.rng.random_range(0.3..1.0);
            let target = nav.position() + Vec3::new(angle.sin() * reach, 0.0, angle.cos() * reach);
            nav.move_to(target)
        } else {
            nav.move_to_random(&mut self.rng)
        };

        if !moved {
            return Err("navigator rejected the movement target".to_string());
        }
        events.push(AvatarEvent::MovementStarted {
            target: nav.target(),
        });
        self.set_state(state, events);
        Ok(())
    }

    fn maybe_gesture(
        &mut self,
        ctx: &DecisionContext,
        skeleton: &mut SkeletonBlender,
        events: &mut Vec<AvatarEvent>,
    ) {
        if self.rng.random::<f32>() >= self.cfg.gesture_chance {
            return;
        }
        let Some(message) = ctx.last_message.as_deref() else {
            return;
        };
        let Some(gesture) = gesture::suggest(message, ctx.emotion, &mut self.rng) else {
            return;
        };
        self.trigger_gesture(gesture, ctx.now, skeleton, events);
    }

    /// Apply a gesture pose as explicit bone claims and arm its expiry.
    pub fn trigger_gesture(
        &mut self,
        gesture: Gesture,
        now: f64,
        skeleton: &mut SkeletonBlender,
        events: &mut Vec<AvatarEvent>,
    ) {
        let pose = gesture.pose();
        for &(bone, [x, y, z]) in pose.bones {
            let rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
            skeleton.set_target_held(bone, rotation, GESTURE_BLEND_SPEED, pose.hold);
        }
        self.gesture = Some(ActiveGesture {
            gesture,
            expires_at: now + self.cfg.gesture_duration as f64,
        });
        info!(gesture = gesture.as_str(), "gesture triggered");
        events.push(AvatarEvent::GestureTriggered { gesture });
    }

    /// Clear an elapsed gesture. Runs on the frame cadence so expiry does not
    /// wait for the next decision tick; only bones the gesture still holds
    /// are reset, the rest already went back to procedural control.
    pub fn expire_gesture(
        &mut self,
        now: f64,
        skeleton: &mut SkeletonBlender,
        events: &mut Vec<AvatarEvent>,
    ) {
        let Some(active) = self.gesture else {
            return;
        };
        if now < active.expires_at {
            return;
        }
        self.gesture = None;
        for &(bone, _) in active.gesture.pose().bones {
            if skeleton.is_explicitly_owned(bone) {
                skeleton.reset_bone(bone);
            }
        }
        events.push(AvatarEvent::GestureCleared {
            gesture: active.gesture,
        });
    }

    fn set_state(&mut self, state: BehaviorState, events: &mut Vec<AvatarEvent>) {
        if self.state != state {
            info!(from = self.state.as_str(), to = state.as_str(), "action");
            events.push(AvatarEvent::ActionChanged {
                from: self.state,
                to: state,
            });
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(kind: GoalKind, priority: u8, seq: u64) -> Goal {
        Goal {
            kind,
            priority,
            seq,
            description: "test",
            actions: Vec::new(),
        }
    }

    #[test]
    fn selection_prefers_priority_then_generation_order() {
        let cooldowns = HashMap::new();
        let candidates = vec![
            goal(GoalKind::Think, 5, 0),
            goal(GoalKind::Move, 8, 1),
            goal(GoalKind::LookAround, 8, 2),
        ];
        let picked = select_goal(&candidates, &cooldowns, 0.0).unwrap();
        assert_eq!(picked.kind, GoalKind::Move);
        assert_eq!(picked.seq, 1);
    }

    #[test]
    fn selection_skips_cooling_kinds() {
        let mut cooldowns = HashMap::new();
        cooldowns.insert(GoalKind::Move, 100.0);
        let candidates = vec![goal(GoalKind::Move, 8, 0), goal(GoalKind::Idle, 1, 1)];
        let picked = select_goal(&candidates, &cooldowns, 50.0).unwrap();
        assert_eq!(picked.kind, GoalKind::Idle);
        // Expired cooldown frees the kind again.
        let picked = select_goal(&candidates, &cooldowns, 100.0).unwrap();
        assert_eq!(picked.kind, GoalKind::Move);
    }

    #[test]
    fn selection_returns_none_when_everything_cools() {
        let mut cooldowns = HashMap::new();
        cooldowns.insert(GoalKind::Move, 100.0);
        let candidates = vec![goal(GoalKind::Move, 8, 0)];
        assert!(select_goal(&candidates, &cooldowns, 0.0).is_none());
    }
}
