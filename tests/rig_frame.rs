use glam::{EulerRot, Quat, Vec3};

use marionette::config::AvatarConfig;
use marionette::puppet::bone::Bone;
use marionette::puppet::events::AvatarEvent;
use marionette::puppet::gesture::Gesture;
use marionette::puppet::rig::AvatarRig;
use marionette::puppet::skeleton::Owner;
use marionette::puppet::state::{BehaviorState, DecisionContext, Emotion, Expression};

const DT: f32 = 1.0 / 60.0;

fn talking_ctx(now: f64) -> DecisionContext {
    DecisionContext {
        emotion: Emotion::Neutral,
        is_talking: true,
        last_message: None,
        now,
    }
}

#[test]
fn deciding_while_talking_enters_talking_state() {
    let mut rig = AvatarRig::with_defaults(1);
    let rx = rig.subscribe();
    rig.decide(&talking_ctx(0.1));
    assert_eq!(rig.state(), BehaviorState::Talking);
    let changed = rx.try_iter().any(|e| {
        matches!(
            e,
            AvatarEvent::ActionChanged {
                to: BehaviorState::Talking,
                ..
            }
        )
    });
    assert!(changed, "action change must be announced");
}

#[test]
fn external_bone_target_outranks_procedural_motion() {
    let mut rig = AvatarRig::with_defaults(1);
    rig.decide(&talking_ctx(0.1));

    let explicit = Quat::from_euler(EulerRot::XYZ, 0.0, 1.0, 0.0);
    rig.set_bone_target("head", Vec3::new(0.0, 1.0, 0.0), 8.0);

    // Within the 2 s hold the talking head emphasis must not touch the bone.
    for _ in 0..60 {
        rig.frame(DT, 0.5);
        let target = rig.skeleton().target_rotation(Bone::Head).unwrap();
        assert!(
            target.angle_between(explicit) < 1e-4,
            "explicit head target was overwritten mid-hold"
        );
    }

    // After the hold decays, the procedural pass takes the bone back.
    for _ in 0..90 {
        rig.frame(DT, 0.5);
    }
    assert!(matches!(
        rig.skeleton().owner(Bone::Head),
        Some(Owner::Procedural)
    ));
}

#[test]
fn unknown_bone_names_do_not_create_tracks() {
    let mut rig = AvatarRig::with_defaults(1);
    rig.set_bone_target("tentacle", Vec3::new(0.0, 1.0, 0.0), 8.0);
    assert_eq!(rig.skeleton().tracked_bones(), 0);
}

#[test]
fn gesture_lifecycle_runs_on_the_frame_clock() {
    let mut rig = AvatarRig::with_defaults(1);
    let rx = rig.subscribe();

    rig.play_gesture(Gesture::Wave);
    assert_eq!(rig.active_gesture(), Some(Gesture::Wave));
    assert!(rig.skeleton().is_explicitly_owned(Bone::RightUpperArm));

    // Default gesture duration is 3 s; step just past it frame by frame.
    let frames = (3.2 / DT) as usize;
    for _ in 0..frames {
        rig.frame(DT, 0.0);
    }
    assert_eq!(rig.active_gesture(), None);

    let mut triggered = false;
    let mut cleared = false;
    for event in rx.try_iter() {
        match event {
            AvatarEvent::GestureTriggered { gesture } => {
                assert_eq!(gesture, Gesture::Wave);
                triggered = true;
            }
            AvatarEvent::GestureCleared { gesture } => {
                assert_eq!(gesture, Gesture::Wave);
                cleared = true;
            }
            _ => {}
        }
    }
    assert!(triggered && cleared);
}

#[test]
fn forced_walk_finishes_with_an_arrival_event() {
    let mut cfg = AvatarConfig::default();
    cfg.behavior.movement_interval = 0.5;
    cfg.behavior.movement_chance = 1.0;
    // Keep the stage away from the spawn point so every sampled target is a
    // real walk.
    cfg.navigation.bounds = marionette::puppet::navigation::Bounds {
        min_x: 1.0,
        max_x: 2.0,
        min_z: 1.0,
        max_z: 2.0,
    };
    let mut rig = AvatarRig::new(&cfg, 2);
    let rx = rig.subscribe();

    rig.decide(&DecisionContext {
        emotion: Emotion::Neutral,
        is_talking: false,
        last_message: None,
        now: 1.0,
    });
    assert!(rig.is_moving(), "movement tick should have started a walk");
    assert_eq!(rig.state(), BehaviorState::Walking);

    // Worst case across this stage at 0.5 u/s is well under 15 s.
    let frames = (15.0 / DT) as usize;
    for _ in 0..frames {
        rig.frame(DT, 0.0);
        if !rig.is_moving() {
            break;
        }
    }
    assert!(!rig.is_moving(), "walk never terminated");

    let mut started = false;
    let mut finished = false;
    for event in rx.try_iter() {
        match event {
            AvatarEvent::MovementStarted { .. } => started = true,
            AvatarEvent::MovementFinished { position } => {
                finished = true;
                assert!(position.is_finite());
            }
            _ => {}
        }
    }
    assert!(started && finished);
}

#[test]
fn stop_movement_emits_a_stop_event() {
    let mut cfg = AvatarConfig::default();
    cfg.behavior.movement_interval = 0.5;
    cfg.behavior.movement_chance = 1.0;
    cfg.navigation.bounds = marionette::puppet::navigation::Bounds {
        min_x: 1.0,
        max_x: 2.0,
        min_z: 1.0,
        max_z: 2.0,
    };
    let mut rig = AvatarRig::new(&cfg, 2);
    let rx = rig.subscribe();

    rig.decide(&DecisionContext {
        emotion: Emotion::Neutral,
        is_talking: false,
        last_message: None,
        now: 1.0,
    });
    assert!(rig.is_moving());
    rig.stop_movement();
    assert!(!rig.is_moving());
    assert!(
        rx.try_iter()
            .any(|e| matches!(e, AvatarEvent::MovementStopped { .. }))
    );
    // Stopping again is a no-op with no event.
    let rx2 = rig.subscribe();
    rig.stop_movement();
    assert_eq!(rx2.try_iter().count(), 0);
}

#[test]
fn expression_changes_fire_once_per_transition() {
    let mut rig = AvatarRig::with_defaults(1);
    let rx = rig.subscribe();

    let happy = DecisionContext {
        emotion: Emotion::Happy,
        is_talking: true,
        last_message: None,
        now: 0.1,
    };
    rig.decide(&happy);
    rig.decide(&DecisionContext { now: 5.1, ..happy.clone() });
    assert_eq!(rig.expression(), Expression::Happy);

    let expression_events: Vec<_> = rx
        .try_iter()
        .filter(|e| matches!(e, AvatarEvent::ExpressionChanged { .. }))
        .collect();
    assert_eq!(
        expression_events.len(),
        1,
        "expression event must fire only on change"
    );
}

#[test]
fn frame_rejects_invalid_deltas() {
    let mut rig = AvatarRig::with_defaults(1);
    rig.frame(f32::NAN, 0.0);
    rig.frame(-1.0, 0.0);
    assert_eq!(rig.clock(), 0.0);
    rig.frame(DT, 0.0);
    assert!(rig.clock() > 0.0);
}

#[test]
fn same_seed_same_inputs_same_behavior() {
    let run = |seed: u64| {
        let mut rig = AvatarRig::with_defaults(seed);
        let mut states = Vec::new();
        let mut now = 0.0f64;
        for tick in 0..40 {
            for _ in 0..30 {
                now += DT as f64;
                rig.frame(DT, 0.0);
            }
            let context = DecisionContext {
                emotion: Emotion::Happy,
                is_talking: tick % 7 == 0,
                last_message: Some("hello friend".to_string()),
                now,
            };
            rig.decide(&context);
            states.push(rig.state());
        }
        (states, rig.position())
    };

    let (states_a, pos_a) = run(42);
    let (states_b, pos_b) = run(42);
    assert_eq!(states_a, states_b);
    assert!((pos_a - pos_b).length() < 1e-6);

    let (states_c, _) = run(43);
    // Not a hard guarantee, but with 40 weighted draws two seeds matching
    // exactly would be a broken RNG wiring.
    assert_ne!(states_a, states_c, "different seeds produced identical runs");
}
