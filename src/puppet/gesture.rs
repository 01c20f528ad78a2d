//! Transient gestures: a fixed pose library plus keyword-driven selection.
//!
//! Poses are Euler-angle offsets for a handful of bones, issued to the
//! blender as explicit targets so the procedural pass keeps its hands off the
//! involved bones while the gesture plays.

use rand::Rng;

use super::bone::Bone;
use super::state::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Wave,
    Thinking,
    Nod,
    Celebrate,
    Explain,
    Empathy,
    Excited,
    Talking,
}

/// Static pose: per-bone Euler radians (XYZ order) and how long the pose is
/// held before the explicit claim decays.
#[derive(Debug, Clone, Copy)]
pub struct GesturePose {
    pub bones: &'static [(Bone, [f32; 3])],
    pub hold: f32,
}

impl Gesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::Wave => "wave",
            Gesture::Thinking => "thinking",
            Gesture::Nod => "nod",
            Gesture::Celebrate => "celebrate",
            Gesture::Explain => "explain",
            Gesture::Empathy => "empathy",
            Gesture::Excited => "excited",
            Gesture::Talking => "talking",
        }
    }

    pub fn pose(self) -> GesturePose {
        match self {
            Gesture::Wave => GesturePose {
                bones: &[
                    (Bone::RightUpperArm, [0.5, 0.0, -0.8]),
                    (Bone::RightLowerArm, [0.0, 0.5, 0.0]),
                    (Bone::RightHand, [0.0, 0.0, 0.3]),
                ],
                hold: 2.0,
            },
            Gesture::Thinking => GesturePose {
                bones: &[
                    (Bone::RightUpperArm, [0.3, 0.0, -0.5]),
                    (Bone::RightLowerArm, [0.0, 0.8, 0.0]),
                    (Bone::RightHand, [0.2, 0.0, 0.0]),
                    (Bone::Head, [0.2, 0.3, 0.0]),
                ],
                hold: 3.0,
            },
            Gesture::Nod => GesturePose {
                bones: &[(Bone::Head, [0.25, 0.0, 0.0]), (Bone::Neck, [0.1, 0.0, 0.0])],
                hold: 1.0,
            },
            Gesture::Celebrate => GesturePose {
                bones: &[
                    (Bone::LeftUpperArm, [0.0, 0.0, 0.5]),
                    (Bone::RightUpperArm, [0.0, 0.0, -0.5]),
                    (Bone::LeftLowerArm, [0.0, -0.3, 0.0]),
                    (Bone::RightLowerArm, [0.0, -0.3, 0.0]),
                ],
                hold: 1.5,
            },
            Gesture::Explain => GesturePose {
                bones: &[
                    (Bone::LeftUpperArm, [0.2, 0.0, 0.3]),
                    (Bone::RightUpperArm, [0.2, 0.0, -0.3]),
                    (Bone::LeftHand, [0.0, 0.0, 0.2]),
                    (Bone::RightHand, [0.0, 0.0, -0.2]),
                ],
                hold: 4.0,
            },
            Gesture::Empathy => GesturePose {
                bones: &[
                    (Bone::RightUpperArm, [0.3, 0.0, -0.4]),
                    (Bone::RightLowerArm, [0.0, 0.5, 0.0]),
                    (Bone::RightHand, [0.1, 0.0, 0.0]),
                    (Bone::Head, [-0.1, 0.2, 0.0]),
                ],
                hold: 2.5,
            },
            Gesture::Excited => GesturePose {
                bones: &[
                    (Bone::LeftUpperArm, [0.0, 0.0, 0.4]),
                    (Bone::RightUpperArm, [0.0, 0.0, -0.4]),
                    (Bone::Head, [-0.05, 0.0, 0.0]),
                ],
                hold: 1.5,
            },
            Gesture::Talking => GesturePose {
                bones: &[
                    (Bone::LeftUpperArm, [0.1, 0.0, 0.15]),
                    (Bone::RightUpperArm, [0.1, 0.0, -0.15]),
                ],
                hold: 2.0,
            },
        }
    }
}

/// Pick a gesture for a message, if any keyword or emotion cue matches.
///
/// Cues are checked most-specific first; no match means no gesture rather
/// than a default, so idle ticks stay still.
pub fn suggest<R: Rng + ?Sized>(message: &str, emotion: Emotion, rng: &mut R) -> Option<Gesture> {
    let msg = message.to_lowercase();
    let has_word = |w: &str| msg.split_whitespace().any(|token| token == w);
    let has = |s: &str| msg.contains(s);

    if has("hello") || has_word("hi") || has_word("hey") || has("greet") {
        return Some(Gesture::Wave);
    }
    if has("think") || has("wonder") || msg.contains('?') {
        return Some(Gesture::Thinking);
    }
    if has_word("yes") || has("agree") {
        return Some(Gesture::Nod);
    }
    if emotion == Emotion::Excited || has("amazing") || has("awesome") || has("great") {
        return Some(Gesture::Celebrate);
    }
    if emotion == Emotion::Empathetic || has("sorry") || has("understand") || has_word("feel") {
        return Some(Gesture::Empathy);
    }
    if msg.len() > 100 || has("because") || has("therefore") || has_word("so") {
        return Some(Gesture::Explain);
    }
    if emotion == Emotion::Happy {
        return Some(if rng.random::<f32>() > 0.5 {
            Gesture::Excited
        } else {
            Gesture::Talking
        });
    }
    None
}
