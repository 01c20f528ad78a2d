use serde::{Deserialize, Serialize};

/// What the body is currently doing. Exactly one is active; transitions are
/// issued only by the decision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Idle,
    LookingAround,
    Walking,
    WalkingSlow,
    Talking,
    Thinking,
    ExcitedIdle,
    SadIdle,
}

impl BehaviorState {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::LookingAround => "looking_around",
            BehaviorState::Walking => "walking",
            BehaviorState::WalkingSlow => "walking_slow",
            BehaviorState::Talking => "talking",
            BehaviorState::Thinking => "thinking",
            BehaviorState::ExcitedIdle => "excited_idle",
            BehaviorState::SadIdle => "sad_idle",
        }
    }
}

/// Conversational emotion as reported by the host application.
///
/// Unknown labels degrade to `Neutral` rather than silently matching nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Excited,
    Sad,
    Empathetic,
    Thoughtful,
    Curious,
    Frustrated,
    Friendly,
}

impl Emotion {
    pub fn parse(label: &str) -> Emotion {
        match label.trim().to_ascii_lowercase().as_str() {
            "happy" => Emotion::Happy,
            "excited" => Emotion::Excited,
            "sad" => Emotion::Sad,
            "empathetic" => Emotion::Empathetic,
            "thoughtful" => Emotion::Thoughtful,
            "curious" => Emotion::Curious,
            "frustrated" => Emotion::Frustrated,
            "friendly" => Emotion::Friendly,
            _ => Emotion::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Sad => "sad",
            Emotion::Empathetic => "empathetic",
            Emotion::Thoughtful => "thoughtful",
            Emotion::Curious => "curious",
            Emotion::Frustrated => "frustrated",
            Emotion::Friendly => "friendly",
        }
    }

    /// Facial expression shown for this emotion.
    pub fn expression(self) -> Expression {
        match self {
            Emotion::Happy | Emotion::Excited | Emotion::Friendly => Expression::Happy,
            Emotion::Sad => Expression::Sad,
            Emotion::Empathetic => Expression::Relaxed,
            Emotion::Curious => Expression::Surprised,
            Emotion::Frustrated => Expression::Angry,
            Emotion::Thoughtful | Emotion::Neutral => Expression::Neutral,
        }
    }
}

/// Blend-shape expression groups the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expression {
    #[default]
    Neutral,
    Happy,
    Sad,
    Relaxed,
    Surprised,
    Angry,
}

impl Expression {
    pub fn as_str(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Relaxed => "relaxed",
            Expression::Surprised => "surprised",
            Expression::Angry => "angry",
        }
    }
}

/// Snapshot handed to the decision loop once per coarse tick.
///
/// `now` is the host's monotonic clock in seconds; the core never reads wall
/// time on its own.
#[derive(Debug, Clone, Default)]
pub struct DecisionContext {
    pub emotion: Emotion,
    pub is_talking: bool,
    pub last_message: Option<String>,
    pub now: f64,
}
