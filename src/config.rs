use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::puppet::navigation::Bounds;

/// Decision-loop cadences and chances. The values are the empirically tuned
/// ones from the behavior this core reproduces; override per deployment
/// rather than editing the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Seconds between idle-behavior decision ticks (driven by the host).
    #[serde(default = "BehaviorConfig::default_decision_interval")]
    pub decision_interval: f32,
    /// Minimum seconds between spatial movement attempts.
    #[serde(default = "BehaviorConfig::default_movement_interval")]
    pub movement_interval: f32,
    /// Chance of a keyword gesture on a talking tick.
    #[serde(default = "BehaviorConfig::default_gesture_chance")]
    pub gesture_chance: f32,
    /// Chance an elapsed movement window actually triggers a walk.
    #[serde(default = "BehaviorConfig::default_movement_chance")]
    pub movement_chance: f32,
    /// Seconds a failed goal kind stays unselectable.
    #[serde(default = "BehaviorConfig::default_goal_cooldown")]
    pub goal_cooldown: f32,
    /// Seconds a triggered gesture stays active.
    #[serde(default = "BehaviorConfig::default_gesture_duration")]
    pub gesture_duration: f32,
}

impl BehaviorConfig {
    fn default_decision_interval() -> f32 {
        5.0
    }
    fn default_movement_interval() -> f32 {
        30.0
    }
    fn default_gesture_chance() -> f32 {
        0.3
    }
    fn default_movement_chance() -> f32 {
        0.7
    }
    fn default_goal_cooldown() -> f32 {
        300.0
    }
    fn default_gesture_duration() -> f32 {
        3.0
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            decision_interval: Self::default_decision_interval(),
            movement_interval: Self::default_movement_interval(),
            gesture_chance: Self::default_gesture_chance(),
            movement_chance: Self::default_movement_chance(),
            goal_cooldown: Self::default_goal_cooldown(),
            gesture_duration: Self::default_gesture_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Walk speed, units per second.
    #[serde(default = "NavigationConfig::default_speed")]
    pub speed: f32,
    /// Turn speed, radians per second.
    #[serde(default = "NavigationConfig::default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default)]
    pub bounds: Bounds,
}

impl NavigationConfig {
    fn default_speed() -> f32 {
        0.5
    }
    fn default_rotation_speed() -> f32 {
        2.0
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            rotation_speed: Self::default_rotation_speed(),
            bounds: Bounds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Motion amplitude floor before microphone coupling.
    #[serde(default = "MotionConfig::default_base_intensity")]
    pub base_intensity: f32,
}

impl MotionConfig {
    fn default_base_intensity() -> f32 {
        0.25
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_intensity: Self::default_base_intensity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeConfig {
    /// Blink interval bounds, seconds.
    #[serde(default = "GazeConfig::default_blink_min")]
    pub blink_min: f32,
    #[serde(default = "GazeConfig::default_blink_max")]
    pub blink_max: f32,
    /// Micro-saccade interval bounds, seconds.
    #[serde(default = "GazeConfig::default_dart_min")]
    pub dart_min: f32,
    #[serde(default = "GazeConfig::default_dart_max")]
    pub dart_max: f32,
}

impl GazeConfig {
    fn default_blink_min() -> f32 {
        2.0
    }
    fn default_blink_max() -> f32 {
        6.0
    }
    fn default_dart_min() -> f32 {
        1.5
    }
    fn default_dart_max() -> f32 {
        2.5
    }
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            blink_min: Self::default_blink_min(),
            blink_max: Self::default_blink_max(),
            dart_min: Self::default_dart_min(),
            dart_max: Self::default_dart_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonConfig {
    /// Slerp factor per second when a caller does not specify one.
    #[serde(default = "SkeletonConfig::default_blend_speed")]
    pub default_blend_speed: f32,
    /// Seconds an externally issued bone target keeps exclusive ownership.
    #[serde(default = "SkeletonConfig::default_explicit_hold")]
    pub explicit_hold: f32,
}

impl SkeletonConfig {
    fn default_blend_speed() -> f32 {
        5.0
    }
    fn default_explicit_hold() -> f32 {
        2.0
    }
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            default_blend_speed: Self::default_blend_speed(),
            explicit_hold: Self::default_explicit_hold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisemeConfig {
    /// Estimated seconds of mouth time per word when no duration is given.
    #[serde(default = "VisemeConfig::default_seconds_per_word")]
    pub seconds_per_word: f32,
    /// Silent gap between words, seconds.
    #[serde(default = "VisemeConfig::default_word_gap")]
    pub word_gap: f32,
}

impl VisemeConfig {
    fn default_seconds_per_word() -> f32 {
        0.4
    }
    fn default_word_gap() -> f32 {
        0.05
    }
}

impl Default for VisemeConfig {
    fn default() -> Self {
        Self {
            seconds_per_word: Self::default_seconds_per_word(),
            word_gap: Self::default_word_gap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AvatarConfig {
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub gaze: GazeConfig,
    #[serde(default)]
    pub skeleton: SkeletonConfig,
    #[serde(default)]
    pub viseme: VisemeConfig,
}

impl AvatarConfig {
    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    /// Load from `path`, or write a fully commented defaults file there and
    /// return the defaults. Parse and I/O failures degrade to defaults with a
    /// message on stderr; this never aborts the host.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write commented defaults and return them.
        let default_cfg = Self::default();
        if let Ok(text) = toml::to_string_pretty(&default_cfg) {
            let mut commented = String::new();
            for line in text.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    commented.push('\n');
                } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                    commented.push_str(line);
                    commented.push('\n');
                } else {
                    let mut out_line = line.to_string();
                    if let Some((lhs, rhs)) = line.split_once('=') {
                        let rhs_trim = rhs.trim();
                        let has_decimal = rhs_trim.contains('.');
                        if (has_decimal || rhs_trim.contains('e') || rhs_trim.contains('E'))
                            && !rhs_trim.contains('"')
                            && rhs_trim != "true"
                            && rhs_trim != "false"
                        {
                            if let Ok(val) = rhs_trim.parse::<f32>() {
                                let mut formatted = Self::format_f32_compact(val);
                                if has_decimal && !formatted.contains('.') {
                                    formatted.push_str(".0");
                                }
                                out_line = format!("{} = {}", lhs.trim(), formatted);
                            }
                        }
                    }
                    commented.push_str("# ");
                    commented.push_str(&out_line);
                    commented.push('\n');
                }
            }
            if let Err(err) = fs::write(path_obj, commented) {
                eprintln!("Failed to write default config to {path}: {err}");
            }
        } else {
            eprintln!("Failed to serialize default config; continuing with defaults");
        }
        default_cfg
    }
}
