use std::f32::consts::PI;

/// Wrap an angle into `[-PI, PI]`.
pub fn wrap_pi(mut v: f32) -> f32 {
    while v > PI {
        v -= 2.0 * PI;
    }
    while v < -PI {
        v += 2.0 * PI;
    }
    v
}

/// Two-sine pseudo-noise in roughly `[-1, 1]`.
///
/// Continuous in `t` for any fixed `offset`; the offset only shifts phase, so
/// re-seeding a consumer never produces a discontinuity at the current time.
pub fn noise(t: f32, offset: f32) -> f32 {
    (t * 1.2 + offset).sin() * 0.5 + (t * 0.7 + offset * 1.3).sin() * 0.5
}

/// Slow breathing cycle in `[0, 1]`.
pub fn breathing_noise(t: f32) -> f32 {
    (t * 0.8).sin() * 0.5 + 0.5
}
