use marionette::config::GazeConfig;
use marionette::puppet::gaze::{GazeController, GazeMode};

#[test]
fn blink_intervals_stay_in_the_configured_band() {
    let cfg = GazeConfig::default();
    let mut gaze = GazeController::new(&cfg, 5);

    let dt = 0.05;
    let mut intervals = Vec::new();
    let mut since_blink = 0.0f32;
    let mut elapsed = 0.0f32;
    while intervals.len() < 8 && elapsed < 120.0 {
        gaze.update(dt, GazeMode::Idle);
        since_blink += dt;
        elapsed += dt;
        if gaze.should_blink() {
            intervals.push(since_blink);
            since_blink = 0.0;
        }
    }

    assert_eq!(intervals.len(), 8, "expected 8 blinks in two minutes");
    for interval in intervals {
        assert!(
            (cfg.blink_min - dt..=cfg.blink_max + dt).contains(&interval),
            "blink interval out of band: {interval}"
        );
    }
}

#[test]
fn thinking_blinks_faster() {
    let cfg = GazeConfig::default();
    let mut gaze = GazeController::new(&cfg, 5);

    let dt = 0.05;
    let mut since_blink = 0.0f32;
    let mut elapsed = 0.0f32;
    let mut intervals = Vec::new();
    while intervals.len() < 8 && elapsed < 120.0 {
        gaze.update(dt, GazeMode::Thinking);
        since_blink += dt;
        elapsed += dt;
        if gaze.should_blink() {
            intervals.push(since_blink);
            since_blink = 0.0;
        }
    }

    // The 0.6 contraction caps thinking intervals at 3.6 s.
    for interval in intervals {
        assert!(
            interval <= cfg.blink_max * 0.6 + dt,
            "thinking blink too slow: {interval}"
        );
    }
}

#[test]
fn blink_flag_is_consumed_on_read() {
    let mut gaze = GazeController::new(&GazeConfig::default(), 5);
    // Force a pending blink by running far past the longest interval.
    for _ in 0..200 {
        gaze.update(0.05, GazeMode::Idle);
    }
    // Whatever the latch state, two consecutive reads cannot both fire.
    let first = gaze.should_blink();
    let second = gaze.should_blink();
    assert!(!(first && second));
}

#[test]
fn listening_gaze_stays_near_center() {
    let mut gaze = GazeController::new(&GazeConfig::default(), 5);
    for _ in 0..1200 {
        gaze.update(1.0 / 60.0, GazeMode::Listening);
        let dir = gaze.direction();
        assert!(
            dir.length() < 0.3,
            "listening gaze wandered off-center: {dir:?}"
        );
    }
}

#[test]
fn idle_gaze_wanders_wider_than_listening() {
    let mut idle = GazeController::new(&GazeConfig::default(), 5);
    let mut max_idle = 0.0f32;
    for _ in 0..3600 {
        idle.update(1.0 / 60.0, GazeMode::Idle);
        max_idle = max_idle.max(idle.direction().length());
    }
    assert!(max_idle > 0.15, "idle gaze never wandered: {max_idle}");
}
