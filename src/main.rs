// Entry point: headless driver that runs the avatar core in simulated time
// and prints every transition it emits.

use clap::Parser;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use marionette::config::AvatarConfig;
use marionette::core::timer::IntervalTimer;
use marionette::puppet::events::AvatarEvent;
use marionette::puppet::rig::AvatarRig;
use marionette::puppet::state::{DecisionContext, Emotion};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    duration: f32,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Session seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Emotion fed to every decision tick
    #[arg(long, default_value = "neutral")]
    emotion: String,

    /// Line the avatar speaks at the start
    #[arg(long)]
    say: Option<String>,

    /// Path to config TOML
    #[arg(long, default_value = "marionette.toml")]
    config: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = AvatarConfig::load_or_default(&args.config);
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    println!("seed: {seed}");

    let mut rig = AvatarRig::new(&cfg, seed);
    let rx = rig.subscribe();

    let emotion = Emotion::parse(&args.emotion);
    let fps = args.fps.clamp(1.0, 240.0);
    let dt = 1.0 / fps;
    let frames = (args.duration.max(0.0) * fps) as u64;

    // Speaking window: talk until the viseme timeline runs out.
    let mut talk_until = 0.0f64;
    if let Some(text) = &args.say {
        let track = rig.speak(text, None);
        talk_until = track.duration() as f64;
        println!(
            "speaking for {:.2}s across {} viseme events",
            track.duration(),
            track.len()
        );
    }

    let mut decision_timer = IntervalTimer::new(cfg.behavior.decision_interval);
    let mut now = 0.0f64;

    for _ in 0..frames {
        now += dt as f64;
        let is_talking = now < talk_until;
        let mic_level = if is_talking { 0.6 } else { 0.0 };
        rig.frame(dt, mic_level);

        if decision_timer.tick(dt) {
            let ctx = DecisionContext {
                emotion,
                is_talking,
                last_message: args.say.clone(),
                now,
            };
            rig.decide(&ctx);
        }

        for event in rx.try_iter() {
            match event {
                AvatarEvent::ActionChanged { from, to } => {
                    println!("[{now:7.2}] action {} -> {}", from.as_str(), to.as_str());
                }
                AvatarEvent::MovementStarted { target } => {
                    println!("[{now:7.2}] walk to ({:.2}, {:.2})", target.x, target.z);
                }
                AvatarEvent::MovementFinished { position } => {
                    println!("[{now:7.2}] arrived ({:.2}, {:.2})", position.x, position.z);
                }
                AvatarEvent::MovementStopped { position } => {
                    println!("[{now:7.2}] stopped ({:.2}, {:.2})", position.x, position.z);
                }
                AvatarEvent::GestureTriggered { gesture } => {
                    println!("[{now:7.2}] gesture {}", gesture.as_str());
                }
                AvatarEvent::GestureCleared { gesture } => {
                    println!("[{now:7.2}] gesture {} done", gesture.as_str());
                }
                AvatarEvent::ExpressionChanged { expression } => {
                    println!("[{now:7.2}] expression {}", expression.as_str());
                }
            }
        }
    }

    let position = rig.position();
    println!(
        "final: state={} position=({:.2}, {:.2}) yaw={:.2}",
        rig.state().as_str(),
        position.x,
        position.z,
        rig.yaw()
    );
}
