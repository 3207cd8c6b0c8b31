use std::time::Duration;

use tracing_subscriber::EnvFilter;

use kickoff_core::simulation::Simulation;
use kickoff_core::time::FrameClock;
use kickoff_soccer::config::SoccerConfig;
use kickoff_soccer::{MatchEvent, SoccerMatch};

/// How the match is driven, read from the environment.
#[derive(Debug, Clone, PartialEq)]
struct RunOptions {
    seed: u64,
    ticks: u64,
    /// Step with wall-clock deltas instead of the fixed tick rate.
    realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: 60 * 90,
            realtime: false,
        }
    }
}

impl RunOptions {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(val) = lookup("KICKOFF_SEED")
            && let Ok(seed) = val.parse::<u64>()
        {
            options.seed = seed;
        }
        if let Some(val) = lookup("KICKOFF_TICKS")
            && let Ok(ticks) = val.parse::<u64>()
        {
            options.ticks = ticks;
        }
        if let Some(val) = lookup("KICKOFF_REALTIME") {
            options.realtime = matches!(val.as_str(), "1" | "true" | "yes");
        }
        options
    }
}

/// Run the match to completion and return the total score as (red, blue).
fn run(world: &mut SoccerMatch, options: &RunOptions) -> (u32, u32) {
    let fixed_dt = 1.0 / world.tick_rate();
    let mut clock = options
        .realtime
        .then(|| FrameClock::new(Duration::from_millis(100)));
    let mut score = (0, 0);

    for _ in 0..options.ticks {
        let dt = match clock.as_mut() {
            Some(clock) => {
                std::thread::sleep(Duration::from_secs_f32(fixed_dt));
                clock.tick()
            },
            None => fixed_dt,
        };
        for event in world.update(dt) {
            match event {
                MatchEvent::GoalScored { scorer, red, blue } => {
                    tracing::info!(scorer = scorer.name(), red, blue, "score update");
                    score = (red, blue);
                },
                MatchEvent::KickOff => tracing::debug!(tick = world.tick(), "kick off"),
            }
        }
    }
    score
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SoccerConfig::load();
    for problem in config.validate() {
        tracing::warn!("config problem: {problem}");
    }

    let options = RunOptions::from_env();
    let mut world = SoccerMatch::new(config, options.seed);
    let meta = world.metadata();
    tracing::info!(
        name = %meta.name,
        seed = options.seed,
        ticks = options.ticks,
        realtime = options.realtime,
        "match starting"
    );

    let (red, blue) = run(&mut world, &options);
    tracing::info!(red, blue, elapsed = world.elapsed(), "match finished");

    match serde_json::to_string_pretty(&world.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode final snapshot: {e}"),
    }
}
