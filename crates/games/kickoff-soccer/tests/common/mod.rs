use kickoff_core::simulation::Simulation;

use kickoff_soccer::config::SoccerConfig;
use kickoff_soccer::team::TeamColor;
use kickoff_soccer::{MatchEvent, SoccerMatch};

pub const DT: f32 = 1.0 / 60.0;

/// A match with default config.
pub fn new_match(seed: u64) -> SoccerMatch {
    SoccerMatch::new(SoccerConfig::default(), seed)
}

/// A match that has already kicked off.
pub fn kicked_off(seed: u64) -> SoccerMatch {
    let mut world = new_match(seed);
    let events = world.update(DT);
    assert!(
        events.contains(&MatchEvent::KickOff),
        "first update should kick off, got {events:?}"
    );
    world
}

pub fn team_state(world: &SoccerMatch, color: TeamColor) -> String {
    world.snapshot().teams[color.index()].state.clone()
}

pub fn goals_in(events: &[MatchEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, MatchEvent::GoalScored { .. }))
        .count()
}
