//! End-to-end match scenarios driven only through the public API.

#[allow(dead_code)]
mod common;

use kickoff_core::geometry::Vec3;
use kickoff_core::simulation::Simulation;
use kickoff_core::test_helpers::{contract_same_seed_is_deterministic, encoded, run_ticks};

use kickoff_soccer::MatchEvent;
use kickoff_soccer::team::TeamColor;

use common::{DT, goals_in, kicked_off, new_match, team_state};

#[test]
fn kickoff_puts_both_teams_in_defence() {
    let world = kicked_off(1);
    assert!(world.pitch().is_playing);
    for color in TeamColor::ALL {
        assert_eq!(team_state(&world, color), "DEFENDING");
    }
}

#[test]
fn players_start_in_their_formation() {
    let world = new_match(1);
    let formation = &world.config().formation;
    for color in TeamColor::ALL {
        let regions: Vec<usize> = world
            .team(color)
            .roster
            .players()
            .map(|player| player.home_region)
            .collect();
        assert_eq!(regions, formation.regions(color, false).to_vec());
    }
}

#[test]
fn goal_into_blue_net_counts_for_red() {
    let mut world = kicked_off(2);
    // Red attacks the blue goal at -x.
    world.ball_mut().place_at(Vec3::new(-9.95, 0.0, -0.3));
    world.ball_mut().kick(Vec3::new(-2.0, 0.0, 0.0));
    let events = world.update(DT);

    assert_eq!(goals_in(&events), 1);
    assert!(events.contains(&MatchEvent::GoalScored {
        scorer: TeamColor::Red,
        red: 1,
        blue: 0,
    }));
    assert_eq!(world.ball().position, Vec3::ZERO);
    assert_eq!(world.ball().velocity, Vec3::ZERO);
    assert_eq!(world.team(TeamColor::Red).goals, 1);
    assert_eq!(world.team(TeamColor::Blue).goals, 0);
    assert!(!world.pitch().is_playing);
}

#[test]
fn play_restarts_after_a_goal() {
    let mut world = kicked_off(3);
    world.ball_mut().place_at(Vec3::new(9.95, 0.0, 0.0));
    world.ball_mut().kick(Vec3::new(2.0, 0.0, 0.0));
    let events = world.update(DT);
    assert_eq!(goals_in(&events), 1);
    for color in TeamColor::ALL {
        assert_eq!(team_state(&world, color), "PREPARE_FOR_KICKOFF");
    }

    // Everyone walks back to formation, then the teams kick off again.
    let mut restarted = false;
    for _ in 0..60 * 60 {
        if world.update(DT).contains(&MatchEvent::KickOff) {
            restarted = true;
            break;
        }
    }
    assert!(restarted, "no kick off within a minute of the goal");
    assert!(world.pitch().is_playing);
    assert_eq!(world.team(TeamColor::Blue).goals, 1);
}

#[test]
fn ball_resting_outside_goal_mouth_does_not_score() {
    let mut world = kicked_off(4);
    world.ball_mut().place_at(Vec3::new(9.0, 0.0, 4.0));
    let events = run_ticks(&mut world, 5, DT);
    assert_eq!(goals_in(&events), 0);
}

#[test]
fn same_seed_gives_same_match() {
    contract_same_seed_is_deterministic(|| new_match(77), 600, DT);
}

#[test]
fn different_seeds_still_valid() {
    for seed in [5, 6, 7] {
        let mut world = new_match(seed);
        run_ticks(&mut world, 300, DT);
        assert!(!encoded(&world).is_empty());
    }
}

#[test]
fn long_match_keeps_invariants() {
    let mut world = new_match(2024);
    let half_length = world.pitch().width() * 0.5;
    let half_width = world.pitch().height() * 0.5;

    for tick in 0..60 * 120 {
        world.update(DT);

        let red = world.team(TeamColor::Red).controlling;
        let blue = world.team(TeamColor::Blue).controlling;
        assert!(
            red.is_none() || blue.is_none(),
            "both teams in control at tick {tick}"
        );
        for color in TeamColor::ALL {
            if let Some(id) = world.team(color).controlling {
                assert_eq!(id.team(), color);
            }
        }

        let ball = world.ball().position;
        assert!(ball.x.abs() <= half_length + 0.5, "ball left the pitch: {ball:?}");
        assert!(ball.z.abs() <= half_width + 0.5, "ball left the pitch: {ball:?}");
    }

    let snapshot = world.snapshot();
    assert_eq!(snapshot.players.len(), 10);
    assert!(snapshot.players.iter().all(|p| p.state != "NONE"));
}

#[test]
fn snapshot_reports_every_player_state() {
    let mut world = kicked_off(9);
    run_ticks(&mut world, 120, DT);
    let snapshot = world.snapshot();
    let keepers: Vec<_> = snapshot
        .players
        .iter()
        .filter(|p| p.id.is_goalkeeper())
        .collect();
    assert_eq!(keepers.len(), 2);
    for keeper in keepers {
        assert!(
            ["RETURN_HOME", "TEND_GOAL", "INTERCEPT_BALL", "PUT_BALL_BACK_IN_PLAY"]
                .contains(&keeper.state.as_str()),
            "unexpected keeper state {}",
            keeper.state
        );
    }
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"players\""));
}

#[test]
fn paused_match_does_not_move() {
    let mut world = kicked_off(10);
    world.pause();
    let before = encoded(&world);
    assert!(run_ticks(&mut world, 30, DT).is_empty());
    assert_eq!(before, encoded(&world));
}
