use std::f32::consts::FRAC_PI_4;

use kickoff_core::fsm::{Agent, State};
use kickoff_core::messaging::Postbox;
use rand::Rng;

use super::{FieldPlayerAgent, FieldPlayerState};
use crate::messages::{EntityId, SoccerMessage};
use crate::player::PlayerId;

impl<'w> State<FieldPlayerAgent<'w>, SoccerMessage> for FieldPlayerState {
    fn name(self) -> &'static str {
        FieldPlayerState::name(self)
    }

    fn enter(self, agent: &mut FieldPlayerAgent<'w>) {
        match self {
            Self::Global => {},
            Self::ChaseBall => agent.player_mut().steering.seek = true,
            Self::Dribble => agent.world.set_control(agent.id),
            Self::KickBall => enter_kick_ball(agent),
            Self::ReceiveBall => enter_receive_ball(agent),
            Self::ReturnHome => enter_return_home(agent),
            Self::SupportAttacker => enter_support_attacker(agent),
            Self::Wait => agent.player_mut().stop(),
        }
    }

    fn execute(self, agent: &mut FieldPlayerAgent<'w>) {
        match self {
            Self::Global => execute_global(agent),
            Self::ChaseBall => execute_chase_ball(agent),
            Self::Dribble => execute_dribble(agent),
            Self::KickBall => execute_kick_ball(agent),
            Self::ReceiveBall => execute_receive_ball(agent),
            Self::ReturnHome => execute_return_home(agent),
            Self::SupportAttacker => execute_support_attacker(agent),
            Self::Wait => execute_wait(agent),
        }
    }

    fn exit(self, agent: &mut FieldPlayerAgent<'w>) {
        let id = agent.id;
        match self {
            Self::ChaseBall => agent.player_mut().steering.seek = false,
            Self::ReceiveBall => {
                let steering = &mut agent.player_mut().steering;
                steering.arrive = false;
                steering.pursuit = false;
                let team = agent.team_mut();
                if team.receiving == Some(id) {
                    team.receiving = None;
                }
            },
            Self::ReturnHome | Self::Wait => agent.player_mut().steering.arrive = false,
            Self::SupportAttacker => {
                agent.player_mut().steering.arrive = false;
                let team = agent.team_mut();
                if team.supporting == Some(id) {
                    team.supporting = None;
                }
            },
            Self::Global | Self::Dribble | Self::KickBall => {},
        }
    }

    fn on_message(self, agent: &mut FieldPlayerAgent<'w>, message: &SoccerMessage) -> bool {
        if self != Self::Global {
            return false;
        }
        match *message {
            SoccerMessage::ReturnHome => {
                agent.player_mut().set_default_home_region();
                agent.change_state(Self::ReturnHome);
                true
            },
            SoccerMessage::PassToMe { requester } => {
                pass_on_request(agent, requester);
                true
            },
            SoccerMessage::ReceiveBall { target } => {
                agent.player_mut().steering_target = target;
                agent.change_state(Self::ReceiveBall);
                true
            },
            SoccerMessage::SupportAttacker => {
                if agent.is_in_state(Self::SupportAttacker) {
                    return true;
                }
                if let Some(spot) = agent.world.support_position(agent.color()) {
                    agent.player_mut().steering_target = spot;
                }
                agent.change_state(Self::SupportAttacker);
                true
            },
            SoccerMessage::GoalScored { .. } => false,
        }
    }
}

fn execute_global(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    let with_ball =
        agent.world.is_ball_within_receiving_range(id) && agent.world.is_controlling_player(id);
    let config = &agent.world.config.player;
    let max_speed = if with_ball {
        config.max_speed_with_ball
    } else {
        config.max_speed_without_ball
    };
    agent.player_mut().vehicle.max_speed = max_speed;
}

fn pass_on_request(agent: &mut FieldPlayerAgent<'_>, requester: PlayerId) {
    let id = agent.id;
    if agent.team().receiving.is_some() || !agent.world.is_ball_within_kicking_range(id) {
        return;
    }
    let target = agent.world.player(requester).position();
    let power = agent.world.config.tactics.max_passing_force;
    agent.world.kick_ball_toward(target, power);
    tracing::debug!(
        team = id.team().name(),
        passer = id.slot(),
        receiver = requester.slot(),
        "pass on request"
    );
    agent.world.send(
        Some(EntityId::Player(id)),
        EntityId::Player(requester),
        SoccerMessage::ReceiveBall { target },
        0.0,
    );
    agent.change_state(FieldPlayerState::Wait);
    agent.world.find_support(agent.color());
}

fn execute_chase_ball(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    if agent.world.is_ball_within_kicking_range(id) {
        agent.change_state(FieldPlayerState::KickBall);
        return;
    }
    if agent.world.is_closest_team_member_to_ball(id) {
        let ball = agent.world.ball.position;
        agent.player_mut().steering_target = ball;
        return;
    }
    agent.change_state(FieldPlayerState::ReturnHome);
}

fn execute_dribble(agent: &mut FieldPlayerAgent<'_>) {
    let facing = agent.player().vehicle.heading;
    let goal_direction = agent.world.home_goal(agent.color()).facing;
    let tactics = &agent.world.config.tactics;

    let force = if facing.dot(goal_direction) < 0.0 {
        // Ball is between the player and its own goal: turn in small steps.
        let sign = if facing.x * goal_direction.z < facing.z * goal_direction.x {
            1.0
        } else {
            -1.0
        };
        facing.rotate_y(FRAC_PI_4 * sign).normalize() * tactics.dribble_turn_force
    } else {
        goal_direction * tactics.dribble_force
    };
    agent.world.ball.kick(force);
    agent.change_state(FieldPlayerState::ChaseBall);
}

fn enter_kick_ball(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    agent.world.set_control(id);
    let now = agent.world.elapsed;
    let ready = agent
        .team_mut()
        .roster
        .field_player_mut(id)
        .kick_regulator
        .ready(now);
    if !ready {
        agent.change_state(FieldPlayerState::ChaseBall);
    }
}

fn execute_kick_ball(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    let color = agent.color();
    let ball = agent.world.ball.position;
    let position = agent.player().position();
    let to_ball = (ball - position).normalize();
    let dot = to_ball.dot(agent.player().vehicle.heading);

    if agent.world.pitch.goalkeeper_has_ball || dot < 0.0 || agent.team().receiving.is_some() {
        agent.change_state(FieldPlayerState::ChaseBall);
        return;
    }

    // The more squarely the ball sits in front, the harder the kick.
    let tactics = agent.world.config.tactics.clone();
    let power = tactics.max_shooting_force * dot;
    let mut shot = agent.world.can_shoot(color, ball, power);
    if shot.is_none() && agent.world.rng.random::<f32>() < tactics.pot_shot_chance {
        shot = Some(agent.world.random_shot_target(color));
    }
    if let Some(target) = shot {
        let target = agent.world.add_noise(id, target);
        agent.world.kick_ball_toward(target, power);
        tracing::debug!(team = color.name(), shooter = id.slot(), power, "shot at goal");
        agent.change_state(FieldPlayerState::Wait);
        agent.world.find_support(color);
        return;
    }

    let power = tactics.max_passing_force * dot;
    let pass = if agent.world.is_threatened(id) {
        agent.world.find_pass(id, power, tactics.min_pass_distance)
    } else {
        None
    };
    match pass {
        Some(pass) => {
            let target = agent.world.add_noise(id, pass.target);
            agent.world.kick_ball_toward(target, power);
            tracing::debug!(
                team = color.name(),
                passer = id.slot(),
                receiver = pass.receiver.slot(),
                "pass under pressure"
            );
            agent.world.send(
                Some(EntityId::Player(id)),
                EntityId::Player(pass.receiver),
                SoccerMessage::ReceiveBall { target },
                0.0,
            );
            agent.change_state(FieldPlayerState::Wait);
            agent.world.find_support(color);
        },
        None => {
            agent.world.find_support(color);
            agent.change_state(FieldPlayerState::Dribble);
        },
    }
}

fn enter_receive_ball(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    agent.team_mut().receiving = Some(id);
    agent.world.set_control(id);

    let tactics = &agent.world.config.tactics;
    let (chance, threat_radius) = (tactics.arrive_receive_chance, tactics.pass_threat_radius);
    let prefers_arrive = agent.world.is_in_hot_region(id) || agent.world.rng.random::<f32>() < chance;
    let use_arrive = prefers_arrive && !agent.world.is_opponent_within_radius(id, threat_radius);

    let steering = &mut agent.player_mut().steering;
    if use_arrive {
        steering.arrive = true;
    } else {
        steering.pursuit = true;
    }
}

fn execute_receive_ball(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    if agent.world.is_ball_within_receiving_range(id) || !agent.team().in_control() {
        agent.change_state(FieldPlayerState::ChaseBall);
        return;
    }

    let ball = agent.world.ball.position;
    if agent.player().steering.pursuit {
        agent.player_mut().steering_target = ball;
    }

    let dt = agent.world.delta;
    if agent.world.is_at_target(id) {
        let player = agent.player_mut();
        player.steering.arrive = false;
        player.steering.pursuit = false;
        player.vehicle.rotate_to(ball, dt);
        player.stop();
    } else {
        let player = agent.player_mut();
        let target = player.steering_target;
        player.vehicle.rotate_to(target, dt);
    }
}

fn enter_return_home(agent: &mut FieldPlayerAgent<'_>) {
    let home = agent.player().home_region;
    let center = agent.world.pitch.region(home).map(|region| {
        (
            region.center,
            region.contains(agent.player().steering_target, true),
        )
    });
    let player = agent.player_mut();
    player.steering.arrive = true;
    if let Some((center, target_inside)) = center
        && !target_inside
    {
        player.steering_target = center;
    }
}

fn execute_return_home(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    let playing = agent.world.pitch.is_playing;
    if playing && should_chase(agent) {
        agent.change_state(FieldPlayerState::ChaseBall);
        return;
    }

    if playing && agent.world.is_in_home_region(id) {
        let position = agent.player().position();
        agent.player_mut().steering_target = position;
        agent.change_state(FieldPlayerState::Wait);
    } else if !playing && agent.world.is_at_target(id) {
        agent.change_state(FieldPlayerState::Wait);
    }

    let dt = agent.world.delta;
    let player = agent.player_mut();
    let target = player.steering_target;
    player.vehicle.rotate_to(target, dt);
}

fn enter_support_attacker(agent: &mut FieldPlayerAgent<'_>) {
    if let Some(spot) = agent.world.support_position(agent.color()) {
        agent.player_mut().steering_target = spot;
    }
    agent.player_mut().steering.arrive = true;
}

fn execute_support_attacker(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    let color = agent.color();
    if !agent.team().in_control() {
        agent.change_state(FieldPlayerState::ReturnHome);
        return;
    }
    if agent.world.is_closest_team_member_to_ball(id) && agent.team().receiving.is_none() {
        agent.change_state(FieldPlayerState::ChaseBall);
        return;
    }

    if let Some(spot) = agent.world.support_position(color)
        && spot != agent.player().steering_target
    {
        let player = agent.player_mut();
        player.steering_target = spot;
        player.steering.arrive = true;
    }

    let position = agent.player().position();
    let force = agent.world.config.tactics.max_shooting_force;
    if agent.world.can_shoot(color, position, force).is_some() {
        agent.world.request_pass(id);
        if !agent.is_in_state(FieldPlayerState::SupportAttacker) {
            return;
        }
    }

    let dt = agent.world.delta;
    if agent.world.is_at_target(id) {
        let ball = agent.world.ball.position;
        let player = agent.player_mut();
        player.steering.arrive = false;
        player.vehicle.rotate_to(ball, dt);
        player.stop();
        if !agent.world.is_threatened(id) {
            agent.world.request_pass(id);
        }
    } else {
        let player = agent.player_mut();
        let target = player.steering_target;
        player.vehicle.rotate_to(target, dt);
    }
}

fn execute_wait(agent: &mut FieldPlayerAgent<'_>) {
    let id = agent.id;
    if agent.world.pitch.is_playing && should_chase(agent) {
        agent.change_state(FieldPlayerState::ChaseBall);
        return;
    }

    // Drift back to the waiting spot if pushed off it.
    if agent.world.is_at_target(id) {
        let player = agent.player_mut();
        player.steering.arrive = false;
        player.stop();
    } else {
        agent.player_mut().steering.arrive = true;
    }

    let team = agent.team();
    if let Some(controller) = team.controlling
        && controller != id
        && !controller.is_goalkeeper()
        && agent.world.is_ahead_of_attacker(id)
    {
        agent.world.request_pass(id);
    }
}

/// Closest team mate to a loose ball nobody is receiving.
fn should_chase(agent: &FieldPlayerAgent<'_>) -> bool {
    agent.world.is_closest_team_member_to_ball(agent.id)
        && agent.team().receiving.is_none()
        && !agent.world.pitch.goalkeeper_has_ball
}

#[cfg(test)]
mod tests {
    use kickoff_core::geometry::Vec3;

    use super::*;
    use crate::config::SoccerConfig;
    use crate::team::TeamColor;
    use crate::SoccerMatch;

    fn playing_match() -> SoccerMatch {
        let mut world = SoccerMatch::new(SoccerConfig::default(), 3);
        world.pitch.is_playing = true;
        world
    }

    fn red(slot: usize) -> PlayerId {
        PlayerId::new(TeamColor::Red, slot)
    }

    fn state_of(world: &SoccerMatch, id: PlayerId) -> Option<FieldPlayerState> {
        world.team(id.team()).roster.field_player(id).fsm.current()
    }

    #[test]
    fn names_are_screaming_snake_case() {
        assert_eq!(FieldPlayerState::ChaseBall.name(), "CHASE_BALL");
        assert_eq!(FieldPlayerState::SupportAttacker.name(), "SUPPORT_ATTACKER");
    }

    #[test]
    fn return_home_message_restores_default_region() {
        let mut world = playing_match();
        let id = red(1);
        world.player_mut(id).home_region = 3;
        let handled = world.send(None, EntityId::Player(id), SoccerMessage::ReturnHome, 0.0);
        assert!(handled);
        let player = world.player(id);
        assert_eq!(player.home_region, player.default_region);
        assert_eq!(state_of(&world, id), Some(FieldPlayerState::ReturnHome));
        assert!(player.steering.arrive);
    }

    #[test]
    fn receive_ball_message_takes_control() {
        let mut world = playing_match();
        let id = red(2);
        let target = Vec3::new(-3.0, 0.0, 1.0);
        world.send(None, EntityId::Player(id), SoccerMessage::ReceiveBall { target }, 0.0);
        assert_eq!(state_of(&world, id), Some(FieldPlayerState::ReceiveBall));
        let team = world.team(TeamColor::Red);
        assert_eq!(team.receiving, Some(id));
        assert_eq!(team.controlling, Some(id));
        assert_eq!(world.player(id).steering_target, target);
        let steering = world.player(id).steering;
        assert!(steering.arrive ^ steering.pursuit);
    }

    #[test]
    fn leaving_receive_clears_only_own_reference() {
        let mut world = playing_match();
        let id = red(2);
        world.send(None, EntityId::Player(id), SoccerMessage::ReceiveBall { target: Vec3::ZERO }, 0.0);
        world.team_mut(TeamColor::Red).receiving = Some(red(3));
        world.send(None, EntityId::Player(id), SoccerMessage::ReturnHome, 0.0);
        assert_eq!(world.team(TeamColor::Red).receiving, Some(red(3)));
    }

    #[test]
    fn pass_request_ignored_when_ball_out_of_range() {
        let mut world = playing_match();
        let id = red(1);
        world.ball.place_at(Vec3::new(-9.0, 0.0, 7.0));
        let before = state_of(&world, id);
        let handled = world.send(
            None,
            EntityId::Player(id),
            SoccerMessage::PassToMe { requester: red(2) },
            0.0,
        );
        assert!(handled);
        assert_eq!(state_of(&world, id), before);
        assert_eq!(world.ball.velocity, Vec3::ZERO);
    }

    #[test]
    fn pass_request_kicks_ball_to_requester() {
        let mut world = playing_match();
        let passer = red(1);
        let requester = red(2);
        let at = world.player(passer).position();
        world.ball.place_at(at);
        world.send(
            None,
            EntityId::Player(passer),
            SoccerMessage::PassToMe { requester },
            0.0,
        );
        assert!(world.ball.speed() > 0.0);
        let towards = world.player(requester).position() - at;
        assert!(world.ball.velocity.dot(towards) > 0.0);
        // The passer may be picked straight away as the supporting attacker.
        assert!(matches!(
            state_of(&world, passer),
            Some(FieldPlayerState::Wait | FieldPlayerState::SupportAttacker)
        ));
        assert_eq!(state_of(&world, requester), Some(FieldPlayerState::ReceiveBall));
        assert!(world.is_controlling_player(requester));
    }

    #[test]
    fn goal_scored_is_not_for_players() {
        let mut world = playing_match();
        let handled = world.send(
            None,
            EntityId::Player(red(1)),
            SoccerMessage::GoalScored { scorer: TeamColor::Red },
            0.0,
        );
        assert!(!handled);
    }

    #[test]
    fn dribble_kicks_toward_opposing_goal_when_facing_it() {
        let mut world = playing_match();
        let id = red(1);
        // Red attacks toward -x.
        world.player_mut(id).vehicle.heading = Vec3::new(-1.0, 0.0, 0.0);
        let at = world.player(id).position();
        world.ball.place_at(at);
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        agent.change_state(FieldPlayerState::Dribble);
        FieldPlayerState::Dribble.execute(&mut agent);
        assert!(world.ball.velocity.x < 0.0);
        assert_eq!(state_of(&world, id), Some(FieldPlayerState::ChaseBall));
        assert!(world.is_controlling_player(id));
    }

    #[test]
    fn dribble_turns_when_facing_own_goal() {
        let mut world = playing_match();
        let id = red(1);
        world.player_mut(id).vehicle.heading = Vec3::new(1.0, 0.0, 0.0);
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        FieldPlayerState::Dribble.execute(&mut agent);
        let velocity = world.ball.velocity;
        let expected = world.config.tactics.dribble_turn_force / world.ball.mass;
        assert!((velocity.length() - expected).abs() < 1e-4);
        assert!(velocity.z.abs() > 0.1, "turning kick goes sideways: {velocity:?}");
    }

    #[test]
    fn kick_regulator_sends_player_back_to_chasing() {
        let mut world = playing_match();
        let id = red(1);
        let at = world.player(id).position();
        world.ball.place_at(at);
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        agent.change_state(FieldPlayerState::KickBall);
        assert!(agent.is_in_state(FieldPlayerState::KickBall));
        agent.change_state(FieldPlayerState::KickBall);
        assert!(agent.is_in_state(FieldPlayerState::ChaseBall));
    }

    #[test]
    fn chase_returns_home_when_not_closest() {
        let mut world = playing_match();
        let id = red(1);
        world.team_mut(TeamColor::Red).closest_to_ball = Some(red(2));
        world.ball.place_at(Vec3::new(-9.0, 0.0, -7.0));
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        agent.change_state(FieldPlayerState::ChaseBall);
        FieldPlayerState::ChaseBall.execute(&mut agent);
        assert_eq!(state_of(&world, id), Some(FieldPlayerState::ReturnHome));
        assert!(!world.player(id).steering.seek);
    }

    #[test]
    fn max_speed_depends_on_possession() {
        let mut world = playing_match();
        let id = red(1);
        let at = world.player(id).position();
        world.ball.place_at(at);
        world.set_control(id);
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        FieldPlayerState::Global.execute(&mut agent);
        let config = world.config.player.clone();
        assert_eq!(world.player(id).vehicle.max_speed, config.max_speed_with_ball);

        world.team_mut(TeamColor::Red).lost_control();
        let mut agent = FieldPlayerAgent { world: &mut world, id };
        FieldPlayerState::Global.execute(&mut agent);
        assert_eq!(world.player(id).vehicle.max_speed, config.max_speed_without_ball);
    }
}
