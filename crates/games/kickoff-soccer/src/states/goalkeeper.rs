use kickoff_core::fsm::{Agent, State};
use kickoff_core::messaging::Postbox;

use super::{GoalkeeperAgent, GoalkeeperState};
use crate::messages::{EntityId, SoccerMessage};

impl<'w> State<GoalkeeperAgent<'w>, SoccerMessage> for GoalkeeperState {
    fn name(self) -> &'static str {
        GoalkeeperState::name(self)
    }

    fn enter(self, agent: &mut GoalkeeperAgent<'w>) {
        match self {
            Self::Global => {},
            Self::ReturnHome => {
                let home = agent.player().home_region;
                let center = agent.world.pitch.region(home).map(|region| region.center);
                let player = agent.player_mut();
                if let Some(center) = center {
                    player.steering_target = center;
                }
                player.steering.arrive = true;
            },
            Self::TendGoal => agent.player_mut().steering.arrive = true,
            Self::InterceptBall => agent.player_mut().steering.pursuit = true,
            Self::PutBallBackInPlay => {
                let color = agent.color();
                agent.world.set_control(agent.id);
                agent.world.return_all_field_players_to_home(color, false);
                agent.world.return_all_field_players_to_home(color.opponent(), false);
            },
        }
    }

    fn execute(self, agent: &mut GoalkeeperAgent<'w>) {
        match self {
            Self::Global => {},
            Self::ReturnHome => {
                if agent.world.is_in_home_region(agent.id) || !agent.world.team(agent.color()).in_control() {
                    agent.change_state(Self::TendGoal);
                }
            },
            Self::TendGoal => execute_tend_goal(agent),
            Self::InterceptBall => {
                let id = agent.id;
                if agent.world.is_too_far_from_goal_mouth(id)
                    && !agent.world.is_closest_player_on_pitch_to_ball(id)
                {
                    agent.change_state(Self::ReturnHome);
                    return;
                }
                if agent.world.is_ball_within_keeper_range(id) {
                    trap_ball(agent);
                }
            },
            Self::PutBallBackInPlay => execute_put_ball_back_in_play(agent),
        }
    }

    fn exit(self, agent: &mut GoalkeeperAgent<'w>) {
        match self {
            Self::ReturnHome | Self::TendGoal => agent.player_mut().steering.arrive = false,
            Self::InterceptBall => agent.player_mut().steering.pursuit = false,
            Self::Global | Self::PutBallBackInPlay => {},
        }
    }

    fn on_message(self, agent: &mut GoalkeeperAgent<'w>, message: &SoccerMessage) -> bool {
        if self != Self::Global {
            return false;
        }
        match message {
            SoccerMessage::ReturnHome => {
                agent.player_mut().set_default_home_region();
                agent.change_state(Self::ReturnHome);
                true
            },
            SoccerMessage::ReceiveBall { .. } => {
                agent.change_state(Self::InterceptBall);
                true
            },
            _ => false,
        }
    }
}

fn execute_tend_goal(agent: &mut GoalkeeperAgent<'_>) {
    let id = agent.id;
    let color = agent.color();
    let ball = agent.world.ball.position;
    let interpose = agent.world.rear_interpose_target(id);
    let stand_off = agent.world.config.goalkeeper.tending_distance;
    agent.player_mut().steering_target = interpose + (ball - interpose).normalize() * stand_off;

    if agent.world.is_ball_within_keeper_range(id) {
        trap_ball(agent);
        return;
    }
    if agent.world.is_too_far_from_goal_mouth(id) && agent.world.team(color.opponent()).in_control() {
        agent.change_state(GoalkeeperState::ReturnHome);
        return;
    }
    if agent.world.is_ball_within_range_for_intercept(id) && !agent.world.team(color).in_control() {
        agent.change_state(GoalkeeperState::InterceptBall);
    }
}

fn trap_ball(agent: &mut GoalkeeperAgent<'_>) {
    agent.world.ball.trap();
    agent.world.pitch.goalkeeper_has_ball = true;
    tracing::debug!(team = agent.color().name(), "goalkeeper trapped the ball");
    agent.change_state(GoalkeeperState::PutBallBackInPlay);
}

fn execute_put_ball_back_in_play(agent: &mut GoalkeeperAgent<'_>) {
    let id = agent.id;
    let force = agent.world.config.tactics.max_passing_force;
    let min_distance = agent.world.config.goalkeeper.min_pass_distance;
    let Some(pass) = agent.world.find_pass(id, force, min_distance) else {
        agent.player_mut().stop();
        return;
    };

    agent.world.kick_ball_toward(pass.target, force);
    agent.world.pitch.goalkeeper_has_ball = false;
    tracing::debug!(
        team = agent.color().name(),
        receiver = pass.receiver.slot(),
        "goalkeeper puts the ball back in play"
    );
    agent.world.send(
        Some(EntityId::Player(id)),
        EntityId::Player(pass.receiver),
        SoccerMessage::ReceiveBall { target: pass.target },
        0.0,
    );
    agent.change_state(GoalkeeperState::TendGoal);
}
