use kickoff_core::fsm::{Agent, State};

use super::{TeamAgent, TeamState};
use crate::messages::SoccerMessage;

impl<'w> State<TeamAgent<'w>, SoccerMessage> for TeamState {
    fn name(self) -> &'static str {
        TeamState::name(self)
    }

    fn enter(self, agent: &mut TeamAgent<'w>) {
        let color = agent.color;
        match self {
            Self::Global => {},
            Self::PrepareForKickoff => {
                let team = agent.team_mut();
                team.lost_control();
                team.closest_to_ball = None;
                agent.world.return_all_field_players_to_home(color, true);
            },
            Self::Defending | Self::Attacking => {
                agent.world.setup_team_positions(color);
                agent.world.update_steering_target_of_players(color);
            },
        }
        if self != Self::Global {
            tracing::debug!(team = color.name(), state = self.name(), "team state entered");
        }
    }

    fn execute(self, agent: &mut TeamAgent<'w>) {
        let color = agent.color;
        match self {
            Self::Global => {},
            Self::PrepareForKickoff => {
                if agent.world.are_all_players_at_home(color)
                    && agent.world.are_all_players_at_home(color.opponent())
                {
                    agent.change_state(Self::Defending);
                }
            },
            Self::Defending => {
                if agent.team().in_control() {
                    agent.change_state(Self::Attacking);
                }
            },
            Self::Attacking => {
                if !agent.team().in_control() {
                    agent.change_state(Self::Defending);
                    return;
                }
                agent.world.compute_best_supporting_position(color);
            },
        }
    }

    fn exit(self, agent: &mut TeamAgent<'w>) {
        match self {
            Self::PrepareForKickoff => {
                agent.world.pitch.is_playing = true;
                tracing::info!(team = agent.color.name(), "kick off");
            },
            Self::Attacking => agent.team_mut().lost_control(),
            Self::Global | Self::Defending => {},
        }
    }

    fn on_message(self, agent: &mut TeamAgent<'w>, message: &SoccerMessage) -> bool {
        let SoccerMessage::GoalScored { scorer } = *message else {
            return false;
        };
        if self != Self::Global {
            return false;
        }
        if scorer == agent.color {
            agent.team_mut().goals += 1;
        }
        agent.change_state(Self::PrepareForKickoff);
        true
    }
}
