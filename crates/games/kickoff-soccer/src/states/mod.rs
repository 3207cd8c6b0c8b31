//! State machines for every agent type in a match.
//!
//! Each agent type has a fieldless state enum and a short-lived agent view
//! that borrows the whole [`SoccerMatch`] mutably together with the handle of
//! the entity being driven. States reach the rest of the world through that
//! view, so an `enter` hook can kick the ball or message a team mate directly.

mod field_player;
mod goalkeeper;
mod team;

use kickoff_core::fsm::{Agent, StateMachine};
use serde::{Deserialize, Serialize};

use crate::messages::SoccerMessage;
use crate::player::{Player, PlayerId};
use crate::team::{Team, TeamColor};
use crate::SoccerMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPlayerState {
    Global,
    ChaseBall,
    Dribble,
    KickBall,
    ReceiveBall,
    ReturnHome,
    SupportAttacker,
    Wait,
}

impl FieldPlayerState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "GLOBAL",
            Self::ChaseBall => "CHASE_BALL",
            Self::Dribble => "DRIBBLE",
            Self::KickBall => "KICK_BALL",
            Self::ReceiveBall => "RECEIVE_BALL",
            Self::ReturnHome => "RETURN_HOME",
            Self::SupportAttacker => "SUPPORT_ATTACKER",
            Self::Wait => "WAIT",
        }
    }

    /// States in which the player keeps turning to face the ball.
    pub fn watches_ball(self) -> bool {
        matches!(
            self,
            Self::ChaseBall | Self::Dribble | Self::KickBall | Self::Wait
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalkeeperState {
    Global,
    ReturnHome,
    TendGoal,
    InterceptBall,
    PutBallBackInPlay,
}

impl GoalkeeperState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "GLOBAL",
            Self::ReturnHome => "RETURN_HOME",
            Self::TendGoal => "TEND_GOAL",
            Self::InterceptBall => "INTERCEPT_BALL",
            Self::PutBallBackInPlay => "PUT_BALL_BACK_IN_PLAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamState {
    Global,
    PrepareForKickoff,
    Defending,
    Attacking,
}

impl TeamState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "GLOBAL",
            Self::PrepareForKickoff => "PREPARE_FOR_KICKOFF",
            Self::Defending => "DEFENDING",
            Self::Attacking => "ATTACKING",
        }
    }
}

/// A field player together with mutable access to the match.
pub struct FieldPlayerAgent<'w> {
    pub world: &'w mut SoccerMatch,
    pub id: PlayerId,
}

impl FieldPlayerAgent<'_> {
    pub fn player(&self) -> &Player {
        self.world.player(self.id)
    }

    pub fn player_mut(&mut self) -> &mut Player {
        self.world.player_mut(self.id)
    }

    pub fn team(&self) -> &Team {
        self.world.team(self.id.team())
    }

    pub fn team_mut(&mut self) -> &mut Team {
        self.world.team_mut(self.id.team())
    }

    fn color(&self) -> TeamColor {
        self.id.team()
    }
}

impl Agent for FieldPlayerAgent<'_> {
    type Message = SoccerMessage;
    type State = FieldPlayerState;

    fn state_machine(&self) -> &StateMachine<FieldPlayerState> {
        &self.team().roster.field_player(self.id).fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<FieldPlayerState> {
        let id = self.id;
        &mut self.team_mut().roster.field_player_mut(id).fsm
    }
}

/// A goalkeeper together with mutable access to the match.
pub struct GoalkeeperAgent<'w> {
    pub world: &'w mut SoccerMatch,
    pub id: PlayerId,
}

impl GoalkeeperAgent<'_> {
    pub fn player(&self) -> &Player {
        self.world.player(self.id)
    }

    pub fn player_mut(&mut self) -> &mut Player {
        self.world.player_mut(self.id)
    }

    fn color(&self) -> TeamColor {
        self.id.team()
    }
}

impl Agent for GoalkeeperAgent<'_> {
    type Message = SoccerMessage;
    type State = GoalkeeperState;

    fn state_machine(&self) -> &StateMachine<GoalkeeperState> {
        &self.world.team(self.id.team()).roster.goalkeeper.fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<GoalkeeperState> {
        &mut self.world.team_mut(self.id.team()).roster.goalkeeper.fsm
    }
}

/// A team together with mutable access to the match.
pub struct TeamAgent<'w> {
    pub world: &'w mut SoccerMatch,
    pub color: TeamColor,
}

impl TeamAgent<'_> {
    pub fn team(&self) -> &Team {
        self.world.team(self.color)
    }

    pub fn team_mut(&mut self) -> &mut Team {
        self.world.team_mut(self.color)
    }
}

impl Agent for TeamAgent<'_> {
    type Message = SoccerMessage;
    type State = TeamState;

    fn state_machine(&self) -> &StateMachine<TeamState> {
        &self.team().fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<TeamState> {
        &mut self.team_mut().fsm
    }
}
