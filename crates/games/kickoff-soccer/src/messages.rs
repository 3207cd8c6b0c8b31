use kickoff_core::geometry::Vec3;
use kickoff_core::messaging::Telegram;
use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::team::TeamColor;

/// Every addressable message recipient in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Pitch,
    Team(TeamColor),
    Player(PlayerId),
}

/// Notifications exchanged between match entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SoccerMessage {
    /// Go back to the default home region.
    ReturnHome,
    /// Sent to the controlling player by a team mate asking for the ball.
    PassToMe { requester: PlayerId },
    /// The ball has been kicked toward `target`.
    ReceiveBall { target: Vec3 },
    /// Move to the team's best support spot.
    SupportAttacker,
    GoalScored { scorer: TeamColor },
}

impl SoccerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReturnHome => "RETURN_HOME",
            Self::PassToMe { .. } => "PASS_TO_ME",
            Self::ReceiveBall { .. } => "RECEIVE_BALL",
            Self::SupportAttacker => "SUPPORT_ATTACKER",
            Self::GoalScored { .. } => "GOAL_SCORED",
        }
    }
}

pub type SoccerTelegram = Telegram<EntityId, SoccerMessage>;
