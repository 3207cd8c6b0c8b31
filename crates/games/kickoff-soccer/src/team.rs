use std::f32::consts::FRAC_PI_2;

use kickoff_core::fsm::StateMachine;
use kickoff_core::geometry::Vec3;
use kickoff_core::messaging::Postbox;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SoccerConfig;
use crate::messages::{EntityId, SoccerMessage};
use crate::pitch::Pitch;
use crate::player::{FieldPlayer, Goalkeeper, Player, PlayerId, ROSTER_SIZE, Role};
use crate::states::{FieldPlayerState, GoalkeeperState, TeamState};
use crate::support_spots::SupportSpotCalculator;
use crate::tactics::{Pass, Tactics};
use crate::SoccerMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamColor {
    Red,
    Blue,
}

impl TeamColor {
    pub const ALL: [Self; 2] = [Self::Red, Self::Blue];

    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

/// Roles by roster slot.
const ROLES: [Role; ROSTER_SIZE] = [
    Role::Goalkeeper,
    Role::Attacker,
    Role::Attacker,
    Role::Defender,
    Role::Defender,
];

/// One goalkeeper and four field players, fixed for the whole match.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub goalkeeper: Goalkeeper,
    pub field_players: [FieldPlayer; ROSTER_SIZE - 1],
}

impl Roster {
    /// Every player placed at the centre of its defending region.
    pub fn new(color: TeamColor, pitch: &Pitch, config: &SoccerConfig) -> Self {
        let regions = config.formation.regions(color, false);
        // Red defends +x and faces -x; blue the opposite.
        let yaw = match color {
            TeamColor::Red => -FRAC_PI_2,
            TeamColor::Blue => FRAC_PI_2,
        };
        let make = |slot: usize| {
            let region = regions[slot];
            let position = pitch.region(region).map_or(Vec3::ZERO, |r| r.center);
            Player::new(PlayerId::new(color, slot), ROLES[slot], region, position, yaw, config)
        };
        Self {
            goalkeeper: Goalkeeper::new(make(0)),
            field_players: [1, 2, 3, 4].map(|slot| FieldPlayer::new(make(slot), config)),
        }
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        if id.is_goalkeeper() {
            &self.goalkeeper.base
        } else {
            &self.field_players[id.field_index()].base
        }
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        if id.is_goalkeeper() {
            &mut self.goalkeeper.base
        } else {
            &mut self.field_players[id.field_index()].base
        }
    }

    /// Players in roster order, goalkeeper first.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.goalkeeper.base).chain(self.field_players.iter().map(|f| &f.base))
    }

    pub fn field_player(&self, id: PlayerId) -> &FieldPlayer {
        debug_assert!(!id.is_goalkeeper());
        &self.field_players[id.field_index()]
    }

    pub fn field_player_mut(&mut self, id: PlayerId) -> &mut FieldPlayer {
        debug_assert!(!id.is_goalkeeper());
        &mut self.field_players[id.field_index()]
    }

    /// FSM state name for any player.
    pub fn state_name(&self, id: PlayerId) -> &'static str {
        let current = if id.is_goalkeeper() {
            self.goalkeeper.fsm.current().map(GoalkeeperState::name)
        } else {
            self.field_player(id).fsm.current().map(FieldPlayerState::name)
        };
        current.unwrap_or("NONE")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub color: TeamColor,
    pub goals: u32,
    pub controlling: Option<PlayerId>,
    pub receiving: Option<PlayerId>,
    pub supporting: Option<PlayerId>,
    /// Recomputed at the start of every tick.
    pub closest_to_ball: Option<PlayerId>,
    pub fsm: StateMachine<TeamState>,
    pub support_spots: SupportSpotCalculator,
    pub roster: Roster,
}

impl Team {
    pub fn new(color: TeamColor, pitch: &Pitch, config: &SoccerConfig) -> Self {
        Self {
            color,
            goals: 0,
            controlling: None,
            receiving: None,
            supporting: None,
            closest_to_ball: None,
            fsm: StateMachine::with_global(TeamState::Global),
            support_spots: SupportSpotCalculator::new(
                color,
                &pitch.playing_area,
                &config.support_spots,
            ),
            roster: Roster::new(color, pitch, config),
        }
    }

    pub fn in_control(&self) -> bool {
        self.controlling.is_some()
    }

    pub fn lost_control(&mut self) {
        self.controlling = None;
        self.receiving = None;
        self.supporting = None;
    }

    pub(crate) fn compute_closest_to_ball(&mut self, ball: Vec3) {
        let mut closest = f32::INFINITY;
        for player in self.roster.players() {
            let distance = player.position().squared_distance_to(ball);
            if distance < closest {
                closest = distance;
                self.closest_to_ball = Some(player.id);
            }
        }
    }
}

/// Team-level operations. They live on the match because most of them read
/// the opposing team or send messages.
impl SoccerMatch {
    pub fn team(&self, color: TeamColor) -> &Team {
        &self.teams[color.index()]
    }

    pub(crate) fn team_mut(&mut self, color: TeamColor) -> &mut Team {
        &mut self.teams[color.index()]
    }

    /// Tactical view for `color`.
    pub fn tactics(&self, color: TeamColor) -> Tactics<'_> {
        Tactics {
            ball: &self.ball,
            pitch: &self.pitch,
            roster: &self.teams[color.index()].roster,
            opponents: &self.teams[color.opponent().index()].roster,
            opposing_goal: self.opposing_goal(color),
            config: &self.config,
        }
    }

    /// Give control to `id` and strip the other team of every reference.
    pub(crate) fn set_control(&mut self, id: PlayerId) {
        self.team_mut(id.team()).controlling = Some(id);
        self.team_mut(id.team().opponent()).lost_control();
    }

    pub fn are_all_players_at_home(&self, color: TeamColor) -> bool {
        self.team(color)
            .roster
            .players()
            .all(|player| self.is_in_home_region(player.id))
    }

    pub(crate) fn return_all_field_players_to_home(&mut self, color: TeamColor, with_goalkeeper: bool) {
        for slot in 0..ROSTER_SIZE {
            let id = PlayerId::new(color, slot);
            if with_goalkeeper || !id.is_goalkeeper() {
                self.send(
                    Some(EntityId::Team(color)),
                    EntityId::Player(id),
                    SoccerMessage::ReturnHome,
                    0.0,
                );
            }
        }
    }

    /// Assign home regions from the formation for the current team state.
    pub(crate) fn setup_team_positions(&mut self, color: TeamColor) {
        let attacking = !self.team(color).fsm.is_in(TeamState::Defending);
        let regions = self.config.formation.regions(color, attacking);
        let team = self.team_mut(color);
        team.roster.goalkeeper.base.home_region = regions[0];
        for (player, region) in team.roster.field_players.iter_mut().zip(&regions[1..]) {
            player.base.home_region = *region;
        }
    }

    /// Idle players head for the centre of their (possibly new) home region.
    pub(crate) fn update_steering_target_of_players(&mut self, color: TeamColor) {
        let Self { teams, pitch, .. } = self;
        for player in &mut teams[color.index()].roster.field_players {
            if (player.fsm.is_in(FieldPlayerState::Wait)
                || player.fsm.is_in(FieldPlayerState::ReturnHome))
                && let Some(region) = pitch.region(player.base.home_region)
            {
                player.base.steering_target = region.center;
            }
        }
    }

    /// Rescore the support spots against the current controller.
    pub(crate) fn compute_best_supporting_position(&mut self, color: TeamColor) -> Option<Vec3> {
        let now = self.elapsed;
        let Self {
            ball,
            pitch,
            teams,
            goals,
            config,
            rng,
            ..
        } = self;
        let [red, blue] = teams;
        let (own, opponents) = match color {
            TeamColor::Red => (red, &*blue),
            TeamColor::Blue => (blue, &*red),
        };
        let Team {
            support_spots,
            roster,
            controlling,
            ..
        } = own;
        let tactics = Tactics {
            ball,
            pitch,
            roster,
            opponents: &opponents.roster,
            opposing_goal: &goals[color.opponent().index()],
            config,
        };
        let controller = controlling.map(|id| roster.player(id));
        support_spots.compute_best(now, &tactics, controller, rng)
    }

    /// Current best support spot, scoring the grid first if it never was.
    pub fn support_position(&mut self, color: TeamColor) -> Option<Vec3> {
        match self.team(color).support_spots.best_position() {
            Some(position) => Some(position),
            None => self.compute_best_supporting_position(color),
        }
    }

    /// The attacker nearest the best support spot, other than the controller.
    pub(crate) fn compute_best_supporting_attacker(&mut self, color: TeamColor) -> Option<PlayerId> {
        let spot = self.support_position(color)?;
        let team = self.team(color);
        let mut best: Option<(f32, PlayerId)> = None;
        for player in team.roster.players() {
            if player.role != Role::Attacker || team.controlling == Some(player.id) {
                continue;
            }
            let distance = player.position().squared_distance_to(spot);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, player.id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Make sure the best placed attacker is supporting the controller.
    pub(crate) fn find_support(&mut self, color: TeamColor) {
        let Some(best) = self.compute_best_supporting_attacker(color) else {
            return;
        };
        let current = self.team(color).supporting;
        if current == Some(best) {
            return;
        }
        if let Some(previous) = current {
            self.send(
                Some(EntityId::Team(color)),
                EntityId::Player(previous),
                SoccerMessage::ReturnHome,
                0.0,
            );
        }
        self.team_mut(color).supporting = Some(best);
        tracing::debug!(team = color.name(), supporter = best.slot(), "new supporting attacker");
        self.send(
            Some(EntityId::Team(color)),
            EntityId::Player(best),
            SoccerMessage::SupportAttacker,
            0.0,
        );
    }

    /// Ask the controller for the ball, if the dice and the pass allow it.
    pub(crate) fn request_pass(&mut self, requester: PlayerId) {
        if self.rng.random::<f32>() > self.config.tactics.pass_request_chance {
            return;
        }
        let color = requester.team();
        let Some(controller) = self.team(color).controlling else {
            return;
        };
        let force = self.config.tactics.max_passing_force;
        let tactics = self.tactics(color);
        let receiver = tactics.roster.player(requester);
        let from = tactics.roster.player(controller).position();
        if tactics.is_pass_safe_from_all_opponents(from, receiver.position(), Some(receiver), force) {
            self.send(
                Some(EntityId::Player(requester)),
                EntityId::Player(controller),
                SoccerMessage::PassToMe { requester },
                0.0,
            );
        }
    }

    pub fn can_shoot(&mut self, color: TeamColor, from: Vec3, force: f32) -> Option<Vec3> {
        let Self {
            ball,
            pitch,
            teams,
            goals,
            config,
            rng,
            ..
        } = self;
        let tactics = Tactics {
            ball,
            pitch,
            roster: &teams[color.index()].roster,
            opponents: &teams[color.opponent().index()].roster,
            opposing_goal: &goals[color.opponent().index()],
            config,
        };
        tactics.can_shoot(from, force, rng)
    }

    /// A random point in the opposing goal mouth.
    pub(crate) fn random_shot_target(&mut self, color: TeamColor) -> Vec3 {
        let Self {
            ball,
            pitch,
            teams,
            goals,
            config,
            rng,
            ..
        } = self;
        let tactics = Tactics {
            ball,
            pitch,
            roster: &teams[color.index()].roster,
            opponents: &teams[color.opponent().index()].roster,
            opposing_goal: &goals[color.opponent().index()],
            config,
        };
        tactics.random_mouth_point(rng)
    }

    pub fn find_pass(&self, passer: PlayerId, force: f32, min_distance: f32) -> Option<Pass> {
        let tactics = self.tactics(passer.team());
        tactics.find_pass(tactics.roster.player(passer), force, min_distance)
    }
}
