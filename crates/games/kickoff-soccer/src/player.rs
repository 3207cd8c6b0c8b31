use std::f32::consts::PI;

use kickoff_core::fsm::StateMachine;
use kickoff_core::geometry::Vec3;
use kickoff_core::regulator::Regulator;
use kickoff_core::steering::{Evader, SteeringBehaviors, Vehicle};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ball::Ball;
use crate::config::SoccerConfig;
use crate::states::{FieldPlayerState, GoalkeeperState};
use crate::team::TeamColor;
use crate::SoccerMatch;

/// Players per team.
pub const ROSTER_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Goalkeeper,
    Attacker,
    Defender,
}

/// Stable handle to a player: its team and roster slot. Slot 0 is always
/// the goalkeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId {
    team: TeamColor,
    slot: u8,
}

impl PlayerId {
    pub(crate) fn new(team: TeamColor, slot: usize) -> Self {
        debug_assert!(slot < ROSTER_SIZE, "roster slot {slot} out of range");
        Self {
            team,
            slot: slot as u8,
        }
    }

    pub fn team(self) -> TeamColor {
        self.team
    }

    pub fn slot(self) -> usize {
        usize::from(self.slot)
    }

    pub fn is_goalkeeper(self) -> bool {
        self.slot == 0
    }

    /// Index into the field player array. Meaningless for the goalkeeper.
    pub(crate) fn field_index(self) -> usize {
        self.slot().saturating_sub(1)
    }
}

/// State shared by every player type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub role: Role,
    pub vehicle: Vehicle,
    pub steering: SteeringBehaviors,
    /// Where seek and arrive are heading.
    pub steering_target: Vec3,
    pub home_region: usize,
    /// Region restored by a return-home order.
    pub default_region: usize,
    pub accuracy: f32,
}

impl Player {
    pub fn new(
        id: PlayerId,
        role: Role,
        region: usize,
        position: Vec3,
        yaw: f32,
        config: &SoccerConfig,
    ) -> Self {
        let player = &config.player;
        let max_speed = match role {
            Role::Goalkeeper => player.goalkeeper_max_speed,
            _ => player.max_speed_without_ball,
        };
        Self {
            id,
            role,
            vehicle: Vehicle {
                position,
                velocity: Vec3::ZERO,
                heading: Vec3::from_yaw(yaw),
                mass: player.mass,
                max_speed,
                max_force: player.max_force,
                max_turn_rate: player.max_turn_rate,
                bounding_radius: player.bounding_radius,
                // Keepers keep their eyes on the ball instead of their path.
                update_orientation: role != Role::Goalkeeper,
            },
            steering: SteeringBehaviors::new(player.arrive_deceleration),
            steering_target: position,
            home_region: region,
            default_region: region,
            accuracy: player.accuracy,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.vehicle.position
    }

    pub fn set_default_home_region(&mut self) {
        self.home_region = self.default_region;
    }

    pub fn is_position_in_front_of(&self, point: Vec3) -> bool {
        self.vehicle.is_in_front(point)
    }

    /// Rotate `target` about the player by a random angle that shrinks as
    /// accuracy grows.
    pub fn add_noise<R: Rng>(&self, target: Vec3, rng: &mut R) -> Vec3 {
        let displacement = (PI - PI * self.accuracy) * rng.random_range(-1.0f32..=1.0);
        let position = self.position();
        (target - position).rotate_y(displacement) + position
    }

    /// Integrate one step of steering. Pursuit chases the ball.
    pub fn steer(&mut self, ball: &Ball, dt: f32) {
        let evader = Evader {
            position: ball.position,
            velocity: ball.velocity,
        };
        let force = self
            .steering
            .calculate(&self.vehicle, self.steering_target, Some(evader));
        self.vehicle.integrate(force, dt);
    }

    pub fn stop(&mut self) {
        self.vehicle.velocity = Vec3::ZERO;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlayer {
    pub base: Player,
    pub fsm: StateMachine<FieldPlayerState>,
    pub kick_regulator: Regulator,
}

impl FieldPlayer {
    pub fn new(base: Player, config: &SoccerConfig) -> Self {
        Self {
            base,
            fsm: StateMachine::with_global(FieldPlayerState::Global),
            kick_regulator: Regulator::new(config.tactics.kick_frequency),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goalkeeper {
    pub base: Player,
    pub fsm: StateMachine<GoalkeeperState>,
}

impl Goalkeeper {
    pub fn new(base: Player) -> Self {
        Self {
            base,
            fsm: StateMachine::with_global(GoalkeeperState::Global),
        }
    }

    /// Point on the goal line the keeper covers: the ball's lateral
    /// coordinate scaled down to the goal mouth.
    pub fn rear_interpose_target(goal_position: Vec3, goal_width: f32, pitch_height: f32, ball: Vec3) -> Vec3 {
        Vec3::new(
            goal_position.x,
            0.0,
            ball.z * (goal_width / pitch_height),
        )
    }
}

/// Player-level queries that need the whole match.
impl SoccerMatch {
    pub fn player(&self, id: PlayerId) -> &Player {
        self.team(id.team()).roster.player(id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        self.team_mut(id.team()).roster.player_mut(id)
    }

    pub fn is_controlling_player(&self, id: PlayerId) -> bool {
        self.team(id.team()).controlling == Some(id)
    }

    pub fn is_closest_team_member_to_ball(&self, id: PlayerId) -> bool {
        self.team(id.team()).closest_to_ball == Some(id)
    }

    /// Closest to the ball across both teams. Red wins exact ties.
    pub fn is_closest_player_on_pitch_to_ball(&self, id: PlayerId) -> bool {
        if !self.is_closest_team_member_to_ball(id) {
            return false;
        }
        let ball = self.ball.position;
        let own = self.player(id).position().squared_distance_to(ball);
        let Some(rival) = self.team(id.team().opponent()).closest_to_ball else {
            return true;
        };
        let theirs = self.player(rival).position().squared_distance_to(ball);
        match id.team() {
            TeamColor::Red => own <= theirs,
            TeamColor::Blue => own < theirs,
        }
    }

    fn ball_within(&self, id: PlayerId, range: f32) -> bool {
        self.player(id)
            .position()
            .squared_distance_to(self.ball.position)
            <= range * range
    }

    pub fn is_ball_within_kicking_range(&self, id: PlayerId) -> bool {
        self.ball_within(id, self.config.tactics.kicking_distance)
    }

    pub fn is_ball_within_receiving_range(&self, id: PlayerId) -> bool {
        self.ball_within(id, self.config.tactics.receiving_range)
    }

    pub fn is_ball_within_keeper_range(&self, id: PlayerId) -> bool {
        self.ball_within(id, self.config.goalkeeper.in_target_range)
    }

    /// Field players must be well inside their region; keepers anywhere in it.
    pub fn is_in_home_region(&self, id: PlayerId) -> bool {
        let player = self.player(id);
        self.pitch
            .region(player.home_region)
            .is_some_and(|region| region.contains(player.position(), player.role != Role::Goalkeeper))
    }

    pub fn is_at_target(&self, id: PlayerId) -> bool {
        let player = self.player(id);
        let range = self.config.tactics.in_target_range;
        player.position().squared_distance_to(player.steering_target) < range * range
    }

    /// An opponent is in front of the player and inside its comfort zone.
    pub fn is_threatened(&self, id: PlayerId) -> bool {
        let player = self.player(id);
        let comfort = self.config.tactics.comfort_zone;
        self.team(id.team().opponent()).roster.players().any(|opponent| {
            player.is_position_in_front_of(opponent.position())
                && player.position().squared_distance_to(opponent.position()) < comfort * comfort
        })
    }

    /// Closer to the opposing goal than the controlling team mate.
    pub fn is_ahead_of_attacker(&self, id: PlayerId) -> bool {
        let Some(controller) = self.team(id.team()).controlling else {
            return false;
        };
        let goal = self.opposing_goal(id.team()).position;
        self.player(id).position().squared_distance_to(goal)
            < self.player(controller).position().squared_distance_to(goal)
    }

    /// Within a third of the pitch length of the opposing goal line.
    pub fn is_in_hot_region(&self, id: PlayerId) -> bool {
        let goal = self.opposing_goal(id.team()).position;
        (self.player(id).position().x - goal.x).abs() < self.pitch.width() / 3.0
    }

    pub fn is_opponent_within_radius(&self, id: PlayerId, radius: f32) -> bool {
        let position = self.player(id).position();
        self.team(id.team().opponent())
            .roster
            .players()
            .any(|opponent| opponent.position().squared_distance_to(position) <= radius * radius)
    }

    pub fn rear_interpose_target(&self, keeper: PlayerId) -> Vec3 {
        let goal = self.home_goal(keeper.team());
        Goalkeeper::rear_interpose_target(
            goal.position,
            goal.width,
            self.pitch.height(),
            self.ball.position,
        )
    }

    pub fn is_too_far_from_goal_mouth(&self, keeper: PlayerId) -> bool {
        let range = self.config.goalkeeper.intercept_range;
        self.player(keeper)
            .position()
            .squared_distance_to(self.rear_interpose_target(keeper))
            > range * range
    }

    pub fn is_ball_within_range_for_intercept(&self, keeper: PlayerId) -> bool {
        let range = self.config.goalkeeper.intercept_range;
        self.home_goal(keeper.team())
            .position
            .squared_distance_to(self.ball.position)
            <= range * range
    }

    /// Kick target perturbed by the player's accuracy.
    pub(crate) fn add_noise(&mut self, id: PlayerId, target: Vec3) -> Vec3 {
        let Self { teams, rng, .. } = self;
        teams[id.team().index()]
            .roster
            .player(id)
            .add_noise(target, rng)
    }
}
