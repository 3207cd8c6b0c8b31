//! Autonomous two-team soccer.
//!
//! [`SoccerMatch`] owns every entity in a match: the pitch, the ball, both
//! goals and both teams with their rosters. Entities refer to each other
//! through [`PlayerId`] and [`TeamColor`] handles, never through references,
//! and all decisions are made by the state machines in [`states`].

pub mod ball;
pub mod config;
pub mod goal;
pub mod messages;
pub mod pitch;
pub mod player;
pub mod states;
pub mod support_spots;
pub mod tactics;
pub mod team;

use kickoff_core::fsm::Agent;
use kickoff_core::geometry::Vec3;
use kickoff_core::messaging::{MessageDispatcher, Postbox};
use kickoff_core::simulation::{Simulation, SimulationMetadata};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use ball::Ball;
use config::SoccerConfig;
use goal::Goal;
use messages::{EntityId, SoccerMessage, SoccerTelegram};
use pitch::Pitch;
use player::{PlayerId, ROSTER_SIZE, Role};
use states::{
    FieldPlayerAgent, FieldPlayerState, GoalkeeperAgent, GoalkeeperState, TeamAgent, TeamState,
};
use team::{Team, TeamColor};

/// Something worth telling the host about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    GoalScored {
        scorer: TeamColor,
        red: u32,
        blue: u32,
    },
    /// Both teams are in position and play has (re)started.
    KickOff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub color: TeamColor,
    pub goals: u32,
    pub state: String,
    pub controlling: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: PlayerId,
    pub team: TeamColor,
    pub role: Role,
    pub position: Vec3,
    /// Heading angle about the vertical axis.
    pub yaw: f32,
    pub state: String,
}

/// Everything a renderer or debug overlay needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub is_playing: bool,
    pub goalkeeper_has_ball: bool,
    pub teams: [TeamSnapshot; 2],
    pub ball: BallSnapshot,
    pub players: Vec<EntitySnapshot>,
}

/// One match: the single owner of all mutable match state.
#[derive(Debug, Clone)]
pub struct SoccerMatch {
    config: SoccerConfig,
    ball: Ball,
    pitch: Pitch,
    /// Indexed by the defending team.
    goals: [Goal; 2],
    teams: [Team; 2],
    dispatcher: MessageDispatcher<EntityId, SoccerMessage>,
    rng: StdRng,
    elapsed: f64,
    /// Length of the step being simulated.
    delta: f32,
    tick: u64,
    paused: bool,
}

impl SoccerMatch {
    /// Build a match with every player in its defending home region and both
    /// teams preparing for kick off.
    pub fn new(config: SoccerConfig, seed: u64) -> Self {
        let pitch = Pitch::new(&config.pitch);
        let half_length = pitch.width() * 0.5;
        // Red defends the +x goal line, blue the -x one.
        let goals = [
            Goal::new(
                TeamColor::Red,
                Vec3::new(half_length, 0.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                config.goal.width,
                config.goal.height,
            ),
            Goal::new(
                TeamColor::Blue,
                Vec3::new(-half_length, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                config.goal.width,
                config.goal.height,
            ),
        ];
        let teams = [
            Team::new(TeamColor::Red, &pitch, &config),
            Team::new(TeamColor::Blue, &pitch, &config),
        ];

        let mut world = Self {
            ball: Ball::new(&config.ball),
            pitch,
            goals,
            teams,
            dispatcher: MessageDispatcher::new(),
            rng: StdRng::seed_from_u64(seed),
            elapsed: 0.0,
            delta: 0.0,
            tick: 0,
            paused: false,
            config,
        };

        for color in TeamColor::ALL {
            GoalkeeperAgent {
                world: &mut world,
                id: PlayerId::new(color, 0),
            }
            .change_state(GoalkeeperState::ReturnHome);
            for slot in 1..ROSTER_SIZE {
                FieldPlayerAgent {
                    world: &mut world,
                    id: PlayerId::new(color, slot),
                }
                .change_state(FieldPlayerState::Wait);
            }
        }
        for color in TeamColor::ALL {
            TeamAgent {
                world: &mut world,
                color,
            }
            .change_state(TeamState::PrepareForKickoff);
        }
        world
    }

    pub fn config(&self) -> &SoccerConfig {
        &self.config
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    /// Direct access for hosts that place the ball, e.g. scripted scenarios.
    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn pitch(&self) -> &Pitch {
        &self.pitch
    }

    pub fn home_goal(&self, color: TeamColor) -> &Goal {
        &self.goals[color.index()]
    }

    pub fn opposing_goal(&self, color: TeamColor) -> &Goal {
        &self.goals[color.opponent().index()]
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Delayed messages still waiting for delivery.
    pub fn pending_messages(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Kick the ball from where it lies toward `target` with `power`.
    pub(crate) fn kick_ball_toward(&mut self, target: Vec3, power: f32) {
        let direction = (target - self.ball.position).normalize();
        self.ball.kick(direction * power);
    }

    fn update_player(&mut self, id: PlayerId, dt: f32) {
        if id.is_goalkeeper() {
            GoalkeeperAgent { world: self, id }.update_state();
        } else {
            FieldPlayerAgent { world: self, id }.update_state();
        }

        let Self { teams, ball, .. } = self;
        let roster = &mut teams[id.team().index()].roster;
        let watches_ball = id.is_goalkeeper()
            || roster
                .field_player(id)
                .fsm
                .current()
                .is_some_and(FieldPlayerState::watches_ball);
        let player = roster.player_mut(id);
        player.steer(ball, dt);
        if watches_ball {
            player.vehicle.rotate_to(ball.position, dt);
        }
    }

    /// The team that scored, if the last ball step crossed a goal mouth.
    fn detect_goal(&mut self) -> Option<TeamColor> {
        let from = self.ball.previous_position();
        let to = self.ball.position;
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.is_crossed_by(from, to))?;
        goal.goals_scored += 1;
        Some(goal.owner.opponent())
    }

    fn on_goal(&mut self, scorer: TeamColor) -> MatchEvent {
        self.ball.place_at(Vec3::ZERO);
        for receiver in [
            EntityId::Team(TeamColor::Red),
            EntityId::Team(TeamColor::Blue),
            EntityId::Pitch,
        ] {
            self.send(None, receiver, SoccerMessage::GoalScored { scorer }, 0.0);
        }
        let red = self.team(TeamColor::Red).goals;
        let blue = self.team(TeamColor::Blue).goals;
        tracing::info!(scorer = scorer.name(), red, blue, "goal");
        MatchEvent::GoalScored { scorer, red, blue }
    }
}

impl Postbox for SoccerMatch {
    type Address = EntityId;
    type Message = SoccerMessage;

    fn dispatcher(&mut self) -> &mut MessageDispatcher<EntityId, SoccerMessage> {
        &mut self.dispatcher
    }

    fn now(&self) -> f64 {
        self.elapsed
    }

    fn deliver(&mut self, telegram: &SoccerTelegram) -> bool {
        let message = &telegram.message;
        let handled = match telegram.receiver {
            EntityId::Pitch => match message {
                SoccerMessage::GoalScored { .. } => {
                    self.pitch.is_playing = false;
                    true
                },
                _ => false,
            },
            EntityId::Team(color) => TeamAgent { world: self, color }.handle_message(message),
            EntityId::Player(id) if id.is_goalkeeper() => {
                GoalkeeperAgent { world: self, id }.handle_message(message)
            },
            EntityId::Player(id) => FieldPlayerAgent { world: self, id }.handle_message(message),
        };
        if !handled {
            tracing::debug!(
                receiver = ?telegram.receiver,
                message = message.name(),
                "message dropped"
            );
        }
        handled
    }
}

impl Simulation for SoccerMatch {
    type Snapshot = MatchSnapshot;
    type Event = MatchEvent;

    fn metadata(&self) -> SimulationMetadata {
        SimulationMetadata {
            name: "Kickoff Soccer".to_string(),
            description: "Two autonomous five-a-side teams driven by state machines.".to_string(),
            agent_count: self.teams.len() * (ROSTER_SIZE + 1),
        }
    }

    fn update(&mut self, dt: f32) -> Vec<MatchEvent> {
        if self.paused {
            return Vec::new();
        }
        let mut events = Vec::new();
        let was_playing = self.pitch.is_playing;
        self.elapsed += f64::from(dt);
        self.delta = dt;

        let ball = self.ball.position;
        for team in &mut self.teams {
            team.compute_closest_to_ball(ball);
        }

        for color in TeamColor::ALL {
            TeamAgent { world: self, color }.update_state();
        }

        for color in TeamColor::ALL {
            for slot in 0..ROSTER_SIZE {
                self.update_player(PlayerId::new(color, slot), dt);
            }
        }

        self.ball.step(dt);
        if let Some(scorer) = self.detect_goal() {
            events.push(self.on_goal(scorer));
        } else {
            self.ball.collide_with_walls(&self.pitch.walls);
        }

        self.dispatch_delayed();

        if !was_playing && self.pitch.is_playing {
            events.push(MatchEvent::KickOff);
        }
        self.tick += 1;
        events
    }

    fn snapshot(&self) -> MatchSnapshot {
        let teams = TeamColor::ALL.map(|color| {
            let team = self.team(color);
            TeamSnapshot {
                color,
                goals: team.goals,
                state: team
                    .fsm
                    .current()
                    .map_or("NONE", TeamState::name)
                    .to_string(),
                controlling: team.controlling,
            }
        });
        let players = self
            .teams
            .iter()
            .flat_map(|team| {
                team.roster.players().map(move |player| EntitySnapshot {
                    id: player.id,
                    team: team.color,
                    role: player.role,
                    position: player.position(),
                    yaw: player.vehicle.heading.yaw(),
                    state: team.roster.state_name(player.id).to_string(),
                })
            })
            .collect();

        MatchSnapshot {
            tick: self.tick,
            elapsed: self.elapsed,
            is_playing: self.pitch.is_playing,
            goalkeeper_has_ball: self.pitch.goalkeeper_has_ball,
            teams,
            ball: BallSnapshot {
                position: self.ball.position,
                velocity: self.ball.velocity,
            },
            players,
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.timing.tick_rate
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }

    kickoff_core::simulation_pause_boilerplate!();
}
