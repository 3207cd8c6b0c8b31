use serde::{Deserialize, Serialize};

use crate::team::TeamColor;

/// Data-driven configuration for a soccer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SoccerConfig {
    pub pitch: PitchConfig,
    pub ball: BallConfig,
    pub goal: GoalConfig,
    pub player: PlayerConfig,
    pub tactics: TacticsConfig,
    pub goalkeeper: GoalkeeperConfig,
    pub support_spots: SupportSpotConfig,
    pub formation: FormationConfig,
    #[serde(rename = "match")]
    pub timing: MatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Extent along the goal-to-goal (x) axis.
    pub width: f32,
    /// Extent along the lateral (z) axis.
    pub height: f32,
    pub region_columns: usize,
    pub region_rows: usize,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 15.0,
            region_columns: 6,
            region_rows: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Kilograms.
    pub mass: f32,
    /// Metres per second.
    pub max_speed: f32,
    /// Braking force opposing the velocity. Must be negative.
    pub friction: f32,
    pub bounding_radius: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            mass: 0.44,
            max_speed: 42.0,
            friction: -0.8,
            bounding_radius: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub mass: f32,
    pub max_force: f32,
    /// Radians per second.
    pub max_turn_rate: f32,
    pub bounding_radius: f32,
    /// Arrive braking constant; larger values brake earlier.
    pub arrive_deceleration: f32,
    /// Field player top speed while controlling the ball.
    pub max_speed_with_ball: f32,
    pub max_speed_without_ball: f32,
    pub goalkeeper_max_speed: f32,
    /// In `[0, 1]`. Lower values add more kick noise.
    pub accuracy: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            max_force: 100.0,
            max_turn_rate: std::f32::consts::PI,
            bounding_radius: 0.25,
            arrive_deceleration: 1.5,
            max_speed_with_ball: 1.8,
            max_speed_without_ball: 1.6,
            goalkeeper_max_speed: 1.5,
            accuracy: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    /// Opponents closer than this (and in front) make a player feel threatened.
    pub comfort_zone: f32,
    /// Kicks per second a field player may make.
    pub kick_frequency: f32,
    pub in_target_range: f32,
    pub kicking_distance: f32,
    pub receiving_range: f32,
    pub max_passing_force: f32,
    pub max_shooting_force: f32,
    pub dribble_force: f32,
    pub dribble_turn_force: f32,
    pub min_pass_distance: f32,
    /// Random mouth points sampled per shot evaluation.
    pub shot_attempts: usize,
    pub pot_shot_chance: f32,
    /// Chance a receiver arrives at the pass target instead of pursuing the ball.
    pub arrive_receive_chance: f32,
    /// Opponents inside this radius force a receiver to pursue the ball.
    pub pass_threat_radius: f32,
    /// Probability that a pass request is considered at all.
    pub pass_request_chance: f32,
    /// Interception radius per second of ball travel, as a fraction of the
    /// receiver's top speed.
    pub interception_scale: f32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            comfort_zone: 2.0,
            kick_frequency: 1.0,
            in_target_range: 0.5,
            kicking_distance: 0.3,
            receiving_range: 0.5,
            max_passing_force: 3.0,
            max_shooting_force: 4.0,
            dribble_force: 0.6,
            dribble_turn_force: 0.4,
            min_pass_distance: 5.0,
            shot_attempts: 5,
            pot_shot_chance: 0.005,
            arrive_receive_chance: 0.5,
            pass_threat_radius: 3.0,
            pass_request_chance: 0.1,
            interception_scale: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalkeeperConfig {
    /// How close the ball must be for the keeper to trap it.
    pub in_target_range: f32,
    pub intercept_range: f32,
    /// Stand-off between the goal line and the keeper along the ball line.
    pub tending_distance: f32,
    pub min_pass_distance: f32,
}

impl Default for GoalkeeperConfig {
    fn default() -> Self {
        Self {
            in_target_range: 0.5,
            intercept_range: 3.0,
            tending_distance: 2.0,
            min_pass_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportSpotConfig {
    pub slices_x: usize,
    pub slices_y: usize,
    pub can_pass_score: f32,
    pub can_score_score: f32,
    pub distance_score: f32,
    pub optimal_distance: f32,
    /// Recomputations per second.
    pub update_frequency: f32,
}

impl Default for SupportSpotConfig {
    fn default() -> Self {
        Self {
            slices_x: 12,
            slices_y: 5,
            can_pass_score: 2.0,
            can_score_score: 1.0,
            distance_score: 2.0,
            optimal_distance: 5.0,
            update_frequency: 1.0,
        }
    }
}

/// Home region ids per roster slot: goalkeeper, two attackers, two defenders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub red_defending: [usize; 5],
    pub red_attacking: [usize; 5],
    pub blue_defending: [usize; 5],
    pub blue_attacking: [usize; 5],
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            red_defending: [16, 9, 11, 12, 14],
            red_attacking: [16, 3, 5, 9, 13],
            blue_defending: [1, 6, 8, 3, 5],
            blue_attacking: [1, 12, 14, 6, 4],
        }
    }
}

impl FormationConfig {
    pub fn regions(&self, color: TeamColor, attacking: bool) -> [usize; 5] {
        match (color, attacking) {
            (TeamColor::Red, false) => self.red_defending,
            (TeamColor::Red, true) => self.red_attacking,
            (TeamColor::Blue, false) => self.blue_defending,
            (TeamColor::Blue, true) => self.blue_attacking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fixed step rate in Hz.
    pub tick_rate: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { tick_rate: 60.0 }
    }
}

impl SoccerConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("KICKOFF_SOCCER_CONFIG")
            && let Ok(contents) = std::fs::read_to_string(&path)
        {
            return Self::parse_or_default(&contents, &path);
        }
        if let Ok(contents) = std::fs::read_to_string("config/soccer.toml") {
            return Self::parse_or_default(&contents, "config/soccer.toml");
        }
        Self::default()
    }

    fn parse_or_default(contents: &str, source: &str) -> Self {
        match toml::from_str::<Self>(contents) {
            Ok(config) => {
                tracing::debug!(source, "loaded soccer config");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to parse {source}: {e}, using defaults");
                Self::default()
            },
        }
    }

    /// Human-readable problems that would make the simulation misbehave.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.pitch.width <= 0.0 || self.pitch.height <= 0.0 {
            problems.push("pitch width and height must be positive".to_string());
        }
        if self.pitch.region_columns == 0 || self.pitch.region_rows == 0 {
            problems.push("pitch must have at least one region column and row".to_string());
        }
        if self.ball.mass <= 0.0 {
            problems.push("ball mass must be positive".to_string());
        }
        if self.ball.friction >= 0.0 {
            problems.push(format!(
                "ball friction must be negative, got {}",
                self.ball.friction
            ));
        }
        if self.player.mass <= 0.0 {
            problems.push("player mass must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.player.accuracy) {
            problems.push(format!(
                "player accuracy must be within [0, 1], got {}",
                self.player.accuracy
            ));
        }
        if self.goal.width >= self.pitch.height {
            problems.push("goal must be narrower than the pitch".to_string());
        }
        if self.support_spots.slices_x < 4 || self.support_spots.slices_y == 0 {
            problems.push("support spot grid needs slices_x >= 4 and slices_y >= 1".to_string());
        }
        if self.timing.tick_rate <= 0.0 {
            problems.push("tick rate must be positive".to_string());
        }

        let region_count = self.pitch.region_columns * self.pitch.region_rows;
        let formation = &self.formation;
        for (name, regions) in [
            ("red_defending", &formation.red_defending),
            ("red_attacking", &formation.red_attacking),
            ("blue_defending", &formation.blue_defending),
            ("blue_attacking", &formation.blue_attacking),
        ] {
            if let Some(id) = regions.iter().find(|&&id| id >= region_count) {
                problems.push(format!(
                    "formation {name} references region {id}, pitch has {region_count}"
                ));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SoccerConfig::default();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    #[test]
    fn default_values() {
        let cfg = SoccerConfig::default();
        assert_eq!(cfg.pitch.width, 20.0);
        assert_eq!(cfg.pitch.height, 15.0);
        assert_eq!(cfg.ball.mass, 0.44);
        assert_eq!(cfg.ball.friction, -0.8);
        assert_eq!(cfg.formation.red_defending, [16, 9, 11, 12, 14]);
        assert!(cfg.player.max_speed_with_ball > cfg.player.max_speed_without_ball);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[ball]
friction = -1.0

[tactics]
shot_attempts = 8

[match]
tick_rate = 30.0
"#;
        let cfg: SoccerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.ball.friction, -1.0);
        assert_eq!(cfg.ball.mass, 0.44);
        assert_eq!(cfg.tactics.shot_attempts, 8);
        assert_eq!(cfg.timing.tick_rate, 30.0);
        assert_eq!(cfg.pitch, PitchConfig::default());
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let cfg = SoccerConfig::parse_or_default("[ball\nmass = ", "inline");
        assert_eq!(cfg, SoccerConfig::default());
    }

    #[test]
    fn validate_rejects_positive_friction() {
        let mut cfg = SoccerConfig::default();
        cfg.ball.friction = 0.5;
        let problems = cfg.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("friction"));
    }

    #[test]
    fn validate_rejects_unknown_region() {
        let mut cfg = SoccerConfig::default();
        cfg.formation.blue_attacking[2] = 18;
        let problems = cfg.validate();
        assert!(problems.iter().any(|p| p.contains("blue_attacking")));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped: SoccerConfig =
            toml::from_str(include_str!("../../../../config/soccer.toml")).unwrap();
        assert_eq!(shipped, SoccerConfig::default());
    }

    #[test]
    fn formation_lookup() {
        let formation = FormationConfig::default();
        assert_eq!(formation.regions(TeamColor::Red, false), formation.red_defending);
        assert_eq!(formation.regions(TeamColor::Blue, true), formation.blue_attacking);
    }

    #[test]
    fn roundtrips_through_toml() {
        let cfg = SoccerConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        let parsed: SoccerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }
}
