use kickoff_core::geometry::{Plane, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::BallConfig;

/// Squared speed below which the ball is considered at rest.
const REST_SPEED_SQ: f32 = 1e-4;

/// The match ball. Impulse kicks, linear friction, no spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec3,
    pub velocity: Vec3,
    previous_position: Vec3,
    pub mass: f32,
    pub max_speed: f32,
    /// Negative braking force applied along the velocity.
    pub friction: f32,
    pub bounding_radius: f32,
}

impl Ball {
    pub fn new(config: &BallConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            previous_position: Vec3::ZERO,
            mass: config.mass,
            max_speed: config.max_speed,
            friction: config.friction,
            bounding_radius: config.bounding_radius,
        }
    }

    /// Position at the start of the last physics step.
    pub fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Replace the velocity with `force / mass`. Kicks are not additive.
    pub fn kick(&mut self, force: Vec3) {
        self.velocity = force / self.mass;
    }

    pub fn trap(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    pub fn place_at(&mut self, position: Vec3) {
        self.position = position;
        self.previous_position = position;
        self.velocity = Vec3::ZERO;
    }

    /// Apply friction and move. Collisions are resolved separately.
    pub fn step(&mut self, dt: f32) {
        self.previous_position = self.position;

        let speed = self.velocity.length();
        if speed > 0.0 {
            // Friction may stop the ball but never reverses it.
            let braked = (speed + self.friction / self.mass * dt).max(0.0);
            self.velocity = self.velocity * (braked / speed);
        }
        if self.velocity.length_squared() < REST_SPEED_SQ {
            self.velocity = Vec3::ZERO;
        }

        self.velocity = self.velocity.clamp_length(self.max_speed);
        self.position += self.velocity * dt;
    }

    /// Bounce off the closest wall crossed during the last step.
    ///
    /// On a hit the ball is put back where the step started and its velocity
    /// is mirrored about the wall normal. Returns whether a wall was hit.
    pub fn collide_with_walls(&mut self, walls: &[Plane]) -> bool {
        let Some(ray) = Ray::between(self.previous_position, self.position) else {
            return false;
        };
        let travelled = self.previous_position.squared_distance_to(self.position);

        let mut closest: Option<(f32, &Plane)> = None;
        for wall in walls {
            let Some(hit) = ray.intersect_plane(wall) else {
                continue;
            };
            let distance = self.previous_position.squared_distance_to(hit);
            if distance <= travelled && closest.is_none_or(|(best, _)| distance < best) {
                closest = Some((distance, wall));
            }
        }

        match closest {
            Some((_, wall)) => {
                self.position = self.previous_position;
                self.velocity = self.velocity.reflect(wall.normal);
                true
            },
            None => false,
        }
    }

    /// Seconds the ball needs to travel `distance` when kicked with `force`,
    /// or `-1.0` if friction stops it first.
    pub fn time_to_cover(&self, distance: f32, force: f32) -> f32 {
        let speed = force / self.mass;
        // v^2 = u^2 + 2as
        let term = speed * speed + 2.0 * self.friction / self.mass * distance;
        if term <= 0.0 {
            return -1.0;
        }
        // t = (v - u) / a
        (term.sqrt() - speed) / (self.friction / self.mass)
    }

    pub fn time_to_cover_distance(&self, from: Vec3, to: Vec3, force: f32) -> f32 {
        self.time_to_cover(from.distance_to(to), force)
    }
}
