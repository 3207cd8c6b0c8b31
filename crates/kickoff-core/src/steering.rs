//! Force-based steering for moving agents.
//!
//! Each behaviour returns the force needed to turn the current velocity into
//! a desired velocity. Active behaviours are summed in priority order and the
//! total is truncated to the vehicle's `max_force` before integration.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Below this speed a vehicle keeps its previous heading.
const MIN_SPEED_SQ_FOR_HEADING: f32 = 1e-8;

/// Pursuers facing an evader this head-on simply seek its current position.
const HEAD_ON_COS: f32 = -0.95;

/// Kinematic state and limits of a steerable entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit forward vector on the XZ plane.
    pub heading: Vec3,
    pub mass: f32,
    pub max_speed: f32,
    pub max_force: f32,
    /// Radians per second.
    pub max_turn_rate: f32,
    pub bounding_radius: f32,
    /// Align the heading with the velocity after each integration step.
    pub update_orientation: bool,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            heading: Vec3::FORWARD,
            mass: 1.0,
            max_speed: 1.0,
            max_force: 100.0,
            max_turn_rate: std::f32::consts::PI,
            bounding_radius: 0.0,
            update_orientation: true,
        }
    }
}

impl Vehicle {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Advance one step under `force` (semi-implicit Euler).
    pub fn integrate(&mut self, force: Vec3, dt: f32) {
        if self.mass > 0.0 {
            let acceleration = force / self.mass;
            self.velocity += acceleration * dt;
        }
        self.velocity = self.velocity.clamp_length(self.max_speed);
        self.position += self.velocity * dt;

        if self.update_orientation && self.velocity.length_squared() > MIN_SPEED_SQ_FOR_HEADING {
            self.heading = self.velocity.normalize();
        }
    }

    /// Turn toward `target` by at most `max_turn_rate * dt` radians.
    /// Returns `true` once the heading points at the target.
    pub fn rotate_to(&mut self, target: Vec3, dt: f32) -> bool {
        let to_target = target - self.position;
        let to_target = Vec3::new(to_target.x, 0.0, to_target.z);
        if to_target.length_squared() == 0.0 {
            return true;
        }
        let current = self.heading.yaw();
        let desired = to_target.yaw();
        let delta = wrap_angle(desired - current);
        let max_step = (self.max_turn_rate * dt).max(0.0);

        if delta.abs() <= max_step {
            self.heading = Vec3::from_yaw(desired);
            true
        } else {
            self.heading = Vec3::from_yaw(current + max_step * delta.signum());
            false
        }
    }

    /// Whether `point` lies in the half-space the vehicle faces.
    pub fn is_in_front(&self, point: Vec3) -> bool {
        self.heading.dot(point - self.position) > 0.0
    }
}

/// Position and velocity of something being chased.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evader {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// The behaviour set carried by one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringBehaviors {
    pub seek: bool,
    pub arrive: bool,
    pub pursuit: bool,
    /// Larger values brake earlier when arriving.
    pub deceleration: f32,
}

impl SteeringBehaviors {
    pub fn new(deceleration: f32) -> Self {
        Self {
            seek: false,
            arrive: false,
            pursuit: false,
            deceleration,
        }
    }

    /// Combined steering force. `target` feeds seek and arrive; `evader`
    /// feeds pursuit, which is skipped when there is nothing to chase.
    pub fn calculate(&self, vehicle: &Vehicle, target: Vec3, evader: Option<Evader>) -> Vec3 {
        let mut total = Vec3::ZERO;

        if self.seek && !accumulate(&mut total, seek(vehicle, target), vehicle.max_force) {
            return total;
        }
        if self.arrive
            && !accumulate(
                &mut total,
                arrive(vehicle, target, self.deceleration),
                vehicle.max_force,
            )
        {
            return total;
        }
        if self.pursuit
            && let Some(evader) = evader
        {
            accumulate(&mut total, pursuit(vehicle, evader), vehicle.max_force);
        }
        total
    }
}

/// Prioritised truncated sum. Returns `false` once the budget is spent.
fn accumulate(total: &mut Vec3, force: Vec3, max_force: f32) -> bool {
    let remaining = max_force - total.length();
    if remaining <= 0.0 {
        return false;
    }
    let magnitude = force.length();
    if magnitude < remaining {
        *total += force;
        true
    } else {
        *total += force.normalize() * remaining;
        false
    }
}

/// Force steering straight at `target` at full speed.
pub fn seek(vehicle: &Vehicle, target: Vec3) -> Vec3 {
    let desired = (target - vehicle.position).normalize() * vehicle.max_speed;
    desired - vehicle.velocity
}

/// Like [`seek`], but slows down proportionally to the remaining distance.
pub fn arrive(vehicle: &Vehicle, target: Vec3, deceleration: f32) -> Vec3 {
    let to_target = target - vehicle.position;
    let distance = to_target.length();
    if distance <= 1e-5 || deceleration <= 0.0 {
        return Vec3::ZERO;
    }
    let speed = (distance / deceleration).min(vehicle.max_speed);
    let desired = to_target * (speed / distance);
    desired - vehicle.velocity
}

/// Seek the evader's predicted position.
pub fn pursuit(vehicle: &Vehicle, evader: Evader) -> Vec3 {
    let to_evader = evader.position - vehicle.position;
    let evader_heading = evader.velocity.normalize();
    let relative_heading = vehicle.heading.dot(evader_heading);

    if to_evader.dot(vehicle.heading) > 0.0 && relative_heading < HEAD_ON_COS {
        return seek(vehicle, evader.position);
    }

    let closing_speed = vehicle.max_speed + evader.velocity.length();
    let look_ahead = if closing_speed > 0.0 {
        to_evader.length() / closing_speed
    } else {
        0.0
    };
    seek(vehicle, evader.position + evader.velocity * look_ahead)
}

/// Wrap an angle into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
