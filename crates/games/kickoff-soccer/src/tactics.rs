//! Pass and shot evaluation.
//!
//! Every query works on a read-only [`Tactics`] view of one team's situation,
//! so callers can hold it while mutating unrelated parts of the match.

use kickoff_core::geometry::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ball::Ball;
use crate::config::SoccerConfig;
use crate::goal::Goal;
use crate::pitch::Pitch;
use crate::player::{Player, PlayerId};
use crate::team::Roster;

/// A chosen pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub receiver: PlayerId,
    pub target: Vec3,
}

/// Read-only view of the match from one team's perspective.
#[derive(Debug, Clone, Copy)]
pub struct Tactics<'a> {
    pub ball: &'a Ball,
    pub pitch: &'a Pitch,
    pub roster: &'a Roster,
    pub opponents: &'a Roster,
    pub opposing_goal: &'a Goal,
    pub config: &'a SoccerConfig,
}

impl Tactics<'_> {
    pub fn is_pass_safe_from_all_opponents(
        &self,
        start: Vec3,
        target: Vec3,
        receiver: Option<&Player>,
        force: f32,
    ) -> bool {
        is_pass_safe_from_all(
            self.ball,
            start,
            target,
            receiver,
            self.opponents.players(),
            force,
        )
    }

    /// Best point to pass to `receiver` with `force`: its position or one of
    /// the two tangent points of its interception circle, whichever is on the
    /// pitch, safe, and closest to the opposing goal. `None` when the ball
    /// lies inside or on that circle.
    pub fn best_pass_to_receiver(&self, receiver: &Player, force: f32) -> Option<Vec3> {
        let ball = self.ball.position;
        let time = self.ball.time_to_cover_distance(ball, receiver.position(), force);
        if time < 0.0 {
            return None;
        }
        let radius = time * receiver.vehicle.max_speed * self.config.tactics.interception_scale;
        let (first, second) = compute_tangent_points(receiver.position(), radius, ball)?;

        let goal = self.opposing_goal.position;
        [first, receiver.position(), second]
            .into_iter()
            .filter(|&candidate| {
                self.pitch.playing_area.contains(candidate, false)
                    && self.is_pass_safe_from_all_opponents(ball, candidate, Some(receiver), force)
            })
            .fold(None, |best: Option<Vec3>, candidate| match best {
                Some(b) if b.squared_distance_to(goal) <= candidate.squared_distance_to(goal) => {
                    Some(b)
                },
                _ => Some(candidate),
            })
    }

    /// The team mate pass (at least `min_distance` away) whose target lies
    /// closest to the opposing goal.
    pub fn find_pass(&self, passer: &Player, force: f32, min_distance: f32) -> Option<Pass> {
        let goal = self.opposing_goal.position;
        let mut best: Option<(f32, Pass)> = None;
        for receiver in self.roster.players() {
            if receiver.id == passer.id
                || passer.position().squared_distance_to(receiver.position())
                    < min_distance * min_distance
            {
                continue;
            }
            let Some(target) = self.best_pass_to_receiver(receiver, force) else {
                continue;
            };
            let distance = target.squared_distance_to(goal);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((
                    distance,
                    Pass {
                        receiver: receiver.id,
                        target,
                    },
                ));
            }
        }
        best.map(|(_, pass)| pass)
    }

    /// Sample the opposing goal mouth and return the first reachable, safe
    /// target.
    pub fn can_shoot<R: Rng>(&self, from: Vec3, force: f32, rng: &mut R) -> Option<Vec3> {
        for _ in 0..self.config.tactics.shot_attempts {
            let target = self.random_mouth_point(rng);
            let time = self.ball.time_to_cover_distance(from, target, force);
            if time >= 0.0 && self.is_pass_safe_from_all_opponents(from, target, None, force) {
                return Some(target);
            }
        }
        None
    }

    /// A random point between the posts, kept a ball radius clear of each.
    pub fn random_mouth_point<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let goal = self.opposing_goal;
        let half = goal.width * 0.5;
        let radius = self.ball.bounding_radius;
        let min_z = goal.position.z - half + radius;
        let max_z = goal.position.z + half - radius;
        let z = if min_z < max_z {
            rng.random_range(min_z..max_z)
        } else {
            goal.position.z
        };
        Vec3::new(goal.position.x, 0.0, z)
    }
}

/// Whether a pass from `start` to `target` can be intercepted by `opponent`.
///
/// The opponent is expressed in the pass frame: origin at `start`, forward
/// along the pass.
pub fn is_pass_safe_from_opponent(
    ball: &Ball,
    start: Vec3,
    target: Vec3,
    receiver: Option<&Player>,
    opponent: &Player,
    force: f32,
) -> bool {
    let forward = (target - start).normalize();
    let side = Vec3::new(forward.z, 0.0, -forward.x);
    let offset = opponent.position() - start;
    let local_forward = offset.dot(forward);
    let local_side = offset.dot(side);

    // Behind the passer.
    if local_forward < 0.0 {
        return true;
    }

    // Further away than the target.
    if start.squared_distance_to(target) < start.squared_distance_to(opponent.position()) {
        return match receiver {
            Some(receiver) => {
                target.squared_distance_to(opponent.position())
                    > target.squared_distance_to(receiver.position())
            },
            None => true,
        };
    }

    // Can the opponent reach the pass line before the ball gets level with it?
    let time = ball.time_to_cover(local_forward, force);
    if time < 0.0 {
        return true;
    }
    let reach = opponent.vehicle.max_speed * time
        + ball.bounding_radius
        + opponent.vehicle.bounding_radius;
    reach < local_side.abs()
}

pub fn is_pass_safe_from_all<'p>(
    ball: &Ball,
    start: Vec3,
    target: Vec3,
    receiver: Option<&Player>,
    opponents: impl IntoIterator<Item = &'p Player>,
    force: f32,
) -> bool {
    opponents
        .into_iter()
        .all(|opponent| is_pass_safe_from_opponent(ball, start, target, receiver, opponent, force))
}

/// Tangent points on the circle (`center`, `radius`) as seen from `point`,
/// or `None` when `point` is inside or on the circle.
pub fn compute_tangent_points(center: Vec3, radius: f32, point: Vec3) -> Option<(Vec3, Vec3)> {
    let to_point = point - center;
    let length_sq = to_point.x * to_point.x + to_point.z * to_point.z;
    let radius_sq = radius * radius;
    if length_sq <= radius_sq {
        return None;
    }

    let inverse = 1.0 / length_sq;
    let root = (length_sq - radius_sq).sqrt();
    let first = Vec3::new(
        center.x + radius * (radius * to_point.x - to_point.z * root) * inverse,
        0.0,
        center.z + radius * (radius * to_point.z + to_point.x * root) * inverse,
    );
    let second = Vec3::new(
        center.x + radius * (radius * to_point.x + to_point.z * root) * inverse,
        0.0,
        center.z + radius * (radius * to_point.z - to_point.x * root) * inverse,
    );
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{ROSTER_SIZE, Role};
    use crate::team::TeamColor;
    use crate::SoccerMatch;

    fn config() -> SoccerConfig {
        SoccerConfig::default()
    }

    fn ball() -> Ball {
        Ball::new(&config().ball)
    }

    fn opponent_at(x: f32, z: f32) -> Player {
        Player::new(
            PlayerId::new(TeamColor::Blue, 1),
            Role::Attacker,
            0,
            Vec3::new(x, 0.0, z),
            0.0,
            &config(),
        )
    }

    fn receiver_at(x: f32, z: f32) -> Player {
        Player::new(
            PlayerId::new(TeamColor::Red, 2),
            Role::Attacker,
            0,
            Vec3::new(x, 0.0, z),
            0.0,
            &config(),
        )
    }

    #[test]
    fn opponent_behind_passer_is_safe() {
        let safe = is_pass_safe_from_opponent(
            &ball(),
            Vec3::ZERO,
            Vec3::new(5.0, 0.0, 0.0),
            None,
            &opponent_at(-1.0, 0.0),
            3.0,
        );
        assert!(safe);
    }

    #[test]
    fn opponent_beyond_target_is_safe_without_receiver() {
        let safe = is_pass_safe_from_opponent(
            &ball(),
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 0.0),
            None,
            &opponent_at(6.0, 0.5),
            3.0,
        );
        assert!(safe);
    }

    #[test]
    fn opponent_beyond_target_but_nearer_than_receiver_is_unsafe() {
        let target = Vec3::new(3.0, 0.0, 0.0);
        let receiver = receiver_at(3.0, 3.0);
        let safe = is_pass_safe_from_opponent(
            &ball(),
            Vec3::ZERO,
            target,
            Some(&receiver),
            &opponent_at(4.0, 0.0),
            3.0,
        );
        assert!(!safe);
    }

    #[test]
    fn opponent_on_the_line_is_unsafe() {
        let safe = is_pass_safe_from_opponent(
            &ball(),
            Vec3::ZERO,
            Vec3::new(8.0, 0.0, 0.0),
            None,
            &opponent_at(4.0, 0.1),
            3.0,
        );
        assert!(!safe);
    }

    #[test]
    fn opponent_far_to_the_side_is_safe() {
        let safe = is_pass_safe_from_opponent(
            &ball(),
            Vec3::ZERO,
            Vec3::new(8.0, 0.0, 0.0),
            None,
            &opponent_at(1.0, 6.0),
            3.0,
        );
        assert!(safe);
    }

    #[test]
    fn tangent_points_inside_circle_fail() {
        assert!(compute_tangent_points(Vec3::ZERO, 2.0, Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn tangent_points_on_circle_fail() {
        assert!(compute_tangent_points(Vec3::ZERO, 2.0, Vec3::new(2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn tangent_points_are_on_circle_and_perpendicular() {
        let center = Vec3::new(1.0, 0.0, 1.0);
        let point = Vec3::new(6.0, 0.0, 1.0);
        let (a, b) = compute_tangent_points(center, 2.0, point).unwrap();
        for t in [a, b] {
            assert!((t.distance_to(center) - 2.0).abs() < 1e-4);
            // Radius is perpendicular to the tangent line.
            assert!((t - center).dot(point - t).abs() < 1e-3);
        }
        assert!((a.z - 1.0) * (b.z - 1.0) < 0.0, "tangents on opposite sides");
    }

    fn open_match() -> SoccerMatch {
        let mut world = SoccerMatch::new(config(), 21);
        // Park every opponent deep behind the play.
        for slot in 0..ROSTER_SIZE {
            world.player_mut(PlayerId::new(TeamColor::Blue, slot)).vehicle.position =
                Vec3::new(9.0, 0.0, -5.0);
        }
        world
    }

    #[test]
    fn pass_to_receiver_lands_near_receiver() {
        let mut world = open_match();
        let id = PlayerId::new(TeamColor::Red, 1);
        let at = world.player(id).position();
        world.ball.place_at(at + Vec3::new(4.0, 0.0, 0.0));
        let target = world
            .tactics(TeamColor::Red)
            .best_pass_to_receiver(world.player(id), 3.0);
        let target = target.expect("open pass");
        assert!(target.distance_to(at) < 1.0, "{target:?}");
    }

    #[test]
    fn no_pass_when_ball_sits_on_receiver() {
        let mut world = open_match();
        let id = PlayerId::new(TeamColor::Red, 1);
        let at = world.player(id).position();
        world.ball.place_at(at);
        let target = world
            .tactics(TeamColor::Red)
            .best_pass_to_receiver(world.player(id), 3.0);
        assert_eq!(target, None);
    }

    #[test]
    fn no_pass_when_ball_inside_interception_circle() {
        let mut world = open_match();
        let id = PlayerId::new(TeamColor::Red, 1);
        // A very fast receiver has a wide interception circle.
        world.player_mut(id).vehicle.max_speed = 1000.0;
        let at = world.player(id).position();
        world.ball.place_at(at + Vec3::new(0.05, 0.0, 0.0));
        let target = world
            .tactics(TeamColor::Red)
            .best_pass_to_receiver(world.player(id), 3.0);
        assert_eq!(target, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn no_opponents_means_safe(
                sx in -10.0f32..10.0, sz in -7.5f32..7.5,
                tx in -10.0f32..10.0, tz in -7.5f32..7.5,
                force in 0.1f32..5.0,
            ) {
                let ball = ball();
                prop_assert!(is_pass_safe_from_all(
                    &ball,
                    Vec3::new(sx, 0.0, sz),
                    Vec3::new(tx, 0.0, tz),
                    None,
                    std::iter::empty(),
                    force,
                ));
            }

            #[test]
            fn tangents_exist_outside_circle(
                radius in 0.1f32..3.0,
                angle in 0.0f32..6.28,
                extra in 0.05f32..5.0,
            ) {
                let point = Vec3::from_yaw(angle) * (radius + extra);
                let tangents = compute_tangent_points(Vec3::ZERO, radius, point);
                prop_assert!(tangents.is_some());
            }
        }
    }
}
