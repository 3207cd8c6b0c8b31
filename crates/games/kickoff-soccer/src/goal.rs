use kickoff_core::geometry::{Vec3, segments_intersect_xz};
use serde::{Deserialize, Serialize};

use crate::team::TeamColor;

/// A goal on one short side of the pitch, defended by `owner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub owner: TeamColor,
    /// Centre of the goal mouth on the goal line.
    pub position: Vec3,
    /// Unit vector from the goal line into the pitch.
    pub facing: Vec3,
    pub width: f32,
    pub height: f32,
    /// Goals conceded into this goal.
    pub goals_scored: u32,
    left_post: Vec3,
    right_post: Vec3,
}

impl Goal {
    pub fn new(owner: TeamColor, position: Vec3, facing: Vec3, width: f32, height: f32) -> Self {
        let facing = facing.normalize();
        // Posts sit half a width either side of the centre along the goal line.
        let lateral = Vec3::new(facing.z, 0.0, -facing.x);
        let half = width * 0.5;
        Self {
            owner,
            position,
            facing,
            width,
            height,
            goals_scored: 0,
            left_post: position + lateral * half,
            right_post: position - lateral * half,
        }
    }

    pub fn left_post(&self) -> Vec3 {
        self.left_post
    }

    pub fn right_post(&self) -> Vec3 {
        self.right_post
    }

    /// Whether a ball moving from `from` to `to` went into the goal.
    /// Only crossings from the pitch side count.
    pub fn is_crossed_by(&self, from: Vec3, to: Vec3) -> bool {
        (to - from).dot(self.facing) < 0.0
            && segments_intersect_xz(from, to, self.left_post, self.right_post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_goal() -> Goal {
        Goal::new(
            TeamColor::Red,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            2.0,
            1.0,
        )
    }

    #[test]
    fn posts_straddle_centre() {
        let goal = red_goal();
        assert_eq!(goal.left_post().x, 10.0);
        assert_eq!(goal.right_post().x, 10.0);
        assert!(((goal.left_post().z - goal.right_post().z).abs() - 2.0).abs() < 1e-6);
        assert!((goal.left_post().z + goal.right_post().z).abs() < 1e-6);
    }

    #[test]
    fn blue_posts_mirror_red() {
        let blue = Goal::new(
            TeamColor::Blue,
            Vec3::new(-10.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            2.0,
            1.0,
        );
        let red = red_goal();
        assert_eq!(blue.left_post().z, -red.left_post().z);
    }

    #[test]
    fn crossing_between_posts_counts() {
        let goal = red_goal();
        assert!(goal.is_crossed_by(Vec3::new(9.95, 0.0, 0.3), Vec3::new(10.05, 0.0, 0.3)));
    }

    #[test]
    fn crossing_wide_of_post_misses() {
        let goal = red_goal();
        assert!(!goal.is_crossed_by(Vec3::new(9.95, 0.0, 1.5), Vec3::new(10.05, 0.0, 1.5)));
    }

    #[test]
    fn crossing_outward_from_behind_is_ignored() {
        let goal = red_goal();
        assert!(!goal.is_crossed_by(Vec3::new(10.05, 0.0, 0.0), Vec3::new(9.95, 0.0, 0.0)));
    }
}
