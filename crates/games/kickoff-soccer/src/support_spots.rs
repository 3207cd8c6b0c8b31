use kickoff_core::geometry::Vec3;
use kickoff_core::regulator::Regulator;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SupportSpotConfig;
use crate::pitch::Region;
use crate::player::Player;
use crate::tactics::Tactics;
use crate::team::TeamColor;

/// Fraction of the pitch covered by the spot grid along each axis.
const GRID_COVERAGE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportSpot {
    pub position: Vec3,
    pub score: f32,
}

/// Scores a fixed grid of candidate support positions in the attacking half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportSpotCalculator {
    spots: Vec<SupportSpot>,
    best: Option<usize>,
    regulator: Regulator,
}

impl SupportSpotCalculator {
    pub fn new(color: TeamColor, playing_area: &Region, config: &SupportSpotConfig) -> Self {
        let width = playing_area.width * GRID_COVERAGE;
        let height = playing_area.height * GRID_COVERAGE;
        let slices_x = config.slices_x.max(1);
        let slices_y = config.slices_y.max(1);
        let slice_x = width / slices_x as f32;
        let slice_y = height / slices_y as f32;

        let top = playing_area.top() - (playing_area.height - height) * 0.5 - slice_y * 0.5;
        let left = playing_area.left() + (playing_area.width - width) * 0.5 + slice_x * 0.5;
        let right = playing_area.right() - (playing_area.width - width) * 0.5 - slice_x * 0.5;

        // Attacking half only, leaving out the column on the halfway line.
        let columns = slices_x.div_ceil(2).saturating_sub(1);
        let mut spots = Vec::with_capacity(columns * slices_y);
        for x in 0..columns {
            for y in 0..slices_y {
                let offset = x as f32 * slice_x;
                let spot_x = match color {
                    TeamColor::Red => left + offset,
                    TeamColor::Blue => right - offset,
                };
                spots.push(SupportSpot {
                    position: Vec3::new(spot_x, 0.0, top - y as f32 * slice_y),
                    score: 0.0,
                });
            }
        }

        Self {
            spots,
            best: None,
            regulator: Regulator::new(config.update_frequency),
        }
    }

    pub fn spots(&self) -> &[SupportSpot] {
        &self.spots
    }

    /// Best spot from the last scoring pass, if any spot scored.
    pub fn best_position(&self) -> Option<Vec3> {
        self.best.map(|i| self.spots[i].position)
    }

    /// Rescore every spot if the regulator allows it; otherwise return the
    /// previous best unchanged.
    pub fn compute_best<R: Rng>(
        &mut self,
        now: f64,
        tactics: &Tactics<'_>,
        controller: Option<&Player>,
        rng: &mut R,
    ) -> Option<Vec3> {
        if !self.regulator.ready(now) && self.best.is_some() {
            return self.best_position();
        }

        let scores = &tactics.config.support_spots;
        let forces = &tactics.config.tactics;
        self.best = None;
        let mut best_score = 0.0;

        for (i, spot) in self.spots.iter_mut().enumerate() {
            spot.score = 0.0;

            if let Some(controller) = controller
                && tactics.is_pass_safe_from_all_opponents(
                    controller.position(),
                    spot.position,
                    None,
                    forces.max_passing_force,
                )
            {
                spot.score += scores.can_pass_score;
            }

            if tactics
                .can_shoot(spot.position, forces.max_shooting_force, rng)
                .is_some()
            {
                spot.score += scores.can_score_score;
            }

            if let Some(controller) = controller {
                spot.score += distance_bonus(
                    controller.position().distance_to(spot.position),
                    scores,
                );
            }

            if spot.score > best_score {
                best_score = spot.score;
                self.best = Some(i);
            }
        }

        tracing::trace!(best = ?self.best_position(), best_score, "support spots rescored");
        self.best_position()
    }
}

/// Linear ramp up to the optimal distance, full bonus at or beyond it.
fn distance_bonus(distance: f32, config: &SupportSpotConfig) -> f32 {
    if config.optimal_distance <= 0.0 || distance >= config.optimal_distance {
        config.distance_score
    } else {
        config.distance_score * (distance / config.optimal_distance)
    }
}
