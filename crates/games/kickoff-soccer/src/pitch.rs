use kickoff_core::geometry::{Plane, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::PitchConfig;

/// An axis-aligned rectangle on the pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: usize,
    pub center: Vec3,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(id: usize, center: Vec3, width: f32, height: f32) -> Self {
        Self {
            id,
            center,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.width * 0.5
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.width * 0.5
    }

    pub fn top(&self) -> f32 {
        self.center.z + self.height * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.center.z - self.height * 0.5
    }

    /// Strict containment. With `half_size` the region shrinks by a quarter
    /// of its extent on every side.
    pub fn contains(&self, position: Vec3, half_size: bool) -> bool {
        let (margin_x, margin_z) = if half_size {
            (self.width * 0.25, self.height * 0.25)
        } else {
            (0.0, 0.0)
        };
        position.x > self.left() + margin_x
            && position.x < self.right() - margin_x
            && position.z > self.bottom() + margin_z
            && position.z < self.top() - margin_z
    }
}

/// The playing area, its boundary walls and the region grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    /// Boundary planes facing into the pitch: top, bottom, right (red goal
    /// line) and left (blue goal line).
    pub walls: [Plane; 4],
    pub playing_area: Region,
    regions: Vec<Region>,
    pub is_playing: bool,
    pub goalkeeper_has_ball: bool,
}

impl Pitch {
    pub fn new(config: &PitchConfig) -> Self {
        let half_width = config.width * 0.5;
        let half_height = config.height * 0.5;
        let walls = [
            Plane::new(Vec3::new(0.0, 0.0, -1.0), half_height),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), half_height),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), half_width),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), half_width),
        ];
        let playing_area = Region::new(0, Vec3::ZERO, config.width, config.height);

        let columns = config.region_columns.max(1);
        let rows = config.region_rows.max(1);
        let cell_width = config.width / columns as f32;
        let cell_height = config.height / rows as f32;

        // Column-major ids: id = column * rows + row.
        let mut regions = Vec::with_capacity(columns * rows);
        for col in 0..columns {
            for row in 0..rows {
                let x = col as f32 * cell_width + cell_width * 0.5 - half_width;
                let z = row as f32 * cell_height + cell_height * 0.5 - half_height;
                regions.push(Region::new(
                    regions.len(),
                    Vec3::new(x, 0.0, z),
                    cell_width,
                    cell_height,
                ));
            }
        }

        Self {
            walls,
            playing_area,
            regions,
            is_playing: false,
            goalkeeper_has_ball: false,
        }
    }

    pub fn width(&self) -> f32 {
        self.playing_area.width
    }

    pub fn height(&self) -> f32 {
        self.playing_area.height
    }

    pub fn region(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }
}
