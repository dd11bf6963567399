use serde::{Deserialize, Serialize};

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// The six axial unit offsets, clockwise starting east.
pub const AXIAL_DIRECTIONS: [(i32, i32); 6] =
    [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Axial hex coordinate `(q, r)`.
///
/// Derives `Hash` and `Ord` so it can key cell maps directly and give
/// deterministic iteration where ordering matters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The six axial neighbors, unfiltered. Board membership is the
    /// caller's job.
    pub fn neighbors(self) -> [Hex; 6] {
        AXIAL_DIRECTIONS.map(|(dq, dr)| Hex::new(self.q + dq, self.r + dr))
    }

    /// Flat-top planar projection with hex spacing `spacing`.
    pub fn planar(self, spacing: f32) -> Pos2 {
        let sqrt3 = 3f32.sqrt();
        let q = self.q as f32;
        let r = self.r as f32;
        Pos2 {
            x: spacing * (sqrt3 * q + sqrt3 / 2.0 * r),
            y: spacing * (1.5 * r),
        }
    }
}

/// Planar position of a cell center, used for the circular board
/// boundary and handed to the presentation layer for placement.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pos2 {
    pub x: f32,
    pub y: f32,
}

impl Pos2 {
    pub fn distance_from_origin(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}
