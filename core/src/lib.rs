use core::ops::BitOr;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod error;
mod generator;
mod session;
mod snapshot;
mod types;

/// Parameters for board generation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Columns of the rectangular extent scanned for candidate cells.
    pub cols: u16,
    /// Rows of the rectangular extent.
    pub rows: u16,
    /// Hex spacing scale fed to the planar projection.
    pub spacing: f32,
    /// Cells whose planar center lies farther than this from the origin
    /// are clipped, giving the board its circular outline.
    pub boundary_radius: f32,
    /// Independent per-cell chance of leaving a gap in the layout.
    pub gap_chance: f32,
    /// Requested mine count; generation may place fewer (density cap).
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(
        cols: u16,
        rows: u16,
        spacing: f32,
        boundary_radius: f32,
        gap_chance: f32,
        mines: CellCount,
    ) -> Self {
        Self {
            cols,
            rows,
            spacing,
            boundary_radius,
            gap_chance,
            mines,
        }
    }

    pub fn new(
        cols: u16,
        rows: u16,
        spacing: f32,
        boundary_radius: f32,
        gap_chance: f32,
        mines: CellCount,
    ) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let spacing = if spacing > 0.0 { spacing } else { 1.0 };
        let boundary_radius = boundary_radius.max(spacing);
        let gap_chance = gap_chance.clamp(0.0, 0.9);
        let mines = mines.clamp(1, mult(cols, rows));
        Self::new_unchecked(cols, rows, spacing, boundary_radius, gap_chance, mines)
    }

    pub const fn total_extent_cells(&self) -> CellCount {
        mult(self.cols, self.rows)
    }

    /// Candidate coordinates of the rectangular extent, centered on the
    /// origin so the circular boundary clips symmetrically.
    pub(crate) fn extent_coords(&self) -> impl Iterator<Item = Hex> + use<> {
        let half_q = (self.cols / 2) as i32;
        let half_r = (self.rows / 2) as i32;
        let cols = self.cols as i32;
        let rows = self.rows as i32;
        (0..rows).flat_map(move |ri| (0..cols).map(move |qi| Hex::new(qi - half_q, ri - half_r)))
    }
}

pub const fn mult(a: u16, b: u16) -> CellCount {
    a.saturating_mul(b)
}

/// Finalized immutable board: the in-play layout with planar positions,
/// mine placement, and precomputed neighbor mine counts.
///
/// Built once per session, before any reveal; the session layers its
/// mutable [`Cell`] state on top and never writes back here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexField {
    order: Vec<Hex>,
    cells: HashMap<Hex, FieldCell>,
    mine_count: CellCount,
}

/// Immutable per-cell data attached to the layout.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldCell {
    pub pos: Pos2,
    pub mine: bool,
    pub adjacent_mines: u8,
}

impl HexField {
    /// Build a field from an explicit layout and mine list, unit spacing.
    /// Mostly useful for tests and scripted boards.
    pub fn from_coords(layout: &[Hex], mine_coords: &[Hex]) -> Result<Self> {
        let placed = layout
            .iter()
            .map(|&coord| (coord, coord.planar(1.0)))
            .collect();
        if mine_coords.len() > layout.len() {
            return Err(GameError::TooManyMines);
        }
        let mut mines = HashSet::with_capacity(mine_coords.len());
        for &coord in mine_coords {
            if !layout.contains(&coord) {
                return Err(GameError::InvalidCoords);
            }
            mines.insert(coord);
        }
        Self::finalize(placed, &mines)
    }

    /// Assemble the field and run the one-time adjacency pass. All mine
    /// coordinates must already be part of `layout`.
    pub(crate) fn finalize(layout: Vec<(Hex, Pos2)>, mines: &HashSet<Hex>) -> Result<Self> {
        if layout.is_empty() {
            return Err(GameError::EmptyLayout);
        }

        let mut order = Vec::with_capacity(layout.len());
        let mut cells = HashMap::with_capacity(layout.len());
        for (coord, pos) in layout {
            order.push(coord);
            cells.insert(
                coord,
                FieldCell {
                    pos,
                    mine: mines.contains(&coord),
                    adjacent_mines: 0,
                },
            );
        }

        for &coord in &order {
            let count = coord
                .neighbors()
                .iter()
                .filter(|n| cells.get(*n).is_some_and(|c: &FieldCell| c.mine))
                .count() as u8;
            if let Some(cell) = cells.get_mut(&coord) {
                cell.adjacent_mines = count;
            }
        }

        let mine_count = order
            .iter()
            .filter(|coord| cells[*coord].mine)
            .count()
            .try_into()
            .map_err(|_| GameError::TooManyMines)?;

        Ok(Self {
            order,
            cells,
            mine_count,
        })
    }

    pub fn len(&self) -> CellCount {
        self.order.len() as CellCount
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.len() - self.mine_count
    }

    pub fn contains(&self, coord: Hex) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn contains_mine(&self, coord: Hex) -> bool {
        self.cells.get(&coord).is_some_and(|c| c.mine)
    }

    /// Precomputed neighbor mine count; 0 for coordinates outside the
    /// layout.
    pub fn adjacent_mine_count(&self, coord: Hex) -> u8 {
        self.cells.get(&coord).map_or(0, |c| c.adjacent_mines)
    }

    pub fn get(&self, coord: Hex) -> Option<&FieldCell> {
        self.cells.get(&coord)
    }

    /// Layout order as generated, with positions.
    pub fn iter(&self) -> impl Iterator<Item = (Hex, &FieldCell)> {
        self.order.iter().map(|coord| (*coord, &self.cells[coord]))
    }

    pub fn coords(&self) -> &[Hex] {
        &self.order
    }

    /// Neighbors of `coord` that are part of the layout.
    pub fn in_layout_neighbors(&self, coord: Hex) -> impl Iterator<Item = Hex> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.cells.contains_key(n))
    }
}

/// Outcome of a flag command.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of a reveal step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    /// Immortal mode only: a mine was revealed and disarmed in place.
    Disarmed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges step outcomes when draining the cascade synchronously.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Disarmed, _) | (_, Disarmed) => Disarmed,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_layout(side: i32) -> Vec<Hex> {
        let mut coords = Vec::new();
        for r in 0..side {
            for q in 0..side {
                coords.push(Hex::new(q, r));
            }
        }
        coords
    }

    #[test]
    fn config_clamps_degenerate_values() {
        let config = BoardConfig::new(0, 0, -1.0, 0.0, 7.5, 0);

        assert_eq!(config.cols, 1);
        assert_eq!(config.rows, 1);
        assert_eq!(config.spacing, 1.0);
        assert!(config.boundary_radius >= config.spacing);
        assert_eq!(config.gap_chance, 0.9);
        assert_eq!(config.mines, 1);
    }

    #[test]
    fn extent_is_centered_on_origin() {
        let config = BoardConfig::new(5, 5, 1.0, 100.0, 0.0, 1);
        let coords: Vec<Hex> = config.extent_coords().collect();

        assert_eq!(coords.len(), 25);
        assert!(coords.contains(&Hex::new(0, 0)));
        assert!(coords.contains(&Hex::new(-2, -2)));
        assert!(coords.contains(&Hex::new(2, 2)));
    }

    #[test]
    fn adjacency_counts_only_in_layout_mine_neighbors() {
        let layout = square_layout(3);
        let field = HexField::from_coords(&layout, &[Hex::new(1, 1)]).unwrap();

        for &coord in field.coords() {
            let expected = coord
                .neighbors()
                .iter()
                .filter(|n| field.contains_mine(**n))
                .count() as u8;
            assert_eq!(field.adjacent_mine_count(coord), expected, "at {coord:?}");
        }
        // (0, 0) touches (1, 1) on a square grid but not under the six
        // axial offsets; (2, 0) does via (1, -1).
        assert_eq!(field.adjacent_mine_count(Hex::new(2, 0)), 1);
        assert_eq!(field.adjacent_mine_count(Hex::new(0, 0)), 0);
    }

    #[test]
    fn from_coords_rejects_mines_outside_layout() {
        let layout = square_layout(2);
        let err = HexField::from_coords(&layout, &[Hex::new(9, 9)]).unwrap_err();

        assert_eq!(err, GameError::InvalidCoords);
    }

    #[test]
    fn empty_layout_is_an_error() {
        assert_eq!(
            HexField::from_coords(&[], &[]).unwrap_err(),
            GameError::EmptyLayout
        );
    }

    #[test]
    fn reveal_outcome_merge_prefers_terminal_results() {
        use RevealOutcome::*;

        assert_eq!(Revealed | HitMine, HitMine);
        assert_eq!(Won | Revealed, Won);
        assert_eq!(NoChange | Disarmed, Disarmed);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
