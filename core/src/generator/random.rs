use hashbrown::HashSet;
use rand::prelude::*;

use super::*;

/// Attempts of the anti-clustered placement pass before giving up.
const MAX_PLACEMENT_ATTEMPTS: u32 = 10;
/// A candidate cell is rejected once this many of its neighbors already
/// hold mines.
const NEIGHBOR_MINE_LIMIT: usize = 3;
/// Random draws allowed per attempt, as a multiple of the layout size.
const DRAWS_PER_CELL: usize = 50;

/// Seeded generator producing the circular gapped layout and an
/// anti-clustered mine scatter on top of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomFieldGenerator {
    seed: u64,
}

impl RandomFieldGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl FieldGenerator for RandomFieldGenerator {
    fn generate(self, config: &BoardConfig) -> Result<HexField> {
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let layout = sample_layout(config, &mut rng);
        if layout.is_empty() {
            return Err(GameError::EmptyLayout);
        }

        let mines = scatter_mines(&layout, config.mines, &mut rng)?;
        let field = HexField::finalize(layout, &mines)?;

        if field.mine_count() != config.mines {
            log::debug!(
                "Placed {} mines of {} requested (density cap or fallback)",
                field.mine_count(),
                config.mines
            );
        }
        Ok(field)
    }
}

/// Keeps every extent coordinate whose planar center falls inside the
/// circular boundary and survives the per-cell gap draw.
fn sample_layout(config: &BoardConfig, rng: &mut SmallRng) -> Vec<(Hex, Pos2)> {
    config
        .extent_coords()
        .filter_map(|coord| {
            let pos = coord.planar(config.spacing);
            if pos.distance_from_origin() > config.boundary_radius {
                return None;
            }
            if rng.random_bool(config.gap_chance as f64) {
                return None;
            }
            Some((coord, pos))
        })
        .collect()
}

/// Greedy rejection scatter: draw random layout cells and accept each as
/// a mine only while fewer than [`NEIGHBOR_MINE_LIMIT`] of its neighbors
/// are mines already. Retried a bounded number of times; falls back to
/// unconstrained placement at half density when it cannot converge.
fn scatter_mines(
    layout: &[(Hex, Pos2)],
    requested: CellCount,
    rng: &mut SmallRng,
) -> Result<HashSet<Hex>> {
    let len = layout.len();
    let max_mines = len / 5;
    let target = (requested as usize).min(max_mines);
    if target == 0 {
        return Err(GameError::NoMineCapacity);
    }

    for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
        let mut mines: HashSet<Hex> = HashSet::with_capacity(target);
        let mut draws = 0;

        while mines.len() < target && draws < len * DRAWS_PER_CELL {
            draws += 1;
            let (candidate, _) = layout[rng.random_range(0..len)];
            if mines.contains(&candidate) {
                continue;
            }
            let crowded = candidate
                .neighbors()
                .iter()
                .filter(|n| mines.contains(*n))
                .count()
                >= NEIGHBOR_MINE_LIMIT;
            if !crowded {
                mines.insert(candidate);
            }
        }

        if mines.len() == target {
            log::trace!("Placed {target} mines on attempt {attempt} after {draws} draws");
            return Ok(mines);
        }
    }

    log::warn!(
        "Anti-clustered placement of {target} mines did not converge in {MAX_PLACEMENT_ATTEMPTS} attempts, falling back to sparse random scatter"
    );

    let fallback_target = max_mines.min(len / 10);
    if fallback_target == 0 {
        return Err(GameError::NoMineCapacity);
    }
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    Ok(indices
        .into_iter()
        .take(fallback_target)
        .map(|i| layout[i].0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config(mines: CellCount) -> BoardConfig {
        // Radius large enough that nothing is clipped, no gaps.
        BoardConfig::new(11, 11, 1.0, 100.0, 0.0, mines)
    }

    #[test]
    fn same_seed_reproduces_the_same_field() {
        let config = BoardConfig::new(9, 9, 1.0, 8.0, 0.15, 12);

        let a = RandomFieldGenerator::new(99).generate(&config).unwrap();
        let b = RandomFieldGenerator::new(99).generate(&config).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let config = BoardConfig::new(9, 9, 1.0, 8.0, 0.15, 12);

        let a = RandomFieldGenerator::new(1).generate(&config).unwrap();
        let b = RandomFieldGenerator::new(2).generate(&config).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn gap_free_open_board_keeps_the_whole_extent() {
        let field = RandomFieldGenerator::new(7)
            .generate(&open_config(10))
            .unwrap();

        assert_eq!(field.len(), 121);
        assert!(field.contains(Hex::new(0, 0)));
    }

    #[test]
    fn boundary_radius_clips_distant_cells() {
        let config = BoardConfig::new(11, 11, 1.0, 4.0, 0.0, 3);
        let field = RandomFieldGenerator::new(7).generate(&config).unwrap();

        assert!(field.len() < 121);
        for (_, cell) in field.iter() {
            assert!(cell.pos.distance_from_origin() <= 4.0);
        }
    }

    #[test]
    fn mine_count_respects_requested_and_density_cap() {
        let modest = RandomFieldGenerator::new(3)
            .generate(&open_config(10))
            .unwrap();
        assert_eq!(modest.mine_count(), 10);

        // 121 cells, 20% cap = 24.
        let greedy = RandomFieldGenerator::new(3)
            .generate(&open_config(500))
            .unwrap();
        assert_eq!(greedy.mine_count(), 24);
    }

    #[test]
    fn adjacency_matches_mine_placement_on_generated_boards() {
        let field = RandomFieldGenerator::new(42)
            .generate(&BoardConfig::new(9, 9, 1.0, 7.0, 0.2, 11))
            .unwrap();

        for &coord in field.coords() {
            let expected = coord
                .neighbors()
                .iter()
                .filter(|n| field.contains_mine(**n))
                .count() as u8;
            assert_eq!(field.adjacent_mine_count(coord), expected);
        }
    }

    #[test]
    fn tiny_layout_cannot_hold_mines() {
        let config = BoardConfig::new(2, 2, 1.0, 100.0, 0.0, 1);
        let err = RandomFieldGenerator::new(0).generate(&config).unwrap_err();

        assert_eq!(err, GameError::NoMineCapacity);
    }
}
