use serde::{Deserialize, Serialize};

use crate::*;

/// Flat, serializable copy of everything the presentation layer renders.
///
/// The engine exposes no reactive bindings; consumers take a snapshot per
/// frame (or per processed reveal) and diff as they see fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub status: Status,
    pub mode: PlayMode,
    pub mine_count: CellCount,
    pub flag_count: CellCount,
    pub is_processing: bool,
    /// One entry per layout cell, in layout order.
    pub cells: Vec<CellView>,
}

/// Per-cell view combining the immutable field data with the session's
/// mutable state, flattened to plain booleans.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub coord: Hex,
    pub pos: Pos2,
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub is_immortal_mine: bool,
    pub neighbor_mine_count: u8,
}

impl BoardSnapshot {
    pub fn from_session(session: &Session) -> Self {
        let cells = session
            .field()
            .iter()
            .map(|(coord, field_cell)| {
                let cell = session.cell_at(coord).unwrap_or_default();
                CellView {
                    coord,
                    pos: field_cell.pos,
                    is_mine: field_cell.mine,
                    is_revealed: cell.is_revealed(),
                    is_flagged: cell.is_flagged(),
                    is_immortal_mine: matches!(cell, Cell::Disarmed),
                    neighbor_mine_count: field_cell.adjacent_mines,
                }
            })
            .collect();

        Self {
            status: session.status(),
            mode: session.mode(),
            mine_count: session.mine_count(),
            flag_count: session.flag_count(),
            is_processing: session.is_processing(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        let layout: Vec<Hex> = (0..3)
            .flat_map(|r| (0..3).map(move |q| Hex::new(q, r)))
            .collect();
        let field = HexField::from_coords(&layout, &[Hex::new(0, 0)]).unwrap();
        let config = BoardConfig::new(3, 3, 1.0, 100.0, 0.0, 1);
        Session::from_field(config, PlayMode::Normal, field)
    }

    #[test]
    fn snapshot_flattens_session_state() {
        let mut session = sample_session();
        session.toggle_flag(Hex::new(0, 1));
        session.reveal_all(Hex::new(2, 2));

        let snapshot = BoardSnapshot::from_session(&session);

        assert_eq!(snapshot.cells.len(), 9);
        assert_eq!(snapshot.flag_count, 1);
        let mine = snapshot
            .cells
            .iter()
            .find(|c| c.coord == Hex::new(0, 0))
            .unwrap();
        assert!(mine.is_mine);
        assert!(!mine.is_revealed);
        let flagged = snapshot
            .cells
            .iter()
            .find(|c| c.coord == Hex::new(0, 1))
            .unwrap();
        assert!(flagged.is_flagged);
        assert!(!flagged.is_immortal_mine);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let session = sample_session();
        let snapshot = BoardSnapshot::from_session(&session);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: BoardSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back, snapshot);
    }
}
