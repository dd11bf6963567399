use thiserror::Error;

/// Errors surfaced while constructing a board.
///
/// Gameplay commands never return these: a reveal or flag against a
/// missing, already-open, or flagged cell is an expected race with the
/// presentation layer and comes back as a `NoChange` outcome instead.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Generated layout contains no cells")]
    EmptyLayout,
    #[error("Coordinate is not part of the board layout")]
    InvalidCoords,
    #[error("Mine list exceeds the layout size")]
    TooManyMines,
    #[error("Layout too small to place any mines")]
    NoMineCapacity,
}

pub type Result<T> = core::result::Result<T, GameError>;
