use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the session for each
/// in-layout cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Flagged,
    /// Open safe cell carrying its neighbor mine count.
    Revealed(u8),
    /// Mine uncovered by the end-of-game sweep after a loss.
    Mine,
    /// Immortal-mode mine that was revealed and disarmed in place:
    /// counts as revealed and flagged, permanently out of play.
    Disarmed,
}

impl Cell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine | Self::Disarmed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::Disarmed)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}
