use std::collections::VecDeque;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Playing
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlayMode {
    /// Revealing a mine ends the game.
    Normal,
    /// Revealing a mine disarms it in place; the game goes on.
    Immortal,
}

impl Default for PlayMode {
    fn default() -> Self {
        Self::Normal
    }
}

/// One game from construction to win, loss, or reset.
///
/// The reveal cascade is a worklist drained one step per
/// [`process_one`](Session::process_one) call so a presentation layer can
/// pace animation and sound per cell; [`reveal_all`](Session::reveal_all)
/// drains it synchronously when pacing is not needed. Either way the
/// final board state is identical.
#[derive(Clone, Debug)]
pub struct Session {
    config: BoardConfig,
    mode: PlayMode,
    field: HexField,
    board: HashMap<Hex, Cell>,
    queue: VecDeque<Hex>,
    queued: HashSet<Hex>,
    revealed_safe: CellCount,
    flag_count: CellCount,
    status: Status,
    triggered_mine: Option<Hex>,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl Session {
    /// Generate a fresh board from `config` and wrap it in a session.
    pub fn initialize(config: BoardConfig, mode: PlayMode, seed: u64) -> Result<Self> {
        let field = RandomFieldGenerator::new(seed).generate(&config)?;
        Ok(Self::from_field(config, mode, field))
    }

    /// Wrap an already-built field. Used by tests and scripted boards;
    /// `config` is only consulted again on [`reset`](Session::reset).
    pub fn from_field(config: BoardConfig, mode: PlayMode, field: HexField) -> Self {
        let board = field.coords().iter().map(|&c| (c, Cell::Hidden)).collect();
        Self {
            config,
            mode,
            field,
            board,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            revealed_safe: 0,
            flag_count: 0,
            status: Status::Playing,
            triggered_mine: None,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn field(&self) -> &HexField {
        &self.field
    }

    pub fn mine_count(&self) -> CellCount {
        self.field.mine_count()
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    /// How many mines are not flagged yet; negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.field.mine_count() as isize) - (self.flag_count as isize)
    }

    pub fn cell_at(&self, coord: Hex) -> Option<Cell> {
        self.board.get(&coord).copied()
    }

    /// The mine that ended a lost game.
    pub fn triggered_mine(&self) -> Option<Hex> {
        self.triggered_mine
    }

    /// True while reveal requests are pending in the cascade queue.
    pub fn is_processing(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Seconds since the first reveal, frozen once the game ends, 0
    /// before the first reveal.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            let end = self.ended_at.unwrap_or_else(Instant::now);
            end.duration_since(started_at).as_secs() as u32
        } else {
            0
        }
    }

    /// Queue a reveal request. Silently ignored unless the game is in
    /// progress and the cell exists, is hidden, is unflagged, and is not
    /// already pending. Returns whether the request was accepted.
    pub fn enqueue_reveal(&mut self, coord: Hex) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        if !matches!(self.board.get(&coord), Some(Cell::Hidden)) {
            return false;
        }
        if !self.queued.insert(coord) {
            return false;
        }
        self.queue.push_back(coord);
        true
    }

    /// Advance the cascade by one cell.
    ///
    /// Top-level requests are served in FIFO order, but zero-count
    /// expansion pushes neighbors to the front of the queue, so a
    /// cascade runs depth-first and visibly flows outward from the
    /// trigger point. Entries that went stale while queued (revealed,
    /// flagged, or the game ended) are discarded without effect.
    pub fn process_one(&mut self) -> RevealOutcome {
        let Some(coord) = self.queue.pop_front() else {
            return RevealOutcome::NoChange;
        };
        self.queued.remove(&coord);

        if self.status.is_terminal() {
            return RevealOutcome::NoChange;
        }
        if !matches!(self.board.get(&coord), Some(Cell::Hidden)) {
            return RevealOutcome::NoChange;
        }

        self.reveal_cell(coord)
    }

    /// Synchronous variant of the cascade: queue `coord` and drain the
    /// whole expansion, merging the per-step outcomes.
    pub fn reveal_all(&mut self, coord: Hex) -> RevealOutcome {
        if !self.enqueue_reveal(coord) {
            return RevealOutcome::NoChange;
        }
        let mut outcome = RevealOutcome::NoChange;
        while self.is_processing() {
            outcome = outcome | self.process_one();
        }
        outcome
    }

    /// Toggle the flag on a hidden cell. Silently ignored on revealed or
    /// missing cells and after the game has ended.
    pub fn toggle_flag(&mut self, coord: Hex) -> MarkOutcome {
        if self.status.is_terminal() {
            return MarkOutcome::NoChange;
        }
        match self.board.get_mut(&coord) {
            Some(cell @ Cell::Hidden) => {
                *cell = Cell::Flagged;
                self.flag_count += 1;
                MarkOutcome::Changed
            }
            Some(cell @ Cell::Flagged) => {
                *cell = Cell::Hidden;
                self.flag_count -= 1;
                MarkOutcome::Changed
            }
            _ => MarkOutcome::NoChange,
        }
    }

    /// Discard everything and generate a fresh board from the stored
    /// config. Valid in any state, including mid-cascade.
    pub fn reset(&mut self, seed: u64) -> Result<()> {
        let field = RandomFieldGenerator::new(seed).generate(&self.config)?;
        *self = Self::from_field(self.config, self.mode, field);
        Ok(())
    }

    fn reveal_cell(&mut self, coord: Hex) -> RevealOutcome {
        self.mark_started();

        if self.field.contains_mine(coord) {
            return match self.mode {
                PlayMode::Normal => {
                    log::debug!("Hit mine at {coord:?}");
                    self.triggered_mine = Some(coord);
                    self.finish(Status::Lost);
                    RevealOutcome::HitMine
                }
                PlayMode::Immortal => {
                    log::debug!("Disarmed mine at {coord:?}");
                    self.board.insert(coord, Cell::Disarmed);
                    self.flag_count += 1;
                    RevealOutcome::Disarmed
                }
            };
        }

        let count = self.field.adjacent_mine_count(coord);
        self.board.insert(coord, Cell::Revealed(count));
        self.revealed_safe += 1;
        log::debug!("Revealed {coord:?}, neighbor mines: {count}");

        if count == 0 {
            let expansion: SmallVec<[Hex; 6]> = self
                .field
                .in_layout_neighbors(coord)
                .filter(|n| matches!(self.board.get(n), Some(Cell::Hidden)))
                .filter(|n| !self.queued.contains(n))
                .collect();
            log::trace!("Expanding cascade from {coord:?} into {expansion:?}");
            // Reverse so the front of the queue keeps direction order.
            for &neighbor in expansion.iter().rev() {
                self.queued.insert(neighbor);
                self.queue.push_front(neighbor);
            }
        }

        if self.revealed_safe == self.field.safe_cell_count() {
            self.finish(Status::Won);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn finish(&mut self, status: Status) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.ended_at = Some(Instant::now());
        self.queue.clear();
        self.queued.clear();

        if matches!(status, Status::Lost) {
            self.uncover_mines();
        }
        log::debug!("Game over: {status:?}");
    }

    /// Loss sweep: every mine is shown, replacing any flag on it.
    fn uncover_mines(&mut self) {
        for &coord in self.field.coords() {
            if !self.field.contains_mine(coord) {
                continue;
            }
            if let Some(cell) = self.board.get_mut(&coord) {
                if matches!(cell, Cell::Flagged) {
                    self.flag_count -= 1;
                }
                *cell = Cell::Mine;
            }
        }
    }
}
