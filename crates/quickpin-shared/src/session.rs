use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::board::{Board, BoardError};
use crate::clock::Clock;
use crate::store::{KeyValueStore, Persistence};
use crate::task::sweep_stale_completed;
use crate::view::BoardView;

/// A [`Board`] wired to a store and a clock.
///
/// Opening loads both records, runs the stale-completed sweep and seeds the
/// history baseline. After every [`Session::apply`] the records are written
/// if the board's revision moved.
#[derive(Debug, Clone)]
pub struct Session<S, C> {
    board: Board,
    persistence: Persistence<S>,
    clock: C,
    saved_revision: u64,
}

impl<S: KeyValueStore, C: Clock> Session<S, C> {
    #[tracing::instrument(skip(store, clock))]
    pub fn open(store: S, clock: C, history_limit: usize) -> Self {
        let mut persistence = Persistence::new(store);
        let mut loaded = persistence.load_snapshot();

        let swept = sweep_stale_completed(&mut loaded.tasks, clock.today());
        if swept > 0 {
            info!(swept, "purged completed tasks from previous days");
            persistence.save(&loaded.tasks, &loaded.pins);
        }
        info!(tasks = loaded.tasks.len(), pins = loaded.pins.len(), "opened session");

        let board = Board::new(loaded, history_limit);
        Self {
            saved_revision: board.revision(),
            board,
            persistence,
            clock,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn view(&self) -> BoardView {
        self.board.view(self.clock.today())
    }

    /// Runs a board operation with the current time, then persists.
    pub fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut Board, DateTime<Utc>) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let now = self.clock.now();
        let result = op(&mut self.board, now);
        self.sync();
        result
    }

    /// Runs an operation that cannot fail (selection, navigation, history).
    pub fn update<T>(&mut self, op: impl FnOnce(&mut Board) -> T) -> T {
        let out = op(&mut self.board);
        self.sync();
        out
    }

    pub fn undo(&mut self) -> bool {
        self.update(Board::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.update(Board::redo)
    }

    fn sync(&mut self) {
        if self.board.revision() == self.saved_revision {
            return;
        }
        self.persistence
            .save(self.board.tasks(), self.board.pins());
        self.saved_revision = self.board.revision();
    }
}
