use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pins::PinSet;
use crate::task::Task;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Full copy of the persisted collections at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub pins: PinSet,
}

/// Linear undo/redo log of snapshots.
///
/// `cursor` points at the entry matching the live state. Recording after an
/// undo discards everything past the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: Option<usize>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|idx| self.entries.get(idx))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|idx| idx > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|idx| idx + 1 < self.entries.len())
    }

    /// Replaces the log with a single entry. Used for the state loaded at
    /// startup so that it is reachable by undo but is not itself a step.
    pub fn reset_baseline(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.cursor = Some(0);
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        if let Some(idx) = self.cursor {
            self.entries.truncate(idx + 1);
        } else {
            self.entries.clear();
        }
        self.entries.push_back(snapshot);

        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
        debug!(len = self.entries.len(), "recorded history snapshot");
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        let idx = self.cursor?;
        if idx == 0 {
            debug!("undo ignored: at oldest entry");
            return None;
        }
        self.cursor = Some(idx - 1);
        self.entries.get(idx - 1)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        let idx = self.cursor?;
        if idx + 1 >= self.entries.len() {
            debug!("redo ignored: at newest entry");
            return None;
        }
        self.cursor = Some(idx + 1);
        self.entries.get(idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn snap(n: u64) -> Snapshot {
        Snapshot {
            tasks: vec![Task::new(
                n,
                format!("task {n}"),
                None,
                DateTime::from_timestamp(0, 0).expect("epoch"),
            )],
            pins: PinSet::new(),
        }
    }

    #[test]
    fn undo_and_redo_walk_the_log() {
        let mut history = History::default();
        history.reset_baseline(Snapshot::default());
        history.record(snap(1));
        history.record(snap(2));

        assert_eq!(history.undo(), Some(&snap(1)));
        assert_eq!(history.undo(), Some(&Snapshot::default()));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&snap(1)));
        assert_eq!(history.redo(), Some(&snap(2)));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn recording_after_undo_drops_redo_branch() {
        let mut history = History::default();
        history.reset_baseline(Snapshot::default());
        history.record(snap(1));
        history.record(snap(2));
        history.undo();

        history.record(snap(3));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&snap(1)));
    }

    #[test]
    fn oldest_entries_fall_off_past_limit() {
        let mut history = History::default();
        history.reset_baseline(Snapshot::default());
        for n in 1..=60 {
            history.record(snap(n));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);

        let mut steps = 0;
        while history.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, DEFAULT_HISTORY_LIMIT - 1);
        assert_eq!(history.current(), Some(&snap(11)));
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut history = History::with_limit(0);
        assert_eq!(history.limit(), 1);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
    }
}
