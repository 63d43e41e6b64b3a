use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::calendar::CustomDate;
use crate::flash::InputFlash;
use crate::history::{History, Snapshot};
use crate::pins::PinSet;
use crate::task::{Task, TaskId, next_task_id};
use crate::view::{BoardView, build_view, by_completion_desc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("task title cannot be blank")]
    BlankTitle,
    #[error("pin text cannot be blank")]
    BlankPin,
    #[error("already pinned: {0}")]
    DuplicatePin(String),
    #[error("no such pin: {0}")]
    UnknownPin(String),
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    #[error("no task is being edited")]
    NotEditing,
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Contents of the entry box and date picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub title: String,
    pub selected_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Idle,
    Editing { id: TaskId, prior: InputState },
}

impl EditMode {
    pub fn editing_id(&self) -> Option<TaskId> {
        match self {
            EditMode::Idle => None,
            EditMode::Editing { id, .. } => Some(*id),
        }
    }
}

/// Two-step delete confirmation. At most one task is armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingDelete {
    #[default]
    Idle,
    ArmedFor(TaskId),
}

impl PendingDelete {
    pub fn armed_id(&self) -> Option<TaskId> {
        match self {
            PendingDelete::Idle => None,
            PendingDelete::ArmedFor(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryOutcome {
    Armed(TaskId),
    Deleted(Task),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryOutcome {
    Disarmed,
    Toggled { done: bool },
}

/// The whole interactive state of the list: persisted collections plus the
/// transient input, selection and confirmation state around them.
///
/// Every method that changes `tasks` or `pins` records a history snapshot and
/// bumps `revision`; callers persist whenever the revision moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    tasks: Vec<Task>,
    pins: PinSet,
    history: History,
    revision: u64,
    input: InputState,
    edit: EditMode,
    pending_delete: PendingDelete,
    flash: InputFlash,
    week_offset: i32,
    show_all_pins: bool,
}

impl Board {
    /// Starts a board from loaded state, which becomes the history baseline.
    pub fn new(loaded: Snapshot, history_limit: usize) -> Self {
        let mut history = History::with_limit(history_limit);
        history.reset_baseline(loaded.clone());
        Self {
            tasks: loaded.tasks,
            pins: loaded.pins,
            history,
            revision: 0,
            input: InputState::default(),
            edit: EditMode::Idle,
            pending_delete: PendingDelete::Idle,
            flash: InputFlash::default(),
            week_offset: 0,
            show_all_pins: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn edit_mode(&self) -> &EditMode {
        &self.edit
    }

    pub fn pending_delete(&self) -> PendingDelete {
        self.pending_delete
    }

    pub fn week_offset(&self) -> i32 {
        self.week_offset
    }

    pub fn show_all_pins(&self) -> bool {
        self.show_all_pins
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            pins: self.pins.clone(),
        }
    }

    pub fn view(&self, today: NaiveDate) -> BoardView {
        build_view(&self.tasks, today, self.pending_delete.armed_id())
    }

    fn commit(&mut self) {
        self.history.record(self.snapshot());
        self.revision += 1;
    }

    fn reject(&mut self, error: BoardError, now: DateTime<Utc>) -> BoardError {
        debug!(%error, "input rejected");
        self.flash.raise(now);
        error
    }

    fn position(&self, id: TaskId) -> Result<usize, BoardError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(BoardError::UnknownTask(id))
    }

    // Input

    pub fn set_input_title(&mut self, title: impl Into<String>) {
        self.input.title = title.into();
    }

    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.input.selected_date = date;
    }

    pub fn apply_custom_date(&mut self, custom: &CustomDate) -> Result<NaiveDate, BoardError> {
        let date = custom.to_date().ok_or_else(|| {
            BoardError::InvalidDate(format!("{}-{}-{}", custom.year(), custom.month(), custom.day()))
        })?;
        self.input.selected_date = Some(date);
        Ok(date)
    }

    pub fn set_week_offset(&mut self, offset: i32) {
        self.week_offset = offset;
    }

    pub fn shift_week(&mut self, delta: i32) {
        self.week_offset = self.week_offset.saturating_add(delta);
    }

    pub fn toggle_show_all_pins(&mut self) {
        self.show_all_pins = !self.show_all_pins;
    }

    pub fn flash_active(&self, now: DateTime<Utc>) -> bool {
        self.flash.is_active(now)
    }

    pub fn flash(&self) -> InputFlash {
        self.flash
    }

    pub fn clear_flash(&mut self) {
        self.flash.clear();
    }

    /// Enter key: saves the edit in progress, otherwise adds a task.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<(), BoardError> {
        match self.edit {
            EditMode::Editing { .. } => self.save_edit(now),
            EditMode::Idle => self.add_task(now).map(|_| ()),
        }
    }

    // Tasks

    #[tracing::instrument(skip(self, now))]
    pub fn add_task(&mut self, now: DateTime<Utc>) -> Result<TaskId, BoardError> {
        let title = self.input.title.trim().to_string();
        if title.is_empty() {
            return Err(self.reject(BoardError::BlankTitle, now));
        }

        let id = next_task_id(&self.tasks, now);
        self.tasks
            .push(Task::new(id, title, self.input.selected_date, now));
        self.commit();
        self.input.title.clear();
        self.edit = EditMode::Idle;
        info!(id, "added task");
        Ok(id)
    }

    /// Flips done state. The stored order becomes undone tasks in their
    /// existing order followed by done tasks, newest completion first.
    #[tracing::instrument(skip(self, now))]
    pub fn toggle_done(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<bool, BoardError> {
        let idx = self.position(id)?;
        let done = !self.tasks[idx].is_done;
        self.tasks[idx].set_done(done, now);

        let (mut finished, open): (Vec<Task>, Vec<Task>) =
            self.tasks.drain(..).partition(|t| t.is_done);
        finished.sort_by(by_completion_desc);
        self.tasks = open;
        self.tasks.extend(finished);

        self.commit();
        Ok(done)
    }

    #[tracing::instrument(skip(self))]
    pub fn start_edit(&mut self, id: TaskId) -> Result<(), BoardError> {
        let idx = self.position(id)?;
        self.cancel_edit();

        let task = &self.tasks[idx];
        let prior = std::mem::replace(
            &mut self.input,
            InputState {
                title: task.title.clone(),
                selected_date: task.due_date,
            },
        );
        self.edit = EditMode::Editing { id, prior };
        Ok(())
    }

    /// Writes the input back to the task being edited. The date picker then
    /// returns to whatever it held before editing began.
    #[tracing::instrument(skip(self, now))]
    pub fn save_edit(&mut self, now: DateTime<Utc>) -> Result<(), BoardError> {
        let EditMode::Editing { id, .. } = self.edit else {
            return Err(BoardError::NotEditing);
        };
        let title = self.input.title.trim().to_string();
        if title.is_empty() {
            return Err(self.reject(BoardError::BlankTitle, now));
        }
        let Ok(idx) = self.position(id) else {
            self.cancel_edit();
            return Err(BoardError::UnknownTask(id));
        };

        self.tasks[idx].title = title;
        self.tasks[idx].due_date = self.input.selected_date;
        self.commit();

        if let EditMode::Editing { prior, .. } = std::mem::take(&mut self.edit) {
            self.input = InputState {
                title: String::new(),
                selected_date: prior.selected_date,
            };
        }
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        if let EditMode::Editing { prior, .. } = std::mem::take(&mut self.edit) {
            self.input = prior;
        }
    }

    /// Right click (or equivalent) on a task. Arms an undone task, deletes
    /// an armed or done one.
    #[tracing::instrument(skip(self))]
    pub fn secondary_action(&mut self, id: TaskId) -> Result<SecondaryOutcome, BoardError> {
        let idx = self.position(id)?;
        let armed = self.pending_delete == PendingDelete::ArmedFor(id);

        if self.tasks[idx].is_done || armed {
            let removed = self.tasks.remove(idx);
            self.pending_delete = PendingDelete::Idle;
            if self.edit.editing_id() == Some(id) {
                self.cancel_edit();
            }
            self.commit();
            info!(id, "deleted task");
            return Ok(SecondaryOutcome::Deleted(removed));
        }

        self.pending_delete = PendingDelete::ArmedFor(id);
        Ok(SecondaryOutcome::Armed(id))
    }

    /// Left click on a task. Disarms it when armed, toggles it otherwise.
    pub fn primary_action(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<PrimaryOutcome, BoardError> {
        if self.pending_delete == PendingDelete::ArmedFor(id) {
            self.pending_delete = PendingDelete::Idle;
            return Ok(PrimaryOutcome::Disarmed);
        }
        self.dismiss_pending_delete();
        let done = self.toggle_done(id, now)?;
        Ok(PrimaryOutcome::Toggled { done })
    }

    /// A click anywhere outside the armed task.
    pub fn dismiss_pending_delete(&mut self) {
        self.pending_delete = PendingDelete::Idle;
    }

    // Pins

    #[tracing::instrument(skip(self, now))]
    pub fn add_pin_from_input(&mut self, now: DateTime<Utc>) -> Result<(), BoardError> {
        let text = self.input.title.trim().to_string();
        if text.is_empty() {
            return Err(self.reject(BoardError::BlankPin, now));
        }
        if !self.pins.prepend(&text) {
            return Err(self.reject(BoardError::DuplicatePin(text), now));
        }
        self.commit();
        Ok(())
    }

    pub fn use_pin(&mut self, text: &str) -> Result<(), BoardError> {
        if !self.pins.contains(text) {
            return Err(BoardError::UnknownPin(text.to_string()));
        }
        self.input.title = text.to_string();
        self.pins.promote(text);
        self.commit();
        Ok(())
    }

    pub fn remove_pin(&mut self, text: &str) -> Result<(), BoardError> {
        if !self.pins.remove(text) {
            return Err(BoardError::UnknownPin(text.to_string()));
        }
        self.commit();
        Ok(())
    }

    // History

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.tasks = snapshot.tasks;
        self.pins = snapshot.pins;
        self.revision += 1;

        if let Some(id) = self.pending_delete.armed_id()
            && self.task(id).is_none()
        {
            self.pending_delete = PendingDelete::Idle;
        }
    }
}
