use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Creation timestamp in epoch milliseconds, bumped when the clock stalls.
pub type TaskId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default)]
    pub is_done: bool,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, title: String, due_date: Option<NaiveDate>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            is_done: false,
            due_date,
            created_at: now,
            completed_at: None,
        }
    }

    /// Keeps `completed_at` populated exactly while the task is done.
    pub fn set_done(&mut self, done: bool, now: DateTime<Utc>) {
        self.is_done = done;
        self.completed_at = if done { Some(now) } else { None };
    }

    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date == Some(date)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_soon(&self, today: NaiveDate) -> bool {
        let tomorrow = today.checked_add_days(Days::new(1));
        self.due_date
            .is_some_and(|due| due == today || Some(due) == tomorrow)
    }
}

pub fn next_task_id(tasks: &[Task], now: DateTime<Utc>) -> TaskId {
    let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    match tasks.iter().map(|t| t.id).max() {
        Some(max) if max >= stamp => max + 1,
        _ => stamp,
    }
}

/// Repairs records that did not come from [`Board`](crate::Board): blank
/// titles are dropped and `completed_at` is made to agree with `is_done`,
/// falling back to `created_at` for a done task with no completion time.
pub fn normalize_loaded(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.retain(|t| !t.title.trim().is_empty());
    for task in &mut tasks {
        match (task.is_done, task.completed_at) {
            (true, None) => task.completed_at = Some(task.created_at),
            (false, Some(_)) => task.completed_at = None,
            _ => {}
        }
    }
    tasks
}

/// Drops done tasks due yesterday or earlier. Returns how many were removed.
pub fn sweep_stale_completed(tasks: &mut Vec<Task>, today: NaiveDate) -> usize {
    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        return 0;
    };
    let before = tasks.len();
    tasks.retain(|t| !(t.is_done && t.due_date.is_some_and(|due| due <= yesterday)));
    before - tasks.len()
}
