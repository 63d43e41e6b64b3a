use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    DueSoon,
    Overdue,
}

impl Urgency {
    pub fn of(task: &Task, today: NaiveDate) -> Self {
        if task.is_overdue(today) {
            Urgency::Overdue
        } else if task.is_due_soon(today) {
            Urgency::DueSoon
        } else {
            Urgency::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task: Task,
    pub urgency: Urgency,
    pub due_today: bool,
    pub pending_delete: bool,
}

impl TaskRow {
    pub fn due_label(&self) -> Option<String> {
        let due = self.task.due_date?;
        Some(if self.due_today {
            "Due today".to_string()
        } else {
            due.format("%Y-%m-%d").to_string()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub active: Vec<TaskRow>,
    pub done: Vec<TaskRow>,
}

/// Undated tasks sort after every dated one. Ties keep list order.
fn by_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Most recently completed first.
pub(crate) fn by_completion_desc(a: &Task, b: &Task) -> Ordering {
    b.completed_at.cmp(&a.completed_at)
}

pub fn active_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| !t.is_done).collect();
    out.sort_by(|a, b| by_due_date(a, b));
    out
}

pub fn done_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| t.is_done).collect();
    out.sort_by(|a, b| by_completion_desc(a, b));
    out
}

pub fn build_view(tasks: &[Task], today: NaiveDate, armed: Option<TaskId>) -> BoardView {
    let active = active_tasks(tasks)
        .into_iter()
        .map(|task| TaskRow {
            task: task.clone(),
            urgency: Urgency::of(task, today),
            due_today: task.is_due_on(today),
            pending_delete: armed == Some(task.id),
        })
        .collect();

    let done = done_tasks(tasks)
        .into_iter()
        .map(|task| TaskRow {
            task: task.clone(),
            urgency: Urgency::Normal,
            due_today: false,
            pending_delete: false,
        })
        .collect();

    BoardView { active, done }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("timestamp")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn task(id: u64, due: Option<NaiveDate>) -> Task {
        Task::new(id, format!("t{id}"), due, at(0))
    }

    #[test]
    fn active_sorted_by_due_with_undated_last() {
        let tasks = vec![
            task(1, None),
            task(2, Some(date(2024, 5, 3))),
            task(3, Some(date(2024, 5, 1))),
            task(4, None),
        ];
        let ids: Vec<_> = active_tasks(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn done_sorted_by_completion_desc() {
        let mut a = task(1, None);
        a.set_done(true, at(10));
        let mut b = task(2, None);
        b.set_done(true, at(30));
        let mut c = task(3, None);
        c.set_done(true, at(20));
        let tasks = vec![a, b, c, task(4, None)];
        let ids: Vec<_> = done_tasks(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn rows_carry_urgency_and_armed_flag() {
        let today = date(2024, 5, 2);
        let tasks = vec![
            task(1, Some(date(2024, 5, 1))),
            task(2, Some(today)),
            task(3, Some(date(2024, 5, 3))),
            task(4, Some(date(2024, 5, 9))),
        ];
        let view = build_view(&tasks, today, Some(3));
        let urgencies: Vec<_> = view.active.iter().map(|r| r.urgency).collect();
        assert_eq!(
            urgencies,
            vec![Urgency::Overdue, Urgency::DueSoon, Urgency::DueSoon, Urgency::Normal]
        );
        assert_eq!(view.active[1].due_label().as_deref(), Some("Due today"));
        assert_eq!(view.active[3].due_label().as_deref(), Some("2024-05-09"));
        assert!(view.active[2].pending_delete);
        assert!(view.done.is_empty());
    }
}
