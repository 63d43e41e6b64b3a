use std::io::Write;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use quickpin_shared::{
    Board, BoardError, Clock, CustomDate, KeyValueStore, PrimaryOutcome, SecondaryOutcome, Session,
    TaskId,
};
use tracing::{debug, info};

use crate::cli::{Action, AddArgs, EditArgs};
use crate::datetime::parse_date_spec;
use crate::render::{Renderer, row_ids};

/// How long the session behind a command lives.
///
/// A one-shot invocation opens a fresh session and only tasks and pins reach
/// disk, so the entry box, the selected date, an armed delete and the pin
/// expansion are gone once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    OneShot,
    Shell,
}

#[tracing::instrument(skip(session, renderer, out))]
pub fn dispatch<S, C, W>(
    session: &mut Session<S, C>,
    renderer: &Renderer,
    action: Action,
    mode: Mode,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
    W: Write,
{
    debug!("dispatching");
    if mode == Mode::OneShot
        && let Some(name) = action.shell_only_name()
    {
        return Err(anyhow!(
            "`{name}` only changes the current session; run it inside `quickpin shell`"
        ));
    }
    match action {
        Action::List => {
            renderer.print_board(out, session.board(), session.today(), session.now())?;
        }
        Action::Add(args) => cmd_add(session, renderer, args, out)?,
        Action::Done { task } => {
            let id = resolve_task(session, &task)?;
            let title = task_title(session.board(), id);
            let msg = match session.apply(|board, now| board.primary_action(id, now))? {
                PrimaryOutcome::Disarmed => format!("Kept \"{title}\"."),
                PrimaryOutcome::Toggled { done: true } => format!("Completed \"{title}\"."),
                PrimaryOutcome::Toggled { done: false } => format!("Reopened \"{title}\"."),
            };
            renderer.message(out, &msg)?;
        }
        Action::Edit(args) => cmd_edit(session, renderer, args, out)?,
        Action::Delete { task, yes } => {
            let id = resolve_task(session, &task)?;
            let mut outcome = session.apply(|board, _| board.secondary_action(id))?;
            if yes && matches!(outcome, SecondaryOutcome::Armed(_)) {
                outcome = session.apply(|board, _| board.secondary_action(id))?;
            }
            let msg = match outcome {
                SecondaryOutcome::Armed(_) => {
                    let title = task_title(session.board(), id);
                    match mode {
                        Mode::Shell => format!(
                            "Delete \"{title}\"? Run the command again (or pass --yes) to confirm."
                        ),
                        Mode::OneShot => format!("Delete \"{title}\"? Pass --yes to confirm."),
                    }
                }
                SecondaryOutcome::Deleted(removed) => {
                    info!(id = removed.id, "task deleted from cli");
                    format!("Deleted \"{}\".", removed.title)
                }
            };
            renderer.message(out, &msg)?;
        }
        Action::Pin { text } => {
            let text = text.join(" ");
            session.apply(|board, now| {
                board.set_input_title(text.as_str());
                board.add_pin_from_input(now)
            })?;
            renderer.message(out, &format!("Pinned \"{}\".", text.trim()))?;
        }
        Action::Unpin { text } => {
            let text = text.join(" ");
            session.apply(|board, _| board.remove_pin(&text))?;
            renderer.message(out, &format!("Unpinned \"{text}\"."))?;
        }
        Action::Use { text } => {
            let text = text.join(" ");
            session.apply(|board, _| board.use_pin(&text))?;
            renderer.message(out, &format!("Input: \"{text}\""))?;
        }
        Action::Date { spec } => {
            let date = parse_spec(session, &spec)?;
            session.update(|board| board.select_date(date));
            renderer.message(out, &format!("Date: {}", describe_date(date)))?;
        }
        Action::Week { offset, relative } => {
            match offset {
                Some(delta) if relative => session.update(|board| board.shift_week(delta)),
                Some(offset) => session.update(|board| board.set_week_offset(offset)),
                None => {}
            }
            renderer.print_week(out, session.board(), session.today())?;
        }
        Action::CheckDate { year, month, day } => {
            let custom = CustomDate::parse(&year, &month, &day)
                .ok_or_else(|| BoardError::InvalidDate(format!("{year}-{month}-{day}")))?;
            let msg = match mode {
                Mode::Shell => {
                    let date = session.apply(|board, _| board.apply_custom_date(&custom))?;
                    format!("Date: {}", describe_date(Some(date)))
                }
                Mode::OneShot => {
                    let date = custom
                        .to_date()
                        .ok_or_else(|| BoardError::InvalidDate(format!("{year}-{month}-{day}")))?;
                    format!("Valid date: {}", describe_date(Some(date)))
                }
            };
            renderer.message(out, &msg)?;
        }
        Action::More => {
            session.update(Board::toggle_show_all_pins);
            renderer.print_pins(out, session.board())?;
        }
        Action::Undo => {
            let msg = if session.undo() { "Undone." } else { "Nothing to undo." };
            renderer.message(out, msg)?;
        }
        Action::Redo => {
            let msg = if session.redo() { "Redone." } else { "Nothing to redo." };
            renderer.message(out, msg)?;
        }
        Action::Shell => {
            return Err(anyhow!("already inside a shell"));
        }
    }
    Ok(())
}

fn cmd_add<S, C, W>(
    session: &mut Session<S, C>,
    renderer: &Renderer,
    args: AddArgs,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
    W: Write,
{
    if let Some(spec) = args.date.as_deref() {
        let date = parse_spec(session, spec)?;
        session.update(|board| board.select_date(date));
    }

    let title = args.title.join(" ");
    let id = session.apply(|board, now| {
        if !title.is_empty() {
            board.set_input_title(title.as_str());
        }
        board.add_task(now)
    })?;

    let board = session.board();
    let due = board.task(id).and_then(|task| task.due_date);
    renderer.message(
        out,
        &format!("Added \"{}\" (due: {}).", task_title(board, id), describe_date(due)),
    )
}

fn cmd_edit<S, C, W>(
    session: &mut Session<S, C>,
    renderer: &Renderer,
    args: EditArgs,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
    W: Write,
{
    let id = resolve_task(session, &args.task)?;
    let date = match (args.no_date, args.date.as_deref()) {
        (true, _) => Some(None),
        (false, Some(spec)) => Some(parse_spec(session, spec)?),
        (false, None) => None,
    };
    let title = args.title.join(" ");

    session.apply(|board, now| {
        board.start_edit(id)?;
        if !title.is_empty() {
            board.set_input_title(title.as_str());
        }
        if let Some(date) = date {
            board.select_date(date);
        }
        let saved = board.save_edit(now);
        if saved.is_err() {
            board.cancel_edit();
        }
        saved
    })?;

    renderer.message(out, &format!("Updated \"{}\".", task_title(session.board(), id)))
}

/// A row number as printed by `list`, or a raw task id.
pub fn resolve_task<S, C>(session: &Session<S, C>, token: &str) -> anyhow::Result<TaskId>
where
    S: KeyValueStore,
    C: Clock,
{
    let n: u64 = token
        .trim()
        .parse()
        .with_context(|| format!("expected a row number or task id, got: {token}"))?;

    let rows = row_ids(&session.view());
    if let Ok(idx) = usize::try_from(n)
        && (1..=rows.len()).contains(&idx)
    {
        return Ok(rows[idx - 1]);
    }
    if session.board().task(n).is_some() {
        return Ok(n);
    }
    Err(BoardError::UnknownTask(n).into())
}

fn parse_spec<S, C>(session: &Session<S, C>, spec: &str) -> anyhow::Result<Option<NaiveDate>>
where
    S: KeyValueStore,
    C: Clock,
{
    parse_date_spec(spec, session.today(), session.board().week_offset())
}

fn task_title(board: &Board, id: TaskId) -> String {
    board
        .task(id)
        .map(|task| task.title.clone())
        .unwrap_or_else(|| id.to_string())
}

fn describe_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use quickpin_shared::{DEFAULT_HISTORY_LIMIT, FixedClock, MemoryStore};

    use super::*;
    use crate::config::Config;

    type TestSession = Session<MemoryStore, FixedClock>;

    fn session() -> TestSession {
        let clock = FixedClock::new(DateTime::from_timestamp(1_710_288_000, 0).expect("timestamp"));
        Session::open(MemoryStore::new(), clock, DEFAULT_HISTORY_LIMIT)
    }

    fn run_in(session: &mut TestSession, action: Action, mode: Mode) -> anyhow::Result<String> {
        let renderer = Renderer::new(&Config::default()).with_color(false);
        let mut out = Vec::new();
        dispatch(session, &renderer, action, mode, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    fn run(session: &mut TestSession, action: Action) -> anyhow::Result<String> {
        run_in(session, action, Mode::Shell)
    }

    fn add(session: &mut TestSession, title: &str, date: Option<&str>) {
        run(
            session,
            Action::Add(AddArgs {
                date: date.map(str::to_string),
                title: title.split_whitespace().map(str::to_string).collect(),
            }),
        )
        .expect("add");
    }

    #[test]
    fn add_with_date_spec_sets_due_date() {
        let mut session = session();
        add(&mut session, "Dentist visit", Some("tomorrow"));

        let task = &session.board().tasks()[0];
        assert_eq!(task.title, "Dentist visit");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 14));
    }

    #[test]
    fn rows_resolve_in_display_order() {
        let mut session = session();
        add(&mut session, "undated", None);
        add(&mut session, "dated", Some("today"));

        // The dated task sorts first in the open list.
        let first = resolve_task(&session, "1").expect("row 1");
        assert_eq!(task_title(session.board(), first), "dated");
        assert!(resolve_task(&session, "9").is_err());
        assert!(resolve_task(&session, "abc").is_err());

        let raw_id = session.board().tasks()[0].id;
        assert_eq!(resolve_task(&session, &raw_id.to_string()).expect("id"), raw_id);
    }

    #[test]
    fn delete_needs_two_steps_or_yes() {
        let mut session = session();
        add(&mut session, "a", None);
        add(&mut session, "b", None);

        let text = run(&mut session, Action::Delete { task: "1".into(), yes: false }).expect("arm");
        assert!(text.contains("to confirm"));
        assert_eq!(session.board().tasks().len(), 2);

        run(&mut session, Action::Delete { task: "1".into(), yes: false }).expect("confirm");
        assert_eq!(session.board().tasks().len(), 1);

        run(&mut session, Action::Delete { task: "1".into(), yes: true }).expect("delete");
        assert!(session.board().tasks().is_empty());
    }

    #[test]
    fn edit_can_clear_date_and_keep_title() {
        let mut session = session();
        add(&mut session, "Report", Some("today"));
        run(
            &mut session,
            Action::Edit(EditArgs {
                task: "1".into(),
                date: None,
                no_date: true,
                title: vec![],
            }),
        )
        .expect("edit");

        let task = &session.board().tasks()[0];
        assert_eq!(task.title, "Report");
        assert_eq!(task.due_date, None);
        assert_eq!(session.board().input().selected_date, NaiveDate::from_ymd_opt(2024, 3, 13));
    }

    #[test]
    fn blank_add_reports_error_and_changes_nothing() {
        let mut session = session();
        let err = run(&mut session, Action::Add(AddArgs { date: None, title: vec![] }))
            .expect_err("blank add");
        assert_eq!(err.downcast_ref::<BoardError>(), Some(&BoardError::BlankTitle));
        assert!(session.board().tasks().is_empty());
    }

    #[test]
    fn used_pin_can_be_added_as_task() {
        let mut session = session();
        run(&mut session, Action::Pin { text: vec!["coffee".into(), "beans".into()] }).expect("pin");
        run(&mut session, Action::Use { text: vec!["coffee beans".into()] }).expect("use");
        run(&mut session, Action::Add(AddArgs { date: None, title: vec![] })).expect("add from input");
        assert_eq!(session.board().tasks()[0].title, "coffee beans");
    }

    #[test]
    fn invalid_custom_date_is_rejected() {
        let mut session = session();
        let action = Action::CheckDate {
            year: "2023".into(),
            month: "02".into(),
            day: "30".into(),
        };
        assert!(run(&mut session, action).is_err());
        let text = run(
            &mut session,
            Action::CheckDate {
                year: "2024".into(),
                month: "2".into(),
                day: "29".into(),
            },
        )
        .expect("valid");
        assert_eq!(text.trim(), "Date: 2024-02-29");

        let overlong = Action::CheckDate {
            year: "2024".into(),
            month: "123".into(),
            day: "01".into(),
        };
        assert!(run(&mut session, overlong).is_err());
        assert_eq!(session.board().input().selected_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn one_shot_refuses_session_only_commands() {
        let mut session = session();
        run_in(&mut session, Action::Pin { text: vec!["tea".into()] }, Mode::OneShot).expect("pin");

        for action in [
            Action::Use { text: vec!["tea".into()] },
            Action::Date { spec: "today".into() },
            Action::More,
        ] {
            let err = run_in(&mut session, action, Mode::OneShot).expect_err("shell only");
            assert!(err.to_string().contains("quickpin shell"));
        }
        assert_eq!(session.board().input().title, "tea");
        assert_eq!(session.board().input().selected_date, None);
        assert!(!session.board().show_all_pins());
    }

    #[test]
    fn one_shot_delete_asks_for_yes_and_check_date_only_validates() {
        let mut session = session();
        add(&mut session, "Keep", None);

        let text = run_in(
            &mut session,
            Action::Delete { task: "1".into(), yes: false },
            Mode::OneShot,
        )
        .expect("arm");
        assert_eq!(text.trim(), "Delete \"Keep\"? Pass --yes to confirm.");

        let text = run_in(
            &mut session,
            Action::CheckDate {
                year: "2024".into(),
                month: "3".into(),
                day: "20".into(),
            },
            Mode::OneShot,
        )
        .expect("valid");
        assert_eq!(text.trim(), "Valid date: 2024-03-20");
        assert_eq!(session.board().input().selected_date, None);
    }

    #[test]
    fn undo_reports_when_history_is_exhausted() {
        let mut session = session();
        assert_eq!(run(&mut session, Action::Undo).expect("undo").trim(), "Nothing to undo.");
        add(&mut session, "a", None);
        assert_eq!(run(&mut session, Action::Undo).expect("undo").trim(), "Undone.");
        assert!(session.board().tasks().is_empty());
        assert_eq!(run(&mut session, Action::Redo).expect("redo").trim(), "Redone.");
        assert_eq!(session.board().tasks().len(), 1);
    }
}
