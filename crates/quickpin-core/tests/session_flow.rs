use std::ffi::OsString;
use std::fs;
use std::io::Cursor;

use chrono::{DateTime, Days, Duration, Utc};
use pretty_assertions::assert_eq;
use quickpin_core::config::Config;
use quickpin_core::datastore::FileStore;
use quickpin_core::render::Renderer;
use quickpin_core::shell::run_shell;
use quickpin_shared::{Clock, DEFAULT_HISTORY_LIMIT, FixedClock, Session, Task};
use tempfile::tempdir;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("timestamp")
}

fn open(dir: &std::path::Path, clock: FixedClock) -> Session<FileStore, FixedClock> {
    let store = FileStore::open(dir).expect("open datastore");
    Session::open(store, clock, DEFAULT_HISTORY_LIMIT)
}

fn shell(session: &mut Session<FileStore, FixedClock>, script: &str) -> String {
    let renderer = Renderer::new(&Config::default()).with_color(false);
    let mut out = Vec::new();
    run_shell(session, &renderer, Cursor::new(script), &mut out).expect("shell");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn tasks_and_pins_survive_reopen() {
    let temp = tempdir().expect("tempdir");
    let clock = FixedClock::new(at(1_710_288_000));

    let mut session = open(temp.path(), clock);
    shell(&mut session, "add --date fri Buy milk\npin coffee\npin tea\nuse coffee\n");
    drop(session);

    assert!(temp.path().join("tasks.json").is_file());
    let reopened = open(temp.path(), clock);
    let tasks = reopened.board().tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].due_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_eq!(reopened.board().pins().as_slice(), &["coffee", "tea"]);

    // A fresh session starts a fresh history.
    assert!(!reopened.board().history().can_undo());
}

#[test]
fn corrupt_records_open_as_empty() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("tasks.json"), "{not json").expect("write tasks");
    fs::write(temp.path().join("pins.json"), "\"oops\"").expect("write pins");

    let session = open(temp.path(), FixedClock::new(at(1_710_288_000)));
    assert!(session.board().tasks().is_empty());
    assert!(session.board().pins().is_empty());
}

#[test]
fn reopening_next_day_sweeps_finished_tasks() {
    let temp = tempdir().expect("tempdir");
    let day_one = FixedClock::new(at(1_710_288_000));

    let mut session = open(temp.path(), day_one);
    shell(
        &mut session,
        "add --date today Water plants\nadd --date today Pay rent\nadd Someday\ndone 1\n",
    );
    drop(session);

    let tomorrow = day_one
        .today()
        .checked_add_days(Days::new(1))
        .expect("tomorrow");
    let day_two = FixedClock {
        now: day_one.now() + Duration::days(1),
        today: tomorrow,
    };
    let session = open(temp.path(), day_two);

    let mut titles: Vec<_> = session
        .board()
        .tasks()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Pay rent", "Someday"]);

    let on_disk = fs::read_to_string(temp.path().join("tasks.json")).expect("read tasks");
    let stored: Vec<Task> = serde_json::from_str(&on_disk).expect("decode tasks");
    assert_eq!(stored.len(), 2);
}

#[test]
fn two_step_delete_and_undo_through_shell() {
    let temp = tempdir().expect("tempdir");
    let mut session = open(temp.path(), FixedClock::new(at(1_710_288_000)));

    let out = shell(&mut session, "add Keep me\nadd Drop me\nrm 2\nrm 2\nls\nundo\n");
    assert!(out.contains("Delete \"Drop me\"?"));
    assert!(out.contains("Deleted \"Drop me\"."));
    assert!(out.contains("Undone."));
    assert_eq!(session.board().tasks().len(), 2);

    let on_disk = fs::read_to_string(temp.path().join("tasks.json")).expect("read tasks");
    assert!(on_disk.contains("Drop me"));
}

fn invoke(dir: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
    let mut raw: Vec<OsString> = vec!["quickpin".into(), "--data".into(), dir.as_os_str().into()];
    raw.extend(args.iter().map(OsString::from));
    quickpin_core::run(raw)
}

#[test]
fn one_shot_delete_only_happens_with_yes() {
    let temp = tempdir().expect("tempdir");
    invoke(temp.path(), &["add", "Keep"]).expect("add");

    for _ in 0..2 {
        invoke(temp.path(), &["delete", "1"]).expect("arm");
    }
    let on_disk = fs::read_to_string(temp.path().join("tasks.json")).expect("read tasks");
    assert!(on_disk.contains("Keep"));

    invoke(temp.path(), &["delete", "1", "--yes"]).expect("delete");
    let on_disk = fs::read_to_string(temp.path().join("tasks.json")).expect("read tasks");
    let stored: Vec<Task> = serde_json::from_str(&on_disk).expect("decode tasks");
    assert!(stored.is_empty());
}

#[test]
fn one_shot_rejects_commands_that_would_be_forgotten() {
    let temp = tempdir().expect("tempdir");
    invoke(temp.path(), &["pin", "tea"]).expect("pin");

    let err = invoke(temp.path(), &["use", "tea"]).expect_err("use outside shell");
    assert!(format!("{err:#}").contains("quickpin shell"));
    assert!(invoke(temp.path(), &["date", "today"]).is_err());
    assert!(invoke(temp.path(), &["more"]).is_err());
}
