use std::io::{BufRead, Write};

use clap::Parser;
use quickpin_shared::{Board, Clock, KeyValueStore, Session};
use tracing::{debug, info};

use crate::cli::{Action, ShellLine};
use crate::commands::{Mode, dispatch};
use crate::render::Renderer;

const PROMPT: &str = "quickpin> ";

/// Interactive loop over one session, so that undo history, the armed
/// delete and the entry box survive between commands.
///
/// Any command other than `done`, `delete` and `list` counts as a click
/// elsewhere and disarms a pending delete.
#[tracing::instrument(skip_all)]
pub fn run_shell<S, C, R, W>(
    session: &mut Session<S, C>,
    renderer: &Renderer,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    info!("starting shell");
    renderer.print_board(out, session.board(), session.today(), session.now())?;

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "quit" | "exit") {
            break;
        }

        let parsed = match ShellLine::try_parse_from(trimmed.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(out, "{err}")?;
                continue;
            }
        };
        debug!(action = ?parsed.action, "shell command");

        if !matches!(
            parsed.action,
            Action::Done { .. } | Action::Delete { .. } | Action::List
        ) {
            session.update(Board::dismiss_pending_delete);
        }

        if let Err(err) = dispatch(session, renderer, parsed.action, Mode::Shell, out) {
            writeln!(out, "error: {err:#}")?;
        }
    }

    info!("shell closed");
    Ok(())
}
