use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use quickpin_shared::calendar::{is_other_date, other_date_label, week_label, week_strip, weekday_short_name};
use quickpin_shared::overflow::wrap_offsets;
use quickpin_shared::{Board, BoardView, EditMode, PinOverflow, TaskId, TaskRow, Urgency};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

const PIN_INDENT: usize = 2;
const PIN_GAP: usize = 1;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    width: usize,
    pin_rows: usize,
}

/// Task ids in display order: open tasks first, then done ones. Row numbers
/// printed by [`Renderer::print_board`] index into this, starting at 1.
pub fn row_ids(view: &BoardView) -> Vec<TaskId> {
    view.active
        .iter()
        .chain(view.done.iter())
        .map(|row| row.task.id)
        .collect()
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color && io::stdout().is_terminal(),
            width: cfg.width.max(20),
            pin_rows: cfg.pin_rows.max(1),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[tracing::instrument(skip(self, out, board, now))]
    pub fn print_board<W: Write>(
        &self,
        out: &mut W,
        board: &Board,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.print_week(out, board, today)?;
        writeln!(out)?;
        self.print_pins(out, board)?;
        writeln!(out)?;

        let view = board.view(today);
        self.print_rows(out, &view)?;
        self.print_input(out, board, now)?;
        Ok(())
    }

    pub fn print_week<W: Write>(&self, out: &mut W, board: &Board, today: NaiveDate) -> anyhow::Result<()> {
        let strip = week_strip(today, board.week_offset());
        let selected = board.input().selected_date;

        if let (Some(first), Some(last)) = (strip.first(), strip.last()) {
            writeln!(
                out,
                "{}  {} .. {}",
                self.paint(&week_label(board.week_offset()), "1"),
                first.date.format("%Y-%m-%d"),
                last.date.format("%Y-%m-%d")
            )?;
        }

        let cells: Vec<String> = strip
            .iter()
            .map(|day| {
                let text = format!("{} {}", day.name, day.month_day);
                let text = if selected == Some(day.date) {
                    format!("[{text}]")
                } else {
                    format!(" {text} ")
                };
                if day.is_today {
                    self.paint(&text, "1;4")
                } else if day.is_sunday {
                    self.paint(&text, "31")
                } else if day.is_saturday {
                    self.paint(&text, "34")
                } else {
                    text
                }
            })
            .collect();
        writeln!(out, "{}", cells.join(" "))?;

        let date_line = match selected {
            None => "Date: none".to_string(),
            Some(date) => format!(
                "Date: {} {}",
                weekday_short_name(date.weekday()),
                date.format("%Y-%m-%d")
            ),
        };
        if is_other_date(selected, &strip) {
            writeln!(out, "{date_line}  [{}]", other_date_label(selected, &strip))?;
        } else {
            writeln!(out, "{date_line}")?;
        }
        Ok(())
    }

    pub fn print_pins<W: Write>(&self, out: &mut W, board: &Board) -> anyhow::Result<()> {
        let pins = board.pins();
        if pins.is_empty() {
            writeln!(out, "Pins: (none)")?;
            return Ok(());
        }
        writeln!(out, "Pins:")?;

        let labels: Vec<String> = pins.iter().map(|text| format!("[{text}]")).collect();
        let widths: Vec<usize> = labels
            .iter()
            .map(|label| UnicodeWidthStr::width(label.as_str()))
            .collect();
        let offsets = wrap_offsets(&widths, self.width.saturating_sub(PIN_INDENT), PIN_GAP);
        let overflow = PinOverflow::from_offsets(&offsets, self.pin_rows);
        let show_all = board.show_all_pins();

        let mut line = String::new();
        let mut current_row = None;
        for (idx, label) in labels.iter().enumerate() {
            if overflow.is_hidden(idx, show_all) {
                break;
            }
            if current_row.is_some() && current_row != Some(offsets[idx]) {
                writeln!(out, "{}{line}", " ".repeat(PIN_INDENT))?;
                line.clear();
            }
            if !line.is_empty() {
                line.push_str(&" ".repeat(PIN_GAP));
            }
            line.push_str(&self.paint(label, "36"));
            current_row = Some(offsets[idx]);
        }
        if !line.is_empty() {
            writeln!(out, "{}{line}", " ".repeat(PIN_INDENT))?;
        }

        if let Some(label) = overflow.toggle_label(pins.len(), show_all) {
            writeln!(out, "{}{}", " ".repeat(PIN_INDENT), self.paint(&label, "2"))?;
        }
        Ok(())
    }

    pub fn print_rows<W: Write>(&self, out: &mut W, view: &BoardView) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint("Active", "1"))?;
        if view.active.is_empty() {
            writeln!(out, "  Nothing to do.")?;
        }
        for (idx, row) in view.active.iter().enumerate() {
            writeln!(out, "{}", self.format_row(idx + 1, row))?;
        }

        if !view.done.is_empty() {
            writeln!(out, "{}", self.paint("Done", "1"))?;
            let offset = view.active.len();
            for (idx, row) in view.done.iter().enumerate() {
                writeln!(out, "{}", self.format_row(offset + idx + 1, row))?;
            }
        }
        Ok(())
    }

    fn format_row(&self, number: usize, row: &TaskRow) -> String {
        let mark = if row.task.is_done { "[x]" } else { "[ ]" };
        let number = self.paint(&format!("{number:>3}."), "33");
        let title = if row.task.is_done {
            self.paint(&row.task.title, "2;9")
        } else {
            row.task.title.clone()
        };

        let mut line = format!("{number} {mark} {title}");
        if let Some(label) = row.due_label() {
            let code = match row.urgency {
                Urgency::Overdue => "31",
                Urgency::DueSoon => "33",
                Urgency::Normal => "2",
            };
            line.push_str("  ");
            line.push_str(&self.paint(&format!("({label})"), code));
        }
        if row.pending_delete {
            line.push_str("  ");
            line.push_str(&self.paint("delete? run it again to confirm", "1;31"));
        }
        line
    }

    pub fn print_input<W: Write>(&self, out: &mut W, board: &Board, now: DateTime<Utc>) -> anyhow::Result<()> {
        let input = board.input();
        let flash = if board.flash_active(now) {
            format!(" {}", self.paint("!", "1;31"))
        } else {
            String::new()
        };

        match board.edit_mode() {
            EditMode::Editing { id, .. } => {
                writeln!(out, "Editing {id}: \"{}\"{flash}", input.title)?;
            }
            EditMode::Idle if !input.title.is_empty() || !flash.is_empty() => {
                writeln!(out, "Input: \"{}\"{flash}", input.title)?;
            }
            EditMode::Idle => {}
        }
        Ok(())
    }

    pub fn message<W: Write>(&self, out: &mut W, text: &str) -> anyhow::Result<()> {
        writeln!(out, "{text}")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

#[cfg(test)]
mod tests {
    use quickpin_shared::{Snapshot, DEFAULT_HISTORY_LIMIT};

    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_710_288_000, 0).expect("timestamp")
    }

    fn plain(width: usize, pin_rows: usize) -> Renderer {
        Renderer {
            color: false,
            width,
            pin_rows,
        }
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut escaped = false;

        for ch in s.chars() {
            if escaped {
                if ch == 'm' {
                    escaped = false;
                }
                continue;
            }

            if ch == '\x1b' {
                escaped = true;
                continue;
            }

            out.push(ch);
        }

        out
    }

    fn render(renderer: &Renderer, board: &Board) -> String {
        let mut out = Vec::new();
        renderer
            .print_board(&mut out, board, t0().date_naive(), t0())
            .expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn empty_board_shows_placeholders() {
        let board = Board::new(Snapshot::default(), DEFAULT_HISTORY_LIMIT);
        let text = render(&plain(80, 3), &board);
        assert!(text.contains("This week  2024-03-10 .. 2024-03-16"));
        assert!(text.contains("Date: none"));
        assert!(text.contains("Pins: (none)"));
        assert!(text.contains("Nothing to do."));
        assert!(!text.contains("Done"));
    }

    #[test]
    fn rows_are_numbered_across_sections() {
        let mut board = Board::new(Snapshot::default(), DEFAULT_HISTORY_LIMIT);
        board.select_date(Some(t0().date_naive()));
        board.set_input_title("Buy milk");
        let milk = board.add_task(t0()).expect("add");
        board.select_date(None);
        board.set_input_title("Call mom");
        board.add_task(t0()).expect("add");
        board.toggle_done(milk, t0()).expect("toggle");

        let text = render(&plain(80, 3), &board);
        assert!(text.contains("  1. [ ] Call mom"));
        assert!(text.contains("  2. [x] Buy milk  (2024-03-13)"));
        assert_eq!(row_ids(&board.view(t0().date_naive()))[1], milk);
    }

    #[test]
    fn overflowing_pins_collapse_behind_toggle() {
        let mut board = Board::new(Snapshot::default(), DEFAULT_HISTORY_LIMIT);
        for text in ["aaaa", "bbbb", "cccc", "dddd"] {
            board.set_input_title(text);
            board.add_pin_from_input(t0()).expect("pin");
        }
        // Each "[xxxx]" is six columns wide; eight columns fit one per row.
        let renderer = plain(10, 2);
        let text = render(&renderer, &board);
        assert!(text.contains("[dddd]"));
        assert!(text.contains("[cccc]"));
        assert!(!text.contains("[bbbb]"));
        assert!(text.contains("Show more (2)"));

        board.toggle_show_all_pins();
        let text = render(&renderer, &board);
        assert!(text.contains("[aaaa]"));
        assert!(text.contains("Show less"));
    }

    #[test]
    fn pending_delete_and_flash_are_visible() {
        let mut board = Board::new(Snapshot::default(), DEFAULT_HISTORY_LIMIT);
        board.set_input_title("a");
        let id = board.add_task(t0()).expect("add");
        board.secondary_action(id).expect("arm");
        assert!(board.add_task(t0()).is_err());

        let text = render(&plain(80, 3), &board);
        assert!(text.contains("delete? run it again to confirm"));
        assert!(text.contains("Input: \"\" !"));
    }

    #[test]
    fn colored_output_matches_plain_once_escapes_are_removed() {
        let mut board = Board::new(Snapshot::default(), DEFAULT_HISTORY_LIMIT);
        board.select_date(Some(t0().date_naive()));
        board.set_input_title("Pay rent");
        let id = board.add_task(t0()).expect("add");
        board.set_input_title("rent");
        board.add_pin_from_input(t0()).expect("pin");
        board.secondary_action(id).expect("arm");

        let colored = render(&plain(80, 3).with_color(true), &board);
        assert!(colored.contains('\x1b'));
        assert_eq!(strip_ansi(&colored), render(&plain(80, 3), &board));
    }
}
