use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "quickpin",
    version,
    about = "Quick pin & click to-do list for the terminal",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Action>,
}

/// One line typed at the `shell` prompt.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "quickpin",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the week strip, pins and both task lists.
    #[command(visible_alias = "ls")]
    List,

    /// Add a task with the given title, or with the entry box contents.
    Add(AddArgs),

    /// Toggle a task between open and done.
    #[command(visible_aliases = ["toggle", "click"])]
    Done { task: String },

    /// Rewrite a task's title or due date.
    Edit(EditArgs),

    /// Arm a task for deletion; repeat (or pass --yes) to delete it.
    #[command(visible_alias = "rm")]
    Delete {
        task: String,
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Save text as a pin.
    Pin {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove a pin.
    Unpin {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Copy a pin into the entry box and move it to the front.
    Use {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Select the due date used by the next `add`.
    Date { spec: String },

    /// Move the visible week, or show it with no argument.
    Week {
        #[arg(allow_negative_numbers = true)]
        offset: Option<i32>,
        /// Shift relative to the current offset instead of replacing it.
        #[arg(long)]
        relative: bool,
    },

    /// Validate a year/month/day triple as a due date.
    #[command(name = "check-date")]
    CheckDate {
        year: String,
        month: String,
        day: String,
    },

    /// Expand or collapse the pin area.
    More,

    #[command(visible_alias = "z")]
    Undo,

    #[command(visible_alias = "y")]
    Redo,

    /// Read commands line by line, keeping history between them.
    Shell,
}

impl Action {
    /// Commands whose only effect is on unsaved session state.
    pub fn shell_only_name(&self) -> Option<&'static str> {
        match self {
            Action::Use { .. } => Some("use"),
            Action::Date { .. } => Some("date"),
            Action::More => Some("more"),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(short = 'd', long = "date")]
    pub date: Option<String>,

    #[arg(num_args = 0..)]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub task: String,

    #[arg(short = 'd', long = "date", conflicts_with = "no_date")]
    pub date: Option<String>,

    #[arg(long = "no-date")]
    pub no_date: bool,

    #[arg(num_args = 0..)]
    pub title: Vec<String>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = GlobalCli::try_parse_from(["quickpin", "-v", "--data", "/tmp/q"]).expect("parse");
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.command, None);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/q")));
    }

    #[test]
    fn add_collects_title_words_and_date() {
        let cli = GlobalCli::try_parse_from(["quickpin", "add", "--date", "tomorrow", "Buy", "milk"])
            .expect("parse");
        let Some(Action::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.date.as_deref(), Some("tomorrow"));
        assert_eq!(args.title, vec!["Buy", "milk"]);
    }

    #[test]
    fn rc_overrides_need_key_value() {
        let cli = GlobalCli::try_parse_from(["quickpin", "--rc", "pin_rows=4", "list"]).expect("parse");
        assert_eq!(cli.rc_overrides[0].key, "pin_rows");
        assert_eq!(cli.rc_overrides[0].value, "4");
        assert!(GlobalCli::try_parse_from(["quickpin", "--rc", "pin_rows"]).is_err());
    }

    #[test]
    fn shell_lines_parse_without_binary_name() {
        let line = ShellLine::try_parse_from(["week", "-2"]).expect("parse");
        assert_eq!(
            line.action,
            Action::Week {
                offset: Some(-2),
                relative: false
            }
        );
        let line = ShellLine::try_parse_from(["rm", "3", "--yes"]).expect("parse");
        assert_eq!(
            line.action,
            Action::Delete {
                task: "3".into(),
                yes: true
            }
        );
        let line = ShellLine::try_parse_from(["edit", "1", "--no-date"]).expect("parse");
        let Action::Edit(args) = line.action else {
            panic!("expected edit");
        };
        assert!(args.no_date);
        assert!(args.title.is_empty());
    }
}
