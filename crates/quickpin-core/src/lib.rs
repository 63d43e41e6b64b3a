pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod datetime;
pub mod render;
pub mod shell;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use quickpin_shared::Session;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting quickpin CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  debug!(?cfg, "effective config");

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store =
    datastore::FileStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let clock =
    datetime::ZonedClock::from_config(
      &cfg
    );
  let mut session = Session::open(
    store,
    clock,
    cfg.history_limit
  );
  let renderer =
    render::Renderer::new(&cfg);

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match cli
    .command
    .unwrap_or(cli::Action::List)
  {
    | cli::Action::Shell => {
      shell::run_shell(
        &mut session,
        &renderer,
        io::stdin().lock(),
        &mut out
      )?;
    }
    | action => {
      commands::dispatch(
        &mut session,
        &renderer,
        action,
        commands::Mode::OneShot,
        &mut out
      )?;
    }
  }

  info!("done");
  Ok(())
}
