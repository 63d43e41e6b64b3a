use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use quickpin_shared::DEFAULT_HISTORY_LIMIT;
use quickpin_shared::overflow::DEFAULT_VISIBLE_ROWS;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

const CONFIG_ENV_VAR: &str =
  "QUICKPIN_CONFIG";
const CONFIG_FILE_NAME: &str =
  "config.toml";
const APP_DIR_NAME: &str = "quickpin";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub data_dir:      Option<PathBuf>,
  pub history_limit: usize,
  pub pin_rows:      usize,
  pub width:         usize,
  pub color:         bool,
  pub timezone:      Option<String>,
  #[serde(skip)]
  pub loaded_files:  Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_dir:      None,
      history_limit:
        DEFAULT_HISTORY_LIMIT,
      pin_rows:      DEFAULT_VISIBLE_ROWS,
      width:         80,
      color:         true,
      timezone:      None,
      loaded_files:  vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      config_override
    ) else {
      debug!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg: Config =
      toml::from_str(&text)
        .with_context(|| {
          format!(
            "invalid config file {}",
            path.display()
          )
        })?;
    cfg.loaded_files.push(path);
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.set(&key, &value)?;
    }
    Ok(())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let value = value.trim();
    match key.trim() {
      | "data_dir" => {
        self.data_dir =
          Some(PathBuf::from(value));
      }
      | "history_limit" => {
        self.history_limit =
          parse_number(key, value)?;
      }
      | "pin_rows" => {
        self.pin_rows =
          parse_number(key, value)?;
      }
      | "width" => {
        self.width =
          parse_number(key, value)?;
      }
      | "color" => {
        self.color = parse_bool(value)
          .ok_or_else(|| {
            anyhow!(
              "invalid color setting: \
               {value}"
            )
          })?;
      }
      | "timezone" => {
        self.timezone =
          (!value.is_empty())
            .then(|| value.to_string());
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: {other}"
        ));
      }
    }
    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.data_dir.as_deref()
  {
    expand_tilde(cfg_value)
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(expand_tilde(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  let Some(config_dir) =
    dirs::config_dir()
  else {
    warn!(
      "cannot determine config \
       directory"
    );
    return None;
  };
  let candidate = config_dir
    .join(APP_DIR_NAME)
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let base = dirs::data_dir()
    .or_else(dirs::home_dir)
    .ok_or_else(|| {
      anyhow!(
        "cannot determine data \
         directory"
      )
    })?;
  Ok(base.join(APP_DIR_NAME))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_number(
  key: &str,
  value: &str
) -> anyhow::Result<usize> {
  value.parse().with_context(|| {
    format!(
      "invalid number for {key}: \
       {value}"
    )
  })
}

fn parse_bool(
  s: &str
) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_toml_with_defaults() {
    let cfg: Config = toml::from_str(
      "history_limit = 10\ncolor = \
       false\n"
    )
    .expect("parse config");
    assert_eq!(cfg.history_limit, 10);
    assert!(!cfg.color);
    assert_eq!(
      cfg.pin_rows,
      DEFAULT_VISIBLE_ROWS
    );
    assert_eq!(cfg.width, 80);
  }

  #[test]
  fn rejects_unknown_keys() {
    assert!(
      toml::from_str::<Config>(
        "colour = true"
      )
      .is_err()
    );
  }

  #[test]
  fn overrides_apply_typed_values() {
    let mut cfg = Config::default();
    cfg
      .apply_overrides([
        (
          "pin_rows".to_string(),
          "5".to_string()
        ),
        (
          "color".to_string(),
          "off".to_string()
        ),
        (
          "timezone".to_string(),
          "Asia/Tokyo".to_string()
        ),
      ])
      .expect("apply overrides");
    assert_eq!(cfg.pin_rows, 5);
    assert!(!cfg.color);
    assert_eq!(
      cfg.timezone.as_deref(),
      Some("Asia/Tokyo")
    );

    assert!(
      cfg
        .apply_overrides([(
          "width".to_string(),
          "wide".to_string()
        )])
        .is_err()
    );
    assert!(
      cfg
        .apply_overrides([(
          "nope".to_string(),
          "1".to_string()
        )])
        .is_err()
    );
  }

  #[test]
  fn explicit_data_dir_wins() {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let target =
      temp.path().join("nested");
    let cfg = Config::default();
    let dir = resolve_data_dir(
      &cfg,
      Some(&target)
    )
    .expect("resolve data dir");
    assert_eq!(dir, target);
    assert!(target.is_dir());
  }
}
