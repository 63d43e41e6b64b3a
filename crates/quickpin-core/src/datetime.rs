use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  Days,
  Local,
  NaiveDate,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use quickpin_shared::calendar::{
  CustomDate,
  week_strip
};
use quickpin_shared::Clock;
use regex::Regex;

use crate::config::Config;

const TIMEZONE_ENV_VAR: &str =
  "QUICKPIN_TIMEZONE";

/// System clock that reads "today" in the configured zone, or the host's
/// local zone when none is configured.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
  zone: Option<Tz>
}

impl ZonedClock {
  pub fn new(zone: Option<Tz>) -> Self {
    Self { zone }
  }

  pub fn from_config(
    cfg: &Config
  ) -> Self {
    Self::new(resolve_timezone(
      cfg.timezone.as_deref()
    ))
  }
}

impl Clock for ZonedClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }

  fn today(&self) -> NaiveDate {
    match self.zone {
      | Some(tz) => {
        Utc::now()
          .with_timezone(&tz)
          .date_naive()
      }
      | None => Local::now().date_naive()
    }
  }
}

/// `$QUICKPIN_TIMEZONE` first, then the config value. Unparseable names
/// are logged and ignored.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Option<Tz> {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return Some(tz);
  }

  configured.and_then(|raw| {
    parse_timezone(raw, "config")
  })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

fn relative_re() -> &'static Regex {
  static RELATIVE: OnceLock<Regex> =
    OnceLock::new();
  RELATIVE.get_or_init(|| {
    Regex::new(
      r"^(?P<sign>[+-])(?P<num>\d{1,4})(?P<unit>[dw]?)$"
    )
    .unwrap_or_else(|err| {
      panic!(
        "relative date pattern must \
         compile: {err}"
      )
    })
  })
}

/// Turns a typed date into the picker selection. `None` means "no date".
///
/// Accepted: `none`, `today`, `tomorrow`, `yesterday`, a weekday name
/// (resolved inside the week strip at `week_offset`), `+N`/`-N` days,
/// `+Nw`/`-Nw` weeks, and `YYYY-MM-DD` or `YYYY/M/D`.
#[tracing::instrument(skip(today))]
pub fn parse_date_spec(
  input: &str,
  today: NaiveDate,
  week_offset: i32
) -> anyhow::Result<Option<NaiveDate>> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "none" | "no-date" | "clear" => {
      return Ok(None);
    }
    | "today" => return Ok(Some(today)),
    | "tomorrow" => {
      return today
        .checked_add_days(Days::new(1))
        .map(Some)
        .ok_or_else(|| {
          anyhow!("date out of range")
        });
    }
    | "yesterday" => {
      return today
        .checked_sub_days(Days::new(1))
        .map(Some)
        .ok_or_else(|| {
          anyhow!("date out of range")
        });
    }
    | _ => {}
  }

  if let Some(weekday) =
    parse_weekday_name(&lower)
  {
    let day = week_strip(
      today,
      week_offset
    )
    .into_iter()
    .find(|d| d.date.weekday() == weekday)
    .ok_or_else(|| {
      anyhow!(
        "weekday missing from strip"
      )
    })?;
    return Ok(Some(day.date));
  }

  if let Some(caps) =
    relative_re().captures(token)
  {
    let num: u64 = caps["num"]
      .parse()
      .context(
        "invalid relative number"
      )?;
    let days = match &caps["unit"] {
      | "w" => num * 7,
      | _ => num
    };
    let shifted = if &caps["sign"] == "-"
    {
      today.checked_sub_days(Days::new(
        days
      ))
    } else {
      today.checked_add_days(Days::new(
        days
      ))
    };
    return shifted.map(Some).ok_or_else(
      || anyhow!("date out of range")
    );
  }

  let parts: Vec<&str> = token
    .split(['-', '/'])
    .collect();
  if let [year, month, day] =
    parts.as_slice()
    && year.len() == 4
  {
    return CustomDate::parse(
      year, month, day
    )
    .and_then(|custom| custom.to_date())
    .map(Some)
    .ok_or_else(|| {
      anyhow!(
        "not a calendar date: {token}"
      )
    });
  }

  Err(anyhow!(
    "unrecognized date: {input}"
  ))
  .with_context(|| {
    "supported formats: none, today, \
     tomorrow, yesterday, weekday \
     names, +N/-N days, +Nw/-Nw \
     weeks, YYYY-MM-DD, YYYY/M/D"
  })
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}
