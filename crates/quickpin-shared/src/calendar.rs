use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub name: String,
    pub month_day: String,
    pub is_today: bool,
    pub is_saturday: bool,
    pub is_sunday: bool,
}

pub fn weekday_short_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(date)
}

/// Sunday of the week containing `today + 7 * week_offset` days.
pub fn week_start(today: NaiveDate, week_offset: i32) -> NaiveDate {
    let base = shift_days(today, i64::from(week_offset) * 7);
    let back = i64::from(base.weekday().num_days_from_sunday());
    shift_days(base, -back)
}

pub fn week_strip(today: NaiveDate, week_offset: i32) -> Vec<WeekDay> {
    let sunday = week_start(today, week_offset);
    (0..7)
        .map(|i| {
            let date = shift_days(sunday, i);
            let weekday = date.weekday();
            WeekDay {
                date,
                name: weekday_short_name(weekday).to_string(),
                month_day: format!("{}/{}", date.month(), date.day()),
                is_today: date == today,
                is_saturday: weekday == Weekday::Sat,
                is_sunday: weekday == Weekday::Sun,
            }
        })
        .collect()
}

pub fn week_label(week_offset: i32) -> String {
    match week_offset {
        0 => "This week".to_string(),
        1 => "Next week".to_string(),
        -1 => "Last week".to_string(),
        n if n > 0 => format!("{n} weeks later"),
        n => format!("{} weeks ago", n.unsigned_abs()),
    }
}

/// True when a date is selected that the visible strip does not show.
pub fn is_other_date(selected: Option<NaiveDate>, strip: &[WeekDay]) -> bool {
    selected.is_some_and(|date| !strip.iter().any(|day| day.date == date))
}

pub fn other_date_label(selected: Option<NaiveDate>, strip: &[WeekDay]) -> String {
    match selected {
        Some(date) if is_other_date(selected, strip) => {
            format!("Other ({}/{})", date.month(), date.day())
        }
        _ => "Other".to_string(),
    }
}

/// Year/month/day as typed into the custom date dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomDate {
    year: String,
    month: String,
    day: String,
}

fn digits(raw: &str, max: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max).collect()
}

impl CustomDate {
    pub fn new(year: &str, month: &str, day: &str) -> Self {
        let mut date = Self::default();
        date.set_year(year);
        date.set_month(month);
        date.set_day(day);
        date
    }

    /// Strict form of [`CustomDate::new`] for typed-out dates: every part must
    /// already be plain digits within its field width, nothing is filtered.
    pub fn parse(year: &str, month: &str, day: &str) -> Option<Self> {
        let fits = |raw: &str, max: usize| {
            !raw.is_empty() && raw.len() <= max && raw.bytes().all(|b| b.is_ascii_digit())
        };
        if !fits(year, 4) || !fits(month, 2) || !fits(day, 2) {
            return None;
        }
        Some(Self {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        })
    }

    /// What the custom date dialog shows when it opens.
    pub fn today<C: Clock>(clock: &C) -> Self {
        Self::from_date(clock.today())
    }

    /// Prefilled with `today`, zero padded like an ISO date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: format!("{:04}", date.year()),
            month: format!("{:02}", date.month()),
            day: format!("{:02}", date.day()),
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn set_year(&mut self, raw: &str) {
        self.year = digits(raw, 4);
    }

    pub fn set_month(&mut self, raw: &str) {
        self.month = digits(raw, 2);
    }

    pub fn set_day(&mut self, raw: &str) {
        self.day = digits(raw, 2);
    }

    /// The calendar date these fields name, if they name a real one.
    ///
    /// The year must be exactly four digits and two-digit era years
    /// (0000-0099) are rejected.
    pub fn to_date(&self) -> Option<NaiveDate> {
        if self.year.len() != 4 || self.month.is_empty() || self.day.is_empty() {
            return None;
        }
        let year: i32 = self.year.parse().ok()?;
        let month: u32 = self.month.parse().ok()?;
        let day: u32 = self.day.parse().ok()?;
        if year < 100 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn is_valid(&self) -> bool {
        self.to_date().is_some()
    }
}
