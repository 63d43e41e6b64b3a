use chrono::{DateTime, Duration, Utc};

pub const FLASH_DURATION_MS: i64 = 1_000;

/// Transient "bad input" marker on the text box. A newer flash supersedes the
/// older one, so only the last raise time matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlash {
    raised_at: Option<DateTime<Utc>>,
}

impl InputFlash {
    pub fn raise(&mut self, now: DateTime<Utc>) {
        self.raised_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.raised_at = None;
    }

    pub fn raised_at(&self) -> Option<DateTime<Utc>> {
        self.raised_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.raised_at
            .is_some_and(|at| now - at < Duration::milliseconds(FLASH_DURATION_MS))
    }
}
