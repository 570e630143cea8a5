//! Recurring schedules read from `option`, `option.period`, `option.sync`,
//! `option.offset` and `option.at_start`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How often something fires and whether it is aligned to wall-clock
/// boundaries.
///
/// With `sync` off the next deadline is always a full `period` away. With
/// `sync` on, deadlines fall on multiples of `period` since the Unix epoch,
/// shifted by `offset`: a one-minute synced rate fires at the top of every
/// minute, one with a ten-second offset at `:10` past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rate {
    pub period: Duration,
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub offset: Duration,
    /// Fire once immediately before following the schedule.
    #[serde(default)]
    pub at_start: bool,
}

impl Rate {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_at_start(mut self, at_start: bool) -> Self {
        self.at_start = at_start;
        self
    }

    /// Time to wait from `now` until the next deadline.
    ///
    /// Synced rates compute `period - ((now - offset) mod period)` in
    /// nanoseconds, so the wait lies in `(0, period]`. A zero period never
    /// waits.
    pub fn next_deadline(&self, now: DateTime<Utc>) -> Duration {
        if !self.sync {
            return self.period;
        }
        let period = nanos(self.period);
        if period == 0 {
            return Duration::ZERO;
        }
        let now = i128::from(now.timestamp()) * NANOS_PER_SEC
            + i128::from(now.timestamp_subsec_nanos());
        let wait = (period - (now - nanos(self.offset)).rem_euclid(period)).unsigned_abs();
        let secs = u64::try_from(wait / NANOS_PER_SEC.unsigned_abs()).unwrap_or(u64::MAX);
        let subsec = (wait % NANOS_PER_SEC.unsigned_abs()) as u32;
        Duration::new(secs, subsec)
    }

    /// The wall-clock time of the next deadline after `now`.
    pub fn next_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let wait = self.next_deadline(now);
        TimeDelta::from_std(wait)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

fn nanos(duration: Duration) -> i128 {
    i128::try_from(duration.as_nanos()).unwrap_or(i128::MAX)
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {}", humantime::format_duration(self.period))?;
        if self.sync {
            write!(f, ", synced")?;
            if !self.offset.is_zero() {
                write!(f, " +{}", humantime::format_duration(self.offset))?;
            }
        }
        if self.at_start {
            write!(f, ", at start")?;
        }
        Ok(())
    }
}
