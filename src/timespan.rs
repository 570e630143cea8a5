//! Calendar-relative durations.
//!
//! A [`Timespan`] keeps months and years apart from the fixed part, so
//! "one month" stays one month whatever the month length. Fields are
//! normalized on construction: microseconds carry into seconds, seconds into
//! minutes, minutes into hours, hours into days and months into years. Days
//! never carry. Carries keep the sign of the field they come from.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Months, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::convert::{self, ConvertError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Timespan {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

const UNITS: [&str; 8] = [
    "years",
    "months",
    "weeks",
    "days",
    "hours",
    "minutes",
    "seconds",
    "microseconds",
];

impl Timespan {
    /// A normalized copy of `self`, or `None` if a carry overflows.
    pub fn normalized(self) -> Option<Self> {
        let mut span = self;
        carry(&mut span.microseconds, &mut span.seconds, 1_000_000)?;
        carry(&mut span.seconds, &mut span.minutes, 60)?;
        carry(&mut span.minutes, &mut span.hours, 60)?;
        carry(&mut span.hours, &mut span.days, 24)?;
        carry(&mut span.months, &mut span.years, 12)?;
        Some(span)
    }

    /// Days, hours, minutes, seconds and microseconds of a fixed duration.
    pub fn from_duration(duration: Duration) -> Self {
        let secs = duration.as_secs();
        Self {
            days: i64::try_from(secs / 86_400).unwrap_or(i64::MAX),
            hours: (secs / 3_600 % 24) as i64,
            minutes: (secs / 60 % 60) as i64,
            seconds: (secs % 60) as i64,
            microseconds: i64::from(duration.subsec_micros()),
            ..Self::default()
        }
    }

    /// Parse either `unit=integer` fields separated by commas
    /// (`days=1, seconds=10`) or a duration expression (`90s`, `1h 30m`,
    /// `3600`).
    ///
    /// `weeks` adds seven days each. A unit given twice keeps its last value.
    pub fn parse(value: &str) -> Result<Self, ConvertError> {
        if !value.contains('=') {
            return convert::parse_duration(value)
                .map(Self::from_duration)
                .map_err(|e| ConvertError::InvalidTimespan {
                    value: value.to_string(),
                    reason: e.to_string(),
                });
        }

        let invalid = |reason: String| ConvertError::InvalidTimespan {
            value: value.to_string(),
            reason,
        };

        let mut span = Self::default();
        let mut weeks = 0;
        for field in value.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let Some((unit, amount)) = field.split_once('=') else {
                return Err(invalid(format!("expected 'unit=integer', got '{field}'")));
            };
            let unit = unit.trim().to_lowercase();
            let amount: i64 = amount
                .trim()
                .parse()
                .map_err(|_| invalid(format!("'{}' is not an integer", amount.trim())))?;
            match unit.as_str() {
                "years" => span.years = amount,
                "months" => span.months = amount,
                "weeks" => weeks = amount,
                "days" => span.days = amount,
                "hours" => span.hours = amount,
                "minutes" => span.minutes = amount,
                "seconds" => span.seconds = amount,
                "microseconds" => span.microseconds = amount,
                _ => {
                    return Err(invalid(format!(
                        "unknown unit '{unit}', expected one of: {}",
                        UNITS.join(", ")
                    )));
                }
            }
        }
        let overflow = || invalid("value out of range".to_string());
        span.days = weeks
            .checked_mul(7)
            .and_then(|days| days.checked_add(span.days))
            .ok_or_else(overflow)?;
        span.normalized().ok_or_else(overflow)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// `dt` moved by this span: calendar months first (clamping the day to
    /// the end of a shorter month), then the fixed part. `None` on overflow.
    pub fn add_to(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        let dt = if months >= 0 {
            dt.checked_add_months(count)?
        } else {
            dt.checked_sub_months(count)?
        };

        let fixed = TimeDelta::try_days(self.days)?
            .checked_add(&TimeDelta::try_hours(self.hours)?)?
            .checked_add(&TimeDelta::try_minutes(self.minutes)?)?
            .checked_add(&TimeDelta::try_seconds(self.seconds)?)?
            .checked_add(&TimeDelta::microseconds(self.microseconds))?;
        dt.checked_add_signed(fixed)
    }

    fn fields(&self) -> [(&'static str, i64); 7] {
        [
            ("years", self.years),
            ("months", self.months),
            ("days", self.days),
            ("hours", self.hours),
            ("minutes", self.minutes),
            ("seconds", self.seconds),
            ("microseconds", self.microseconds),
        ]
    }
}

fn carry(low: &mut i64, high: &mut i64, base: i64) -> Option<()> {
    if low.unsigned_abs() >= base.unsigned_abs() {
        *high = high.checked_add(*low / base)?;
        *low %= base;
    }
    Some(())
}

impl FromStr for Timespan {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the non-zero fields in the `unit=integer` form [`Timespan::parse`]
/// reads back.
impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "seconds=0");
        }
        let mut first = true;
        for (unit, amount) in self.fields() {
            if amount == 0 {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{unit}={amount}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_unit_fields() {
        let span = Timespan::parse("days=1, seconds=10").unwrap();
        assert_eq!(
            span,
            Timespan {
                days: 1,
                seconds: 10,
                ..Timespan::default()
            }
        );
    }

    #[test]
    fn duration_expression_becomes_seconds() {
        let span = Timespan::parse("90s").unwrap();
        assert_eq!(span.minutes, 1);
        assert_eq!(span.seconds, 30);

        let span = Timespan::parse("10").unwrap();
        assert_eq!(span.seconds, 10);
    }

    #[test]
    fn weeks_add_seven_days() {
        let span = Timespan::parse("weeks=2, days=1").unwrap();
        assert_eq!(span.days, 15);
    }

    #[test]
    fn normalization_carries_but_not_days() {
        let span = Timespan::parse("hours=49, months=14, microseconds=1500000").unwrap();
        assert_eq!(span.days, 2);
        assert_eq!(span.hours, 1);
        assert_eq!(span.years, 1);
        assert_eq!(span.months, 2);
        assert_eq!(span.seconds, 1);
        assert_eq!(span.microseconds, 500_000);

        let span = Timespan::parse("days=400").unwrap();
        assert_eq!(span.days, 400);
        assert_eq!(span.years, 0);
    }

    #[test]
    fn negative_fields_keep_their_sign() {
        let span = Timespan::parse("minutes=-90").unwrap();
        assert_eq!(span.hours, -1);
        assert_eq!(span.minutes, -30);
    }

    #[test]
    fn bad_input_is_rejected() {
        for bad in ["fortnights=1", "days=one", "days", "soon"] {
            assert!(
                matches!(Timespan::parse(bad), Err(ConvertError::InvalidTimespan { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn overflowing_fields_are_rejected() {
        for bad in [
            "weeks=2000000000000000000",
            "weeks=1317624576693539401, days=9223372036854775807",
            "minutes=9223372036854775807, seconds=9223372036854775807",
            "months=-9223372036854775808, years=-9223372036854775808",
        ] {
            assert!(
                matches!(Timespan::parse(bad), Err(ConvertError::InvalidTimespan { .. })),
                "{bad} should fail"
            );
        }

        let span = Timespan::parse("seconds=9223372036854775807").unwrap();
        assert_eq!(span.seconds, 7);
        assert_eq!(span.minutes, 30);
    }

    #[test]
    fn display_round_trips() {
        let span = Timespan::parse("days=1, seconds=10").unwrap();
        assert_eq!(span.to_string(), "days=1, seconds=10");
        assert_eq!(span.to_string().parse::<Timespan>().unwrap(), span);
        assert_eq!(Timespan::default().to_string(), "seconds=0");
    }

    #[test]
    fn add_to_clamps_month_end() {
        let span = Timespan::parse("months=1").unwrap();
        assert_eq!(span.add_to(dt(2024, 1, 31)), Some(dt(2024, 2, 29)));
    }

    #[test]
    fn add_to_applies_fixed_part_after_months() {
        let span = Timespan::parse("years=1, days=1").unwrap();
        assert_eq!(span.add_to(dt(2023, 2, 28)), Some(dt(2024, 2, 29)));

        let back = Timespan::parse("months=-1, days=-1").unwrap();
        assert_eq!(back.add_to(dt(2024, 3, 31)), Some(dt(2024, 2, 28)));
    }

    #[test]
    fn serializes_as_named_fields() {
        let span = Timespan::parse("weeks=1, hours=2").unwrap();
        let json = serde_json::to_value(span).unwrap();
        assert_eq!(json["days"], 7);
        assert_eq!(json["hours"], 2);

        let partial: Timespan = serde_json::from_str(r#"{"months": 3}"#).unwrap();
        assert_eq!(partial, Timespan::parse("months=3").unwrap());
    }
}
