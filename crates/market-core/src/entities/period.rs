//! Weekly recurring opening periods
//!
//! `PlacePeriod` is the raw `opening_hours.periods[]` record as delivered by the
//! places data source (`{ open: { day, time: "HHMM" }, close?: {...} }`).
//! `RecurringPeriod` is the validated form the schedule engines work with.

use serde::{Deserialize, Serialize};

use crate::value_objects::MinuteOfDay;

/// One endpoint of a raw period
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodPoint {
    #[serde(default)]
    pub day: Option<i64>,
    #[serde(default)]
    pub time: Option<String>,
}

impl PeriodPoint {
    pub fn new(day: i64, time: impl Into<String>) -> Self {
        Self {
            day: Some(day),
            time: Some(time.into()),
        }
    }

    /// Day index and minute, if both parse
    fn parse(&self) -> Option<(u8, MinuteOfDay)> {
        let day = self.day.filter(|d| (0..=6).contains(d))? as u8;
        let minute = MinuteOfDay::parse_compact(self.time.as_deref()?)?;
        Some((day, minute))
    }
}

/// Raw weekly period record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacePeriod {
    #[serde(default)]
    pub open: Option<PeriodPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<PeriodPoint>,
}

impl PlacePeriod {
    pub fn new(open: PeriodPoint, close: Option<PeriodPoint>) -> Self {
        Self {
            open: Some(open),
            close,
        }
    }
}

/// Validated close endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodEnd {
    pub day: u8,
    pub minute: MinuteOfDay,
}

/// Validated weekly recurring period (days are Sunday-first, 0..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringPeriod {
    pub open_day: u8,
    pub open_minute: MinuteOfDay,
    pub close: Option<PeriodEnd>,
}

impl RecurringPeriod {
    /// Validate a raw period. `None` when the opening endpoint does not parse;
    /// an unparseable close endpoint is treated as missing.
    pub fn from_place(period: &PlacePeriod) -> Option<Self> {
        let (open_day, open_minute) = period.open.as_ref()?.parse()?;
        let close = period
            .close
            .as_ref()
            .and_then(PeriodPoint::parse)
            .map(|(day, minute)| PeriodEnd { day, minute });
        Some(Self {
            open_day,
            open_minute,
            close,
        })
    }

    /// Validate every raw period, dropping the malformed ones
    pub fn parse_all(periods: &[PlacePeriod]) -> Vec<Self> {
        periods.iter().filter_map(Self::from_place).collect()
    }

    /// Close endpoint, with a missing close read as a 24-hour window from opening
    pub fn effective_close(&self) -> PeriodEnd {
        self.close.unwrap_or(PeriodEnd {
            day: (self.open_day + 1) % 7,
            minute: self.open_minute,
        })
    }

    /// Same-day period whose close is not after its opening
    pub fn is_degenerate(&self) -> bool {
        let close = self.effective_close();
        close.day == self.open_day && close.minute <= self.open_minute
    }

    /// Number of day boundaries the period crosses (0 for same-day)
    pub fn span_days(&self) -> u8 {
        (self.effective_close().day + 7 - self.open_day) % 7
    }

    /// Whether the venue is open at `minute` on weekday `day`
    pub fn is_open_at(&self, day: u8, minute: MinuteOfDay) -> bool {
        let close = self.effective_close();

        if close.day == self.open_day {
            return !self.is_degenerate()
                && day == self.open_day
                && minute >= self.open_minute
                && minute < close.minute;
        }

        let span = self.span_days();
        let offset = (day % 7 + 7 - self.open_day) % 7;
        if offset == 0 {
            minute >= self.open_minute
        } else if offset == span {
            minute < close.minute
        } else {
            offset < span
        }
    }
}
