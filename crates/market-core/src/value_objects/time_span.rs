//! Minute-of-day time values and the small formatting helpers built on them.
//!
//! Two textual forms are understood:
//! - compact `"HHMM"` as supplied by the places data source
//! - `"HH:mm"` as stored in user alert preferences

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Minutes in one day
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Weekday names indexed Sunday-first
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Short weekday names indexed Sunday-first
pub const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A time of day with minute resolution (0..=1439)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    /// Midnight
    pub const MIDNIGHT: Self = Self(0);

    /// Create from a raw minute count, rejecting values past 23:59
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Create from an hour/minute pair
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Parse the compact `"HHMM"` form. Exactly four ASCII digits.
    pub fn parse_compact(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let hour = s[0..2].parse::<u32>().ok()?;
        let minute = s[2..4].parse::<u32>().ok()?;
        Self::from_hm(hour, minute)
    }

    /// Parse the `"HH:mm"` form. Exactly two digits on each side of the colon.
    pub fn parse_hh_mm(s: &str) -> Option<Self> {
        let (hh, mm) = s.split_once(':')?;
        if hh.len() != 2 || mm.len() != 2 {
            return None;
        }
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::from_hm(hh.parse().ok()?, mm.parse().ok()?)
    }

    /// Minute-of-day of a wall-clock time (seconds are dropped)
    pub fn from_time(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    #[inline]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    #[inline]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or_default()
    }

    /// 12-hour rendering, e.g. `9:05 AM`
    pub fn to_12h(self) -> String {
        format_12h(self.0)
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for MinuteOfDay {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hh_mm(s)
            .ok_or_else(|| DomainError::ValidationError(format!("invalid time of day: {s:?}")))
    }
}

impl Serialize for MinuteOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MinuteOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Format a minute offset as `"HH:mm"`. `1440` renders as `"24:00"` for end-of-day.
pub fn format_hh_mm(minutes: u16) -> String {
    let minutes = minutes.min(MINUTES_PER_DAY);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format a minute offset in 12-hour time, e.g. `"12:30 PM"`
pub fn format_12h(minutes: u16) -> String {
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}:{mins:02} {period}")
}

/// `"Today"`, `"Tomorrow"`, or the short weekday name of `date`
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> &'static str {
    match (date - today).num_days() {
        0 => "Today",
        1 => "Tomorrow",
        _ => WEEKDAY_SHORT[weekday_index(date.weekday()) as usize],
    }
}

/// Sunday-first weekday index (0 = Sunday)
#[inline]
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// Inverse of [`weekday_index`]; out-of-range values yield `None`
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
