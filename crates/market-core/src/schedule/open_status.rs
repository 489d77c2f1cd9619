//! Opening-hours engine: is a venue open right now, and when does it open next?

use chrono::{Datelike, Days, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::entities::{PlacePeriod, RecurringPeriod};
use crate::value_objects::time_span::{format_12h, weekday_index, WEEKDAY_NAMES};
use crate::value_objects::{MinuteOfDay, OpenDays};

/// Venue status at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpenStatus {
    OpenNow,
    Closed,
    /// No usable schedule
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStatusResult {
    pub status: OpenStatus,
    pub next_open_instant: Option<NaiveDateTime>,
    pub next_open_description: Option<String>,
    pub days_ahead: Option<u32>,
}

impl OpeningStatusResult {
    fn bare(status: OpenStatus) -> Self {
        Self {
            status,
            next_open_instant: None,
            next_open_description: None,
            days_ahead: None,
        }
    }

    pub fn invalid() -> Self {
        Self::bare(OpenStatus::Invalid)
    }

    pub fn open_now() -> Self {
        Self::bare(OpenStatus::OpenNow)
    }
}

/// Status of raw places periods at local wall-clock time `now`
pub fn get_open_status(periods: &[PlacePeriod], now: NaiveDateTime) -> OpeningStatusResult {
    open_status_of(&RecurringPeriod::parse_all(periods), now)
}

/// Status of already validated periods at local wall-clock time `now`
pub fn open_status_of(periods: &[RecurringPeriod], now: NaiveDateTime) -> OpeningStatusResult {
    if periods.is_empty() {
        return OpeningStatusResult::invalid();
    }

    let today = weekday_index(now.weekday());
    let minute = MinuteOfDay::from_time(now.time());

    if periods.iter().any(|p| p.is_open_at(today, minute)) {
        return OpeningStatusResult::open_now();
    }

    // Soonest (days ahead, opening minute) over every parsed period. A degenerate
    // period is never open but still announces its opening.
    let best = periods
        .iter()
        .map(|p| {
            let mut days_ahead = u32::from((p.open_day + 7 - today) % 7);
            if days_ahead == 0 && p.open_minute <= minute {
                days_ahead = 7;
            }
            (days_ahead, p.open_minute, p.open_day)
        })
        .min();

    let Some((days_ahead, open_minute, open_day)) = best else {
        return OpeningStatusResult::invalid();
    };

    let Some(open_date) = now.date().checked_add_days(Days::new(u64::from(days_ahead))) else {
        return OpeningStatusResult::invalid();
    };

    let description = format!(
        "Opens {} {} {}",
        WEEKDAY_NAMES[open_day as usize],
        open_date.format("%-d %b"),
        format_12h(open_minute.minutes()),
    );

    OpeningStatusResult {
        status: OpenStatus::Closed,
        next_open_instant: Some(open_date.and_time(open_minute.to_naive_time())),
        next_open_description: Some(description),
        days_ahead: Some(days_ahead),
    }
}

/// Weekdays on which at least one valid period opens
pub fn open_days_of(periods: &[PlacePeriod]) -> OpenDays {
    OpenDays::from_indices(RecurringPeriod::parse_all(periods).iter().map(|p| p.open_day))
}
