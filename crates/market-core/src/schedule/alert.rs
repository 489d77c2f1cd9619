//! Alert scheduling engine: when should a saved-market reminder fire next?

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

use crate::entities::{AlertSettings, NextAlert};
use crate::value_objects::time_span::{format_12h, relative_day_label};
use crate::value_objects::{MinuteOfDay, OpenDays};

/// How far ahead (in days from today) an open day is searched for
pub const ALERT_SEARCH_HORIZON_DAYS: u64 = 21;

/// First notification instant strictly after `now`.
///
/// Each candidate open day within the horizon yields a notification at
/// `time_of_day`, `lead_days` days before it. Disabled settings, an empty
/// day set, or no candidate in the horizon all give [`NextAlert::NONE`].
pub fn compute_next_alert(
    open_days: OpenDays,
    lead_days: u8,
    time_of_day: MinuteOfDay,
    enabled: bool,
    now: NaiveDateTime,
) -> NextAlert {
    if !enabled || open_days.is_empty() {
        return NextAlert::NONE;
    }

    let today = now.date();
    for delta in 0..=ALERT_SEARCH_HORIZON_DAYS {
        let Some(open_on) = today.checked_add_days(Days::new(delta)) else {
            break;
        };
        if !open_days.contains_weekday(open_on.weekday()) {
            continue;
        }
        let Some(notify_on) = open_on.checked_sub_days(Days::new(u64::from(lead_days))) else {
            continue;
        };
        let notify_at = notify_on.and_time(time_of_day.to_naive_time());
        if notify_at > now {
            return NextAlert {
                notify_at: Some(notify_at),
                open_on: Some(open_on),
            };
        }
    }

    NextAlert::NONE
}

pub fn next_alert_for(settings: &AlertSettings, now: NaiveDateTime) -> NextAlert {
    compute_next_alert(
        settings.open_days,
        settings.lead_days,
        settings.time_of_day,
        settings.enabled,
        now,
    )
}

/// Short status line: `Off`, `Not scheduled`, or e.g. `Tomorrow · 9:00 AM`
pub fn describe_next_alert(settings: &AlertSettings, next: &NextAlert, today: NaiveDate) -> String {
    if !settings.enabled {
        return "Off".to_string();
    }
    match next.notify_at {
        None => "Not scheduled".to_string(),
        Some(at) => format!(
            "{} · {}",
            relative_day_label(at.date(), today),
            format_12h(settings.time_of_day.minutes())
        ),
    }
}
