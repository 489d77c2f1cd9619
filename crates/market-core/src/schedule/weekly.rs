//! Weekly schedule projector: expands recurring periods into a per-weekday table

use serde::Serialize;

use crate::entities::{PlacePeriod, RecurringPeriod};
use crate::value_objects::time_span::{format_hh_mm, MINUTES_PER_DAY, WEEKDAY_NAMES, WEEKDAY_SHORT};

/// Open interval within one day, in minutes. `end` is exclusive and may be 1440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DayWindow {
    pub start: u16,
    pub end: u16,
}

impl DayWindow {
    pub fn new(start: u16, end: u16) -> Self {
        Self {
            start,
            end: end.min(MINUTES_PER_DAY),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.start == 0 && self.end >= MINUTES_PER_DAY
    }
}

/// Opening windows of one weekday
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DaySchedule {
    /// Sunday-first index
    pub day: u8,
    pub windows: Vec<DayWindow>,
}

impl DaySchedule {
    pub fn name(&self) -> &'static str {
        WEEKDAY_NAMES[usize::from(self.day % 7)]
    }

    pub fn short_name(&self) -> &'static str {
        WEEKDAY_SHORT[usize::from(self.day % 7)]
    }

    pub fn is_open(&self) -> bool {
        !self.windows.is_empty()
    }

    /// Start of the first window as "HH:mm", empty when closed
    pub fn open_time(&self) -> String {
        self.windows
            .first()
            .map(|w| format_hh_mm(w.start))
            .unwrap_or_default()
    }

    /// End of the last window as "HH:mm" ("24:00" for end of day), empty when closed
    pub fn close_time(&self) -> String {
        self.windows
            .last()
            .map(|w| format_hh_mm(w.end))
            .unwrap_or_default()
    }

    fn add(&mut self, start: u16, end: u16) {
        if end > start {
            self.windows.push(DayWindow::new(start, end));
        }
    }

    /// Sort and merge overlapping or touching windows
    fn normalize(&mut self) {
        self.windows.sort_unstable();
        let mut merged: Vec<DayWindow> = Vec::with_capacity(self.windows.len());
        for w in self.windows.drain(..) {
            match merged.last_mut() {
                Some(last) if w.start <= last.end => last.end = last.end.max(w.end),
                _ => merged.push(w),
            }
        }
        self.windows = merged;
    }
}

/// Seven-day table, Sunday first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    pub days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn closed() -> Self {
        Self {
            days: std::array::from_fn(|i| DaySchedule {
                day: i as u8,
                windows: Vec::new(),
            }),
        }
    }

    pub fn day(&self, index: u8) -> Option<&DaySchedule> {
        self.days.get(usize::from(index))
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| !d.is_open())
    }

    pub fn open_days(&self) -> impl Iterator<Item = &DaySchedule> {
        self.days.iter().filter(|d| d.is_open())
    }
}

/// Project raw places periods; malformed and degenerate periods contribute nothing
pub fn project_weekly_schedule(periods: &[PlacePeriod]) -> WeeklySchedule {
    project_recurring(&RecurringPeriod::parse_all(periods))
}

pub fn project_recurring(periods: &[RecurringPeriod]) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::closed();

    for period in periods.iter().filter(|p| !p.is_degenerate()) {
        let open_day = usize::from(period.open_day);
        let open = period.open_minute.minutes();
        let close = period.effective_close();

        if close.day == period.open_day {
            schedule.days[open_day].add(open, close.minute.minutes());
            continue;
        }

        schedule.days[open_day].add(open, MINUTES_PER_DAY);
        let span = period.span_days();
        for offset in 1..span {
            let day = (open_day + usize::from(offset)) % 7;
            schedule.days[day].add(0, MINUTES_PER_DAY);
        }
        schedule.days[usize::from(close.day)].add(0, close.minute.minutes());
    }

    for day in &mut schedule.days {
        day.normalize();
    }
    schedule
}

/// Compact per-day summary, one line per open day: `Mon 09:00-13:00, 17:00-21:00`
pub fn format_weekly_schedule(schedule: &WeeklySchedule) -> String {
    if schedule.is_empty() {
        return "No schedule available".to_string();
    }

    schedule
        .open_days()
        .map(|day| {
            let windows = day
                .windows
                .iter()
                .map(|w| format!("{}-{}", format_hh_mm(w.start), format_hh_mm(w.end)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} {}", day.short_name(), windows)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
