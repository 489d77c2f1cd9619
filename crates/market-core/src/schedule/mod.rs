//! Pure schedule engines: opening status, weekly projection, alert timing.
//!
//! All functions take the local wall-clock "now" as an argument and hold no state.

mod alert;
mod open_status;
mod weekly;

pub use alert::{compute_next_alert, describe_next_alert, next_alert_for, ALERT_SEARCH_HORIZON_DAYS};
pub use open_status::{
    get_open_status, open_days_of, open_status_of, OpenStatus, OpeningStatusResult,
};
pub use weekly::{
    format_weekly_schedule, project_recurring, project_weekly_schedule, DaySchedule, DayWindow,
    WeeklySchedule,
};
