//! Domain entities - core business objects

mod alert;
mod comment;
mod cycle;
mod period;
mod reaction;
mod venue;

pub use alert::{
    AlertDefaults, AlertSettings, AlertSettingsPatch, NextAlert, SavedMarket, MAX_LEAD_DAYS,
};
pub use comment::{Comment, DEFAULT_COMMENT_PAGE_SIZE, MAX_COMMENT_LEN, MAX_COMMENT_PAGE_SIZE};
pub use cycle::Cycle;
pub use period::{PeriodEnd, PeriodPoint, PlacePeriod, RecurringPeriod};
pub use reaction::{Category, CategoryCounts, FieldCounters, ReactionField, UserReaction};
pub use venue::{Market, VenueInfo};
