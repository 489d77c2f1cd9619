//! # market-core
//!
//! Domain layer for market discovery: entities, value objects, the opening-hours
//! and alert engines, reaction consensus rules, market list filters, and the ports (document store,
//! clock) that the infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, runtime, etc.).

pub mod consensus;
pub mod discovery;
pub mod entities;
pub mod error;
pub mod schedule;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use consensus::{
    displayed_value, has_new_information, is_field_empty, summarize, winner, FieldSummary, Winner,
};
pub use discovery::{apply_market_filter, market_distance, MarketFilter};
pub use entities::{
    AlertDefaults, AlertSettings, AlertSettingsPatch, Category, CategoryCounts, Comment, Cycle,
    FieldCounters, Market, NextAlert, PeriodEnd, PeriodPoint, PlacePeriod, ReactionField,
    RecurringPeriod, SavedMarket, UserReaction, VenueInfo, DEFAULT_COMMENT_PAGE_SIZE,
    MAX_COMMENT_LEN, MAX_COMMENT_PAGE_SIZE, MAX_LEAD_DAYS,
};
pub use error::DomainError;
pub use schedule::{
    compute_next_alert, describe_next_alert, format_weekly_schedule, get_open_status,
    next_alert_for, open_days_of, open_status_of, project_weekly_schedule, DaySchedule, DayWindow,
    OpenStatus, OpeningStatusResult, WeeklySchedule, ALERT_SEARCH_HORIZON_DAYS,
};
pub use traits::{
    Clock, DocumentStore, FixedClock, Precondition, RepoResult, SystemClock, Transaction,
    VersionedDocument, WriteBatch, WriteOp,
};
pub use value_objects::{
    CollectionPath, CommentId, DocPath, GeoPoint, MinuteOfDay, OpenDays, UserId, VenueId,
};
