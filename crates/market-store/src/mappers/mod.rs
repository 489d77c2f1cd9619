//! Mappers between stored documents and domain entities

mod comment;
mod market;
mod saved_market;
mod timestamp;
mod user_reaction;
mod venue_info;

pub use comment::{
    comment_document, comment_from_document, user_comment_document, user_comment_venue,
};
pub use market::{market_document, market_from_document};
pub use saved_market::{
    apply_alert_patch, apply_alert_settings, new_saved_market_document,
    saved_market_document, saved_market_from_document, StoredAlertSettings,
};
pub use timestamp::{parse_timestamp, timestamp_value};
pub use user_reaction::{
    reaction_document, user_reaction_from_document, user_reaction_from_index_document,
};
pub use venue_info::{apply_venue_info, venue_info_from_document};
