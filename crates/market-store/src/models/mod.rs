//! Stored document models

mod comment;
mod market;
mod saved_market;

pub use comment::{CommentDocument, UserCommentDocument};
pub use market::{MarketDocument, OpeningHoursDocument};
pub use saved_market::SavedMarketDocument;
