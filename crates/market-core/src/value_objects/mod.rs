//! Value objects - immutable types that represent domain concepts

mod doc_path;
mod geo_point;
mod ids;
mod open_days;
pub mod time_span;

pub use doc_path::{CollectionPath, DocPath};
pub use geo_point::GeoPoint;
pub use ids::{CommentId, UserId, VenueId};
pub use open_days::OpenDays;
pub use time_span::MinuteOfDay;
