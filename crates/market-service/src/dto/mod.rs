//! Data transfer objects for service inputs and outputs
//!
//! - Request DTOs with validation
//! - Response DTOs for serializing results

pub mod requests;
pub mod responses;

pub use requests::{
    AddCommentRequest, CommentPageRequest, UpdateAlertSettingsRequest, UpdateReactionRequest,
};
pub use responses::{MyReaction, UpcomingAlert};
