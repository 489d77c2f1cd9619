//! Anonymous market comments

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::value_objects::{CommentId, UserId, VenueId};

/// Page size when the caller does not ask for one
pub const DEFAULT_COMMENT_PAGE_SIZE: usize = 20;

/// Largest page a single read returns
pub const MAX_COMMENT_PAGE_SIZE: usize = 100;

/// Longest comment text, in characters
pub const MAX_COMMENT_LEN: usize = 1000;

/// A comment left on a market.
///
/// Comments are shown without attribution. The author is kept so the writer
/// can delete their own comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub venue_id: VenueId,
    pub text: String,
    #[serde(skip)]
    pub author: Option<UserId>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Newest first; equal timestamps fall back to descending id so pages are stable
    pub fn newest_first(a: &Comment, b: &Comment) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }

    pub fn is_written_by(&self, user: &UserId) -> bool {
        self.author.as_ref() == Some(user)
    }
}
