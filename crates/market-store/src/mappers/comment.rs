//! Comment documents <-> `Comment`

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use market_core::{Comment, CommentId, DocPath, DomainError, RepoResult, UserId, VenueId};

use super::timestamp::{parse_timestamp, timestamp_value};
use crate::models::{CommentDocument, UserCommentDocument};

pub fn comment_document(comment: &Comment) -> Value {
    json!({
        "text": comment.text,
        "userId": comment.author.as_ref().map(UserId::as_str),
        "createdAt": timestamp_value(comment.created_at),
        "anonymous": comment.anonymous,
    })
}

/// Map a stored comment. A comment without a readable creation time cannot be
/// ordered and is reported as malformed; an unusable author reads as none.
pub fn comment_from_document(
    path: &DocPath,
    venue_id: &VenueId,
    doc: &Value,
) -> RepoResult<Comment> {
    let stored: CommentDocument = serde_json::from_value(doc.clone())
        .map_err(|e| DomainError::malformed(path, format!("comment: {e}")))?;

    let created_at = stored
        .created_at
        .as_ref()
        .and_then(parse_timestamp)
        .ok_or_else(|| DomainError::malformed(path, "comment without createdAt"))?;

    Ok(Comment {
        id: CommentId::new(path.id())?,
        venue_id: venue_id.clone(),
        text: stored.text.unwrap_or_default(),
        author: stored.user_id.and_then(|u| UserId::new(u).ok()),
        anonymous: stored.anonymous,
        created_at,
    })
}

/// Entry of the user's own-comment index
pub fn user_comment_document(
    venue_id: &VenueId,
    comment_id: &CommentId,
    at: DateTime<Utc>,
) -> Value {
    json!({
        "commentId": comment_id.as_str(),
        "placeId": venue_id.as_str(),
        "createdAt": timestamp_value(at),
    })
}

/// Venue an own-comment index entry points at, if it names one
pub fn user_comment_venue(path: &DocPath, doc: &Value) -> RepoResult<Option<VenueId>> {
    let stored: UserCommentDocument = serde_json::from_value(doc.clone())
        .map_err(|e| DomainError::malformed(path, format!("user comment: {e}")))?;
    Ok(stored.place_id.and_then(|p| VenueId::new(p).ok()))
}
