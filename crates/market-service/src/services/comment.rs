//! Comment service
//!
//! Anonymous comments on markets. Each comment is mirrored into the writer's
//! own-comment index, which is what allows them (and only them) to delete it.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use market_core::{
    Comment, CommentId, DomainError, Transaction, UserId, VenueId, MAX_COMMENT_PAGE_SIZE,
};
use market_store::mappers::{
    comment_document, comment_from_document, user_comment_document, user_comment_venue,
};
use market_store::paths;

use crate::dto::{AddCommentRequest, CommentPageRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::market::MarketService;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a comment to a market and record it in the author's index
    #[instrument(skip(self, request))]
    pub async fn add_comment(
        &self,
        venue_id: &VenueId,
        author: &UserId,
        request: &AddCommentRequest,
    ) -> ServiceResult<Comment> {
        let text = request.parse()?;
        MarketService::new(self.ctx).get_market(venue_id).await?;

        let comment = Comment {
            id: CommentId::new(Uuid::new_v4().simple().to_string())?,
            venue_id: venue_id.clone(),
            text,
            author: Some(author.clone()),
            anonymous: true,
            created_at: self.ctx.clock().now(),
        };

        self.ctx
            .settings()
            .retry
            .run("add_comment", || self.try_add(&comment, author))
            .await?;

        info!(comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    async fn try_add(&self, comment: &Comment, author: &UserId) -> ServiceResult<()> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::market_comment(&comment.venue_id, &comment.id);
        let index = paths::user_comment(author, &comment.id);
        tx.get(&path).await?;
        tx.get(&index).await?;
        tx.set(path, comment_document(comment));
        tx.set(
            index,
            user_comment_document(&comment.venue_id, &comment.id, comment.created_at),
        );
        tx.commit().await?;
        Ok(())
    }

    /// One page of a market's comments, newest first.
    ///
    /// A cursor naming a comment that no longer exists is ignored and the
    /// first page is returned. Unreadable comments are logged and skipped.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        venue_id: &VenueId,
        request: &CommentPageRequest,
    ) -> ServiceResult<Vec<Comment>> {
        let (limit, cursor) = request.parse()?;
        let limit = limit.min(MAX_COMMENT_PAGE_SIZE);
        let store = self.ctx.store();

        let mut comments = Vec::new();
        for path in store.list(&paths::market_comments(venue_id)).await? {
            let Some(doc) = store.get(&path).await? else {
                continue;
            };
            match comment_from_document(&path, venue_id, &doc.data) {
                Ok(comment) => comments.push(comment),
                Err(e) => warn!(path = %path, error = %e, "Skipping unreadable comment"),
            }
        }
        comments.sort_by(Comment::newest_first);

        let start = cursor
            .and_then(|id| comments.iter().position(|c| c.id == id))
            .map_or(0, |i| i + 1);

        Ok(comments.into_iter().skip(start).take(limit).collect())
    }

    /// Delete a comment the user wrote. The comment and the index entry are
    /// removed together.
    ///
    /// # Errors
    /// `CommentNotFound` when the comment does not exist, `NotCommentAuthor`
    /// when the user's index has no entry for it on this market
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        venue_id: &VenueId,
        user_id: &UserId,
        comment_id: &CommentId,
    ) -> ServiceResult<()> {
        self.ctx
            .settings()
            .retry
            .run("delete_comment", || {
                self.try_delete(venue_id, user_id, comment_id)
            })
            .await?;

        info!("Comment deleted");
        Ok(())
    }

    async fn try_delete(
        &self,
        venue_id: &VenueId,
        user_id: &UserId,
        comment_id: &CommentId,
    ) -> ServiceResult<()> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::market_comment(venue_id, comment_id);
        let index = paths::user_comment(user_id, comment_id);

        if tx.get(&path).await?.is_none() {
            return Err(DomainError::CommentNotFound(comment_id.to_string()).into());
        }
        let owned = match tx.get(&index).await? {
            Some(doc) => user_comment_venue(&index, &doc)?.as_ref() == Some(venue_id),
            None => false,
        };
        if !owned {
            return Err(DomainError::NotCommentAuthor(comment_id.to_string()).into());
        }

        tx.delete(path);
        tx.delete(index);
        tx.commit().await?;
        Ok(())
    }

    /// Ids of the comments the user wrote on a market
    #[instrument(skip(self))]
    pub async fn user_comment_ids(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
    ) -> ServiceResult<Vec<CommentId>> {
        let store = self.ctx.store();
        let mut ids = Vec::new();

        for path in store.list(&paths::user_comments(user_id)).await? {
            let Some(doc) = store.get(&path).await? else {
                continue;
            };
            if user_comment_venue(&path, &doc.data)?.as_ref() == Some(venue_id) {
                ids.push(CommentId::new(path.id())?);
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Whether the user wrote the comment
    pub async fn is_user_comment(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
        comment_id: &CommentId,
    ) -> ServiceResult<bool> {
        let index = paths::user_comment(user_id, comment_id);
        Ok(match self.ctx.store().get(&index).await? {
            Some(doc) => user_comment_venue(&index, &doc.data)?.as_ref() == Some(venue_id),
            None => false,
        })
    }
}
