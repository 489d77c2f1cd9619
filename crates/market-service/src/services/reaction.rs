//! Reaction service
//!
//! Applies one user's reaction to a venue's counters and answers consensus queries.

use tracing::{debug, info, instrument};

use market_core::{
    summarize, Category, Cycle, DocumentStore, FieldSummary, ReactionField, Transaction, UserId,
    UserReaction, VenueId, VenueInfo,
};
use market_store::mappers::{
    apply_venue_info, reaction_document, user_reaction_from_document,
    user_reaction_from_index_document, venue_info_from_document,
};
use market_store::paths;

use crate::dto::MyReaction;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What an update did to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    /// The user already had this selection; nothing was written
    Unchanged,
    Changed {
        from: Option<Category>,
        to: Option<Category>,
    },
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set (`Some`) or clear (`None`) the user's selection for `field`.
    ///
    /// Counters, the venue-indexed record and the user-indexed record change
    /// together in one transaction, retried on conflict.
    #[instrument(skip(self))]
    pub async fn update_reaction(
        &self,
        venue_id: &VenueId,
        user_id: &UserId,
        field: ReactionField,
        category: Option<Category>,
    ) -> ServiceResult<ReactionChange> {
        if let Some(c) = category {
            field.check(c)?;
        }

        let change = self
            .ctx
            .settings()
            .retry
            .run("update_reaction", || {
                self.try_update(venue_id, user_id, field, category)
            })
            .await?;

        match change {
            ReactionChange::Unchanged => debug!("Selection unchanged"),
            ReactionChange::Changed { from, to } => info!(
                from = ?from,
                to = ?to,
                "Reaction updated"
            ),
        }

        Ok(change)
    }

    async fn try_update(
        &self,
        venue_id: &VenueId,
        user_id: &UserId,
        field: ReactionField,
        category: Option<Category>,
    ) -> ServiceResult<ReactionChange> {
        let now = self.ctx.clock().now();
        let store: &dyn DocumentStore = self.ctx.store();
        let mut tx = Transaction::new(store);

        let info_path = paths::market_info(venue_id);
        let info_doc = tx.get(&info_path).await?;
        let mut info = venue_info_from_document(&info_path, info_doc.as_ref())?;
        let generation = info.generation();

        let user_path = paths::venue_user_reaction(venue_id, user_id);
        let user_doc = tx.get(&user_path).await?;
        let stored = user_doc
            .as_ref()
            .map(|doc| user_reaction_from_document(venue_id, user_id, &user_path, doc))
            .transpose()?;

        let from = stored
            .as_ref()
            .and_then(|r| r.live_selection(field, generation));
        if from == category {
            return Ok(ReactionChange::Unchanged);
        }

        // Selections from an older cycle no longer count anywhere
        let mut reaction = match stored {
            Some(r) if r.generation >= generation => r,
            _ => UserReaction::new(venue_id.clone(), user_id.clone(), generation),
        };

        let counters = info.counters_mut(field);
        if let Some(old) = from {
            counters.current.decrement(old);
        }
        if let Some(new) = category {
            counters.current.increment(new);
        }
        counters.last_updated = Some(now);
        info.last_updated = Some(now);
        if info.cycle.is_none() {
            info.cycle = Some(Cycle::starting_at(now, self.ctx.settings().cycle_length));
        }

        reaction.select(field, category);
        reaction.updated_at = Some(now);

        let index_path = paths::user_reaction_index_entry(user_id, venue_id);
        let index_doc = tx.get(&index_path).await?;

        tx.set(info_path, apply_venue_info(info_doc, &info));
        tx.set(user_path, reaction_document(user_doc, &reaction, false));
        tx.set(index_path, reaction_document(index_doc, &reaction, true));
        tx.commit().await?;

        Ok(ReactionChange::Changed { from, to: category })
    }

    /// Canonical snapshot of a venue's counters and cycle
    #[instrument(skip(self))]
    pub async fn venue_info(&self, venue_id: &VenueId) -> ServiceResult<VenueInfo> {
        let path = paths::market_info(venue_id);
        let doc = self.ctx.store().get(&path).await?;
        let info = venue_info_from_document(&path, doc.as_ref().map(|d| &d.data))?;
        Ok(info)
    }

    /// Displayed value and flags for every field
    #[instrument(skip(self))]
    pub async fn field_summaries(&self, venue_id: &VenueId) -> ServiceResult<Vec<FieldSummary>> {
        Ok(summarize(&self.venue_info(venue_id).await?))
    }

    /// The user's live selection for one field
    #[instrument(skip(self))]
    pub async fn user_reaction(
        &self,
        venue_id: &VenueId,
        user_id: &UserId,
        field: ReactionField,
    ) -> ServiceResult<Option<Category>> {
        let path = paths::user_reaction_index_entry(user_id, venue_id);
        let Some(doc) = self.ctx.store().get(&path).await? else {
            return Ok(None);
        };
        let reaction = user_reaction_from_index_document(user_id, &path, &doc.data)?;
        let generation = self.venue_info(venue_id).await?.generation();
        Ok(reaction.live_selection(field, generation))
    }

    /// Every venue the user has live selections on
    #[instrument(skip(self))]
    pub async fn my_reactions(&self, user_id: &UserId) -> ServiceResult<Vec<MyReaction>> {
        let store = self.ctx.store();
        let mut out = Vec::new();

        for path in store.list(&paths::user_reaction_index(user_id)).await? {
            let Some(doc) = store.get(&path).await? else {
                continue;
            };
            let reaction = user_reaction_from_index_document(user_id, &path, &doc.data)?;
            let generation = self.venue_info(&reaction.venue_id).await?.generation();
            if reaction.generation < generation || reaction.selections.is_empty() {
                continue;
            }
            out.push(MyReaction {
                updated_at: reaction.updated_at,
                selections: reaction.selections,
                venue_id: reaction.venue_id,
            });
        }

        // Most recent first
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }
}

