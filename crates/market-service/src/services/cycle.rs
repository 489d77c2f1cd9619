//! Cycle service
//!
//! Periodic reset of a venue's reaction counters. A reset runs in two phases:
//!
//! 1. one transaction snapshots the non-empty fields into `previousCycle`,
//!    zeroes them, advances the cycle and marks cleanup as pending;
//! 2. user records written in older generations are deleted in chunks that
//!    fit the store's commit limit, then the pending flag is cleared.
//!
//! Phase 2 is resumable: a later call picks up the pending cleanup even when
//! the cycle is not due again.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use market_core::{
    CategoryCounts, Cycle, DocPath, DomainError, Transaction, UserId, VenueId, VenueInfo,
};
use market_store::mappers::{
    apply_venue_info, user_reaction_from_document, venue_info_from_document,
};
use market_store::paths;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Outcome of a sweep over all venues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub reset: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Advance {
    /// Nothing to do
    Idle,
    /// Cycle advanced now; cleanup for this generation follows
    Reset(Cycle),
    /// An earlier reset left cleanup unfinished
    Resume(Cycle),
}

/// Cycle service
pub struct CycleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CycleService<'a> {
    /// Create a new CycleService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reset the venue's counters if its cycle is due. Returns whether a reset happened.
    ///
    /// Calling it again right away is a no-op; a cleanup interrupted by an
    /// error is resumed by the next call.
    #[instrument(skip(self))]
    pub async fn reset_cycle_if_due(
        &self,
        venue_id: &VenueId,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        let advance = self
            .ctx
            .settings()
            .retry
            .run("reset_cycle", || self.try_advance(venue_id, now))
            .await?;

        let (cycle, did_reset) = match advance {
            Advance::Idle => {
                debug!("Cycle not due");
                return Ok(false);
            }
            Advance::Reset(cycle) => {
                info!(
                    generation = cycle.generation,
                    next_reset_at = %cycle.next_reset_at,
                    "Cycle reset"
                );
                (cycle, true)
            }
            Advance::Resume(cycle) => {
                info!(generation = cycle.generation, "Resuming cycle cleanup");
                (cycle, false)
            }
        };

        let removed = self.cleanup(venue_id, cycle.generation).await?;
        self.finish_cleanup(venue_id, cycle.generation).await?;
        info!(generation = cycle.generation, removed, "Cycle cleanup finished");

        Ok(did_reset)
    }

    async fn try_advance(&self, venue_id: &VenueId, now: DateTime<Utc>) -> ServiceResult<Advance> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::market_info(venue_id);
        let Some(doc) = tx.get(&path).await? else {
            return Ok(Advance::Idle);
        };
        let mut info = venue_info_from_document(&path, Some(&doc))?;
        let length = self.ctx.settings().cycle_length;

        let next = match info.cycle.clone() {
            None => {
                // Venue predates cycles; start one without resetting
                info.cycle = Some(Cycle::starting_at(now, length));
                tx.set(path, apply_venue_info(Some(doc), &info));
                tx.commit().await?;
                return Ok(Advance::Idle);
            }
            Some(cycle) if !cycle.is_due(now) => {
                return Ok(if cycle.cleanup_pending {
                    Advance::Resume(cycle)
                } else {
                    Advance::Idle
                });
            }
            Some(cycle) => cycle.advanced(now, length),
        };

        snapshot_and_zero(&mut info);
        info.cycle = Some(next.clone());
        tx.set(path, apply_venue_info(Some(doc), &info));
        tx.commit().await?;

        Ok(Advance::Reset(next))
    }

    /// Delete every user record of the venue written before `generation`,
    /// in chunks. Returns the number of users whose records were removed.
    async fn cleanup(&self, venue_id: &VenueId, generation: u64) -> ServiceResult<usize> {
        let paths_to_check = self
            .ctx
            .store()
            .list(&paths::venue_user_reactions(venue_id))
            .await?;
        // Two deletes per user
        let per_commit = (self.ctx.commit_budget() / 2).max(1);

        let mut removed = 0;
        for chunk in paths_to_check.chunks(per_commit) {
            removed += self
                .ctx
                .settings()
                .retry
                .run("reset_cleanup", || {
                    self.delete_stale(venue_id, generation, chunk)
                })
                .await?;
        }
        Ok(removed)
    }

    async fn delete_stale(
        &self,
        venue_id: &VenueId,
        generation: u64,
        chunk: &[DocPath],
    ) -> ServiceResult<usize> {
        let mut tx = Transaction::new(self.ctx.store());
        let mut removed = 0;

        for path in chunk {
            let user_id = UserId::new(path.id())
                .map_err(|_| DomainError::malformed(path, "bad user id"))?;
            let Some(doc) = tx.get(path).await? else {
                continue;
            };
            let reaction = user_reaction_from_document(venue_id, &user_id, path, &doc)?;
            if reaction.generation >= generation {
                continue;
            }
            tx.delete(path.clone());
            tx.delete(paths::user_reaction_index_entry(&user_id, venue_id));
            removed += 1;
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn finish_cleanup(&self, venue_id: &VenueId, generation: u64) -> ServiceResult<()> {
        self.ctx
            .settings()
            .retry
            .run("finish_cleanup", || self.try_finish_cleanup(venue_id, generation))
            .await
    }

    async fn try_finish_cleanup(&self, venue_id: &VenueId, generation: u64) -> ServiceResult<()> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::market_info(venue_id);
        let Some(doc) = tx.get(&path).await? else {
            return Ok(());
        };
        let mut info = venue_info_from_document(&path, Some(&doc))?;
        match info.cycle.as_mut() {
            Some(c) if c.generation == generation && c.cleanup_pending => {
                c.cleanup_pending = false;
            }
            _ => return Ok(()),
        }
        tx.set(path, apply_venue_info(Some(doc), &info));
        tx.commit().await?;
        Ok(())
    }

    /// Reset every due venue, continuing past failures
    #[instrument(skip(self))]
    pub async fn reset_all_due(&self, now: DateTime<Utc>) -> ServiceResult<ResetReport> {
        let mut report = ResetReport::default();

        for path in self.ctx.store().list(&paths::markets()).await? {
            let venue_id = match VenueId::new(path.id()) {
                Ok(id) => id,
                Err(e) => {
                    warn!(path = %path, error = %e, "Skipping market with bad id");
                    report.failed += 1;
                    continue;
                }
            };
            match self.reset_cycle_if_due(&venue_id, now).await {
                Ok(true) => report.reset += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!(venue_id = %venue_id, error = %e, "Cycle reset failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            reset = report.reset,
            skipped = report.skipped,
            failed = report.failed,
            "Reset sweep finished"
        );
        Ok(report)
    }
}

/// Copy each non-empty field into the previous-cycle snapshot and zero it.
/// Fields with no votes keep their old snapshot.
fn snapshot_and_zero(info: &mut VenueInfo) {
    for (field, counters) in &mut info.fields {
        if counters.current.is_empty() {
            continue;
        }
        counters.previous =
            std::mem::replace(&mut counters.current, CategoryCounts::zeroed(*field));
    }
}
