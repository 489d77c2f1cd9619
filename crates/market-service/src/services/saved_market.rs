//! Saved market service
//!
//! Saving and un-saving markets, their alert preferences and the next
//! notification time of each.

use tracing::{debug, info, instrument};

use market_core::{
    describe_next_alert, next_alert_for, open_days_of, AlertSettings, AlertSettingsPatch,
    DomainError, NextAlert, OpenDays, SavedMarket, Transaction, UserId, VenueId,
};
use market_store::mappers::{
    apply_alert_patch, new_saved_market_document, saved_market_from_document,
};
use market_store::paths;

use crate::dto::{UpcomingAlert, UpdateAlertSettingsRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::market::MarketService;

/// Saved market service
pub struct SavedMarketService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SavedMarketService<'a> {
    /// Create a new SavedMarketService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Save a market for the user. Alerts start disabled and cover the
    /// venue's open days. Saving twice returns the existing record unchanged.
    #[instrument(skip(self))]
    pub async fn save_market(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
    ) -> ServiceResult<SavedMarket> {
        let market = MarketService::new(self.ctx).get_market(venue_id).await?;
        let open_days = open_days_of(&market.periods);

        let (saved, created) = self
            .ctx
            .settings()
            .retry
            .run("save_market", || self.try_save(user_id, venue_id, open_days))
            .await?;

        if created {
            info!(open_days = ?saved.settings.open_days.days(), "Market saved");
        } else {
            debug!("Market already saved");
        }
        Ok(saved)
    }

    async fn try_save(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
        open_days: OpenDays,
    ) -> ServiceResult<(SavedMarket, bool)> {
        let defaults = &self.ctx.settings().alert_defaults;
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::saved_market(user_id, venue_id);

        if let Some(doc) = tx.get(&path).await? {
            let saved = saved_market_from_document(&path, &doc, open_days, defaults)?;
            return Ok((saved, false));
        }

        let now = self.ctx.clock().now();
        let settings = AlertSettings::initial(open_days, defaults);
        tx.set(path, new_saved_market_document(venue_id, now, &settings)?);
        tx.commit().await?;

        Ok((
            SavedMarket {
                venue_id: venue_id.clone(),
                saved_at: now,
                settings,
                settings_updated_at: Some(now),
            },
            true,
        ))
    }

    /// Remove a saved market and its alert preferences. Returns whether it was saved.
    #[instrument(skip(self))]
    pub async fn unsave_market(&self, user_id: &UserId, venue_id: &VenueId) -> ServiceResult<bool> {
        let removed = self
            .ctx
            .settings()
            .retry
            .run("unsave_market", || self.try_unsave(user_id, venue_id))
            .await?;

        if removed {
            info!("Market unsaved");
        }
        Ok(removed)
    }

    async fn try_unsave(&self, user_id: &UserId, venue_id: &VenueId) -> ServiceResult<bool> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::saved_market(user_id, venue_id);
        if tx.get(&path).await?.is_none() {
            return Ok(false);
        }
        tx.delete(path);
        Ok(tx.commit().await?)
    }

    #[instrument(skip(self))]
    pub async fn is_saved(&self, user_id: &UserId, venue_id: &VenueId) -> ServiceResult<bool> {
        let path = paths::saved_market(user_id, venue_id);
        Ok(self.ctx.store().get(&path).await?.is_some())
    }

    /// All saved markets of the user, most recently saved first
    #[instrument(skip(self))]
    pub async fn list_saved(&self, user_id: &UserId) -> ServiceResult<Vec<SavedMarket>> {
        let store = self.ctx.store();
        let markets = MarketService::new(self.ctx);
        let defaults = &self.ctx.settings().alert_defaults;
        let mut out = Vec::new();

        for path in store.list(&paths::saved_markets(user_id)).await? {
            let Some(doc) = store.get(&path).await? else {
                continue;
            };
            let venue_id = VenueId::new(path.id())?;
            let open_days = markets.open_days(&venue_id).await?;
            out.push(saved_market_from_document(&path, &doc.data, open_days, defaults)?);
        }

        out.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(out)
    }

    /// Effective alert settings, with defaults filled in for missing or invalid values
    #[instrument(skip(self))]
    pub async fn get_alert_settings(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
    ) -> ServiceResult<AlertSettings> {
        Ok(self.get_saved(user_id, venue_id).await?.settings)
    }

    async fn get_saved(&self, user_id: &UserId, venue_id: &VenueId) -> ServiceResult<SavedMarket> {
        let path = paths::saved_market(user_id, venue_id);
        let doc = self
            .ctx
            .store()
            .get(&path)
            .await?
            .ok_or_else(|| DomainError::SavedMarketNotFound(venue_id.to_string()))?;
        let open_days = MarketService::new(self.ctx).open_days(venue_id).await?;
        Ok(saved_market_from_document(
            &path,
            &doc.data,
            open_days,
            &self.ctx.settings().alert_defaults,
        )?)
    }

    /// Apply a partial update to the alert settings
    #[instrument(skip(self, request))]
    pub async fn update_alert_settings(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
        request: &UpdateAlertSettingsRequest,
    ) -> ServiceResult<AlertSettings> {
        let patch = request.to_patch()?;
        let open_days = MarketService::new(self.ctx).open_days(venue_id).await?;

        let settings = self
            .ctx
            .settings()
            .retry
            .run("update_alert_settings", || {
                self.try_update_settings(user_id, venue_id, &patch, open_days)
            })
            .await?;

        info!(
            enabled = settings.enabled,
            lead_days = settings.lead_days,
            time_of_day = %settings.time_of_day,
            "Alert settings updated"
        );
        Ok(settings)
    }

    async fn try_update_settings(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
        patch: &AlertSettingsPatch,
        open_days: OpenDays,
    ) -> ServiceResult<AlertSettings> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::saved_market(user_id, venue_id);
        let existing = tx
            .get(&path)
            .await?
            .ok_or_else(|| DomainError::SavedMarketNotFound(venue_id.to_string()))?;
        let (doc, settings) = apply_alert_patch(
            &path,
            &existing,
            patch,
            open_days,
            &self.ctx.settings().alert_defaults,
            self.ctx.clock().now(),
        )?;
        tx.set(path, doc);
        tx.commit().await?;
        Ok(settings)
    }

    /// Next notification for one saved market, at the clock's local time
    #[instrument(skip(self))]
    pub async fn next_alert(&self, user_id: &UserId, venue_id: &VenueId) -> ServiceResult<NextAlert> {
        let settings = self.get_alert_settings(user_id, venue_id).await?;
        Ok(next_alert_for(&settings, self.ctx.clock().local_now()))
    }

    /// Saved markets with alerts on: scheduled ones soonest first, then
    /// unscheduled ones, at most `limit` entries
    #[instrument(skip(self))]
    pub async fn upcoming_alerts(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> ServiceResult<Vec<UpcomingAlert>> {
        let now = self.ctx.clock().local_now();
        let mut alerts: Vec<UpcomingAlert> = self
            .list_saved(user_id)
            .await?
            .into_iter()
            .filter(|s| s.settings.enabled)
            .map(|s| UpcomingAlert {
                next: next_alert_for(&s.settings, now),
                venue_id: s.venue_id,
                settings: s.settings,
            })
            .collect();

        // None sorts after every scheduled instant
        alerts.sort_by_key(|a| (a.next.notify_at.is_none(), a.next.notify_at));
        alerts.truncate(limit);
        Ok(alerts)
    }

    /// "Off", "Not scheduled" or "<Today|Tomorrow|Wed> · 9:00 AM"
    #[instrument(skip(self))]
    pub async fn describe_next_alert(
        &self,
        user_id: &UserId,
        venue_id: &VenueId,
    ) -> ServiceResult<String> {
        let settings = self.get_alert_settings(user_id, venue_id).await?;
        let now = self.ctx.clock().local_now();
        let next = next_alert_for(&settings, now);
        Ok(describe_next_alert(&settings, &next, now.date()))
    }
}
