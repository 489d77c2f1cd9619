//! Market service
//!
//! Venue registration, opening-hours queries and market list filters.

use tracing::{debug, info, instrument, warn};

use market_core::{
    apply_market_filter, format_weekly_schedule, get_open_status, open_days_of,
    project_weekly_schedule, DomainError, GeoPoint, Market, MarketFilter, OpenDays,
    OpeningStatusResult, PlacePeriod, Transaction, VenueId, WeeklySchedule,
};
use market_store::mappers::{market_document, market_from_document};
use market_store::paths;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const MAX_NAME_LEN: usize = 200;

/// Market service
pub struct MarketService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MarketService<'a> {
    /// Create a new MarketService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create or update a market record. Keys the engine does not own are kept.
    pub async fn register_market(
        &self,
        venue_id: &VenueId,
        name: &str,
        periods: Vec<PlacePeriod>,
    ) -> ServiceResult<Market> {
        self.register_market_at(venue_id, name, periods, None).await
    }

    /// Register a market together with its coordinates. `None` keeps any
    /// stored coordinates.
    #[instrument(skip(self, periods), fields(period_count = periods.len()))]
    pub async fn register_market_at(
        &self,
        venue_id: &VenueId,
        name: &str,
        periods: Vec<PlacePeriod>,
        location: Option<GeoPoint>,
    ) -> ServiceResult<Market> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(ServiceError::validation(format!(
                "Market name must be 1-{MAX_NAME_LEN} characters"
            )));
        }

        let market = Market::new(venue_id.clone(), name, periods).with_location(location);
        self.ctx
            .settings()
            .retry
            .run("register_market", || self.try_register(&market))
            .await?;

        info!(
            valid_periods = market.recurring_periods().len(),
            "Market registered"
        );
        Ok(market)
    }

    async fn try_register(&self, market: &Market) -> ServiceResult<()> {
        let mut tx = Transaction::new(self.ctx.store());
        let path = paths::market(&market.id);
        let existing = tx.get(&path).await?;
        let doc = market_document(existing.as_ref(), market)?;
        tx.set(path, doc);
        tx.commit().await?;
        Ok(())
    }

    /// Load a market
    #[instrument(skip(self))]
    pub async fn get_market(&self, venue_id: &VenueId) -> ServiceResult<Market> {
        self.find_market(venue_id)
            .await?
            .ok_or_else(|| DomainError::MarketNotFound(venue_id.to_string()).into())
    }

    pub(crate) async fn find_market(&self, venue_id: &VenueId) -> ServiceResult<Option<Market>> {
        let path = paths::market(venue_id);
        let Some(doc) = self.ctx.store().get(&path).await? else {
            return Ok(None);
        };
        Ok(Some(market_from_document(&path, &doc.data)?))
    }

    /// Every registered market, ordered by name then id. Records that fail to
    /// map are logged and left out.
    #[instrument(skip(self))]
    pub async fn list_markets(&self) -> ServiceResult<Vec<Market>> {
        let store = self.ctx.store();
        let mut markets = Vec::new();

        for path in store.list(&paths::markets()).await? {
            let Some(doc) = store.get(&path).await? else {
                continue;
            };
            match market_from_document(&path, &doc.data) {
                Ok(market) => markets.push(market),
                Err(e) => warn!(path = %path, error = %e, "Skipping unreadable market"),
            }
        }

        markets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(markets)
    }

    /// Registered markets narrowed or ordered by `filter` at the clock's local time
    #[instrument(skip(self))]
    pub async fn filter_markets(&self, filter: &MarketFilter) -> ServiceResult<Vec<Market>> {
        let markets = self.list_markets().await?;
        let total = markets.len();
        let out = apply_market_filter(markets, filter, self.ctx.clock().local_now());
        debug!(total, kept = out.len(), "Markets filtered");
        Ok(out)
    }

    /// Weekdays the venue opens on; empty when the market is unknown
    pub(crate) async fn open_days(&self, venue_id: &VenueId) -> ServiceResult<OpenDays> {
        Ok(self
            .find_market(venue_id)
            .await?
            .map(|m| open_days_of(&m.periods))
            .unwrap_or_default())
    }

    /// Whether the venue is open at the clock's local time, and when it opens next
    #[instrument(skip(self))]
    pub async fn open_status(&self, venue_id: &VenueId) -> ServiceResult<OpeningStatusResult> {
        let market = self.get_market(venue_id).await?;
        Ok(get_open_status(&market.periods, self.ctx.clock().local_now()))
    }

    /// Per-weekday opening windows
    #[instrument(skip(self))]
    pub async fn weekly_schedule(&self, venue_id: &VenueId) -> ServiceResult<WeeklySchedule> {
        let market = self.get_market(venue_id).await?;
        Ok(project_weekly_schedule(&market.periods))
    }

    /// Compact text rendering of the weekly schedule
    pub async fn formatted_schedule(&self, venue_id: &VenueId) -> ServiceResult<String> {
        Ok(format_weekly_schedule(&self.weekly_schedule(venue_id).await?))
    }
}
