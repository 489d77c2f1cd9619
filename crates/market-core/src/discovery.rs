//! Market list filters: everything, open right now, or nearest first

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::entities::Market;
use crate::schedule::{get_open_status, OpenStatus};
use crate::value_objects::GeoPoint;

/// How a list of markets is narrowed or ordered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketFilter {
    /// Unchanged
    All,
    /// Only markets open at the given local time; closed and unscheduled ones drop out
    OpenNow,
    /// Every market, nearest to the point first; markets without coordinates last
    ClosestTo(GeoPoint),
}

/// Distance from `point`, infinite when the market has no coordinates
pub fn market_distance(market: &Market, point: &GeoPoint) -> f64 {
    market
        .location
        .map_or(f64::INFINITY, |loc| loc.planar_distance(point))
}

/// Apply `filter` at local wall-clock time `now`. The relative order of
/// markets the filter does not reorder is kept.
pub fn apply_market_filter(
    markets: Vec<Market>,
    filter: &MarketFilter,
    now: NaiveDateTime,
) -> Vec<Market> {
    match filter {
        MarketFilter::All => markets,
        MarketFilter::OpenNow => markets
            .into_iter()
            .filter(|m| get_open_status(&m.periods, now).status == OpenStatus::OpenNow)
            .collect(),
        MarketFilter::ClosestTo(point) => {
            let mut ranked: Vec<(f64, Market)> = markets
                .into_iter()
                .map(|m| (market_distance(&m, point), m))
                .collect();
            ranked.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            ranked.into_iter().map(|(_, m)| m).collect()
        }
    }
}
