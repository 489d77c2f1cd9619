//! Venue entities - the market record and its aggregated reaction info

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::cycle::Cycle;
use super::period::{PlacePeriod, RecurringPeriod};
use super::reaction::{FieldCounters, ReactionField};
use crate::value_objects::{GeoPoint, VenueId};

/// A market as registered from the places data source
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: VenueId,
    pub name: String,
    pub periods: Vec<PlacePeriod>,
    /// `geometry.location`, absent for venues without usable coordinates
    pub location: Option<GeoPoint>,
}

impl Market {
    pub fn new(id: VenueId, name: impl Into<String>, periods: Vec<PlacePeriod>) -> Self {
        Self {
            id,
            name: name.into(),
            periods,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self
    }

    /// Periods that parse
    pub fn recurring_periods(&self) -> Vec<RecurringPeriod> {
        RecurringPeriod::parse_all(&self.periods)
    }
}

/// Aggregated reaction state of one venue
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VenueInfo {
    pub fields: BTreeMap<ReactionField, FieldCounters>,
    pub cycle: Option<Cycle>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl VenueInfo {
    /// Counters of `field`, zeroed when the venue has none yet
    pub fn counters(&self, field: ReactionField) -> FieldCounters {
        self.fields
            .get(&field)
            .cloned()
            .unwrap_or_else(|| FieldCounters::new(field))
    }

    pub fn counters_mut(&mut self, field: ReactionField) -> &mut FieldCounters {
        self.fields
            .entry(field)
            .or_insert_with(|| FieldCounters::new(field))
    }

    /// Generation of the current cycle, 0 before the first reset
    pub fn generation(&self) -> u64 {
        self.cycle.as_ref().map_or(0, |c| c.generation)
    }
}
