//! Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use market_core::{AlertSettings, Category, NextAlert, ReactionField, VenueId};

/// One venue the user currently has live reactions on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReaction {
    pub venue_id: VenueId,
    pub selections: BTreeMap<ReactionField, Category>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A saved market with alerts turned on and its next notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAlert {
    pub venue_id: VenueId,
    pub settings: AlertSettings,
    #[serde(flatten)]
    pub next: NextAlert,
}
