//! Saved market document <-> `SavedMarket`

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use market_core::{
    AlertDefaults, AlertSettings, AlertSettingsPatch, DocPath, DomainError, MinuteOfDay, OpenDays,
    RepoResult, SavedMarket, VenueId, MAX_LEAD_DAYS,
};

use super::timestamp::{parse_timestamp, timestamp_value};
use crate::models::SavedMarketDocument;

/// Alert settings as stored, before fallbacks are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredAlertSettings {
    pub enabled: bool,
    pub lead_days: Option<u8>,
    pub open_days: OpenDays,
    pub time_of_day: Option<MinuteOfDay>,
}

impl StoredAlertSettings {
    pub fn from_document(doc: &SavedMarketDocument) -> Self {
        Self {
            enabled: doc
                .notify_enabled
                .as_ref()
                .and_then(Value::as_bool)
                .unwrap_or(false),
            lead_days: doc
                .notify_lead_days
                .as_ref()
                .and_then(Value::as_u64)
                .filter(|d| *d <= u64::from(MAX_LEAD_DAYS))
                .and_then(|d| u8::try_from(d).ok()),
            open_days: doc
                .notify_open_days
                .as_ref()
                .and_then(Value::as_array)
                .map(|days| {
                    OpenDays::from_indices(
                        days.iter()
                            .filter_map(Value::as_u64)
                            .filter_map(|d| u8::try_from(d).ok()),
                    )
                })
                .unwrap_or_default(),
            time_of_day: doc
                .notify_time_of_day
                .as_ref()
                .and_then(Value::as_str)
                .and_then(MinuteOfDay::parse_hh_mm),
        }
    }

    /// Effective settings: no stored days means the venue's open days,
    /// missing or invalid lead/time fall back to the defaults
    pub fn resolve(&self, venue_open_days: OpenDays, defaults: &AlertDefaults) -> AlertSettings {
        AlertSettings {
            enabled: self.enabled,
            lead_days: self.lead_days.unwrap_or(defaults.lead_days.min(MAX_LEAD_DAYS)),
            open_days: if self.open_days.is_empty() {
                venue_open_days
            } else {
                self.open_days
            },
            time_of_day: self.time_of_day.unwrap_or(defaults.time_of_day),
        }
    }
}

pub fn saved_market_document(path: &DocPath, doc: &Value) -> RepoResult<SavedMarketDocument> {
    serde_json::from_value(doc.clone())
        .map_err(|e| DomainError::malformed(path, format!("saved market: {e}")))
}

/// Map a stored saved market, resolving its alert settings
pub fn saved_market_from_document(
    path: &DocPath,
    doc: &Value,
    venue_open_days: OpenDays,
    defaults: &AlertDefaults,
) -> RepoResult<SavedMarket> {
    let stored = saved_market_document(path, doc)?;
    let venue = stored.place_id.as_deref().unwrap_or_else(|| path.id());
    let venue_id = VenueId::new(venue)
        .map_err(|_| DomainError::malformed(path, format!("bad place id {venue:?}")))?;

    Ok(SavedMarket {
        venue_id,
        saved_at: stored
            .saved_at
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or_default(),
        settings: StoredAlertSettings::from_document(&stored).resolve(venue_open_days, defaults),
        settings_updated_at: stored.notify_updated_at.as_ref().and_then(parse_timestamp),
    })
}

/// Document written on first save
pub fn new_saved_market_document(
    venue_id: &VenueId,
    saved_at: DateTime<Utc>,
    settings: &AlertSettings,
) -> RepoResult<Value> {
    let doc = SavedMarketDocument {
        place_id: Some(venue_id.to_string()),
        saved_at: Some(timestamp_value(saved_at)),
        notify_updated_at: Some(timestamp_value(saved_at)),
        ..SavedMarketDocument::default()
    };
    to_value(&with_settings(doc, settings))
}

/// Write `settings` into the stored document, stamping `notifyUpdatedAt`
pub fn apply_alert_settings(
    path: &DocPath,
    existing: &Value,
    settings: &AlertSettings,
    now: DateTime<Utc>,
) -> RepoResult<Value> {
    let mut doc = with_settings(saved_market_document(path, existing)?, settings);
    doc.notify_updated_at = Some(timestamp_value(now));
    to_value(&doc)
}

/// Resolve, patch and write back in one step
pub fn apply_alert_patch(
    path: &DocPath,
    existing: &Value,
    patch: &AlertSettingsPatch,
    venue_open_days: OpenDays,
    defaults: &AlertDefaults,
    now: DateTime<Utc>,
) -> RepoResult<(Value, AlertSettings)> {
    let stored = saved_market_document(path, existing)?;
    let mut settings = StoredAlertSettings::from_document(&stored).resolve(venue_open_days, defaults);
    patch.apply_to(&mut settings);
    let doc = apply_alert_settings(path, existing, &settings, now)?;
    Ok((doc, settings))
}

fn with_settings(mut doc: SavedMarketDocument, settings: &AlertSettings) -> SavedMarketDocument {
    doc.notify_enabled = Some(json!(settings.enabled));
    doc.notify_lead_days = Some(json!(settings.lead_days));
    doc.notify_open_days = Some(json!(settings.open_days.days()));
    doc.notify_time_of_day = Some(json!(settings.time_of_day.to_string()));
    doc
}

fn to_value(doc: &SavedMarketDocument) -> RepoResult<Value> {
    serde_json::to_value(doc).map_err(|e| DomainError::InternalError(e.to_string()))
}
