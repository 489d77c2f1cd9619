//! Saved markets and their alert preferences

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MinuteOfDay, OpenDays, VenueId};

/// Longest allowed alert lead time, in days
pub const MAX_LEAD_DAYS: u8 = 7;

/// Fallbacks applied when stored preferences are missing or invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDefaults {
    pub time_of_day: MinuteOfDay,
    pub lead_days: u8,
}

impl Default for AlertDefaults {
    fn default() -> Self {
        Self {
            // 8pm
            time_of_day: MinuteOfDay::from_hm(20, 0).unwrap_or_default(),
            lead_days: 1,
        }
    }
}

/// Per (user, venue) alert preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSettings {
    pub enabled: bool,
    pub lead_days: u8,
    pub open_days: OpenDays,
    pub time_of_day: MinuteOfDay,
}

impl AlertSettings {
    /// Settings created when a market is first saved: disabled, covering the venue's open days
    pub fn initial(open_days: OpenDays, defaults: &AlertDefaults) -> Self {
        Self {
            enabled: false,
            lead_days: defaults.lead_days.min(MAX_LEAD_DAYS),
            open_days,
            time_of_day: defaults.time_of_day,
        }
    }
}

/// Partial update of [`AlertSettings`]; `None` leaves a value untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertSettingsPatch {
    pub enabled: Option<bool>,
    pub lead_days: Option<u8>,
    pub open_days: Option<OpenDays>,
    pub time_of_day: Option<MinuteOfDay>,
}

impl AlertSettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, settings: &mut AlertSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(lead_days) = self.lead_days {
            settings.lead_days = lead_days.min(MAX_LEAD_DAYS);
        }
        if let Some(open_days) = self.open_days {
            settings.open_days = open_days;
        }
        if let Some(time_of_day) = self.time_of_day {
            settings.time_of_day = time_of_day;
        }
    }
}

/// Result of the next-alert search. Both fields are `None` when nothing is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAlert {
    pub notify_at: Option<NaiveDateTime>,
    pub open_on: Option<NaiveDate>,
}

impl NextAlert {
    pub const NONE: Self = Self {
        notify_at: None,
        open_on: None,
    };

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.notify_at.is_some()
    }
}

/// A market saved by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMarket {
    pub venue_id: VenueId,
    pub saved_at: DateTime<Utc>,
    pub settings: AlertSettings,
    pub settings_updated_at: Option<DateTime<Utc>>,
}
