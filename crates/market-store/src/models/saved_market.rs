//! Saved market document model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored shape of `users/{user}/savedMarkets/{venue}`.
///
/// The `notify*` values are kept raw: older clients wrote them loosely and
/// they are normalized when mapped to domain settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMarketDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_enabled: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_lead_days: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_open_days: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_time_of_day: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_updated_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
