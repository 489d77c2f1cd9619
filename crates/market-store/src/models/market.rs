//! Market document model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored shape of `markets/{venue}`.
///
/// Keys this crate does not interpret (address, geometry, photos, ...) are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHoursDocument>,
    /// Places `geometry`; only `location.lat` and `location.lng` are read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `opening_hours` block; periods stay raw so one bad entry cannot fail the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningHoursDocument {
    #[serde(default)]
    pub periods: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
