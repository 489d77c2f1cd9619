//! Market document <-> `Market`

use serde_json::{json, Value};

use market_core::{DocPath, DomainError, GeoPoint, Market, PlacePeriod, RepoResult, VenueId};

use crate::models::MarketDocument;

/// Map a stored market. Period entries that do not deserialize are kept as
/// empty periods so the schedule engines skip them.
pub fn market_from_document(path: &DocPath, doc: &Value) -> RepoResult<Market> {
    let stored: MarketDocument = serde_json::from_value(doc.clone())
        .map_err(|e| DomainError::malformed(path, format!("market: {e}")))?;

    let venue = stored.place_id.as_deref().unwrap_or_else(|| path.id());
    let id = VenueId::new(venue)
        .map_err(|_| DomainError::malformed(path, format!("bad place id {venue:?}")))?;

    let periods = stored
        .opening_hours
        .map(|hours| {
            hours
                .periods
                .into_iter()
                .map(|p| serde_json::from_value::<PlacePeriod>(p).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let location = stored.geometry.as_ref().and_then(location_of);

    Ok(Market::new(id, stored.name.unwrap_or_default(), periods).with_location(location))
}

/// `geometry.location` when both coordinates are usable numbers
fn location_of(geometry: &Value) -> Option<GeoPoint> {
    let location = geometry.get("location")?;
    let lat = location.get("lat")?.as_f64()?;
    let lng = location.get("lng")?.as_f64()?;
    GeoPoint::new(lat, lng).ok()
}

/// Write `market` over `existing`, keeping keys this crate does not own
pub fn market_document(existing: Option<&Value>, market: &Market) -> RepoResult<Value> {
    let mut stored: MarketDocument = match existing {
        Some(doc) => serde_json::from_value(doc.clone()).unwrap_or_default(),
        None => MarketDocument::default(),
    };

    let periods = market
        .periods
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::InternalError(e.to_string()))?;

    stored.place_id = Some(market.id.to_string());
    stored.name = Some(market.name.clone());
    let mut hours = stored.opening_hours.take().unwrap_or_default();
    hours.periods = periods;
    stored.opening_hours = Some(hours);

    if let Some(point) = market.location {
        let location = json!({ "lat": point.lat, "lng": point.lng });
        match stored.geometry.as_mut().and_then(Value::as_object_mut) {
            Some(geometry) => {
                geometry.insert("location".to_string(), location);
            }
            None => stored.geometry = Some(json!({ "location": location })),
        }
    }

    serde_json::to_value(&stored).map_err(|e| DomainError::InternalError(e.to_string()))
}
