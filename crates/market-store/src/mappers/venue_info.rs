//! Venue info document <-> `VenueInfo`
//!
//! Canonical stored shape:
//!
//! ```json
//! {
//!   "toilet":   { "Yes": 2, "No": 0, "lastUpdated": "..." },
//!   "parking":  { "Free": 1, "Paid": 0, "Street": 0, "lastUpdated": "..." },
//!   "previousCycle": { "toilet": { "Yes": 5, "No": 1 } },
//!   "cycle": { "generation": 3, "lastResetAt": "...", "nextResetAt": "...", "cleanupPending": false },
//!   "lastUpdated": "..."
//! }
//! ```
//!
//! Legacy documents may use lowercase `yes`/`no` keys or keep the previous
//! cycle nested inside each field (`toilet.previousCycle`). Both are read,
//! and rewritten canonically on the next write. Unknown keys are preserved.

use serde_json::{json, Map, Value};

use market_core::{
    CategoryCounts, Cycle, DocPath, DomainError, FieldCounters, ReactionField, RepoResult,
    VenueInfo,
};

use super::timestamp::{parse_timestamp, timestamp_value};

const PREVIOUS_CYCLE: &str = "previousCycle";
const LAST_UPDATED: &str = "lastUpdated";
const CYCLE: &str = "cycle";

/// Read a venue info document; a missing document is an empty venue
pub fn venue_info_from_document(path: &DocPath, doc: Option<&Value>) -> RepoResult<VenueInfo> {
    let Some(doc) = doc else {
        return Ok(VenueInfo::default());
    };
    let root = doc
        .as_object()
        .ok_or_else(|| DomainError::malformed(path, "venue info is not an object"))?;

    let top_previous = root.get(PREVIOUS_CYCLE).and_then(Value::as_object);
    let mut info = VenueInfo {
        cycle: root
            .get(CYCLE)
            .and_then(Value::as_object)
            .and_then(cycle_from_object),
        last_updated: root.get(LAST_UPDATED).and_then(parse_timestamp),
        ..VenueInfo::default()
    };

    for field in ReactionField::ALL {
        let current = root.get(field.as_str()).and_then(Value::as_object);
        let previous = top_previous
            .and_then(|p| p.get(field.as_str()))
            .and_then(Value::as_object)
            .or_else(|| {
                current
                    .and_then(|c| c.get(PREVIOUS_CYCLE))
                    .and_then(Value::as_object)
            });

        if current.is_none() && previous.is_none() {
            continue;
        }

        info.fields.insert(
            field,
            FieldCounters {
                current: current.map_or_else(
                    || CategoryCounts::zeroed(field),
                    |c| counts_from_object(field, c),
                ),
                previous: previous
                    .map(|p| counts_from_object(field, p))
                    .unwrap_or_default(),
                last_updated: current
                    .and_then(|c| c.get(LAST_UPDATED))
                    .and_then(parse_timestamp),
            },
        );
    }

    Ok(info)
}

/// Merge `info` into an existing document (or a fresh one) in canonical shape
pub fn apply_venue_info(existing: Option<Value>, info: &VenueInfo) -> Value {
    let mut root = into_object(existing);
    let mut previous_root = into_object(root.remove(PREVIOUS_CYCLE));

    for (field, counters) in &info.fields {
        let mut obj = into_object(root.remove(field.as_str()));
        obj.remove(PREVIOUS_CYCLE);
        for category in field.categories() {
            obj.remove(&category.as_str().to_lowercase());
            obj.insert(
                category.as_str().to_string(),
                json!(counters.current.get(*category)),
            );
        }
        if let Some(at) = counters.last_updated {
            obj.insert(LAST_UPDATED.to_string(), timestamp_value(at));
        }
        root.insert(field.as_str().to_string(), Value::Object(obj));
        previous_root.insert(
            field.as_str().to_string(),
            counts_value(*field, &counters.previous),
        );
    }

    if !previous_root.is_empty() {
        root.insert(PREVIOUS_CYCLE.to_string(), Value::Object(previous_root));
    }
    if let Some(cycle) = &info.cycle {
        root.insert(CYCLE.to_string(), cycle_value(cycle));
    }
    if let Some(at) = info.last_updated {
        root.insert(LAST_UPDATED.to_string(), timestamp_value(at));
    }

    Value::Object(root)
}

fn into_object(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn counts_from_object(field: ReactionField, obj: &Map<String, Value>) -> CategoryCounts {
    CategoryCounts::from_pairs(field.categories().iter().map(|category| {
        let raw = obj
            .get(category.as_str())
            .or_else(|| obj.get(&category.as_str().to_lowercase()));
        (*category, raw.map_or(0, count_from_value))
    }))
}

/// Non-negative count; negative, fractional-negative and non-numeric values read as 0
fn count_from_value(value: &Value) -> u32 {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }
    match value.as_f64() {
        Some(f) if f > 0.0 => f.floor().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn counts_value(field: ReactionField, counts: &CategoryCounts) -> Value {
    let map: Map<String, Value> = field
        .categories()
        .iter()
        .map(|c| (c.as_str().to_string(), json!(counts.get(*c))))
        .collect();
    Value::Object(map)
}

fn cycle_from_object(obj: &Map<String, Value>) -> Option<Cycle> {
    Some(Cycle {
        generation: obj.get("generation").and_then(Value::as_u64).unwrap_or(0),
        last_reset_at: obj.get("lastResetAt").and_then(parse_timestamp),
        next_reset_at: obj.get("nextResetAt").and_then(parse_timestamp)?,
        cleanup_pending: obj
            .get("cleanupPending")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn cycle_value(cycle: &Cycle) -> Value {
    json!({
        "generation": cycle.generation,
        "lastResetAt": cycle.last_reset_at.map(timestamp_value),
        "nextResetAt": timestamp_value(cycle.next_reset_at),
        "cleanupPending": cycle.cleanup_pending,
    })
}
