//! User reaction documents <-> `UserReaction`
//!
//! The same record is stored twice: under the venue
//! (`markets/{venue}/details/info/userReactions/{user}`) and under the user
//! (`userReactions/{user}/reactions/{venue}`, which also carries `placeId`).
//! A cleared selection is written as `null` when the key already existed.

use serde_json::{json, Map, Value};
use std::str::FromStr;

use market_core::{
    Category, DocPath, DomainError, ReactionField, RepoResult, UserId, UserReaction, VenueId,
};

use super::timestamp::{parse_timestamp, timestamp_value};

pub fn user_reaction_from_document(
    venue_id: &VenueId,
    user_id: &UserId,
    path: &DocPath,
    doc: &Value,
) -> RepoResult<UserReaction> {
    let obj = doc
        .as_object()
        .ok_or_else(|| DomainError::malformed(path, "user reaction is not an object"))?;

    let generation = obj.get("generation").and_then(Value::as_u64).unwrap_or(0);
    let mut reaction = UserReaction::new(venue_id.clone(), user_id.clone(), generation);
    reaction.updated_at = obj.get("updatedAt").and_then(parse_timestamp);

    for field in ReactionField::ALL {
        let selected = obj
            .get(field.as_str())
            .and_then(Value::as_str)
            .and_then(|s| Category::from_str(s).ok())
            .filter(|c| field.accepts(*c));
        reaction.select(field, selected);
    }

    Ok(reaction)
}

/// Read a user-indexed snapshot; the venue comes from `placeId`, else the document id
pub fn user_reaction_from_index_document(
    user_id: &UserId,
    path: &DocPath,
    doc: &Value,
) -> RepoResult<UserReaction> {
    let venue = doc
        .get("placeId")
        .and_then(Value::as_str)
        .unwrap_or_else(|| path.id());
    let venue_id = VenueId::new(venue)
        .map_err(|_| DomainError::malformed(path, format!("bad place id {venue:?}")))?;
    user_reaction_from_document(&venue_id, user_id, path, doc)
}

/// Document for `reaction`, merged over `existing` so unrelated keys survive
pub fn reaction_document(
    existing: Option<Value>,
    reaction: &UserReaction,
    with_place_id: bool,
) -> Value {
    let mut obj = match existing {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    for field in ReactionField::ALL {
        match reaction.selection(field) {
            Some(category) => {
                obj.insert(field.as_str().to_string(), json!(category.as_str()));
            }
            None => {
                if let Some(slot) = obj.get_mut(field.as_str()) {
                    *slot = Value::Null;
                }
            }
        }
    }

    obj.insert("generation".to_string(), json!(reaction.generation));
    if let Some(at) = reaction.updated_at {
        obj.insert("updatedAt".to_string(), timestamp_value(at));
    }
    if with_place_id {
        obj.insert("placeId".to_string(), json!(reaction.venue_id.as_str()));
    }

    Value::Object(obj)
}
