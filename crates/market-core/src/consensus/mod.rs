//! Reaction consensus rules
//!
//! All functions work on an already fetched [`FieldCounters`] snapshot.
//! Only the categories a field accepts take part; stray keys are ignored.

use serde::Serialize;

use crate::entities::{Category, CategoryCounts, FieldCounters, ReactionField, VenueInfo};

/// Outcome of a strict-maximum vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    NoVotes,
    Tied,
    Unique(Category),
}

impl Winner {
    pub fn category(self) -> Option<Category> {
        match self {
            Self::Unique(c) => Some(c),
            Self::NoVotes | Self::Tied => None,
        }
    }
}

/// Strict-maximum category of `counts` for `field`
pub fn winner(field: ReactionField, counts: &CategoryCounts) -> Winner {
    let mut best: Option<(Category, u32)> = None;
    let mut tied = false;

    for &category in field.categories() {
        let n = counts.get(category);
        if n == 0 {
            continue;
        }
        match best {
            Some((_, top)) if n < top => {}
            Some((_, top)) if n == top => tied = true,
            _ => {
                best = Some((category, n));
                tied = false;
            }
        }
    }

    match best {
        None => Winner::NoVotes,
        Some(_) if tied => Winner::Tied,
        Some((c, _)) => Winner::Unique(c),
    }
}

/// Value shown for a field: the current strict winner, falling back to the
/// previous cycle's strict winner when the current cycle is empty or tied.
pub fn displayed_value(field: ReactionField, counters: &FieldCounters) -> Option<Category> {
    match winner(field, &counters.current) {
        Winner::Unique(c) => Some(c),
        Winner::NoVotes | Winner::Tied => winner(field, &counters.previous).category(),
    }
}

/// Whether the current cycle says something the previous cycle did not.
///
/// A current tie resolves through the previous winner, so a tie never counts as new.
pub fn has_new_information(field: ReactionField, counters: &FieldCounters) -> bool {
    let previous = winner(field, &counters.previous).category();
    let current = match winner(field, &counters.current) {
        Winner::NoVotes => return false,
        Winner::Unique(c) => c,
        Winner::Tied => match previous {
            Some(c) => c,
            None => return false,
        },
    };
    previous != Some(current)
}

/// No votes in either cycle
pub fn is_field_empty(field: ReactionField, counters: &FieldCounters) -> bool {
    let sum = |counts: &CategoryCounts| -> u64 {
        field
            .categories()
            .iter()
            .map(|c| u64::from(counts.get(*c)))
            .sum()
    };
    sum(&counters.current) == 0 && sum(&counters.previous) == 0
}

/// Display-ready view of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub field: ReactionField,
    pub displayed: Option<Category>,
    pub has_new_information: bool,
    pub is_empty: bool,
    pub current: CategoryCounts,
    pub previous: CategoryCounts,
}

/// Summaries of every tracked field of a venue, in field order
pub fn summarize(info: &VenueInfo) -> Vec<FieldSummary> {
    ReactionField::ALL
        .into_iter()
        .map(|field| {
            let counters = info.counters(field);
            FieldSummary {
                field,
                displayed: displayed_value(field, &counters),
                has_new_information: has_new_information(field, &counters),
                is_empty: is_field_empty(field, &counters),
                current: counters.current,
                previous: counters.previous,
            }
        })
        .collect()
}
