//! Community reaction entities - tracked fields, categories, counters, per-user records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{UserId, VenueId};

/// Venue attribute that users can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionField {
    Parking,
    PetFriendly,
    Reusable,
    Toilet,
    LiveMusic,
    Accessibility,
}

/// A selectable answer for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Yes,
    No,
    Free,
    Paid,
    Street,
}

const YES_NO: &[Category] = &[Category::Yes, Category::No];
const PARKING: &[Category] = &[Category::Free, Category::Paid, Category::Street];

impl ReactionField {
    pub const ALL: [ReactionField; 6] = [
        Self::Parking,
        Self::PetFriendly,
        Self::Reusable,
        Self::Toilet,
        Self::LiveMusic,
        Self::Accessibility,
    ];

    /// Stored field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::PetFriendly => "petFriendly",
            Self::Reusable => "reusable",
            Self::Toilet => "toilet",
            Self::LiveMusic => "liveMusic",
            Self::Accessibility => "accessibility",
        }
    }

    /// Categories this field accepts, in tie-listing order
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Self::Parking => PARKING,
            _ => YES_NO,
        }
    }

    #[inline]
    pub fn accepts(&self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Reject a category the field does not accept
    pub fn check(&self, category: Category) -> Result<(), DomainError> {
        if self.accepts(category) {
            Ok(())
        } else {
            Err(DomainError::InvalidCategory {
                field: *self,
                category,
            })
        }
    }
}

impl fmt::Display for ReactionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::ValidationError(format!("unknown reaction field: {s}")))
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Free => "Free",
            Self::Paid => "Paid",
            Self::Street => "Street",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Case-insensitive, so legacy lowercase `yes`/`no` values are understood
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Yes, Self::No, Self::Free, Self::Paid, Self::Street]
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::ValidationError(format!("unknown category: {s}")))
    }
}

/// Category -> count mapping for one field and one cycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts(BTreeMap<Category, u32>);

impl CategoryCounts {
    /// All of the field's categories at zero
    pub fn zeroed(field: ReactionField) -> Self {
        Self(field.categories().iter().map(|c| (*c, 0)).collect())
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, u32)>,
    {
        Self(pairs.into_iter().collect())
    }

    #[inline]
    pub fn get(&self, category: Category) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: Category, count: u32) {
        self.0.insert(category, count);
    }

    pub fn increment(&mut self, category: Category) {
        let entry = self.0.entry(category).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    /// Decrement, flooring at zero
    pub fn decrement(&mut self, category: Category) {
        let entry = self.0.entry(category).or_insert(0);
        *entry = entry.saturating_sub(1);
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|c| u64::from(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }
}

/// Counters of one field on one venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCounters {
    pub current: CategoryCounts,
    pub previous: CategoryCounts,
    pub last_updated: Option<DateTime<Utc>>,
}

impl FieldCounters {
    pub fn new(field: ReactionField) -> Self {
        Self {
            current: CategoryCounts::zeroed(field),
            previous: CategoryCounts::default(),
            last_updated: None,
        }
    }
}

/// One user's selections on one venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReaction {
    pub venue_id: VenueId,
    pub user_id: UserId,
    /// Cycle generation the selections were made in
    pub generation: u64,
    pub selections: BTreeMap<ReactionField, Category>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserReaction {
    pub fn new(venue_id: VenueId, user_id: UserId, generation: u64) -> Self {
        Self {
            venue_id,
            user_id,
            generation,
            selections: BTreeMap::new(),
            updated_at: None,
        }
    }

    #[inline]
    pub fn selection(&self, field: ReactionField) -> Option<Category> {
        self.selections.get(&field).copied()
    }

    /// Selection as seen by cycle `generation`; records from older cycles select nothing
    pub fn live_selection(&self, field: ReactionField, generation: u64) -> Option<Category> {
        if self.generation < generation {
            return None;
        }
        self.selection(field)
    }

    /// Set or clear a selection
    pub fn select(&mut self, field: ReactionField, category: Option<Category>) {
        match category {
            Some(c) => {
                self.selections.insert(field, c);
            }
            None => {
                self.selections.remove(&field);
            }
        }
    }
}
