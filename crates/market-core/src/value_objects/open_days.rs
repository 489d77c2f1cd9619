//! Set of weekdays, Sunday-first, stored as a 7-bit bitfield.
//!
//! Serialized as a sorted array of day indexes (`[0, 6]` = Sunday and Saturday).

use bitflags::bitflags;
use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::time_span::weekday_index;

bitflags! {
    /// Weekday set used by alert preferences and venue open-day derivation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenDays: u8 {
        const SUNDAY    = 1 << 0;
        const MONDAY    = 1 << 1;
        const TUESDAY   = 1 << 2;
        const WEDNESDAY = 1 << 3;
        const THURSDAY  = 1 << 4;
        const FRIDAY    = 1 << 5;
        const SATURDAY  = 1 << 6;

        const ALL = 0b0111_1111;
    }
}

impl OpenDays {
    /// Single-day set; indexes outside 0..=6 give the empty set
    pub fn from_day(index: u8) -> Self {
        if index > 6 {
            return Self::empty();
        }
        Self::from_bits_truncate(1 << index)
    }

    /// Build from day indexes, silently dropping out-of-range entries
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        indices
            .into_iter()
            .fold(Self::empty(), |acc, d| acc | Self::from_day(d))
    }

    #[inline]
    pub fn contains_day(&self, index: u8) -> bool {
        index <= 6 && self.contains(Self::from_day(index))
    }

    #[inline]
    pub fn contains_weekday(&self, weekday: Weekday) -> bool {
        self.contains_day(weekday_index(weekday))
    }

    /// Sorted day indexes in the set
    pub fn days(&self) -> Vec<u8> {
        (0..7u8).filter(|d| self.contains_day(*d)).collect()
    }
}

impl Serialize for OpenDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.days().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OpenDays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Non-integer and out-of-range entries are dropped rather than rejected.
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_indices(
            raw.iter()
                .filter_map(serde_json::Value::as_u64)
                .filter(|d| *d <= 6)
                .map(|d| d as u8),
        ))
    }
}
