//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use std::str::FromStr;
use validator::Validate;

use market_core::{
    AlertSettingsPatch, Category, CommentId, MinuteOfDay, OpenDays, ReactionField,
    DEFAULT_COMMENT_PAGE_SIZE, MAX_LEAD_DAYS,
};

use crate::services::{ServiceError, ServiceResult};

// ============================================================================
// Reaction Requests
// ============================================================================

/// Set or clear one field's reaction; `category: null` clears it
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Field must be 1-32 characters"))]
    pub field: String,

    #[validate(length(min = 1, max = 16, message = "Category must be 1-16 characters"))]
    pub category: Option<String>,
}

impl UpdateReactionRequest {
    /// Parse into a field and an optional category the field accepts
    pub fn parse(&self) -> ServiceResult<(ReactionField, Option<Category>)> {
        self.validate()?;
        let field = ReactionField::from_str(&self.field)?;
        let category = self
            .category
            .as_deref()
            .map(Category::from_str)
            .transpose()?;
        if let Some(c) = category {
            field.check(c)?;
        }
        Ok((field, category))
    }
}

// ============================================================================
// Alert Requests
// ============================================================================

/// Partial update of a saved market's alert preferences
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertSettingsRequest {
    pub enabled: Option<bool>,

    #[validate(range(max = 7, message = "Lead days must be 0-7"))]
    pub lead_days: Option<u8>,

    #[validate(length(max = 7, message = "At most 7 open days"))]
    pub open_days: Option<Vec<u8>>,

    #[validate(length(equal = 5, message = "Time must be HH:mm"))]
    pub time_of_day: Option<String>,
}

impl UpdateAlertSettingsRequest {
    /// Validate and convert into a domain patch
    pub fn to_patch(&self) -> ServiceResult<AlertSettingsPatch> {
        self.validate()?;

        let open_days = match &self.open_days {
            Some(days) => {
                if let Some(bad) = days.iter().find(|d| **d > 6) {
                    return Err(ServiceError::validation(format!(
                        "Open day {bad} is not in 0-6"
                    )));
                }
                Some(OpenDays::from_indices(days.iter().copied()))
            }
            None => None,
        };

        let time_of_day = match &self.time_of_day {
            Some(t) => Some(MinuteOfDay::parse_hh_mm(t).ok_or_else(|| {
                ServiceError::validation(format!("Time {t:?} must be HH:mm"))
            })?),
            None => None,
        };

        Ok(AlertSettingsPatch {
            enabled: self.enabled,
            lead_days: self.lead_days.map(|d| d.min(MAX_LEAD_DAYS)),
            open_days,
            time_of_day,
        })
    }
}

// ============================================================================
// Comment Requests
// ============================================================================

/// New anonymous comment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub text: String,
}

impl AddCommentRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Trimmed text, rejected when only whitespace is left
    pub fn parse(&self) -> ServiceResult<String> {
        self.validate()?;
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ServiceError::validation("Comment must not be blank"));
        }
        Ok(text.to_string())
    }
}

/// One page of a market's comments, newest first
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentPageRequest {
    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<usize>,

    /// Id of the last comment of the previous page
    pub start_after: Option<String>,
}

impl CommentPageRequest {
    /// Page size and cursor
    pub fn parse(&self) -> ServiceResult<(usize, Option<CommentId>)> {
        self.validate()?;
        let cursor = self.start_after.as_deref().map(CommentId::new).transpose()?;
        Ok((self.limit.unwrap_or(DEFAULT_COMMENT_PAGE_SIZE), cursor))
    }
}
