//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::{Category, ReactionField};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Saved market not found: {0}")]
    SavedMarketNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    // =========================================================================
    // Permission Errors
    // =========================================================================
    #[error("Comment {0} was not written by this user")]
    NotCommentAuthor(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Category {category} is not valid for field {field}")]
    InvalidCategory {
        field: ReactionField,
        category: Category,
    },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Transaction conflict: a document changed since it was read")]
    TransactionConflict,

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Batch of {got} writes exceeds the limit of {max}")]
    BatchTooLarge { max: usize, got: usize },

    #[error("Malformed document at {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MarketNotFound(_) => "UNKNOWN_MARKET",
            Self::SavedMarketNotFound(_) => "UNKNOWN_SAVED_MARKET",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",

            // Permission
            Self::NotCommentAuthor(_) => "NOT_COMMENT_AUTHOR",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidCategory { .. } => "INVALID_CATEGORY",

            // Conflict
            Self::TransactionConflict => "TRANSACTION_CONFLICT",

            // Storage
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            Self::StoreError(_) => "STORE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MarketNotFound(_) | Self::SavedMarketNotFound(_) | Self::CommentNotFound(_)
        )
    }

    /// Check if the caller may not act on the resource
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotCommentAuthor(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidCategory { .. })
    }

    /// Check if this is an optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TransactionConflict)
    }

    /// Check if retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionConflict | Self::StoreError(_))
    }

    /// Shorthand for a malformed document error
    pub fn malformed(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
