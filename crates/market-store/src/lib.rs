//! # market-store
//!
//! Storage layer implementing the `DocumentStore` port from `market-core`.
//!
//! ## Overview
//!
//! - In-memory document store with versioned, optimistic-concurrency commits
//! - Document path layout
//! - Stored document models
//! - Document ↔ entity mappers, including legacy document shapes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_core::{DocumentStore, Transaction};
//! use market_store::{paths, MemoryDocumentStore};
//!
//! async fn example(venue: &market_core::VenueId) -> market_core::RepoResult<()> {
//!     let store = MemoryDocumentStore::new();
//!     let mut tx = Transaction::new(&store);
//!     let info = tx.get(&paths::market_info(venue)).await?;
//!     // ... modify and write back ...
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use memory::{MemoryDocumentStore, DEFAULT_MAX_WRITES_PER_COMMIT};
pub use models::{
    CommentDocument, MarketDocument, OpeningHoursDocument, SavedMarketDocument,
    UserCommentDocument,
};
