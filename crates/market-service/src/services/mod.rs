//! Business logic services
//!
//! Every mutation runs as an optimistic transaction against the document
//! store and is retried on conflict (see [`retry`]).

pub mod comment;
pub mod context;
pub mod cycle;
pub mod error;
pub mod market;
pub mod reaction;
pub mod retry;
pub mod saved_market;

// Re-export all services for convenience
pub use comment::CommentService;
pub use context::{EngineSettings, ServiceContext, ServiceContextBuilder};
pub use cycle::{CycleService, ResetReport};
pub use error::{ServiceError, ServiceResult};
pub use market::MarketService;
pub use reaction::{ReactionChange, ReactionService};
pub use retry::RetryPolicy;
pub use saved_market::SavedMarketService;
