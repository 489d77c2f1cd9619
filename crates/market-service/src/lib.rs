//! # market-service
//!
//! Application layer: reaction updates and consensus reads, cycle resets and
//! the background reset job, saved markets with alert scheduling, anonymous
//! comments, and opening-hours queries with market list filters. Services borrow a shared [`ServiceContext`].

pub mod dto;
pub mod jobs;
pub mod services;

pub use jobs::CycleResetJob;
pub use services::{
    CommentService, CycleService, EngineSettings, MarketService, ReactionChange, ReactionService,
    ResetReport, RetryPolicy, SavedMarketService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
