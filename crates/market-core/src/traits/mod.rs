//! Ports - the interfaces the domain needs from infrastructure

mod clock;
mod store;
mod transaction;

pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{DocumentStore, Precondition, RepoResult, VersionedDocument, WriteBatch, WriteOp};
pub use transaction::Transaction;
