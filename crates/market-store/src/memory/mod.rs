//! In-memory store implementation

mod store;

pub use store::{MemoryDocumentStore, DEFAULT_MAX_WRITES_PER_COMMIT};
