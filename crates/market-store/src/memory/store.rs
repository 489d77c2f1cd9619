//! In-memory document store with optimistic concurrency

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::trace;

use market_core::{
    CollectionPath, DocPath, DocumentStore, DomainError, Precondition, RepoResult,
    VersionedDocument, WriteBatch, WriteOp,
};

/// Per-commit mutation limit, matching common hosted document databases
pub const DEFAULT_MAX_WRITES_PER_COMMIT: usize = 500;

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<DocPath, VersionedDocument>,
    next_version: u64,
}

/// Thread-safe document store kept in process memory.
///
/// Every write stamps the document with a fresh, store-wide unique version,
/// so a version seen by a reader identifies exactly one stored state.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    state: Mutex<State>,
    max_writes: usize,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_max_writes(DEFAULT_MAX_WRITES_PER_COMMIT)
    }

    pub fn with_max_writes(max_writes: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            max_writes: max_writes.max(1),
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.state.lock().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().docs.is_empty()
    }

    fn check(state: &State, path: &DocPath, precondition: Precondition) -> RepoResult<()> {
        let current = state.docs.get(path).map(|d| d.version);
        let holds = match precondition {
            Precondition::Missing => current.is_none(),
            Precondition::Version(v) => current == Some(v),
        };
        if holds {
            Ok(())
        } else {
            trace!(%path, ?precondition, ?current, "precondition failed");
            Err(DomainError::TransactionConflict)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> RepoResult<Option<VersionedDocument>> {
        Ok(self.state.lock().docs.get(path).cloned())
    }

    async fn list(&self, collection: &CollectionPath) -> RepoResult<Vec<DocPath>> {
        let state = self.state.lock();
        Ok(state
            .docs
            .keys()
            .filter(|p| p.parent_collection() == *collection)
            .cloned()
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> RepoResult<()> {
        if batch.len() > self.max_writes {
            return Err(DomainError::BatchTooLarge {
                max: self.max_writes,
                got: batch.len(),
            });
        }

        let mut state = self.state.lock();
        for (path, precondition) in &batch.preconditions {
            Self::check(&state, path, *precondition)?;
        }

        for op in batch.writes {
            match op {
                WriteOp::Set { path, data } => {
                    state.next_version += 1;
                    let version = state.next_version;
                    state.docs.insert(path, VersionedDocument { data, version });
                }
                WriteOp::Delete { path } => {
                    state.docs.remove(&path);
                }
            }
        }
        Ok(())
    }

    fn max_writes_per_commit(&self) -> usize {
        self.max_writes
    }
}
