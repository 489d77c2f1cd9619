//! Document store port
//!
//! A generic key-document store addressed by hierarchical paths, with
//! optimistic concurrency: every stored document carries a version that
//! changes on each write, and a commit can be made conditional on the
//! versions observed when reading.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::{CollectionPath, DocPath};

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

/// A stored document and its current version
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    pub data: Value,
    pub version: u64,
}

/// A single mutation
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace the whole document
    Set { path: DocPath, data: Value },
    /// Remove the document; removing a missing document is a no-op
    Delete { path: DocPath },
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Set { path, .. } | Self::Delete { path } => path,
        }
    }
}

/// State a document must be in for a commit to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Missing,
    Version(u64),
}

/// Writes applied all-or-nothing, guarded by preconditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub preconditions: Vec<(DocPath, Precondition)>,
    pub writes: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, path: DocPath, precondition: Precondition) -> &mut Self {
        self.preconditions.push((path, precondition));
        self
    }

    pub fn set(&mut self, path: DocPath, data: Value) -> &mut Self {
        self.writes.push(WriteOp::Set { path, data });
        self
    }

    pub fn delete(&mut self, path: DocPath) -> &mut Self {
        self.writes.push(WriteOp::Delete { path });
        self
    }

    /// Number of mutations (preconditions are not counted)
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document
    async fn get(&self, path: &DocPath) -> RepoResult<Option<VersionedDocument>>;

    /// Paths of the documents directly inside a collection
    async fn list(&self, collection: &CollectionPath) -> RepoResult<Vec<DocPath>>;

    /// Apply a batch atomically.
    ///
    /// Fails with `TransactionConflict` if any precondition does not hold and
    /// with `BatchTooLarge` if the batch exceeds [`Self::max_writes_per_commit`].
    async fn commit(&self, batch: WriteBatch) -> RepoResult<()>;

    /// Largest number of writes a single commit may carry
    fn max_writes_per_commit(&self) -> usize;
}
