//! Optimistic read-modify-write transaction over a [`DocumentStore`]

use serde_json::Value;
use std::collections::BTreeMap;

use super::store::{DocumentStore, Precondition, RepoResult, WriteBatch, WriteOp};
use crate::error::DomainError;
use crate::value_objects::DocPath;

/// Records the version of every document it reads and buffers writes.
/// On commit, the writes apply only if none of the read documents changed.
pub struct Transaction<'a> {
    store: &'a dyn DocumentStore,
    reads: BTreeMap<DocPath, Option<u64>>,
    writes: Vec<WriteOp>,
}

impl<'a> Transaction<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            reads: BTreeMap::new(),
            writes: Vec::new(),
        }
    }

    /// Read a document, remembering its version.
    ///
    /// Reading the same path again and seeing a different version is a conflict.
    pub async fn get(&mut self, path: &DocPath) -> RepoResult<Option<Value>> {
        let doc = self.store.get(path).await?;
        let version = doc.as_ref().map(|d| d.version);

        if let Some(seen) = self.reads.get(path) {
            if *seen != version {
                return Err(DomainError::TransactionConflict);
            }
        }
        self.reads.insert(path.clone(), version);

        Ok(doc.map(|d| d.data))
    }

    pub fn set(&mut self, path: DocPath, data: Value) {
        self.writes.push(WriteOp::Set { path, data });
    }

    pub fn delete(&mut self, path: DocPath) {
        self.writes.push(WriteOp::Delete { path });
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Commit buffered writes. Returns `false` when there was nothing to write.
    pub async fn commit(self) -> RepoResult<bool> {
        if self.writes.is_empty() {
            return Ok(false);
        }

        let preconditions = self
            .reads
            .into_iter()
            .map(|(path, version)| {
                let pre = match version {
                    Some(v) => Precondition::Version(v),
                    None => Precondition::Missing,
                };
                (path, pre)
            })
            .collect();

        self.store
            .commit(WriteBatch {
                preconditions,
                writes: self.writes,
            })
            .await?;
        Ok(true)
    }
}
