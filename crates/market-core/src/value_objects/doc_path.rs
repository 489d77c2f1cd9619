//! Hierarchical document-store paths
//!
//! A path alternates collection and document segments:
//! `markets` is a collection, `markets/abc` a document,
//! `markets/abc/details` a sub-collection, and so on.

use std::fmt;

/// Path to a document (even number of segments)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

/// Path to a collection (odd number of segments)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

impl CollectionPath {
    /// Top-level collection
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Document inside this collection
    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        let mut segments = self.segments.clone();
        segments.push(id.into());
        DocPath { segments }
    }

    /// Collection name (last segment)
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Document owning this collection, `None` for root collections
    pub fn parent(&self) -> Option<DocPath> {
        if self.segments.len() < 3 {
            return None;
        }
        Some(DocPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl DocPath {
    /// Parse a slash-separated document path
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path.split('/').map(str::to_owned).collect();
        if segments.len() % 2 != 0 || !segments.iter().all(|s| valid_segment(s)) {
            return None;
        }
        Some(Self { segments })
    }

    /// Sub-collection under this document
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        CollectionPath { segments }
    }

    /// Document id (last segment)
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Collection this document lives in
    pub fn parent_collection(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len().saturating_sub(1)].to_vec(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
