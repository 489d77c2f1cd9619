//! Test helpers
//!
//! Service wiring over an in-memory store, a store wrapper that injects
//! commit failures, and an independent recount of a venue's reactions.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use serde_json::Value;

use market_common::AppConfig;
use market_core::{
    CategoryCounts, CollectionPath, DocPath, DocumentStore, DomainError, FixedClock,
    ReactionField, RepoResult, UserId, VenueId, VersionedDocument, WriteBatch,
};
use market_service::{
    CommentService, CycleService, EngineSettings, MarketService, ReactionService, RetryPolicy,
    SavedMarketService, ServiceContext,
};
use market_store::mappers::{user_reaction_from_document, venue_info_from_document};
use market_store::{paths, MemoryDocumentStore};

use crate::fixtures::friday_morning;

/// Cycle length used by every test context
pub fn test_cycle_length() -> Duration {
    Duration::days(7)
}

/// One-week cycles and the given retry budget
pub fn test_settings(max_attempts: u32) -> EngineSettings {
    EngineSettings {
        cycle_length: test_cycle_length(),
        retry: RetryPolicy::with_max_attempts(max_attempts),
        ..EngineSettings::default()
    }
}

/// Engine settings built from configuration key/value pairs; unset keys take defaults
pub fn settings_from_vars(vars: &[(&str, &str)]) -> Result<EngineSettings> {
    let config = AppConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    })
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(EngineSettings::from_config(&config))
}

/// Install a test subscriber once; later calls are ignored
pub fn init_test_tracing() {
    let _ = market_common::try_init_tracing();
}

/// Services wired to a store and a clock the test controls
pub struct TestContext<S = MemoryDocumentStore> {
    pub store: Arc<S>,
    pub clock: Arc<FixedClock>,
    pub ctx: ServiceContext,
}

impl TestContext {
    /// Fresh in-memory store, clock at Friday 2024-06-07 08:00 UTC
    pub fn new() -> Self {
        Self::with_store(MemoryDocumentStore::new())
    }

    /// In-memory store with settings loaded from configuration pairs
    pub fn from_vars(vars: &[(&str, &str)]) -> Result<Self> {
        let settings = settings_from_vars(vars)?;
        Ok(Self::with_store_and_settings(MemoryDocumentStore::new(), settings))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DocumentStore + 'static> TestContext<S> {
    pub fn with_store(store: S) -> Self {
        Self::with_store_and_settings(store, test_settings(5))
    }

    pub fn with_store_and_settings(store: S, settings: EngineSettings) -> Self {
        init_test_tracing();
        let store = Arc::new(store);
        let clock = Arc::new(FixedClock::new(friday_morning()));
        let ctx = ServiceContext::new(store.clone(), clock.clone(), settings);
        Self { store, clock, ctx }
    }

    pub fn markets(&self) -> MarketService<'_> {
        MarketService::new(&self.ctx)
    }

    pub fn reactions(&self) -> ReactionService<'_> {
        ReactionService::new(&self.ctx)
    }

    pub fn cycles(&self) -> CycleService<'_> {
        CycleService::new(&self.ctx)
    }

    pub fn saved(&self) -> SavedMarketService<'_> {
        SavedMarketService::new(&self.ctx)
    }

    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(&self.ctx)
    }

    /// Write a raw document, bypassing the services
    pub async fn seed(&self, path: DocPath, data: Value) {
        let mut batch = WriteBatch::new();
        batch.set(path, data);
        self.store.commit(batch).await.unwrap();
    }

    /// Read a raw document
    pub async fn raw(&self, path: &DocPath) -> Option<Value> {
        self.store.get(path).await.unwrap().map(|d| d.data)
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &CollectionPath) -> usize {
        self.store.list(collection).await.unwrap().len()
    }
}

/// Recount a venue's current counters from its user records.
///
/// Only selections made in the venue's current generation count.
pub async fn recount_reactions(
    store: &dyn DocumentStore,
    venue_id: &VenueId,
) -> BTreeMap<ReactionField, CategoryCounts> {
    let info_path = paths::market_info(venue_id);
    let info_doc = store.get(&info_path).await.unwrap();
    let generation = venue_info_from_document(&info_path, info_doc.as_ref().map(|d| &d.data))
        .unwrap()
        .generation();

    let mut counts: BTreeMap<ReactionField, CategoryCounts> = ReactionField::ALL
        .into_iter()
        .map(|f| (f, CategoryCounts::zeroed(f)))
        .collect();

    for path in store
        .list(&paths::venue_user_reactions(venue_id))
        .await
        .unwrap()
    {
        let Some(doc) = store.get(&path).await.unwrap() else {
            continue;
        };
        let user_id = UserId::new(path.id()).unwrap();
        let reaction = user_reaction_from_document(venue_id, &user_id, &path, &doc.data).unwrap();
        for field in ReactionField::ALL {
            if let Some(category) = reaction.live_selection(field, generation) {
                counts.entry(field).or_default().increment(category);
            }
        }
    }
    counts
}

/// Assert that the stored counters equal a recount of the user records
pub async fn assert_counters_consistent(store: &dyn DocumentStore, venue_id: &VenueId) {
    let info_path = paths::market_info(venue_id);
    let info_doc = store.get(&info_path).await.unwrap();
    let info =
        venue_info_from_document(&info_path, info_doc.as_ref().map(|d| &d.data)).unwrap();
    let recount = recount_reactions(store, venue_id).await;

    for field in ReactionField::ALL {
        let stored = info.counters(field).current;
        let expected = &recount[&field];
        for &category in field.categories() {
            assert_eq!(
                stored.get(category),
                expected.get(category),
                "{field}.{category} does not match the user records"
            );
        }
    }
}

/// What the next commit should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Pass,
    /// Fail with a transaction conflict; retried by the services
    Conflict,
    /// Fail with an error the services do not retry
    Fail,
}

/// Wraps a [`MemoryDocumentStore`] and fails commits according to a plan.
///
/// Each commit takes the next planned [`Fault`]; once the plan is empty
/// commits pass through.
pub struct FaultInjectingStore {
    inner: MemoryDocumentStore,
    plan: Mutex<VecDeque<Fault>>,
    commits: AtomicUsize,
    applied: AtomicUsize,
}

impl FaultInjectingStore {
    pub fn new(inner: MemoryDocumentStore) -> Self {
        Self {
            inner,
            plan: Mutex::new(VecDeque::new()),
            commits: AtomicUsize::new(0),
            applied: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, faults: impl IntoIterator<Item = Fault>) {
        self.plan.lock().extend(faults);
    }

    /// The next `n` commits conflict
    pub fn conflict_next(&self, n: usize) {
        self.push(std::iter::repeat(Fault::Conflict).take(n));
    }

    /// Let `passing` commits through, then fail the one after
    pub fn fail_after(&self, passing: usize) {
        self.push(std::iter::repeat(Fault::Pass).take(passing));
        self.push([Fault::Fail]);
    }

    /// Commits attempted, failed ones included
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Commits that reached the inner store and succeeded
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FaultInjectingStore {
    async fn get(&self, path: &DocPath) -> RepoResult<Option<VersionedDocument>> {
        self.inner.get(path).await
    }

    async fn list(&self, collection: &CollectionPath) -> RepoResult<Vec<DocPath>> {
        self.inner.list(collection).await
    }

    async fn commit(&self, batch: WriteBatch) -> RepoResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let fault = self.plan.lock().pop_front().unwrap_or(Fault::Pass);
        match fault {
            Fault::Pass => {
                self.inner.commit(batch).await?;
                self.applied.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Fault::Conflict => Err(DomainError::TransactionConflict),
            Fault::Fail => Err(DomainError::InternalError("injected failure".to_string())),
        }
    }

    fn max_writes_per_commit(&self) -> usize {
        self.inner.max_writes_per_commit()
    }
}
