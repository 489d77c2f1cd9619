//! Service context - dependency container for services
//!
//! Holds the document store, the clock and the engine settings.

use std::sync::Arc;

use chrono::Duration;
use market_common::AppConfig;
use market_core::{AlertDefaults, Clock, DocumentStore, SystemClock};

use super::error::{ServiceError, ServiceResult};
use super::retry::RetryPolicy;

/// Tunables derived from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Length of one reaction cycle
    pub cycle_length: Duration,
    pub retry: RetryPolicy,
    /// Upper bound on mutations per cleanup commit
    pub reset_batch_size: usize,
    pub alert_defaults: AlertDefaults,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cycle_length: Duration::days(i64::from(config.reactions.cycle_days)),
            retry: RetryPolicy::with_max_attempts(config.reactions.tx_max_attempts),
            reset_batch_size: config.reactions.reset_batch_size,
            alert_defaults: config.alerts.defaults(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// Get the document store
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Mutations allowed in one cleanup commit: the configured batch size,
    /// capped by what the store accepts
    pub fn commit_budget(&self) -> usize {
        self.settings
            .reset_batch_size
            .min(self.store.max_writes_per_commit())
            .max(1)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn DocumentStore")
            .field("clock", &"dyn Clock")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    clock: Option<Arc<dyn Clock>>,
    settings: Option<EngineSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn config(self, config: &AppConfig) -> Self {
        self.settings(EngineSettings::from_config(config))
    }

    /// Build the ServiceContext. The clock defaults to [`SystemClock`] and
    /// the settings to the configuration defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if no store was given
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store
                .ok_or_else(|| ServiceError::validation("store is required"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.settings.unwrap_or_default(),
        ))
    }
}
