use std::sync::Arc;

use linkvault_blob::BlobStore;
use linkvault_core::{
    Argon2Hasher, Clock, CredentialHasher, RandomTokenGenerator, SystemClock, TokenGenerator,
};
use linkvault_store::DropStore;

use crate::engine::{DropEngine, EngineConfig};
use crate::error::EngineError;
use crate::metrics::EngineMetrics;

/// Fluent builder for constructing a [`DropEngine`].
///
/// A [`DropStore`] and a [`BlobStore`] must be supplied. The hasher, token
/// generator and clock default to argon2id, the OS random source and the
/// system clock.
pub struct DropEngineBuilder {
    store: Option<Arc<dyn DropStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    hasher: Option<Arc<dyn CredentialHasher>>,
    tokens: Option<Arc<dyn TokenGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Arc<EngineMetrics>>,
    config: EngineConfig,
}

impl DropEngineBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            blobs: None,
            hasher: None,
            tokens: None,
            clock: None,
            metrics: None,
            config: EngineConfig::default(),
        }
    }

    /// Set the drop store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn DropStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the blob store implementation.
    #[must_use]
    pub fn blobs(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    #[must_use]
    pub fn hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    #[must_use]
    pub fn tokens(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the clock used for every expiry decision.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing metrics instance instead of creating a fresh one.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn default_ttl_minutes(mut self, minutes: u32) -> Self {
        self.config.default_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn max_ttl_minutes(mut self, minutes: u32) -> Self {
        self.config.max_ttl_minutes = minutes;
        self
    }

    /// Set how many insert attempts are made before a collision is fatal.
    /// Values below one are treated as one.
    #[must_use]
    pub fn max_insert_attempts(mut self, attempts: u32) -> Self {
        self.config.max_insert_attempts = attempts.max(1);
        self
    }

    /// Consume the builder and produce a [`DropEngine`].
    ///
    /// Returns an error if a required component is missing or the TTL
    /// settings contradict each other.
    pub fn build(self) -> Result<DropEngine, EngineError> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Configuration("drop store is required".into()))?;

        let blobs = self
            .blobs
            .ok_or_else(|| EngineError::Configuration("blob store is required".into()))?;

        if self.config.default_ttl_minutes == 0
            || self.config.default_ttl_minutes > self.config.max_ttl_minutes
        {
            return Err(EngineError::Configuration(format!(
                "default ttl {} must be between 1 and the maximum {}",
                self.config.default_ttl_minutes, self.config.max_ttl_minutes
            )));
        }

        Ok(DropEngine {
            store,
            blobs,
            hasher: self.hasher.unwrap_or_else(|| Arc::new(Argon2Hasher::new())),
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(RandomTokenGenerator::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            metrics: self.metrics.unwrap_or_default(),
            config: self.config,
        })
    }
}

impl Default for DropEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
