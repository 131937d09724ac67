//! Per-session fetch memory.
//!
//! One [`SessionStore`] spans one interactive session. Successful fetch
//! outcomes are remembered per ticker; a later request for the same
//! ticker over the same range is served from memory without touching
//! the source. Changing the range, or explicitly invalidating the
//! ticker, forces a refetch. Failures are never stored, so a ticker
//! that failed once is retried in full on the next request.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::pipeline::{FetchPipeline, FetchRequest, FetchResult, FetchSuccess};
use crate::Ticker;

#[derive(Debug, Clone)]
struct CachedFetch {
    request: FetchRequest,
    outcome: FetchSuccess,
}

#[derive(Debug, Default)]
struct SessionInner {
    map: HashMap<Ticker, CachedFetch>,
}

impl SessionInner {
    fn lookup(&self, request: &FetchRequest) -> Option<FetchSuccess> {
        self.map
            .get(&request.ticker)
            .filter(|cached| cached.request.range == request.range)
            .map(|cached| cached.outcome.clone())
    }

    fn store(&mut self, request: FetchRequest, outcome: FetchSuccess) {
        let ticker = request.ticker.clone();
        self.map.insert(ticker, CachedFetch { request, outcome });
    }

    fn invalidate(&mut self, ticker: &Ticker) -> bool {
        self.map.remove(ticker).is_some()
    }
}

/// Thread-safe session-scoped store of fetch outcomes, one entry per
/// ticker. Cloning shares the underlying state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    session_id: Uuid,
    inner: Arc<tokio::sync::RwLock<SessionInner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            inner: Arc::new(tokio::sync::RwLock::new(SessionInner::default())),
        }
    }

    /// Identifier for this session, used in logs and exports.
    pub const fn id(&self) -> Uuid {
        self.session_id
    }

    /// Returns the remembered outcome for this exact request, if any.
    /// A stored entry for the same ticker over a different range does
    /// not match.
    pub async fn lookup(&self, request: &FetchRequest) -> Option<FetchSuccess> {
        let store = self.inner.read().await;
        store.lookup(request)
    }

    /// Remembers a successful outcome, replacing any previous entry for
    /// the ticker.
    pub async fn store(&self, request: FetchRequest, outcome: FetchSuccess) {
        let mut store = self.inner.write().await;
        store.store(request, outcome);
    }

    /// Drops the entry for `ticker`. Returns whether one was present.
    pub async fn invalidate(&self, ticker: &Ticker) -> bool {
        let mut store = self.inner.write().await;
        store.invalidate(ticker)
    }

    /// Drops every entry, keeping the session id.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Serves `request` from memory when possible, otherwise runs the
    /// pipeline and remembers the outcome. Failures pass through
    /// without being stored.
    pub async fn resolve(&self, pipeline: &FetchPipeline, request: &FetchRequest) -> FetchResult {
        if let Some(hit) = self.lookup(request).await {
            log::debug!(
                "session {} serving {} from memory",
                self.session_id,
                request.ticker
            );
            return Ok(hit);
        }

        let outcome = pipeline.fetch(request).await?;
        self.store(request.clone(), outcome.clone()).await;
        Ok(outcome)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
