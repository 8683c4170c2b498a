//! Session-lifetime cache of the catalog.
//!
//! [`ContentStore`] owns the one catalog every view reads. It is created
//! once and passed by reference (usually inside an `Arc`) to whoever
//! needs it; there is no global instance.
//!
//! # States
//!
//! ```text
//!          load()                ok
//!   Idle ─────────▶ Loading ─────────▶ Ready
//!     ▲                │
//!     │ reset()        │ err
//!     │                ▼
//!     └──────────── Failed ──retry()──▶ Loading
//! ```
//!
//! `load()` is a no-op while a fetch is in flight or once content is
//! present, so at most one fetch runs at a time. There is no automatic
//! retry: recovering from `Failed` takes an explicit `retry()`.
//!
//! Every fetch is tagged with a generation number. `reset()` bumps it, so
//! a response that arrives after a reset is discarded instead of
//! overwriting newer state.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ContentError;
use crate::models::Catalog;
use crate::validate::{validate, IntegrityMode};

/// Where the catalog comes from.
///
/// Implementations perform one attempt per call and never retry.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self) -> Result<Catalog, ContentError>;
}

/// Coarse view of [`ContentState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot of the store.
#[derive(Debug, Clone, Default)]
pub struct ContentState {
    content: Option<Arc<Catalog>>,
    loading: bool,
    error: Option<ContentError>,
}

impl ContentState {
    pub fn status(&self) -> LoadStatus {
        if self.loading {
            LoadStatus::Loading
        } else if self.error.is_some() {
            LoadStatus::Failed
        } else if self.content.is_some() {
            LoadStatus::Ready
        } else {
            LoadStatus::Idle
        }
    }

    /// Content present, not loading, no error.
    pub fn is_ready(&self) -> bool {
        self.content.is_some() && !self.loading && self.error.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn content(&self) -> Option<&Arc<Catalog>> {
        self.content.as_ref()
    }

    pub fn error(&self) -> Option<&ContentError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ContentError::user_message)
    }
}

struct Inner {
    state: ContentState,
    generation: u64,
}

pub struct ContentStore {
    source: Arc<dyn ContentSource>,
    integrity: IntegrityMode,
    inner: Mutex<Inner>,
}

/// Clears the loading flag if a load future is dropped before it finishes.
struct InFlight<'a> {
    store: &'a ContentStore,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.store.lock();
        if inner.generation == self.generation && inner.state.loading {
            tracing::debug!(generation = self.generation, "catalog load abandoned");
            inner.state.loading = false;
        }
    }
}

impl ContentStore {
    pub fn new(source: Arc<dyn ContentSource>, integrity: IntegrityMode) -> Self {
        Self {
            source,
            integrity,
            inner: Mutex::new(Inner {
                state: ContentState::default(),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is replaced wholesale, so a poisoned lock still holds a
        // consistent value.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ContentState {
        self.lock().state.clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().state.status()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().state.is_ready()
    }

    pub fn content(&self) -> Option<Arc<Catalog>> {
        self.lock().state.content.clone()
    }

    /// Fetch the catalog unless one is present or already being fetched.
    pub async fn load(&self) {
        let generation = {
            let mut inner = self.lock();
            if inner.state.loading || inner.state.content.is_some() {
                return;
            }
            inner.generation += 1;
            inner.state.loading = true;
            inner.state.error = None;
            inner.generation
        };

        let mut in_flight = InFlight {
            store: self,
            generation,
            armed: true,
        };

        tracing::info!(generation, "loading catalog");
        let result = match self.source.fetch().await {
            Ok(catalog) => validate(&catalog, self.integrity).map(|()| catalog),
            Err(e) => Err(e),
        };

        in_flight.armed = false;
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::info!(
                generation,
                current = inner.generation,
                "discarding stale catalog response"
            );
            return;
        }

        inner.state = match result {
            Ok(catalog) => {
                tracing::info!(
                    generation,
                    categories = catalog.categories.len(),
                    places = catalog.places.len(),
                    "catalog loaded"
                );
                ContentState {
                    content: Some(Arc::new(catalog)),
                    loading: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "catalog load failed");
                ContentState {
                    content: None,
                    loading: false,
                    error: Some(e),
                }
            }
        };
    }

    /// Same as [`load`](Self::load); named for the manual recovery path.
    pub async fn retry(&self) {
        self.load().await;
    }

    /// Drop all content and error state. An in-flight fetch becomes stale.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ContentState::default();
    }

    /// [`reset`](Self::reset) followed by [`load`](Self::load).
    pub async fn reload(&self) {
        self.reset();
        self.load().await;
    }
}
