//! Thread-safe wrapper for driving a coordinator from several threads.
//!
//! Renderer animations usually finish on a different thread than the one
//! that noticed the viewport change. `SyncCoordinator` wraps a
//! [`RegroupCoordinator`] in `Arc<Mutex<_>>` so both sides can reach it.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! quadcluster = { version = "0.1", features = ["sync"] }
//! ```
//!
//! The lock is held while renderer callbacks run, so callbacks must not call
//! back into the same `SyncCoordinator`; forward the tokens (for example
//! over a channel) and complete them from outside the callback.

use crate::config::GroupingConfig;
use crate::coordinator::{
    ClusterRenderer, CompletionToken, Generation, ItemProvider, RegionSource, RegroupCoordinator,
    RegroupOutcome, RegroupState,
};
use crate::error::Result;
use parking_lot::Mutex;
use quadcluster_types::region::Region;
use std::sync::Arc;

/// Cloneable, thread-safe handle to a [`RegroupCoordinator`].
pub struct SyncCoordinator<P, S, R> {
    inner: Arc<Mutex<RegroupCoordinator<P, S, R>>>,
}

impl<P, S, R> Clone for SyncCoordinator<P, S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, S, R> SyncCoordinator<P, S, R>
where
    P: ItemProvider,
    S: RegionSource,
    R: ClusterRenderer,
{
    pub fn new(coordinator: RegroupCoordinator<P, S, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(coordinator)),
        }
    }

    pub fn request_regroup(&self, visible: &Region) -> RegroupOutcome {
        self.inner.lock().request_regroup(visible)
    }

    pub fn complete(&self, token: CompletionToken) -> Result<()> {
        self.inner.lock().complete(token)
    }

    pub fn set_config(&self, config: GroupingConfig) -> Result<()> {
        self.inner.lock().set_config(config)
    }

    pub fn set_pinned_item(&self, key: Option<String>) {
        self.inner.lock().set_pinned_item(key)
    }

    pub fn acknowledge_pinned_surfaced(&self, identity: &str) -> bool {
        self.inner.lock().acknowledge_pinned_surfaced(identity)
    }

    pub fn invalidate(&self) {
        self.inner.lock().invalidate()
    }

    pub fn state(&self) -> RegroupState {
        self.inner.lock().state()
    }

    pub fn generation(&self) -> Arc<Generation> {
        self.inner.lock().generation()
    }

    /// Run `f` with exclusive access to the wrapped coordinator.
    pub fn with_coordinator<T>(&self, f: impl FnOnce(&mut RegroupCoordinator<P, S, R>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
