//! Load-once coordination
//!
//! The snapshot is loaded at most once per process. Callers arriving while a
//! load is in flight wait on it instead of starting their own, and share its
//! outcome, including a failure.

use crate::error::LoadError;
use gamerec_core::{ArtifactSnapshot, ArtifactSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{error, info};

/// Outcome shared by every caller that waited on one load attempt
pub type SharedResult<T> = std::result::Result<T, Arc<LoadError>>;

/// Process-wide holder of the immutable artifact snapshot
#[derive(Debug, Default)]
pub struct SnapshotCell {
    cell: OnceCell<Arc<ArtifactSnapshot>>,
    /// Held for the duration of a load attempt
    attempt: Mutex<Option<Arc<LoadError>>>,
    /// Number of finished failed attempts
    failures: AtomicU64,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot, if a load has completed
    pub fn get(&self) -> Option<Arc<ArtifactSnapshot>> {
        self.cell.get().cloned()
    }

    /// Return the loaded snapshot, running `make_source` and the blocking load
    /// on the blocking pool if no load has completed yet.
    ///
    /// Callers that queued behind a failing attempt receive that attempt's
    /// error. The cell stays empty, so a caller arriving afterwards starts a
    /// fresh attempt.
    pub async fn get_or_load<S, F>(&self, make_source: F) -> SharedResult<Arc<ArtifactSnapshot>>
    where
        S: ArtifactSource<Error = LoadError> + 'static,
        F: FnOnce() -> crate::Result<S> + Send + 'static,
    {
        if let Some(snapshot) = self.cell.get() {
            return Ok(snapshot.clone());
        }

        let seen_failures = self.failures.load(Ordering::Acquire);
        let mut last_error = self.attempt.lock().await;
        if let Some(snapshot) = self.cell.get() {
            return Ok(snapshot.clone());
        }
        if self.failures.load(Ordering::Acquire) != seen_failures {
            if let Some(e) = last_error.as_ref() {
                return Err(e.clone());
            }
        }

        info!("loading artifact snapshot");
        let loaded = tokio::task::spawn_blocking(move || {
            let source = make_source()?;
            ArtifactSnapshot::load(&source)
        })
        .await
        .map_err(|e| LoadError::Join(e.to_string()))
        .and_then(|loaded| loaded);

        match loaded {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                // Only the attempt holder sets the cell
                let _ = self.cell.set(snapshot.clone());
                *last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                error!(error = %e, "artifact snapshot load failed");
                let e = Arc::new(e);
                *last_error = Some(e.clone());
                self.failures.fetch_add(1, Ordering::Release);
                Err(e)
            }
        }
    }
}
