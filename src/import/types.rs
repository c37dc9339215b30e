use crate::library::LibraryError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error("Failed to scan Steam directory: {0}")]
    Scan(#[from] std::io::Error),
    #[error("Import cancelled")]
    Cancelled,
}

/// Outcome of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Manifest files looked at
    pub scanned: usize,
    /// New games added to the catalog
    pub imported: usize,
    /// Apps already in the catalog or seen earlier in the run
    pub duplicates: usize,
    /// Unreadable manifests or manifests without a numeric appid
    pub invalid: usize,
    /// Games added without store metadata
    pub enrichment_failures: usize,
}

/// Progress updates during an import
#[derive(Debug, Clone, PartialEq)]
pub enum ImportProgress {
    Started { manifests: usize },
    GameImported { id: Uuid, appid: u64, name: String },
    Skipped { appid: Option<u64>, reason: String },
    Complete(ImportReport),
}

/// Shared flag a caller sets to stop a running import
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<(), ImportError> {
        if self.is_cancelled() {
            Err(ImportError::Cancelled)
        } else {
            Ok(())
        }
    }
}
