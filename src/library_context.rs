use crate::library::{LibraryError, LibraryManager, LibraryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the single catalog owner
///
/// Cloning is cheap (clones Arc). All writers go through [`SharedLibrary::write`],
/// which serializes catalog mutation and persistence.
#[derive(Clone)]
pub struct SharedLibrary {
    inner: Arc<RwLock<LibraryManager>>,
}

impl PartialEq for SharedLibrary {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SharedLibrary {
    pub fn new(library_manager: LibraryManager) -> Self {
        SharedLibrary {
            inner: Arc::new(RwLock::new(library_manager)),
        }
    }

    /// Load the catalog from `store` and wrap it
    pub fn open(store: LibraryStore) -> Result<Self, LibraryError> {
        Ok(Self::new(LibraryManager::open(store)?))
    }

    /// Get a read lock on the library manager
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, LibraryManager> {
        self.inner.read().await
    }

    /// Get a write lock on the library manager
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, LibraryManager> {
        self.inner.write().await
    }

    /// Read lock for synchronous callers outside the runtime
    pub fn blocking_read(&self) -> tokio::sync::RwLockReadGuard<'_, LibraryManager> {
        self.inner.blocking_read()
    }

    /// Write lock for synchronous callers outside the runtime
    pub fn blocking_write(&self) -> tokio::sync::RwLockWriteGuard<'_, LibraryManager> {
        self.inner.blocking_write()
    }
}
