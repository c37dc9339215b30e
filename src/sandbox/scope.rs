use crate::sandbox::Bookmarks;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// An open access bracket on a granted location.
///
/// Access stops when the guard drops, whichever way the holder exits.
pub struct AccessScope {
    bookmarks: Arc<dyn Bookmarks>,
    path: PathBuf,
}

impl AccessScope {
    /// Start accessing `path`. `None` when the platform refuses.
    pub fn start(bookmarks: Arc<dyn Bookmarks>, path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        if !bookmarks.start_accessing(&path) {
            debug!("AccessScope: Refused for {}", path.display());
            return None;
        }
        Some(AccessScope { bookmarks, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AccessScope {
    fn drop(&mut self) {
        self.bookmarks.stop_accessing(&self.path);
    }
}

impl std::fmt::Debug for AccessScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessScope")
            .field("path", &self.path)
            .finish()
    }
}
