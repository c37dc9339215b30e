use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// What a token resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBookmark {
    pub path: PathBuf,
    /// The token still resolves but should be recreated
    pub is_stale: bool,
}

/// Platform facility for durable access tokens to user-chosen locations
pub trait Bookmarks: Send + Sync {
    /// Create a token for a location the user has granted
    fn create(&self, path: &Path) -> Result<Vec<u8>, BookmarkError>;

    /// Resolve a token back to a real path
    fn resolve(&self, token: &[u8]) -> Result<ResolvedBookmark, BookmarkError>;

    /// Begin using a granted location. Returns false when the platform refuses.
    fn start_accessing(&self, path: &Path) -> bool;

    fn stop_accessing(&self, path: &Path);
}

/// Token layout written by [`PathBookmarks`]
#[derive(Serialize, Deserialize)]
struct PathToken {
    path: PathBuf,
    identity: Option<(u64, u64)>,
}

/// Bookmarks for platforms without a sandbox.
///
/// A token records the canonical path and its device/inode pair. It goes stale
/// when the path canonicalizes elsewhere or now names a different directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathBookmarks;

impl PathBookmarks {
    pub fn new() -> Self {
        PathBookmarks
    }
}

#[cfg(unix)]
fn identity(path: &Path) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path)
        .ok()
        .map(|metadata| (metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn identity(_path: &Path) -> Option<(u64, u64)> {
    None
}

impl Bookmarks for PathBookmarks {
    fn create(&self, path: &Path) -> Result<Vec<u8>, BookmarkError> {
        let path = path.canonicalize()?;
        let token = PathToken {
            identity: identity(&path),
            path,
        };
        Ok(bincode::serialize(&token)?)
    }

    fn resolve(&self, token: &[u8]) -> Result<ResolvedBookmark, BookmarkError> {
        let token: PathToken = bincode::deserialize(token)?;
        let path = token.path.canonicalize()?;
        let is_stale = path != token.path || identity(&path) != token.identity;
        Ok(ResolvedBookmark { path, is_stale })
    }

    fn start_accessing(&self, path: &Path) -> bool {
        let opened = if path.is_dir() {
            std::fs::read_dir(path).map(drop)
        } else {
            std::fs::File::open(path).map(drop)
        };
        match opened {
            Ok(()) => true,
            Err(e) => {
                debug!("PathBookmarks: No access to {}: {}", path.display(), e);
                false
            }
        }
    }

    fn stop_accessing(&self, _path: &Path) {}
}
