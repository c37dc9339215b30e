// Test support utilities for both unit and integration tests

use crate::sandbox::{AccessPrompt, BookmarkError, Bookmarks, ResolvedBookmark};
use crate::steam::{ApplicationInfo, MetadataSource, SteamError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

/// In-memory bookmarks
///
/// Tokens are the UTF-8 path. Paths marked stale resolve with `is_stale`
/// until a fresh token is created for them. Counts start/stop calls so tests
/// can check every scope was closed.
#[derive(Default)]
pub struct MemoryBookmarks {
    stale: Mutex<HashSet<PathBuf>>,
    refused: Mutex<HashSet<PathBuf>>,
    created: AtomicUsize,
    started: AtomicUsize,
    stopped: AtomicUsize,
}

impl MemoryBookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_stale(&self, path: &Path) {
        self.stale.lock().unwrap().insert(path.to_path_buf());
    }

    /// Make `start_accessing` fail for `path`
    pub fn refuse(&self, path: &Path) {
        self.refused.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Bookmarks for MemoryBookmarks {
    fn create(&self, path: &Path) -> Result<Vec<u8>, BookmarkError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.stale.lock().unwrap().remove(path);
        Ok(path.to_string_lossy().into_owned().into_bytes())
    }

    fn resolve(&self, token: &[u8]) -> Result<ResolvedBookmark, BookmarkError> {
        let path = PathBuf::from(String::from_utf8_lossy(token).into_owned());
        if !path.exists() {
            return Err(BookmarkError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is gone", path.display()),
            )));
        }
        let is_stale = self.stale.lock().unwrap().contains(&path);
        Ok(ResolvedBookmark { path, is_stale })
    }

    fn start_accessing(&self, path: &Path) -> bool {
        if self.refused.lock().unwrap().contains(path) {
            return false;
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn stop_accessing(&self, _path: &Path) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Prompt that answers with a fixed selection and counts how often it was shown
pub struct ScriptedPrompt {
    answer: Option<PathBuf>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    /// Always select `path`
    pub fn selecting(path: impl Into<PathBuf>) -> Self {
        ScriptedPrompt {
            answer: Some(path.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always cancel
    pub fn cancelling() -> Self {
        ScriptedPrompt {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AccessPrompt for ScriptedPrompt {
    fn pick_directory(&self, _directory: &Path) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Metadata source serving canned store details
///
/// Records when each request was made (on the tokio clock) so tests can check
/// request spacing with paused time.
#[derive(Default)]
pub struct StaticMetadata {
    details: HashMap<u64, ApplicationInfo>,
    failing: HashSet<u64>,
    requests: Mutex<Vec<(u64, Instant)>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_details(mut self, appid: u64, info: ApplicationInfo) -> Self {
        self.details.insert(appid, info);
        self
    }

    /// Requests for `appid` fail with a rate limit error
    pub fn failing(mut self, appid: u64) -> Self {
        self.failing.insert(appid);
        self
    }

    pub fn requests(&self) -> Vec<(u64, Instant)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MetadataSource for StaticMetadata {
    async fn details(&self, appid: u64) -> Result<Option<ApplicationInfo>, SteamError> {
        self.requests.lock().unwrap().push((appid, Instant::now()));
        if self.failing.contains(&appid) {
            return Err(SteamError::RateLimit);
        }
        Ok(self.details.get(&appid).cloned())
    }
}
