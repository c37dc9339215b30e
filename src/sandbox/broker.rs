use crate::sandbox::{AccessPrompt, AccessScope, Bookmarks};
use crate::settings::{SettingsExt, SettingsStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Settings key holding the persisted grants
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// A usable grant for a requested location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// The logical path the caller asked for
    pub requested: PathBuf,
    /// Where the grant currently points
    pub path: PathBuf,
    pub token: Vec<u8>,
}

/// Obtains scoped access to externally owned directories and remembers the
/// user's consent across launches.
///
/// Every failure degrades to `None`; nothing propagates past this type.
/// Prompting is synchronous and must happen on the main thread.
pub struct SandboxAccessBroker {
    bookmarks: Arc<dyn Bookmarks>,
    prompt: Arc<dyn AccessPrompt>,
    settings: Arc<dyn SettingsStore>,
    grants: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl SandboxAccessBroker {
    pub fn new(
        bookmarks: Arc<dyn Bookmarks>,
        prompt: Arc<dyn AccessPrompt>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let grants = load_grants(settings.as_ref());
        debug!("SandboxAccessBroker: Loaded {} grants", grants.len());
        SandboxAccessBroker {
            bookmarks,
            prompt,
            settings,
            grants: Mutex::new(grants),
        }
    }

    pub fn bookmarks(&self) -> Arc<dyn Bookmarks> {
        self.bookmarks.clone()
    }

    /// Get a grant for `path`, prompting only when no usable one is stored
    pub fn access(&self, path: &Path) -> Option<AccessGrant> {
        if let Some(grant) = self.restore(path) {
            return Some(grant);
        }
        self.request(path)
    }

    /// Open an access scope on a grant
    pub fn open(&self, grant: &AccessGrant) -> Option<AccessScope> {
        AccessScope::start(self.bookmarks.clone(), grant.path.clone())
    }

    /// Run `f` with the resolved path while access is held
    pub fn with_access<T>(&self, path: &Path, f: impl FnOnce(&Path) -> T) -> Option<T> {
        let grant = self.access(path)?;
        let scope = self.open(&grant)?;
        Some(f(scope.path()))
    }

    /// Drop the stored grant for `path`
    pub fn forget(&self, path: &Path) {
        let mut grants = self.lock();
        if grants.remove(path).is_some() {
            self.persist(&grants);
        }
    }

    /// Whether a grant is stored for `path`, usable or not
    pub fn has_grant(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn restore(&self, path: &Path) -> Option<AccessGrant> {
        let token = self.lock().get(path).cloned()?;

        let resolved = match self.bookmarks.resolve(&token) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(
                    "SandboxAccessBroker: Stored grant for {} no longer resolves: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        if !resolved.is_stale {
            return Some(AccessGrant {
                requested: path.to_path_buf(),
                path: resolved.path,
                token,
            });
        }

        info!(
            "SandboxAccessBroker: Refreshing stale grant for {}",
            path.display()
        );
        match self.bookmarks.create(&resolved.path) {
            Ok(fresh) => {
                self.store(path, fresh.clone());
                Some(AccessGrant {
                    requested: path.to_path_buf(),
                    path: resolved.path,
                    token: fresh,
                })
            }
            Err(e) => {
                warn!(
                    "SandboxAccessBroker: Could not refresh grant for {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn request(&self, path: &Path) -> Option<AccessGrant> {
        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(
                    "SandboxAccessBroker: Cannot resolve {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        let Some(selected) = self.prompt.pick_directory(&canonical) else {
            info!("SandboxAccessBroker: Access to {} declined", path.display());
            return None;
        };

        let selected = selected.canonicalize().ok()?;
        if selected != canonical {
            warn!(
                "SandboxAccessBroker: Selected {} but {} was requested",
                selected.display(),
                canonical.display()
            );
            return None;
        }

        let token = match self.bookmarks.create(&selected) {
            Ok(token) => token,
            Err(e) => {
                warn!(
                    "SandboxAccessBroker: Could not create grant for {}: {}",
                    selected.display(),
                    e
                );
                return None;
            }
        };

        self.store(path, token.clone());
        info!("SandboxAccessBroker: Access granted to {}", path.display());
        Some(AccessGrant {
            requested: path.to_path_buf(),
            path: selected,
            token,
        })
    }

    fn store(&self, path: &Path, token: Vec<u8>) {
        let mut grants = self.lock();
        grants.insert(path.to_path_buf(), token);
        self.persist(&grants);
    }

    fn persist(&self, grants: &HashMap<PathBuf, Vec<u8>>) {
        let encoded = match bincode::serialize(grants) {
            Ok(bytes) => hex::encode(bytes),
            Err(e) => {
                warn!("SandboxAccessBroker: Could not encode grants: {}", e);
                return;
            }
        };
        if let Err(e) = self.settings.set(BOOKMARKS_KEY, &encoded) {
            warn!("SandboxAccessBroker: Could not save grants: {}", e);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.grants.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn load_grants(settings: &dyn SettingsStore) -> HashMap<PathBuf, Vec<u8>> {
    let Some(encoded) = settings.get::<String>(BOOKMARKS_KEY) else {
        return HashMap::new();
    };

    let bytes = match hex::decode(&encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("SandboxAccessBroker: Ignoring corrupt grants: {}", e);
            return HashMap::new();
        }
    };

    bincode::deserialize(&bytes).unwrap_or_else(|e| {
        warn!("SandboxAccessBroker: Ignoring undecodable grants: {}", e);
        HashMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::PathBookmarks;
    use crate::settings::MemorySettings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Pick {
        answer: Option<PathBuf>,
        calls: AtomicUsize,
    }

    impl AccessPrompt for Pick {
        fn pick_directory(&self, _directory: &Path) -> Option<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn broker(answer: Option<PathBuf>, settings: Arc<MemorySettings>) -> (SandboxAccessBroker, Arc<Pick>) {
        let prompt = Arc::new(Pick {
            answer,
            calls: AtomicUsize::new(0),
        });
        let broker = SandboxAccessBroker::new(Arc::new(PathBookmarks), prompt.clone(), settings);
        (broker, prompt)
    }

    #[test]
    fn test_grant_is_remembered() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Arc::new(MemorySettings::new());

        let (first, prompt) = broker(Some(temp_dir.path().to_path_buf()), settings.clone());
        let grant = first.access(temp_dir.path()).unwrap();
        assert_eq!(grant.requested, temp_dir.path());
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert!(settings.get_value(BOOKMARKS_KEY).is_some());

        let (second, prompt) = broker(None, settings);
        assert!(second.access(temp_dir.path()).is_some());
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_yields_none() {
        let temp_dir = TempDir::new().unwrap();
        let (broker, _) = broker(None, Arc::new(MemorySettings::new()));
        assert!(broker.access(temp_dir.path()).is_none());
        assert!(!broker.has_grant(temp_dir.path()));
    }

    #[test]
    fn test_with_access_runs_on_resolved_path() {
        let temp_dir = TempDir::new().unwrap();
        let (broker, _) = broker(
            Some(temp_dir.path().to_path_buf()),
            Arc::new(MemorySettings::new()),
        );
        let seen = broker.with_access(temp_dir.path(), |path| path.to_path_buf());
        assert_eq!(seen, Some(temp_dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_forget_removes_grant() {
        let temp_dir = TempDir::new().unwrap();
        let (broker, _) = broker(
            Some(temp_dir.path().to_path_buf()),
            Arc::new(MemorySettings::new()),
        );
        broker.access(temp_dir.path()).unwrap();
        assert!(broker.has_grant(temp_dir.path()));
        broker.forget(temp_dir.path());
        assert!(!broker.has_grant(temp_dir.path()));
    }
}
