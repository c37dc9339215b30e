// # Steam importer
//
// Two phases:
// - `prepare` runs on the main thread and obtains access to the Steam folder,
//   prompting the user when no stored grant works
// - `run` does the scanning, enrichment and merge on the runtime
//
// The access scope opened by `prepare` travels inside `ImportSource` and is
// released when the run ends.

use crate::import::artwork::resolve_local_artwork;
use crate::import::schedule::ImportSchedule;
use crate::import::steam_parser::{apply_details, game_from_manifest};
use crate::import::throttle::Throttle;
use crate::import::types::{CancellationFlag, ImportError, ImportProgress, ImportReport};
use crate::config::DEFAULT_IMPORT_DELAY;
use crate::library::Game;
use crate::library_context::SharedLibrary;
use crate::sandbox::{AccessScope, SandboxAccessBroker};
use crate::settings::SettingsStore;
use crate::steam::{AppManifest, ApplicationInfo, MetadataSource};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Steam folder with access held for the duration of an import
#[derive(Debug)]
pub struct ImportSource {
    root: PathBuf,
    _scope: AccessScope,
}

impl ImportSource {
    pub fn new(root: impl Into<PathBuf>, scope: AccessScope) -> Self {
        ImportSource {
            root: root.into(),
            _scope: scope,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Imports installed Steam games into the catalog
pub struct SteamImporter {
    steam_root: PathBuf,
    metadata: Arc<dyn MetadataSource>,
    settings: Arc<dyn SettingsStore>,
    request_delay: Duration,
    progress_tx: Option<mpsc::UnboundedSender<ImportProgress>>,
}

impl SteamImporter {
    pub fn new(
        steam_root: impl Into<PathBuf>,
        metadata: Arc<dyn MetadataSource>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        SteamImporter {
            steam_root: steam_root.into(),
            metadata,
            settings,
            request_delay: DEFAULT_IMPORT_DELAY,
            progress_tx: None,
        }
    }

    /// Minimum spacing between two store requests
    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    /// Send progress updates to `progress_tx`
    pub fn with_progress(mut self, progress_tx: mpsc::UnboundedSender<ImportProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn steam_root(&self) -> &Path {
        &self.steam_root
    }

    pub fn schedule(&self) -> ImportSchedule {
        ImportSchedule::load(self.settings.as_ref())
    }

    /// Obtain access to the Steam folder. Must run on the main thread since it
    /// may prompt.
    pub fn prepare(&self, broker: &SandboxAccessBroker) -> Option<ImportSource> {
        let Some(grant) = broker.access(&self.steam_root) else {
            warn!(
                "SteamImporter: No access to {}, skipping import",
                self.steam_root.display()
            );
            return None;
        };
        let Some(scope) = broker.open(&grant) else {
            warn!(
                "SteamImporter: Access to {} was refused",
                grant.path.display()
            );
            return None;
        };
        Some(ImportSource::new(grant.path, scope))
    }

    /// Prepare and run in one go. `None` when access was not granted.
    ///
    /// Prompts on the calling thread when needed.
    pub async fn import(
        &self,
        broker: &SandboxAccessBroker,
        library: &SharedLibrary,
    ) -> Result<Option<ImportReport>, ImportError> {
        match self.prepare(broker) {
            Some(source) => self.run(source, library).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn run(
        &self,
        source: ImportSource,
        library: &SharedLibrary,
    ) -> Result<ImportReport, ImportError> {
        self.run_with_cancel(source, library, &CancellationFlag::new())
            .await
    }

    /// Scan, enrich and merge. A cancelled run leaves the catalog untouched.
    pub async fn run_with_cancel(
        &self,
        source: ImportSource,
        library: &SharedLibrary,
        cancel: &CancellationFlag,
    ) -> Result<ImportReport, ImportError> {
        let root = source.root();
        let mut report = ImportReport::default();

        let steamapps = root.join("steamapps");
        if !tokio::fs::try_exists(&steamapps).await.unwrap_or(false) {
            info!(
                "SteamImporter: No steamapps folder in {}, nothing to import",
                root.display()
            );
            return Ok(report);
        }

        let manifests = scan_manifests(&steamapps).await?;
        info!("SteamImporter: Found {} manifests", manifests.len());
        self.emit(ImportProgress::Started {
            manifests: manifests.len(),
        });

        let known = library.read().await.steam_appids();
        let mut queued = HashSet::new();
        let mut throttle = Throttle::new(self.request_delay);
        let mut games: Vec<Game> = Vec::new();

        for path in manifests {
            cancel.check()?;
            report.scanned += 1;

            let manifest = match AppManifest::read(&path).await {
                Ok(manifest) => manifest,
                Err(e) => {
                    error!("SteamImporter: Failed to read {}: {}", path.display(), e);
                    report.invalid += 1;
                    self.skipped(None, format!("unreadable manifest: {}", e));
                    continue;
                }
            };

            let Some(appid) = manifest.appid() else {
                error!("SteamImporter: Missing appid in {}", path.display());
                report.invalid += 1;
                self.skipped(None, "missing appid".to_string());
                continue;
            };

            if known.contains(&appid) || !queued.insert(appid) {
                info!(
                    "SteamImporter: '{}' ({}) is already in the catalog",
                    manifest.name().unwrap_or_default(),
                    appid
                );
                report.duplicates += 1;
                self.skipped(Some(appid), "already in catalog".to_string());
                continue;
            }

            throttle.wait().await;
            cancel.check()?;

            let (details, artwork) =
                tokio::join!(self.fetch(appid), resolve_local_artwork(root, appid));
            cancel.check()?;

            let mut game = game_from_manifest(appid, &manifest);
            for (kind, url) in artwork {
                game.set_artwork_url(kind, Some(url));
            }
            match details {
                Some(info) => apply_details(&mut game, &info),
                None => report.enrichment_failures += 1,
            }

            info!("SteamImporter: New Steam game '{}' ({})", game.name, appid);
            self.emit(ImportProgress::GameImported {
                id: game.id(),
                appid,
                name: game.name.clone(),
            });
            games.push(game);
        }

        cancel.check()?;

        if !games.is_empty() {
            let mut manager = library.write().await;
            for game in games {
                // Another writer may have added it while we were fetching
                if game
                    .steam_appid()
                    .is_some_and(|appid| manager.contains_steam_app(appid))
                {
                    report.duplicates += 1;
                    continue;
                }
                manager.add(game)?;
                report.imported += 1;
            }
            if report.imported > 0 {
                manager.persist()?;
            }
        }

        if let Err(e) = ImportSchedule::record_import(self.settings.as_ref(), Utc::now()) {
            warn!("SteamImporter: Could not record import time: {}", e);
        }

        info!(
            "SteamImporter: Imported {} games ({} duplicates, {} invalid)",
            report.imported, report.duplicates, report.invalid
        );
        self.emit(ImportProgress::Complete(report.clone()));
        Ok(report)
    }

    async fn fetch(&self, appid: u64) -> Option<ApplicationInfo> {
        match self.metadata.details(appid).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                warn!("SteamImporter: The store has no details for {}", appid);
                None
            }
            Err(e) => {
                error!(
                    "SteamImporter: Failed to retrieve details of Steam app {}: {}",
                    appid, e
                );
                None
            }
        }
    }

    fn skipped(&self, appid: Option<u64>, reason: String) {
        self.emit(ImportProgress::Skipped { appid, reason });
    }

    fn emit(&self, progress: ImportProgress) {
        if let Some(tx) = &self.progress_tx {
            if tx.send(progress).is_err() {
                debug!("SteamImporter: Progress receiver dropped");
            }
        }
    }
}

/// `.acf` files directly inside `steamapps`, sorted by path
async fn scan_manifests(steamapps: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(steamapps).await?;
    let mut manifests = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_manifest = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("acf"));
        if is_manifest && entry.file_type().await?.is_file() {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_scan_only_picks_manifests() {
        let temp_dir = TempDir::new().unwrap();
        let steamapps = temp_dir.path();
        std::fs::write(steamapps.join("appmanifest_440.acf"), "").unwrap();
        std::fs::write(steamapps.join("appmanifest_400.ACF"), "").unwrap();
        std::fs::write(steamapps.join("libraryfolders.vdf"), "").unwrap();
        std::fs::create_dir(steamapps.join("common.acf")).unwrap();

        let manifests = scan_manifests(steamapps).await.unwrap();
        let names: Vec<_> = manifests
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["appmanifest_400.ACF", "appmanifest_440.acf"]);
    }
}
