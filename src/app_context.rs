use crate::cache::ImageCache;
use crate::config::Config;
use crate::import::SteamImporter;
use crate::library::{LibraryError, LibraryStore};
use crate::library_context::SharedLibrary;
use crate::sandbox::{AccessPrompt, Bookmarks, DialogPrompt, PathBookmarks, SandboxAccessBroker};
use crate::settings::{JsonFileSettings, SettingsStore};
use crate::steam::{MetadataSource, SteampoweredClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
}

/// Every long-lived service, built once at startup and passed explicitly
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub settings: Arc<dyn SettingsStore>,
    pub library: SharedLibrary,
    pub broker: Arc<SandboxAccessBroker>,
    pub images: Arc<ImageCache>,
    pub importer: Arc<SteamImporter>,
}

impl AppContext {
    /// Wire up the services with the platform bookmarks and the native prompt
    pub fn initialize(config: Config) -> Result<Self, AppError> {
        let bookmarks: Arc<dyn Bookmarks> = Arc::new(PathBookmarks::new());
        let metadata: Arc<dyn MetadataSource> =
            Arc::new(SteampoweredClient::new(&config.steam_api_url).use_device_locale());
        Self::with_services(config, bookmarks, Arc::new(DialogPrompt), metadata)
    }

    /// Wire up the services around the given platform seams
    pub fn with_services(
        config: Config,
        bookmarks: Arc<dyn Bookmarks>,
        prompt: Arc<dyn AccessPrompt>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let settings: Arc<dyn SettingsStore> =
            Arc::new(JsonFileSettings::open(config.settings_path()));
        let library = SharedLibrary::open(LibraryStore::new(config.library_path()))?;
        let broker = Arc::new(SandboxAccessBroker::new(
            bookmarks.clone(),
            prompt,
            settings.clone(),
        ));
        let images = Arc::new(ImageCache::new(config.images_dir(), bookmarks));
        let importer = Arc::new(
            SteamImporter::new(&config.steam_dir, metadata, settings.clone())
                .with_request_delay(config.import_delay),
        );

        info!("AppContext: Initialized in {}", config.data_dir.display());

        Ok(AppContext {
            config,
            settings,
            library,
            broker,
            images,
            importer,
        })
    }
}
