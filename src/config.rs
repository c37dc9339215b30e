use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Store API used for enrichment
pub const DEFAULT_STEAM_API_URL: &str = "https://store.steampowered.com/api/";

/// Minimum spacing between two enrichment requests
pub const DEFAULT_IMPORT_DELAY: Duration = Duration::from_secs(2);

/// Application configuration
/// In debug builds: loads a .env file first, then reads the environment
/// In release builds: reads the environment only
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding games.json, settings.json and the image cache
    pub data_dir: PathBuf,
    /// Root of the Steam installation to import from
    pub steam_dir: PathBuf,
    /// Base URL of the store API
    pub steam_api_url: String,
    /// Delay enforced between enrichment requests
    pub import_delay: Duration,
}

impl Config {
    /// Load configuration based on build mode
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                info!("Config: Dev mode activated - loaded .env file");
            } else {
                info!("Config: No .env file found, using environment only");
            }
        }

        Self::from_env()
    }

    /// Load configuration from PHOENIX_* environment variables, falling back to
    /// platform defaults
    fn from_env() -> Self {
        let data_dir = std::env::var("PHOENIX_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let steam_dir = std::env::var("PHOENIX_STEAM_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_steam_dir);

        let steam_api_url = std::env::var("PHOENIX_STEAM_API_URL")
            .unwrap_or_else(|_| DEFAULT_STEAM_API_URL.to_string());

        let import_delay = match std::env::var("PHOENIX_IMPORT_DELAY_MS") {
            Ok(value) => match value.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(
                        "Config: PHOENIX_IMPORT_DELAY_MS='{}' is not a number, using default",
                        value
                    );
                    DEFAULT_IMPORT_DELAY
                }
            },
            Err(_) => DEFAULT_IMPORT_DELAY,
        };

        info!("Config: Data directory: {}", data_dir.display());
        info!("Config: Steam directory: {}", steam_dir.display());

        Self {
            data_dir,
            steam_dir,
            steam_api_url,
            import_delay,
        }
    }

    /// Configuration rooted at an explicit data directory, everything else default
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            steam_dir: default_steam_dir(),
            steam_api_url: DEFAULT_STEAM_API_URL.to_string(),
            import_delay: DEFAULT_IMPORT_DELAY,
        }
    }

    /// Path of the catalog file
    pub fn library_path(&self) -> PathBuf {
        self.data_dir.join("games.json")
    }

    /// Path of the settings file
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Root of the artwork cache
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
        .join("Phoenix")
}

fn default_steam_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Steam")
    } else {
        home_dir().join(".steam").join("steam")
    }
}
