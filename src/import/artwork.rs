use crate::library::ArtworkKind;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artwork files Steam keeps for each installed app, by kind
const LIBRARY_CACHE_FILES: &[(ArtworkKind, &str)] = &[
    (ArtworkKind::Icon, "icon.jpg"),
    (ArtworkKind::Library, "library_600x900.jpg"),
    (ArtworkKind::Banner, "library_hero.jpg"),
    (ArtworkKind::Header, "header.jpg"),
    (ArtworkKind::Logo, "logo.png"),
];

/// Steam's local artwork cache under an installation root
pub fn library_cache_dir(steam_root: &Path) -> PathBuf {
    steam_root.join("appcache").join("librarycache")
}

/// Find the artwork Steam already downloaded for `appid`.
///
/// Files are only checked for existence, not decoded.
pub async fn resolve_local_artwork(steam_root: &Path, appid: u64) -> Vec<(ArtworkKind, Url)> {
    let cache_dir = library_cache_dir(steam_root);
    let mut found = Vec::new();

    for (kind, suffix) in LIBRARY_CACHE_FILES {
        let path = cache_dir.join(format!("{}_{}", appid, suffix));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        match Url::from_file_path(&path) {
            Ok(url) => found.push((*kind, url)),
            Err(()) => debug!("SteamImporter: Not an absolute path: {}", path.display()),
        }
    }

    found
}
