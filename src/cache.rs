use crate::fs_util::write_atomic;
use crate::library::{ArtworkKind, Game, Library};
use crate::sandbox::{AccessScope, Bookmarks};
use image::{DynamicImage, ImageFormat};
use reqwest::Url;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported artwork source: {0}")]
    UnsupportedSource(String),
    #[error("Access denied to {0}")]
    AccessDenied(PathBuf),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// On-disk artwork store keyed by game id and artwork kind.
///
/// Every image is stored re-encoded as PNG at `<folder>/<game id>.png`.
pub struct ImageCache {
    root: PathBuf,
    bookmarks: Arc<dyn Bookmarks>,
}

impl ImageCache {
    pub fn new(root: impl Into<PathBuf>, bookmarks: Arc<dyn Bookmarks>) -> Self {
        ImageCache {
            root: root.into(),
            bookmarks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of an entry relative to the cache root
    pub fn relative_path(id: Uuid, kind: ArtworkKind) -> PathBuf {
        Path::new(kind.folder()).join(format!("{}.png", id))
    }

    pub fn path_for(&self, id: Uuid, kind: ArtworkKind) -> PathBuf {
        self.root.join(Self::relative_path(id, kind))
    }

    /// Cached artwork, if present and decodable
    pub async fn get(&self, id: Uuid, kind: ArtworkKind) -> Option<DynamicImage> {
        let path = self.path_for(id, kind);
        let bytes = fs::read(&path).await.ok()?;
        decode(bytes, &path).await
    }

    /// Copy artwork from a local `file://` source into the cache
    pub async fn put(&self, source: &Url, id: Uuid, kind: ArtworkKind) -> Result<(), CacheError> {
        let source_path = source
            .to_file_path()
            .map_err(|_| CacheError::UnsupportedSource(source.to_string()))?;

        let bytes = {
            let _scope = AccessScope::start(self.bookmarks.clone(), source_path.clone())
                .ok_or_else(|| CacheError::AccessDenied(source_path.clone()))?;
            fs::read(&source_path).await?
        };

        let destination = self.path_for(id, kind);
        let target = destination.clone();
        tokio::task::spawn_blocking(move || -> Result<(), CacheError> {
            let image = image::load_from_memory(&bytes)?;
            let mut png = Cursor::new(Vec::new());
            image.write_to(&mut png, ImageFormat::Png)?;
            write_atomic(&target, png.get_ref())?;
            Ok(())
        })
        .await??;

        debug!(
            "ImageCache: Cached {} as {}",
            source_path.display(),
            destination.display()
        );
        Ok(())
    }

    /// Artwork for a game, preferring its own local artwork over the cache
    pub async fn artwork(&self, game: &Game, kind: ArtworkKind) -> Option<DynamicImage> {
        if let Some(path) = game
            .artwork_url(kind)
            .and_then(|url| url.to_file_path().ok())
        {
            let bytes = match AccessScope::start(self.bookmarks.clone(), path.clone()) {
                Some(_scope) => fs::read(&path).await.ok(),
                None => None,
            };
            if let Some(bytes) = bytes {
                if let Some(image) = decode(bytes, &path).await {
                    return Some(image);
                }
            }
        }
        self.get(game.id(), kind).await
    }

    /// Remove cached artwork of games no longer in the catalog.
    ///
    /// Hidden games keep their artwork since they can be restored.
    pub async fn evict_orphans(&self, library: &Library) -> Result<usize, CacheError> {
        let mut evicted = 0;

        for kind in ArtworkKind::ALL {
            let folder = self.root.join(kind.folder());
            let mut entries = match fs::read_dir(&folder).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                    continue;
                }
                let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| Uuid::parse_str(stem).ok())
                else {
                    continue;
                };

                if !library.contains(id) {
                    match fs::remove_file(&path).await {
                        Ok(()) => evicted += 1,
                        Err(e) => warn!(
                            "ImageCache: Failed to remove {}: {}",
                            path.display(),
                            e
                        ),
                    }
                }
            }
        }

        info!("ImageCache: Evicted {} orphaned images", evicted);
        Ok(evicted)
    }
}

async fn decode(bytes: Vec<u8>, path: &Path) -> Option<DynamicImage> {
    match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await {
        Ok(Ok(image)) => Some(image),
        Ok(Err(e)) => {
            debug!("ImageCache: Cannot decode {}: {}", path.display(), e);
            None
        }
        Err(e) => {
            warn!("ImageCache: Decode task failed: {}", e);
            None
        }
    }
}
