#![cfg(feature = "test-utils")]

mod support;
use std::sync::Arc;

use crate::support::{tracing_init, write_jpeg};
use phoenix::cache::{CacheError, ImageCache};
use phoenix::library::{ArtworkKind, Game, Library};
use phoenix::test_support::MemoryBookmarks;
use reqwest::Url;
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_get_before_and_after_put() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("440_icon.jpg");
    write_jpeg(&source);
    let bookmarks = Arc::new(MemoryBookmarks::new());
    let cache = ImageCache::new(temp_dir.path().join("images"), bookmarks.clone());
    let id = Uuid::new_v4();

    assert!(cache.get(id, ArtworkKind::Icon).await.is_none());

    cache
        .put(&Url::from_file_path(&source).unwrap(), id, ArtworkKind::Icon)
        .await
        .unwrap();

    let image = cache.get(id, ArtworkKind::Icon).await.unwrap();
    assert_eq!((image.width(), image.height()), (6, 3));
    assert!(cache.get(id, ArtworkKind::Banner).await.is_none());
    assert!(temp_dir
        .path()
        .join("images")
        .join("icon")
        .join(format!("{}.png", id))
        .exists());

    // The source read was bracketed
    assert_eq!(bookmarks.started(), 1);
    assert_eq!(bookmarks.stopped(), 1);
}

#[tokio::test]
async fn test_put_overwrites() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.jpg");
    write_jpeg(&first);
    let second = temp_dir.path().join("second.png");
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(2, 9))
        .save_with_format(&second, image::ImageFormat::Png)
        .unwrap();
    let cache = ImageCache::new(temp_dir.path().join("images"), Arc::new(MemoryBookmarks::new()));
    let id = Uuid::new_v4();

    for source in [&first, &second] {
        cache
            .put(&Url::from_file_path(source).unwrap(), id, ArtworkKind::Library)
            .await
            .unwrap();
    }

    let image = cache.get(id, ArtworkKind::Library).await.unwrap();
    assert_eq!((image.width(), image.height()), (2, 9));
}

#[tokio::test]
async fn test_put_failures() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let bookmarks = Arc::new(MemoryBookmarks::new());
    let cache = ImageCache::new(temp_dir.path().join("images"), bookmarks.clone());
    let id = Uuid::new_v4();

    let not_an_image = temp_dir.path().join("notes.txt");
    std::fs::write(&not_an_image, "hello").unwrap();
    let result = cache
        .put(&Url::from_file_path(&not_an_image).unwrap(), id, ArtworkKind::Logo)
        .await;
    assert!(matches!(result, Err(CacheError::Image(_))));

    let missing = temp_dir.path().join("missing.jpg");
    let result = cache
        .put(&Url::from_file_path(&missing).unwrap(), id, ArtworkKind::Logo)
        .await;
    assert!(matches!(result, Err(CacheError::Io(_))));

    let refused = temp_dir.path().join("refused.jpg");
    write_jpeg(&refused);
    bookmarks.refuse(&refused);
    let result = cache
        .put(&Url::from_file_path(&refused).unwrap(), id, ArtworkKind::Logo)
        .await;
    assert!(matches!(result, Err(CacheError::AccessDenied(_))));

    assert!(cache.get(id, ArtworkKind::Logo).await.is_none());
    assert_eq!(bookmarks.started(), bookmarks.stopped());
}

#[tokio::test]
async fn test_evict_orphans_keeps_hidden_games() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("art.jpg");
    write_jpeg(&source);
    let url = Url::from_file_path(&source).unwrap();
    let cache = ImageCache::new(temp_dir.path().join("images"), Arc::new(MemoryBookmarks::new()));

    let visible = Game::new("Portal");
    let mut hidden = Game::new("Portal 2");
    hidden.is_deleted = true;
    let removed = Uuid::new_v4();

    for (id, kind) in [
        (visible.id(), ArtworkKind::Icon),
        (hidden.id(), ArtworkKind::Header),
        (removed, ArtworkKind::Icon),
        (removed, ArtworkKind::Banner),
    ] {
        cache.put(&url, id, kind).await.unwrap();
    }
    // Files the cache did not write are left alone
    std::fs::write(temp_dir.path().join("images").join("icon").join("README"), "").unwrap();

    let library = Library {
        games: vec![visible.clone(), hidden.clone()],
        ..Default::default()
    };

    assert_eq!(cache.evict_orphans(&library).await.unwrap(), 2);
    assert!(cache.get(visible.id(), ArtworkKind::Icon).await.is_some());
    assert!(cache.get(hidden.id(), ArtworkKind::Header).await.is_some());
    assert!(cache.get(removed, ArtworkKind::Icon).await.is_none());
    assert!(cache.get(removed, ArtworkKind::Banner).await.is_none());
    assert!(temp_dir.path().join("images").join("icon").join("README").exists());

    assert_eq!(cache.evict_orphans(&library).await.unwrap(), 0);
}

#[tokio::test]
async fn test_artwork_falls_back_to_cache() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("hero.jpg");
    write_jpeg(&source);
    let cache = ImageCache::new(temp_dir.path().join("images"), Arc::new(MemoryBookmarks::new()));

    let mut game = Game::new("Portal");
    cache
        .put(&Url::from_file_path(&source).unwrap(), game.id(), ArtworkKind::Banner)
        .await
        .unwrap();

    // Points at a file that is gone
    game.set_artwork_url(
        ArtworkKind::Banner,
        Url::from_file_path(temp_dir.path().join("deleted.jpg")).ok(),
    );
    assert!(cache.artwork(&game, ArtworkKind::Banner).await.is_some());
}
