#![allow(dead_code)]

use phoenix::library::{LibraryManager, LibraryStore};
use phoenix::library_context::SharedLibrary;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A fake Steam installation plus a data directory, both temporary
pub struct SteamFixture {
    pub temp_dir: TempDir,
}

impl SteamFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("Steam").join("steamapps")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        SteamFixture { temp_dir }
    }

    /// Fixture without a `steamapps` folder
    pub fn without_steamapps() -> Self {
        let fixture = Self::new();
        std::fs::remove_dir(fixture.steamapps()).unwrap();
        fixture
    }

    pub fn steam_root(&self) -> PathBuf {
        self.temp_dir.path().join("Steam")
    }

    pub fn steamapps(&self) -> PathBuf {
        self.steam_root().join("steamapps")
    }

    pub fn library_path(&self) -> PathBuf {
        self.temp_dir.path().join("data").join("games.json")
    }

    /// Write `appmanifest_<appid>.acf`
    pub fn write_manifest(&self, appid: u64, name: &str) -> PathBuf {
        let contents = format!(
            "\"AppState\"\n{{\n\t\"appid\"\t\t\"{}\"\n\t\"Universe\"\t\t\"1\"\n\t\"name\"\t\t\"{}\"\n\t\"StateFlags\"\t\t\"4\"\n}}\n",
            appid, name
        );
        self.write_raw_manifest(&format!("appmanifest_{}.acf", appid), &contents)
    }

    pub fn write_raw_manifest(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.steamapps().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write a file into Steam's local artwork cache
    pub fn write_artwork(&self, file_name: &str) -> PathBuf {
        let dir = self.steam_root().join("appcache").join("librarycache");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        write_jpeg(&path);
        path
    }

    pub fn open_library(&self) -> SharedLibrary {
        SharedLibrary::new(LibraryManager::open(LibraryStore::new(self.library_path())).unwrap())
    }
}

/// A small solid-color JPEG
pub fn write_jpeg(path: &Path) {
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(6, 3, image::Rgb([10, 120, 200])))
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}
