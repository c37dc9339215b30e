use crate::fs_util::write_atomic;
use crate::library::models::{Game, Library, CURRENT_FORMAT};
use crate::library::LibraryError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads and writes the catalog file (`games.json`)
#[derive(Debug, Clone)]
pub struct LibraryStore {
    path: PathBuf,
}

/// Just enough of the file to pick a decoder
#[derive(Deserialize)]
struct FormatProbe {
    #[serde(default)]
    format: i64,
}

/// Format 0 layout
#[derive(Deserialize)]
struct LibraryV0 {
    games: Vec<Game>,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LibraryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog. A missing file is an empty catalog.
    pub fn load(&self) -> Result<Library, LibraryError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "LibraryStore: No catalog at {}, starting empty",
                    self.path.display()
                );
                return Ok(Library::default());
            }
            Err(e) => return Err(LibraryError::Io(e)),
        };

        let library = Self::decode(&bytes)?;
        debug!(
            "LibraryStore: Loaded {} games from {}",
            library.games.len(),
            self.path.display()
        );
        Ok(library)
    }

    /// Write the catalog atomically
    pub fn save(&self, library: &Library) -> Result<(), LibraryError> {
        let json = Self::encode(library)?;
        write_atomic(&self.path, &json)?;
        debug!(
            "LibraryStore: Saved {} games to {}",
            library.games.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Decode a catalog file, dispatching on its format version.
    ///
    /// Only format 0 exists. Any other version is rejected, never downgraded.
    pub fn decode(bytes: &[u8]) -> Result<Library, LibraryError> {
        let probe: FormatProbe = serde_json::from_slice(bytes)?;

        let games = match probe.format {
            0 => serde_json::from_slice::<LibraryV0>(bytes)?.games,
            other => return Err(LibraryError::UnsupportedFormat(other)),
        };

        let mut seen = HashSet::with_capacity(games.len());
        for game in &games {
            if !seen.insert(game.id()) {
                return Err(LibraryError::DuplicateId(game.id()));
            }
        }

        Ok(Library {
            format: CURRENT_FORMAT,
            games,
        })
    }

    pub fn encode(library: &Library) -> Result<Vec<u8>, LibraryError> {
        Ok(serde_json::to_vec_pretty(library)?)
    }
}
